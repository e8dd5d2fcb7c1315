//! Dashboard state: the loaded records, the current filter selection, and
//! everything derived from the two.
//!
//! Derived values are plain functions of `(records, selection)`. The
//! `Dashboard` only stores their latest results and recomputes all of them
//! whenever the selection is replaced.

use crate::aggregate::unique_values;
use crate::filter::{filter_records, FilterChange, FilterSelection};
use crate::reports::{
    monthly_trend, subscriber_group_breakdown, summary_stats, top_districts, yearly_trend,
};
use crate::types::{
    DistrictRow, Field, FieldValue, MonthlyRow, Record, SubscriberGroupRow, SummaryStats,
    YearlyRow,
};
use tracing::debug;

/// Choices offered for each filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub districts: Vec<String>,
    /// Scoped to the selected district, if any.
    pub neighborhoods: Vec<String>,
    pub subscriber_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    pub yearly: Vec<YearlyRow>,
    pub top_districts: Vec<DistrictRow>,
    pub subscriber_groups: Vec<SubscriberGroupRow>,
    pub monthly: Vec<MonthlyRow>,
    pub summary: SummaryStats,
}

fn text_values<'a, I>(data: I, field: Field) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    unique_values(data, field)
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}

pub fn filter_options(records: &[Record], selected_district: Option<&str>) -> FilterOptions {
    let years = unique_values(records, Field::Year)
        .iter()
        .filter_map(FieldValue::as_int)
        .filter_map(|y| i32::try_from(y).ok())
        .collect();
    let neighborhoods = match selected_district {
        Some(d) => text_values(records.iter().filter(|r| r.district == d), Field::Neighborhood),
        None => text_values(records, Field::Neighborhood),
    };
    FilterOptions {
        years,
        districts: text_values(records, Field::District),
        neighborhoods,
        subscriber_groups: text_values(records, Field::SubscriberGroup),
    }
}

pub fn compute_views(records: &[Record], selection: &FilterSelection) -> DashboardViews {
    let filtered = filter_records(records, selection);
    DashboardViews {
        yearly: yearly_trend(&filtered),
        top_districts: top_districts(&filtered),
        subscriber_groups: subscriber_group_breakdown(&filtered),
        monthly: monthly_trend(&filtered),
        summary: summary_stats(&filtered),
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Vec<Record>,
    selection: FilterSelection,
    options: FilterOptions,
    views: DashboardViews,
}

impl Dashboard {
    pub fn new(records: Vec<Record>) -> Self {
        let selection = FilterSelection::default();
        let options = filter_options(&records, None);
        let views = compute_views(&records, &selection);
        Dashboard {
            records,
            selection,
            options,
            views,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    /// Records passing the current selection.
    pub fn filtered(&self) -> Vec<&Record> {
        filter_records(&self.records, &self.selection)
    }

    /// Replace the selection with `change` applied and recompute everything.
    pub fn set_filter(&mut self, change: FilterChange) {
        debug!("Applying filter change {:?}", change);
        self.selection = self.selection.apply(change);
        self.options = filter_options(&self.records, self.selection.district.as_deref());
        self.views = compute_views(&self.records, &self.selection);
        debug!(
            "{} of {} records match",
            self.views.summary.record_count,
            self.records.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, district: &str, neighborhood: &str, subs: u64, cons: u64) -> Record {
        Record {
            year,
            month: 1,
            district: district.to_string(),
            neighborhood: neighborhood.to_string(),
            subscriber_group: "MESKEN".to_string(),
            subscriber_count: subs,
            consumption: cons,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec(2021, "KONAK", "ALSANCAK", 10, 100),
            rec(2021, "BORNOVA", "ERZENE", 20, 200),
            rec(2022, "KONAK", "GUZELYALI", 15, 150),
            rec(2022, "", "", 0, 0),
        ]
    }

    #[test]
    fn test_options_unscoped_without_district() {
        let options = filter_options(&sample(), None);
        assert_eq!(options.years, vec![2021, 2022]);
        assert_eq!(options.districts, vec!["BORNOVA", "KONAK"]);
        assert_eq!(options.neighborhoods, vec!["ALSANCAK", "ERZENE", "GUZELYALI"]);
        assert_eq!(options.subscriber_groups, vec!["MESKEN"]);
    }

    #[test]
    fn test_neighborhood_options_follow_district() {
        let mut dashboard = Dashboard::new(sample());
        dashboard.set_filter(FilterChange::District(Some("KONAK".to_string())));
        assert_eq!(dashboard.options().neighborhoods, vec!["ALSANCAK", "GUZELYALI"]);
        // Other lists stay unscoped.
        assert_eq!(dashboard.options().districts, vec!["BORNOVA", "KONAK"]);

        dashboard.set_filter(FilterChange::Neighborhood(Some("ALSANCAK".to_string())));
        assert_eq!(dashboard.views().summary.total_consumption, 100);

        dashboard.set_filter(FilterChange::District(Some("BORNOVA".to_string())));
        assert_eq!(dashboard.selection().neighborhood, None);
        assert_eq!(dashboard.options().neighborhoods, vec!["ERZENE"]);
        assert_eq!(dashboard.views().summary.total_consumption, 200);
    }

    #[test]
    fn test_no_matches_yields_empty_views() {
        let mut dashboard = Dashboard::new(sample());
        dashboard.set_filter(FilterChange::Year(Some(1999)));
        let views = dashboard.views();
        assert!(views.yearly.is_empty());
        assert!(views.top_districts.is_empty());
        assert!(views.subscriber_groups.is_empty());
        assert!(views.monthly.is_empty());
        assert_eq!(views.summary.record_count, 0);
        assert_eq!(views.summary.avg_consumption_per_subscriber, 0.0);
    }

    #[test]
    fn test_clear_all_restores_initial_views() {
        let mut dashboard = Dashboard::new(sample());
        let initial = dashboard.views().clone();
        dashboard.set_filter(FilterChange::District(Some("KONAK".to_string())));
        assert_ne!(dashboard.views(), &initial);
        dashboard.set_filter(FilterChange::ClearAll);
        assert_eq!(dashboard.views(), &initial);
        assert_eq!(dashboard.filtered().len(), dashboard.records().len());
    }
}
