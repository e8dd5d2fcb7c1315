use crate::types::Record;
use serde::Serialize;

/// The four equality constraints a user can set. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub subscriber_group: Option<String>,
}

/// A single user edit to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Year(Option<i32>),
    District(Option<String>),
    Neighborhood(Option<String>),
    SubscriberGroup(Option<String>),
    ClearAll,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

impl FilterSelection {
    /// Return the selection after `change`. Changing the district always
    /// drops the neighborhood, even when re-selecting the same district.
    pub fn apply(&self, change: FilterChange) -> FilterSelection {
        let mut next = self.clone();
        match change {
            FilterChange::Year(y) => next.year = y.filter(|y| *y != 0),
            FilterChange::District(d) => {
                next.district = non_empty(d);
                next.neighborhood = None;
            }
            FilterChange::Neighborhood(n) => next.neighborhood = non_empty(n),
            FilterChange::SubscriberGroup(g) => next.subscriber_group = non_empty(g),
            FilterChange::ClearAll => next = FilterSelection::default(),
        }
        next
    }

    pub fn is_active(&self) -> bool {
        self.year.is_some()
            || self.district.is_some()
            || self.neighborhood.is_some()
            || self.subscriber_group.is_some()
    }

    /// True when every set constraint equals the record's field exactly.
    pub fn matches(&self, r: &Record) -> bool {
        if let Some(year) = self.year {
            if r.year != year {
                return false;
            }
        }
        if let Some(district) = &self.district {
            if r.district != *district {
                return false;
            }
        }
        if let Some(neighborhood) = &self.neighborhood {
            if r.neighborhood != *neighborhood {
                return false;
            }
        }
        if let Some(group) = &self.subscriber_group {
            if r.subscriber_group != *group {
                return false;
            }
        }
        true
    }
}

/// Records matching `selection`, in input order.
pub fn filter_records<'a, I>(data: I, selection: &FilterSelection) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    data.into_iter().filter(|r| selection.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, district: &str, neighborhood: &str, group: &str) -> Record {
        Record {
            year,
            month: 1,
            district: district.to_string(),
            neighborhood: neighborhood.to_string(),
            subscriber_group: group.to_string(),
            subscriber_count: 1,
            consumption: 1,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec(2021, "KONAK", "ALSANCAK", "MESKEN"),
            rec(2021, "BORNOVA", "ERZENE", "MESKEN"),
            rec(2022, "KONAK", "ALSANCAK", "ISYERI"),
            rec(2022, "KONAK", "GUZELYALI", "MESKEN"),
        ]
    }

    #[test]
    fn test_unset_selection_returns_input_unchanged() {
        let data = sample();
        let out = filter_records(&data, &FilterSelection::default());
        let expected: Vec<&Record> = data.iter().collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_filter_combines_constraints() {
        let data = sample();
        let selection = FilterSelection {
            year: Some(2022),
            district: Some("KONAK".to_string()),
            subscriber_group: Some("MESKEN".to_string()),
            ..FilterSelection::default()
        };
        let out = filter_records(&data, &selection);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].neighborhood, "GUZELYALI");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let data = sample();
        let selection = FilterSelection {
            district: Some("KONAK".to_string()),
            ..FilterSelection::default()
        };
        let once = filter_records(&data, &selection);
        let twice = filter_records(once.iter().copied(), &selection);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_district_change_clears_neighborhood() {
        let s = FilterSelection::default()
            .apply(FilterChange::District(Some("KONAK".to_string())))
            .apply(FilterChange::Neighborhood(Some("ALSANCAK".to_string())))
            .apply(FilterChange::Year(Some(2021)));
        assert_eq!(s.neighborhood.as_deref(), Some("ALSANCAK"));

        let s = s.apply(FilterChange::District(Some("BORNOVA".to_string())));
        assert_eq!(s.district.as_deref(), Some("BORNOVA"));
        assert_eq!(s.neighborhood, None);
        assert_eq!(s.year, Some(2021));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let s = FilterSelection::default()
            .apply(FilterChange::District(Some(String::new())))
            .apply(FilterChange::Year(Some(0)));
        assert!(!s.is_active());
    }

    #[test]
    fn test_clear_all() {
        let s = FilterSelection::default()
            .apply(FilterChange::SubscriberGroup(Some("MESKEN".to_string())));
        assert!(s.is_active());
        let s = s.apply(FilterChange::ClearAll);
        assert!(!s.is_active());
        assert_eq!(s, FilterSelection::default());
    }
}
