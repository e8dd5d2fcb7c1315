use crate::aggregate::aggregate;
use crate::types::{
    BreakdownRow, DistrictRow, Field, Measure, MonthlyRow, Record, SubscriberGroupRow,
    SummaryStats, YearlyRow,
};
use crate::util::{format_number, percentage, saturating_sum};
use std::collections::HashMap;

pub const TOP_DISTRICT_LIMIT: usize = 10;

pub const MONTH_NAMES: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

pub fn yearly_trend(data: &[&Record]) -> Vec<YearlyRow> {
    let mut rows: Vec<YearlyRow> = aggregate(data.iter().copied(), Field::Year, Measure::Consumption)
        .into_iter()
        .map(|g| {
            let year_num = g.key.as_int().and_then(|y| i32::try_from(y).ok()).unwrap_or(0);
            YearlyRow {
                year: g.key.to_string(),
                year_num,
                consumption: g.total,
            }
        })
        .collect();
    rows.sort_by_key(|r| r.year_num);
    rows
}

pub fn top_districts(data: &[&Record]) -> Vec<DistrictRow> {
    let mut totals = aggregate(data.iter().copied(), Field::District, Measure::Consumption);
    // Stable: equal totals keep the aggregator's alphabetical order.
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
        .into_iter()
        .take(TOP_DISTRICT_LIMIT)
        .enumerate()
        .map(|(idx, g)| DistrictRow {
            rank: idx + 1,
            district: g.key.to_string(),
            consumption: g.total,
        })
        .collect()
}

pub fn subscriber_group_breakdown(data: &[&Record]) -> Vec<SubscriberGroupRow> {
    let totals = aggregate(
        data.iter().copied(),
        Field::SubscriberGroup,
        Measure::Consumption,
    );
    let grand_total = saturating_sum(totals.iter().map(|g| g.total));
    totals
        .into_iter()
        .map(|g| SubscriberGroupRow {
            subscriber_group: g.key.to_string(),
            consumption: g.total,
            share_pct: format_number(percentage(g.total, grand_total), 2),
        })
        .collect()
}

/// `"<month name> <year>"`, falling back to the raw month number when it is
/// outside 1..=12.
pub fn month_label(year: i32, month: u32) -> String {
    let name = month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .map(|n| n.to_string())
        .unwrap_or_else(|| month.to_string());
    format!("{} {}", name, year)
}

pub fn monthly_sort_key(year: i32, month: u32) -> String {
    format!("{}-{:02}", year, month)
}

pub fn monthly_trend(data: &[&Record]) -> Vec<MonthlyRow> {
    let mut map: HashMap<String, MonthlyRow> = HashMap::new();
    for r in data {
        let key = monthly_sort_key(r.year, r.month);
        let e = map.entry(key.clone()).or_insert_with(|| MonthlyRow {
            period: month_label(r.year, r.month),
            sort_key: key,
            consumption: 0,
        });
        e.consumption = e.consumption.saturating_add(r.consumption);
    }
    let mut rows: Vec<MonthlyRow> = map.into_values().collect();
    rows.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    rows
}

pub fn summary_stats(data: &[&Record]) -> SummaryStats {
    let total_consumption = saturating_sum(data.iter().map(|r| r.consumption));
    let total_subscribers = saturating_sum(data.iter().map(|r| r.subscriber_count));
    let avg_consumption_per_subscriber = if total_subscribers > 0 {
        total_consumption as f64 / total_subscribers as f64
    } else {
        0.0
    };
    SummaryStats {
        record_count: data.len(),
        total_consumption,
        total_subscribers,
        avg_consumption_per_subscriber,
    }
}

/// Ad-hoc grouping over any field and measure, in aggregator order.
pub fn custom_breakdown(data: &[&Record], group_by: Field, sum: Measure) -> Vec<BreakdownRow> {
    aggregate(data.iter().copied(), group_by, sum)
        .into_iter()
        .map(|g| BreakdownRow {
            key: g.key.to_string(),
            total: g.total,
        })
        .collect()
}
