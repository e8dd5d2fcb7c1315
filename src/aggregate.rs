use crate::types::{Field, FieldValue, GroupTotal, Measure, Record};
use std::collections::{HashMap, HashSet};

/// Group `data` by `group_by` and sum `sum` within each group.
///
/// One pass over the input; the result has one entry per distinct key,
/// sorted ascending (numerically for numeric fields).
pub fn aggregate<'a, I>(data: I, group_by: Field, sum: Measure) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut map: HashMap<FieldValue, u64> = HashMap::new();
    for r in data {
        let e = map.entry(group_by.value(r)).or_default();
        *e = e.saturating_add(sum.value(r));
    }
    let mut totals: Vec<GroupTotal> = map
        .into_iter()
        .map(|(key, total)| GroupTotal { key, total })
        .collect();
    totals.sort_by(|a, b| a.key.cmp(&b.key));
    totals
}

/// Distinct, non-falsy values of `field`, sorted ascending.
pub fn unique_values<'a, I>(data: I, field: Field) -> Vec<FieldValue>
where
    I: IntoIterator<Item = &'a Record>,
{
    let set: HashSet<FieldValue> = data
        .into_iter()
        .map(|r| field.value(r))
        .filter(|v| !v.is_falsy())
        .collect();
    let mut values: Vec<FieldValue> = set.into_iter().collect();
    values.sort();
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, month: u32, district: &str, subs: u64, cons: u64) -> Record {
        Record {
            year,
            month,
            district: district.to_string(),
            neighborhood: String::new(),
            subscriber_group: String::new(),
            subscriber_count: subs,
            consumption: cons,
        }
    }

    #[test]
    fn test_aggregate_empty_input() {
        let data: Vec<Record> = Vec::new();
        assert!(aggregate(&data, Field::District, Measure::Consumption).is_empty());
    }

    #[test]
    fn test_aggregate_sums_per_key_sorted_by_name() {
        let data = vec![
            rec(2021, 1, "KONAK", 1, 100),
            rec(2021, 1, "BORNOVA", 1, 200),
            rec(2022, 1, "KONAK", 1, 150),
        ];
        let totals = aggregate(&data, Field::District, Measure::Consumption);
        assert_eq!(
            totals,
            vec![
                GroupTotal {
                    key: FieldValue::Text("BORNOVA".to_string()),
                    total: 200
                },
                GroupTotal {
                    key: FieldValue::Text("KONAK".to_string()),
                    total: 250
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_numeric_keys_sort_numerically() {
        let data = vec![
            rec(2021, 10, "A", 1, 1),
            rec(2021, 2, "A", 1, 1),
            rec(2021, 1, "A", 1, 1),
        ];
        let keys: Vec<FieldValue> = aggregate(&data, Field::Month, Measure::SubscriberCount)
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(
            keys,
            vec![FieldValue::Int(1), FieldValue::Int(2), FieldValue::Int(10)]
        );
    }

    #[test]
    fn test_aggregate_preserves_sum() {
        let data = vec![
            rec(2021, 1, "A", 3, 17),
            rec(2022, 4, "B", 5, 23),
            rec(2021, 7, "C", 0, 0),
            rec(2023, 9, "A", 9, 61),
        ];
        let expected: u64 = data.iter().map(|r| r.consumption).sum();
        for field in Field::ALL {
            let got: u64 = aggregate(&data, field, Measure::Consumption)
                .iter()
                .map(|g| g.total)
                .sum();
            assert_eq!(got, expected, "grouping by {:?}", field);
        }
    }

    #[test]
    fn test_unique_values_sorted_without_duplicates_or_falsy() {
        let data = vec![
            rec(2022, 1, "B", 1, 1),
            rec(0, 1, "", 1, 1),
            rec(2021, 1, "A", 1, 1),
            rec(2021, 1, "B", 1, 1),
        ];
        assert_eq!(
            unique_values(&data, Field::District),
            vec![
                FieldValue::Text("A".to_string()),
                FieldValue::Text("B".to_string())
            ]
        );
        assert_eq!(
            unique_values(&data, Field::Year),
            vec![FieldValue::Int(2021), FieldValue::Int(2022)]
        );
    }
}
