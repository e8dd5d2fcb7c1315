use crate::error::DashboardError;
use crate::filter::FilterSelection;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// One tokenized CSV line, keyed by header name.
///
/// Every column is optional so short rows and absent columns deserialize
/// instead of failing; coercion decides what a missing value becomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRow {
    #[serde(rename = "YIL")]
    pub year: Option<String>,
    #[serde(rename = "AY")]
    pub month: Option<String>,
    #[serde(rename = "ILCE")]
    pub district: Option<String>,
    #[serde(rename = "MAHALLE")]
    pub neighborhood: Option<String>,
    #[serde(rename = "ABONELIK_GRUBU")]
    pub subscriber_group: Option<String>,
    #[serde(rename = "ABONE_ADEDI")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "ORTALAMA_TUKETIM")]
    pub consumption: Option<String>,
}

impl RawRow {
    /// Build a row from a column-name to value map, as handed over by an
    /// external fetch-and-tokenize step. Unknown columns are ignored.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |column: &str| fields.get(column).cloned();
        RawRow {
            year: get("YIL"),
            month: get("AY"),
            district: get("ILCE"),
            neighborhood: get("MAHALLE"),
            subscriber_group: get("ABONELIK_GRUBU"),
            subscriber_count: get("ABONE_ADEDI"),
            consumption: get("ORTALAMA_TUKETIM"),
        }
    }
}

/// A single consumption observation after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub year: i32,
    pub month: u32,
    pub district: String,
    pub neighborhood: String,
    pub subscriber_group: String,
    pub subscriber_count: u64,
    /// Cubic meters.
    pub consumption: u64,
}

/// Header names the loader expects, in file order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "YIL",
    "AY",
    "ILCE",
    "MAHALLE",
    "ABONELIK_GRUBU",
    "ABONE_ADEDI",
    "ORTALAMA_TUKETIM",
];

/// Selector for a record field, used for grouping and option extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    District,
    Neighborhood,
    SubscriberGroup,
    SubscriberCount,
    Consumption,
}

static FIELD_LOOKUP: Lazy<HashMap<&'static str, Field>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for field in Field::ALL {
        m.insert(field.column(), field);
        m.insert(field.name(), field);
    }
    m
});

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Year,
        Field::Month,
        Field::District,
        Field::Neighborhood,
        Field::SubscriberGroup,
        Field::SubscriberCount,
        Field::Consumption,
    ];

    /// CSV header for this field.
    pub fn column(self) -> &'static str {
        match self {
            Field::Year => "YIL",
            Field::Month => "AY",
            Field::District => "ILCE",
            Field::Neighborhood => "MAHALLE",
            Field::SubscriberGroup => "ABONELIK_GRUBU",
            Field::SubscriberCount => "ABONE_ADEDI",
            Field::Consumption => "ORTALAMA_TUKETIM",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::District => "district",
            Field::Neighborhood => "neighborhood",
            Field::SubscriberGroup => "subscriber_group",
            Field::SubscriberCount => "subscriber_count",
            Field::Consumption => "consumption",
        }
    }

    pub fn value(self, r: &Record) -> FieldValue {
        match self {
            Field::Year => FieldValue::Int(i64::from(r.year)),
            Field::Month => FieldValue::Int(i64::from(r.month)),
            Field::District => FieldValue::Text(r.district.clone()),
            Field::Neighborhood => FieldValue::Text(r.neighborhood.clone()),
            Field::SubscriberGroup => FieldValue::Text(r.subscriber_group.clone()),
            Field::SubscriberCount => FieldValue::Int(count_to_i64(r.subscriber_count)),
            Field::Consumption => FieldValue::Int(count_to_i64(r.consumption)),
        }
    }
}

fn count_to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

impl FromStr for Field {
    type Err = DashboardError;

    /// Accepts either the CSV header (`ILCE`) or the field name (`district`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        FIELD_LOOKUP
            .get(key)
            .or_else(|| FIELD_LOOKUP.get(key.to_ascii_uppercase().as_str()))
            .or_else(|| FIELD_LOOKUP.get(key.to_ascii_lowercase().as_str()))
            .copied()
            .ok_or_else(|| DashboardError::UnknownField(s.to_string()))
    }
}

/// Numeric fields that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    SubscriberCount,
    Consumption,
}

impl Measure {
    pub fn value(self, r: &Record) -> u64 {
        match self {
            Measure::SubscriberCount => r.subscriber_count,
            Measure::Consumption => r.consumption,
        }
    }

    pub fn field(self) -> Field {
        match self {
            Measure::SubscriberCount => Field::SubscriberCount,
            Measure::Consumption => Field::Consumption,
        }
    }
}

impl FromStr for Measure {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Field>()? {
            Field::SubscriberCount => Ok(Measure::SubscriberCount),
            Field::Consumption => Ok(Measure::Consumption),
            _ => Err(DashboardError::UnknownField(s.to_string())),
        }
    }
}

/// The value of one field of one record.
///
/// Numbers order numerically and text orders lexicographically, so a grouped
/// year column sorts `2` before `10`. Text comparison is by UTF-8 bytes, not
/// Turkish collation: names starting with Ç, İ, Ö, Ş or Ü sort after `Z`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Zero and the empty string never appear in option lists.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Int(n) => *n == 0,
            FieldValue::Text(s) => s.is_empty(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Sum of a measure across all records sharing one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTotal {
    pub key: FieldValue,
    pub total: u64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct YearlyRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub year_num: i32,
    #[serde(rename = "Consumption")]
    #[tabled(rename = "Consumption")]
    pub consumption: u64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct DistrictRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "District")]
    #[tabled(rename = "District")]
    pub district: String,
    #[serde(rename = "Consumption")]
    #[tabled(rename = "Consumption")]
    pub consumption: u64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SubscriberGroupRow {
    #[serde(rename = "SubscriberGroup")]
    #[tabled(rename = "SubscriberGroup")]
    pub subscriber_group: String,
    #[serde(rename = "Consumption")]
    #[tabled(rename = "Consumption")]
    pub consumption: u64,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct MonthlyRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "SortKey")]
    #[tabled(rename = "SortKey")]
    pub sort_key: String,
    #[serde(rename = "Consumption")]
    #[tabled(rename = "Consumption")]
    pub consumption: u64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct BreakdownRow {
    #[serde(rename = "Key")]
    #[tabled(rename = "Key")]
    pub key: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub record_count: usize,
    pub total_consumption: u64,
    pub total_subscribers: u64,
    pub avg_consumption_per_subscriber: f64,
}

/// Shape of `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub filters: &'a FilterSelection,
    #[serde(flatten)]
    pub stats: &'a SummaryStats,
}
