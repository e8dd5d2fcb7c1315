use crate::error::{DashboardError, Result};
use crate::types::{RawRow, Record, REQUIRED_COLUMNS};
use crate::util::parse_leading_int;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub const DELIMITER: u8 = b';';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows the tokenizer could not decode.
    pub skipped_rows: usize,
    /// Numeric fields that were absent or unparseable and became 0.
    pub defaulted_fields: usize,
    pub missing_columns: Vec<String>,
}

/// A coerced record plus the number of numeric fields that fell back to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coerced {
    pub record: Record,
    pub defaulted: usize,
}

/// Coerce a raw row into a `Record`. Never fails: anything that is not a
/// leading integer in range of the target type becomes 0, missing text
/// becomes `""`.
pub fn coerce_row(row: &RawRow) -> Coerced {
    let mut defaulted = 0usize;
    let year = coerce_int(row.year.as_deref(), &mut defaulted);
    let month = coerce_int(row.month.as_deref(), &mut defaulted);
    let subscriber_count = coerce_int(row.subscriber_count.as_deref(), &mut defaulted);
    let consumption = coerce_int(row.consumption.as_deref(), &mut defaulted);

    Coerced {
        record: Record {
            year,
            month,
            district: row.district.clone().unwrap_or_default(),
            neighborhood: row.neighborhood.clone().unwrap_or_default(),
            subscriber_group: row.subscriber_group.clone().unwrap_or_default(),
            subscriber_count,
            consumption,
        },
        defaulted,
    }
}

fn coerce_int<T>(raw: Option<&str>, defaulted: &mut usize) -> T
where
    T: TryFrom<i64> + Default,
{
    match parse_leading_int(raw).and_then(|n| T::try_from(n).ok()) {
        Some(v) => v,
        None => {
            *defaulted += 1;
            T::default()
        }
    }
}

/// Load and coerce a semicolon-delimited CSV file.
///
/// A file that cannot be opened, or whose header cannot be read, is a load
/// failure and yields no records at all.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<(Vec<Record>, LoadReport)> {
    let path = path.as_ref();
    info!("Loading consumption data from {}", path.display());
    let rdr = reader_builder()
        .from_path(path)
        .map_err(|source| DashboardError::Load {
            path: path.to_path_buf(),
            source,
        })?;
    read_all(rdr).map_err(|e| match e {
        DashboardError::Csv(source) => DashboardError::Load {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Same as [`load_from_path`] for any reader, e.g. an in-memory buffer.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<Record>, LoadReport)> {
    read_all(reader_builder().from_reader(reader))
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers);
    builder
}

fn read_all<R: Read>(mut rdr: csv::Reader<R>) -> Result<(Vec<Record>, LoadReport)> {
    let headers = rdr.headers()?.clone();
    let missing_columns: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    for column in &missing_columns {
        warn!("Required column '{}' not found in header", column);
    }

    let mut report = LoadReport {
        missing_columns,
        ..LoadReport::default()
    };
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping row {}: {}", report.total_rows, e);
                report.skipped_rows += 1;
                continue;
            }
        };
        let coerced = coerce_row(&row);
        report.defaulted_fields += coerced.defaulted;
        records.push(coerced.record);
    }

    report.loaded_rows = records.len();
    if report.skipped_rows > 0 {
        warn!("{} rows could not be decoded and were skipped", report.skipped_rows);
    }
    if report.defaulted_fields > 0 {
        debug!(
            "{} numeric fields were missing or unparseable and set to 0",
            report.defaulted_fields
        );
    }
    info!(
        "Loaded {} of {} rows",
        report.loaded_rows, report.total_rows
    );
    Ok((records, report))
}
