use crate::dashboard::DashboardViews;
use crate::error::Result;
use crate::filter::FilterSelection;
use crate::types::SummaryReport;
use chrono::Utc;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::{debug, info};

pub const YEARLY_FILE: &str = "yearly_trend.csv";
pub const DISTRICT_FILE: &str = "top_districts.csv";
pub const GROUP_FILE: &str = "subscriber_groups.csv";
pub const MONTHLY_FILE: &str = "monthly_trend.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Serialize `rows` to a comma-separated file with a header row taken from
/// the row type. An empty slice leaves an empty file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    rows.iter().try_for_each(|r| wtr.serialize(r))?;
    wtr.flush()?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Write every view into `dir` and return the paths written.
pub fn export_views(
    dir: &Path,
    views: &DashboardViews,
    selection: &FilterSelection,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let yearly = dir.join(YEARLY_FILE);
    write_csv(&yearly, &views.yearly)?;
    let districts = dir.join(DISTRICT_FILE);
    write_csv(&districts, &views.top_districts)?;
    let groups = dir.join(GROUP_FILE);
    write_csv(&groups, &views.subscriber_groups)?;
    let monthly = dir.join(MONTHLY_FILE);
    write_csv(&monthly, &views.monthly)?;

    let summary = dir.join(SUMMARY_FILE);
    let report = SummaryReport {
        generated_at: Utc::now(),
        filters: selection,
        stats: &views.summary,
    };
    write_json(&summary, &report)?;

    let written = vec![yearly, districts, groups, monthly, summary];
    info!("Exported {} files to {}", written.len(), dir.display());
    Ok(written)
}

/// Markdown table of the first `max_rows` rows under `title`.
pub fn render_preview<T: Tabled>(title: &str, rows: &[T], max_rows: usize) -> String {
    if rows.is_empty() {
        return format!("{}\n\n(no rows)\n", title);
    }
    let shown = rows.len().min(max_rows);
    let table = Table::new(&rows[..shown]).with(Style::markdown()).to_string();
    let mut out = format!("{}\n\n{}\n", title, table);
    if rows.len() > shown {
        out.push_str(&format!("... {} more rows\n", rows.len() - shown));
    }
    out
}

pub fn preview_table_rows<T: Tabled>(title: &str, rows: &[T], max_rows: usize) {
    println!("{}", render_preview(title, rows, max_rows));
}
