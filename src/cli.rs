//! Command-line arguments and logging setup.

use crate::dashboard::FilterOptions;
use crate::filter::{FilterChange, FilterSelection};
use crate::types::{Field, Measure};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_INPUT: &str = "izsu-yillik-ilce-mahalle-su-tuketimi.csv";

/// Summaries of İZSU district and neighborhood water consumption
#[derive(Debug, Clone, Parser)]
#[command(name = "izsu-dashboard", version)]
pub struct Args {
    /// Semicolon-delimited consumption CSV
    #[arg(short = 'i', long = "input", value_name = "PATH", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Only include this reporting year
    #[arg(long)]
    pub year: Option<i32>,

    /// Only include this district (ILCE)
    #[arg(long)]
    pub district: Option<String>,

    /// Only include this neighborhood (MAHALLE)
    #[arg(long)]
    pub neighborhood: Option<String>,

    /// Only include this subscriber group (ABONELIK_GRUBU)
    #[arg(long = "subscriber-group")]
    pub subscriber_group: Option<String>,

    /// Directory for exported CSV and JSON files
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Rows shown in each table preview
    #[arg(long = "preview-rows", default_value_t = 5)]
    pub preview_rows: usize,

    /// Print previews only, write no files
    #[arg(long = "no-export")]
    pub no_export: bool,

    /// Print the available filter values and exit
    #[arg(long = "list-options")]
    pub list_options: bool,

    /// Extra breakdown grouped by this column (e.g. MAHALLE or month)
    #[arg(long = "group-by", value_name = "FIELD")]
    pub group_by: Option<Field>,

    /// Measure summed by --group-by
    #[arg(long = "sum", value_name = "FIELD", default_value = "ORTALAMA_TUKETIM")]
    pub sum: Measure,

    /// Start the interactive menu instead of a single run
    #[arg(long)]
    pub interactive: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Filter edits requested on the command line. District comes before
    /// neighborhood so the district rule does not erase it.
    pub fn filter_changes(&self) -> Vec<FilterChange> {
        let mut changes = Vec::new();
        if self.year.is_some() {
            changes.push(FilterChange::Year(self.year));
        }
        if self.district.is_some() {
            changes.push(FilterChange::District(self.district.clone()));
        }
        if self.neighborhood.is_some() {
            changes.push(FilterChange::Neighborhood(self.neighborhood.clone()));
        }
        if self.subscriber_group.is_some() {
            changes.push(FilterChange::SubscriberGroup(self.subscriber_group.clone()));
        }
        changes
    }
}

/// Log every selected value that is not among the offered options.
/// Returns how many were found.
pub fn warn_unoffered(selection: &FilterSelection, options: &FilterOptions) -> usize {
    let mut count = 0;
    if let Some(year) = selection.year {
        if !options.years.contains(&year) {
            warn!("Year {} does not occur in the data", year);
            count += 1;
        }
    }
    let text_checks = [
        ("District", &selection.district, &options.districts),
        ("Neighborhood", &selection.neighborhood, &options.neighborhoods),
        (
            "Subscriber group",
            &selection.subscriber_group,
            &options.subscriber_groups,
        ),
    ];
    for (label, selected, offered) in text_checks {
        if let Some(value) = selected {
            if !offered.contains(value) {
                warn!("{} '{}' is not among the available options", label, value);
                count += 1;
            }
        }
    }
    count
}

/// Set up structured logging on stderr. `RUST_LOG` takes precedence.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("izsu_dashboard={}", args.get_log_level())));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["izsu-dashboard"]);
        assert_eq!(args.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(args.preview_rows, 5);
        assert_eq!(args.sum, Measure::Consumption);
        assert!(args.group_by.is_none());
        assert!(args.filter_changes().is_empty());
        assert_eq!(args.get_log_level(), "info");
    }

    #[test]
    fn test_filter_changes_order() {
        let args = Args::parse_from([
            "izsu-dashboard",
            "--neighborhood",
            "ALSANCAK",
            "--district",
            "KONAK",
            "--year",
            "2021",
        ]);
        let selection = args
            .filter_changes()
            .into_iter()
            .fold(FilterSelection::default(), |s, c| s.apply(c));
        assert_eq!(selection.year, Some(2021));
        assert_eq!(selection.district.as_deref(), Some("KONAK"));
        assert_eq!(selection.neighborhood.as_deref(), Some("ALSANCAK"));
    }

    #[test]
    fn test_group_by_parses_column_names() {
        let args = Args::parse_from(["izsu-dashboard", "--group-by", "MAHALLE", "--sum", "ABONE_ADEDI"]);
        assert_eq!(args.group_by, Some(Field::Neighborhood));
        assert_eq!(args.sum, Measure::SubscriberCount);
        assert!(Args::try_parse_from(["izsu-dashboard", "--group-by", "NOPE"]).is_err());
    }

    #[test]
    fn test_log_level_flags() {
        assert_eq!(Args::parse_from(["x", "-vv"]).get_log_level(), "trace");
        assert_eq!(Args::parse_from(["x", "-q"]).get_log_level(), "error");
        assert!(Args::try_parse_from(["x", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_warn_unoffered() {
        let options = FilterOptions {
            years: vec![2021],
            districts: vec!["KONAK".to_string()],
            neighborhoods: vec!["ALSANCAK".to_string()],
            subscriber_groups: vec!["MESKEN".to_string()],
        };
        let ok = FilterSelection {
            year: Some(2021),
            district: Some("KONAK".to_string()),
            ..FilterSelection::default()
        };
        assert_eq!(warn_unoffered(&ok, &options), 0);
        let bad = FilterSelection {
            year: Some(1990),
            neighborhood: Some("ERZENE".to_string()),
            ..FilterSelection::default()
        };
        assert_eq!(warn_unoffered(&bad, &options), 2);
    }
}
