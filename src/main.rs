// Entry point and high-level CLI flow.
//
// A plain run loads the CSV, applies the filters given as flags, prints a
// preview of every view and exports them. With `--interactive` the user
// gets a menu instead:
// - [1] loads the CSV,
// - [2] picks a filter value from the current option lists,
// - [3] clears all filters,
// - [4] prints and exports the reports.
use clap::Parser;
use izsu_dashboard::cli::{self, Args};
use izsu_dashboard::dashboard::Dashboard;
use izsu_dashboard::filter::FilterChange;
use izsu_dashboard::loader::{self, LoadReport};
use izsu_dashboard::types::Record;
use izsu_dashboard::{output, reports, util, DashboardError, Result};
use std::io::{self, BufRead, Write};
use std::process;
use tracing::error;

/// Prompt and read one trimmed line. `None` once the input is closed or broken.
fn read_line_from<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_line(prompt: &str) -> Option<String> {
    read_line_from(&mut io::stdin().lock(), prompt)
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// `true` for `Y`; `N` or end of input means leave.
fn prompt_back_to_menu() -> bool {
    back_to_menu_from(&mut io::stdin().lock())
}

fn back_to_menu_from<R: BufRead>(input: &mut R) -> bool {
    while let Some(resp) = read_line_from(input, "Back to Menu (Y/N): ") {
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
    false
}

fn load(args: &Args) -> Result<Vec<Record>> {
    match loader::load_from_path(&args.input) {
        Ok((records, report)) => {
            print_load_report(&report);
            Ok(records)
        }
        Err(e) => {
            error!("Data load failed: {}", e);
            Err(e)
        }
    }
}

fn print_load_report(report: &LoadReport) {
    println!(
        "Processing dataset... ({} rows loaded)",
        util::format_int(report.loaded_rows)
    );
    if report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped because they could not be decoded.",
            util::format_int(report.skipped_rows)
        );
    }
    if report.defaulted_fields > 0 {
        println!(
            "Note: {} numeric fields were empty or invalid and counted as 0.",
            util::format_int(report.defaulted_fields)
        );
    }
    if !report.missing_columns.is_empty() {
        println!("Warning: missing columns {}", report.missing_columns.join(", "));
    }
    println!();
}

fn print_options(dashboard: &Dashboard) {
    let options = dashboard.options();
    let years: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
    println!("Years: {}", years.join(", "));
    println!("Districts: {}", options.districts.join(", "));
    println!("Neighborhoods: {}", options.neighborhoods.join(", "));
    println!("Subscriber groups: {}\n", options.subscriber_groups.join(", "));
}

fn print_reports(dashboard: &Dashboard, args: &Args) -> Result<()> {
    let views = dashboard.views();
    let max_rows = args.preview_rows;
    let summary = &views.summary;

    let selection = dashboard.selection();
    if selection.is_active() {
        println!("Filters: {:?}", selection);
    } else {
        println!("No filters applied.");
    }
    println!(
        "{} records match\n",
        util::format_int(summary.record_count)
    );
    println!(
        "Total consumption: {} m³",
        util::format_large_number(summary.total_consumption)
    );
    println!(
        "Total subscribers: {}",
        util::format_large_number(summary.total_subscribers)
    );
    println!(
        "Average consumption: {} m³/subscriber\n",
        util::format_number(summary.avg_consumption_per_subscriber, 2)
    );

    output::preview_table_rows("Consumption by Year", &views.yearly, max_rows);
    output::preview_table_rows(
        "Consumption by Subscriber Group",
        &views.subscriber_groups,
        max_rows,
    );
    let top_title = format!("Top {} Districts by Consumption", reports::TOP_DISTRICT_LIMIT);
    output::preview_table_rows(&top_title, &views.top_districts, max_rows);
    if !views.monthly.is_empty() {
        output::preview_table_rows("Monthly Consumption Trend", &views.monthly, max_rows);
    }

    if let Some(group_by) = args.group_by {
        let rows = reports::custom_breakdown(&dashboard.filtered(), group_by, args.sum);
        let title = format!("{} by {}", args.sum.field().column(), group_by.column());
        output::preview_table_rows(&title, &rows, max_rows);
    }

    if !args.no_export {
        let written = output::export_views(&args.output_dir, views, selection)?;
        for path in written {
            println!("(Exported {})", path.display());
        }
        println!();
    }
    Ok(())
}

fn run_once(args: &Args) -> Result<()> {
    let records = load(args)?;
    let mut dashboard = Dashboard::new(records);
    for change in args.filter_changes() {
        dashboard.set_filter(change);
    }
    cli::warn_unoffered(dashboard.selection(), dashboard.options());

    if args.list_options {
        print_options(&dashboard);
        return Ok(());
    }
    print_reports(&dashboard, args)
}

/// Pick one of `values` by number; `0` unsets the filter. `None` means the
/// input was not a valid choice.
fn pick<T: Clone + ToString>(label: &str, values: &[T]) -> Option<Option<T>> {
    println!("[0] All {}", label);
    for (idx, v) in values.iter().enumerate() {
        println!("[{}] {}", idx + 1, v.to_string());
    }
    let n: usize = read_choice()?.parse().ok()?;
    match n {
        0 => Some(None),
        n => values.get(n - 1).cloned().map(Some),
    }
}

fn handle_set_filter(dashboard: &mut Dashboard) {
    println!("[1] Year");
    println!("[2] District");
    println!("[3] Neighborhood");
    println!("[4] Subscriber group\n");
    let options = dashboard.options().clone();
    let Some(choice) = read_choice() else {
        return;
    };
    let change = match choice.as_str() {
        "1" => pick("years", &options.years).map(FilterChange::Year),
        "2" => pick("districts", &options.districts).map(FilterChange::District),
        "3" => {
            if dashboard.selection().district.is_none() {
                println!("Select a district first.\n");
                return;
            }
            pick("neighborhoods", &options.neighborhoods).map(FilterChange::Neighborhood)
        }
        "4" => pick("groups", &options.subscriber_groups).map(FilterChange::SubscriberGroup),
        _ => None,
    };
    match change {
        Some(change) => {
            dashboard.set_filter(change);
            println!("Current filters: {:?}\n", dashboard.selection());
        }
        None => println!("Invalid choice.\n"),
    }
}

fn run_interactive(args: &Args) {
    let mut dashboard: Option<Dashboard> = None;
    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Set a filter");
        println!("[3] Clear filters");
        println!("[4] Generate Reports\n");
        let Some(choice) = read_choice() else {
            println!("Exiting the program.");
            break;
        };
        if choice == "1" {
            match load(args) {
                Ok(records) => dashboard = Some(Dashboard::new(records)),
                Err(e) => eprintln!("Failed to load file: {}\n", e),
            }
            continue;
        }
        if !matches!(choice.as_str(), "2" | "3" | "4") {
            println!("Invalid choice. Please enter 1, 2, 3 or 4.\n");
            continue;
        }
        let Some(d) = dashboard.as_mut() else {
            println!(
                "Error: {}. Please load the CSV file first (option 1).\n",
                DashboardError::NoData
            );
            continue;
        };
        match choice.as_str() {
            "2" => handle_set_filter(d),
            "3" => {
                d.set_filter(FilterChange::ClearAll);
                println!("Filters cleared.\n");
            }
            _ => {
                println!();
                if let Err(e) = print_reports(d, args) {
                    eprintln!("Write error: {}", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
        }
    }
}

fn main() {
    let args = Args::parse();
    cli::setup_logging(&args);

    if args.interactive {
        run_interactive(&args);
        return;
    }
    if let Err(e) = run_once(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_line_stops_at_end_of_input() {
        let mut input: &[u8] = b" 2 \n";
        assert_eq!(read_line_from(&mut input, ""), Some("2".to_string()));
        assert_eq!(read_line_from(&mut input, ""), None);
    }

    #[test]
    fn test_back_to_menu_answers() {
        let mut yes: &[u8] = b"maybe\ny\n";
        assert!(back_to_menu_from(&mut yes));
        let mut no: &[u8] = b"N\n";
        assert!(!back_to_menu_from(&mut no));
        let mut closed: &[u8] = b"";
        assert!(!back_to_menu_from(&mut closed));
    }
}
