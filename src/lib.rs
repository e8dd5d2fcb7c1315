//! Filtering and aggregation core for the İZSU water-consumption dashboard.
//!
//! Raw semicolon-delimited rows are coerced into [`types::Record`]s, filtered
//! by a [`filter::FilterSelection`], and aggregated into chart-ready views by
//! [`dashboard::Dashboard`].

pub mod aggregate;
pub mod cli;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{DashboardError, Result};
