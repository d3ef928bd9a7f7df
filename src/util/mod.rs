//! Shared Utilities
//!
//! Stateless helpers used by every layer above:
//!
//! - **format**: currency and percentage formatting
//! - **debounce**: trailing-edge debouncer on the tokio timer
//! - **dom**: HTML escaping for container markup
//! - **export**: JSON/CSV serialization of dashboard data
//! - **print**: self-contained printable HTML reports
//! - **sink**: where exported files and printed reports end up
//! - **task**: detached tasks whose failures are logged

pub mod debounce;
pub mod dom;
pub mod export;
pub mod format;
pub mod print;
pub mod sink;
pub mod task;

pub use debounce::Debouncer;
pub use export::{convert_to_csv, export_data, ExportArtifact, ExportFormat};
pub use format::{format_currency, format_percentage};
pub use print::{chart_report, dashboard_report, PrintDocument};
pub use sink::{DirectorySink, DownloadSink, OutputError, PrintSink};
pub use task::{run_logged, spawn_logged};
