//! # finboard
//!
//! Finance Analytics Dashboard - the client side of a finance analytics
//! app. All numbers are computed by a backend; finboard fetches the chart
//! figures and summary insights, renders them onto a page and wires up
//! refresh, export, print, keyboard shortcuts and theming.
//!
//! ## Features
//!
//! - **Concurrent loading**: five charts and the insights panel load side by side
//! - **Isolated failures**: a broken chart shows an inline error, the rest still render
//! - **Newest refresh wins**: superseded loads are dropped before they touch the page
//! - **Exports**: JSON (and CSV for tabular data) of the current summary
//! - **Print reports**: self-contained HTML snapshots of the dashboard or one chart
//!
//! ## Modules
//!
//! - [`api`]: backend access (`GET /api/charts/{type}`, `GET /api/summary`)
//! - [`charts`]: chart orchestration, registry and rendering port
//! - [`insights`]: insights panel controller
//! - [`shell`]: page controller, shortcuts, real-time hook
//! - [`surface`]: the page abstraction and its in-memory document
//! - [`util`]: formatting, debounce, export and print helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use finboard::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let document = Arc::new(Document::finance_dashboard(&default_slots()));
//!     let sink = Arc::new(DirectorySink::new(config.output.dir_path()));
//!
//!     let shell = DashboardShell::new(
//!         ShellPorts {
//!             api: Arc::new(HttpDashboardApi::new(&config.api)?),
//!             renderer: Arc::new(PlotlyHtmlRenderer::new()),
//!             surface: document.clone(),
//!             downloads: sink.clone(),
//!             printer: sink,
//!             store: Arc::new(FileStore::new(FileStore::default_path())),
//!         },
//!         default_slots(),
//!         ShellSettings::from(&config.dashboard),
//!     );
//!
//!     let report = shell.start().await;
//!     println!("{} panel(s) failed", report.failed_panels());
//!     std::fs::write("dashboard.html", document.to_html())?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod charts;
pub mod config;
pub mod insights;
pub mod load;
pub mod shell;
pub mod surface;
pub mod theme;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use api::{ChartPayload, DashboardApi, HttpDashboardApi, LoadError, SummaryPayload};

pub use charts::{
    default_slots, ChartKind, ChartOrchestrator, ChartRegistry, ChartSlot, LoadReport,
    PlotlyHtmlRenderer, RenderError, RenderOptions, RenderPort, RenderedPlot,
};

pub use config::{generate_default_config, Config, ConfigError};

pub use insights::InsightsController;

pub use load::{LoadEpoch, LoadOutcome, LoadToken};

pub use shell::{
    DashboardReport, DashboardShell, ExportReceipt, KeyEvent, KeyOutcome, RealTimeUpdates,
    ShellPorts, ShellSettings, ShortcutAction,
};

pub use surface::{Document, Notice, NoticeLevel, Panel, SnapshotScope, Surface};

pub use theme::{FileStore, KeyValueStore, MemoryStore, StoreError, Theme};

pub use util::{
    DirectorySink, DownloadSink, ExportArtifact, ExportFormat, OutputError, PrintDocument,
    PrintSink,
};
