//! Chart Orchestration
//!
//! - **kind**: the chart types and their default containers
//! - **registry**: last loaded figure per container
//! - **render**: the charting engine port and fixed plot options
//! - **plotly**: the Plotly markup renderer
//! - **orchestrator**: concurrent loading, error panels, debounced resize

pub mod kind;
pub mod orchestrator;
pub mod plotly;
pub mod registry;
pub mod render;

pub use kind::{default_slots, ChartKind, ChartSlot, UnknownChartKind};
pub use orchestrator::{ChartOrchestrator, LoadReport, CHARTS_FAILURE};
pub use plotly::PlotlyHtmlRenderer;
pub use registry::ChartRegistry;
pub use render::{
    apply_cosmetic_layout, ImageExportOptions, RenderError, RenderOptions, RenderPort, RenderedPlot,
};
