//! Rendering Port
//!
//! Boundary to the charting engine. The orchestrator decides what to draw
//! and where; the port turns a figure into container content.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::kind::ChartKind;
use crate::api::ChartPayload;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("container {0} not found")]
    MissingContainer(String),

    #[error("invalid figure: {0}")]
    InvalidFigure(String),

    #[error("figure serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Engine configuration passed with every plot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub responsive: bool,
    pub display_mode_bar: bool,
    pub mode_bar_buttons_to_remove: Vec<String>,
    #[serde(rename = "displaylogo")]
    pub display_logo: bool,
    pub to_image_button_options: ImageExportOptions,
}

/// Settings of the engine's "download as image" button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageExportOptions {
    pub format: String,
    pub filename: String,
    pub height: u32,
    pub width: u32,
    pub scale: u32,
}

impl RenderOptions {
    /// Fixed dashboard options for one chart type
    pub fn for_chart(kind: ChartKind) -> Self {
        Self {
            responsive: true,
            display_mode_bar: true,
            mode_bar_buttons_to_remove: ["pan2d", "lasso2d", "select2d"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            display_logo: false,
            to_image_button_options: ImageExportOptions {
                format: "png".to_string(),
                filename: format!("finance_{}", kind.as_str()),
                height: 500,
                width: 800,
                scale: 1,
            },
        }
    }
}

/// Overlay the dashboard's cosmetic layout fields
///
/// Only `font`, `paper_bgcolor`, `plot_bgcolor` and `margin` are written;
/// every other backend field is kept. A missing layout starts empty.
pub fn apply_cosmetic_layout(layout: Option<Map<String, Value>>) -> Map<String, Value> {
    let mut layout = layout.unwrap_or_default();
    layout.insert(
        "font".to_string(),
        json!({"family": "Inter, sans-serif", "size": 12}),
    );
    layout.insert("paper_bgcolor".to_string(), json!("rgba(0,0,0,0)"));
    layout.insert("plot_bgcolor".to_string(), json!("rgba(0,0,0,0)"));
    layout.insert(
        "margin".to_string(),
        json!({"t": 50, "b": 50, "l": 50, "r": 50}),
    );
    layout
}

/// Container content produced by the rendering port
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPlot {
    /// Interactive markup for the live page
    pub markup: String,
    /// Static markup for print snapshots; needs no script or external resource
    pub print: String,
}

/// Charting engine
#[async_trait]
pub trait RenderPort: Send + Sync {
    /// Draw `figure` for `container_id`, returning the container content
    async fn render(
        &self,
        container_id: &str,
        figure: &ChartPayload,
        options: &RenderOptions,
    ) -> Result<RenderedPlot, RenderError>;

    /// Re-fit an existing plot to its container
    fn resize(&self, container_id: &str);
}
