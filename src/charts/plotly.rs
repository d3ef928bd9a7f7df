//! Plotly Markup Renderer
//!
//! Emits a plot target plus an inline `Plotly.newPlot` call. The markup
//! draws once the page is opened in a browser with Plotly loaded. Print
//! snapshots get a static table per trace instead, so a printed report
//! shows the figure's numbers without any script.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use super::render::{RenderError, RenderOptions, RenderPort, RenderedPlot};
use crate::api::ChartPayload;
use crate::util::dom::{escape_html, escape_script_json};

/// Plotly bundle referenced by full-page output
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

#[derive(Debug, Default)]
pub struct PlotlyHtmlRenderer {
    resizes: Mutex<HashMap<String, u64>>,
}

impl PlotlyHtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize passes seen for `container_id`
    pub fn resize_count(&self, container_id: &str) -> u64 {
        let resizes = self.resizes.lock().unwrap_or_else(|e| e.into_inner());
        resizes.get(container_id).copied().unwrap_or(0)
    }

    fn to_script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
        Ok(escape_script_json(&serde_json::to_string(value)?))
    }
}

#[async_trait]
impl RenderPort for PlotlyHtmlRenderer {
    async fn render(
        &self,
        container_id: &str,
        figure: &ChartPayload,
        options: &RenderOptions,
    ) -> Result<RenderedPlot, RenderError> {
        let data = match &figure.data {
            Value::Null => Value::Array(Vec::new()),
            Value::Array(_) => figure.data.clone(),
            other => {
                return Err(RenderError::InvalidFigure(format!(
                    "data must be an array of traces, got {}",
                    json_type(other)
                )))
            }
        };
        let layout = figure.layout.clone().unwrap_or_default();

        let target = format!("{}-plot", container_id);
        let target_json = Self::to_script_json(&target)?;

        let markup = format!(
            "<div id=\"{id}\" class=\"plotly-graph\"></div>\n\
             <script>Plotly.newPlot({target}, {data}, {layout}, {config});</script>",
            id = escape_html(&target),
            target = target_json,
            data = Self::to_script_json(&data)?,
            layout = Self::to_script_json(&layout)?,
            config = Self::to_script_json(options)?,
        );

        let print = static_figure(&target, &data, &layout);

        tracing::debug!(container_id = %container_id, bytes = markup.len(), "Plot rendered");
        Ok(RenderedPlot { markup, print })
    }

    fn resize(&self, container_id: &str) {
        let mut resizes = self.resizes.lock().unwrap_or_else(|e| e.into_inner());
        *resizes.entry(container_id.to_string()).or_insert(0) += 1;
        tracing::debug!(container_id = %container_id, "Plot resized");
    }
}

/// Script-free rendition of a figure: its title and one table per trace
fn static_figure(target: &str, data: &Value, layout: &Map<String, Value>) -> String {
    let mut html = format!("<figure id=\"{}\" class=\"plot-static\">\n", escape_html(target));

    let title = match layout.get("title") {
        Some(Value::String(text)) => Some(text.as_str()),
        Some(Value::Object(title)) => title.get("text").and_then(Value::as_str),
        _ => None,
    };
    if let Some(title) = title {
        html.push_str(&format!("<figcaption>{}</figcaption>\n", escape_html(title)));
    }

    let traces = data.as_array().map(Vec::as_slice).unwrap_or(&[]);
    for (index, trace) in traces.iter().enumerate() {
        html.push_str(&trace_table(index, trace));
    }

    html.push_str("</figure>");
    html
}

fn trace_table(index: usize, trace: &Value) -> String {
    let name = trace
        .get("name")
        .or_else(|| trace.get("type"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("trace {}", index + 1));

    // Pie traces carry labels/values, everything else x/y
    let (keys, columns) = if trace.get("labels").is_some() || trace.get("values").is_some() {
        (("Label", "Value"), (column(trace, "labels"), column(trace, "values")))
    } else {
        (("x", "y"), (column(trace, "x"), column(trace, "y")))
    };

    let rows = columns.0.len().max(columns.1.len());
    let mut html = format!(
        "<table class=\"trace\"><caption>{}</caption>\n<thead><tr><th>{}</th><th>{}</th></tr></thead>\n<tbody>\n",
        escape_html(&name),
        keys.0,
        keys.1,
    );
    for row in 0..rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            cell(columns.0.get(row)),
            cell(columns.1.get(row)),
        ));
    }
    html.push_str("</tbody></table>\n");
    html
}

fn column<'a>(trace: &'a Value, key: &str) -> &'a [Value] {
    trace
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => escape_html(text),
        Some(other) => escape_html(&other.to_string()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
