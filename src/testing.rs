//! Test doubles for the backend and the charting engine.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::{ChartPayload, DashboardApi, LoadError, LoadResult, SummaryPayload};
use crate::charts::{ChartKind, RenderError, RenderOptions, RenderPort, RenderedPlot};

#[derive(Debug, Clone)]
enum Body {
    Json(Value),
    Status(u16),
    Panic,
}

/// Scripted backend reply
#[derive(Debug, Clone)]
pub struct Reply {
    body: Body,
    delay: Duration,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self {
            body: Body::Json(value),
            delay: Duration::ZERO,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            body: Body::Status(code),
            delay: Duration::ZERO,
        }
    }

    /// Panic inside the request future
    pub fn panic() -> Self {
        Self {
            body: Body::Panic,
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn resolve<T: serde::de::DeserializeOwned>(self) -> LoadResult<T> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.body {
            Body::Json(value) => {
                serde_json::from_value(value).map_err(|e| LoadError::Decode(e.to_string()))
            }
            Body::Status(status) => Err(LoadError::Http { status }),
            Body::Panic => panic!("scripted backend panic"),
        }
    }
}

/// A valid figure tagged with `marker`
pub fn figure(kind: ChartKind, marker: &str) -> Value {
    json!({
        "data": [{"type": "bar", "x": [kind.as_str()], "y": [1], "name": marker}],
        "layout": {"title": {"text": kind.title()}, "height": 400}
    })
}

/// In-memory [`DashboardApi`] with per-endpoint scripted replies
pub struct FakeApi {
    charts: Mutex<HashMap<ChartKind, Reply>>,
    summary: Mutex<Reply>,
    chart_calls: AtomicUsize,
    summary_calls: AtomicUsize,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeApi {
    /// Every chart answers with a valid figure; the summary has no insights
    pub fn new() -> Self {
        let charts = ChartKind::ALL
            .into_iter()
            .map(|kind| (kind, Reply::json(figure(kind, "initial"))))
            .collect();

        Self {
            charts: Mutex::new(charts),
            summary: Mutex::new(Reply::json(json!({"insights": []}))),
            chart_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
        }
    }

    pub fn chart(self, kind: ChartKind, reply: Reply) -> Self {
        self.set_chart(kind, reply);
        self
    }

    pub fn summary(self, reply: Reply) -> Self {
        self.set_summary(reply);
        self
    }

    pub fn set_chart(&self, kind: ChartKind, reply: Reply) {
        self.charts.lock().unwrap().insert(kind, reply);
    }

    /// Script every chart at once
    pub fn set_all_charts(&self, reply: impl Fn(ChartKind) -> Reply) {
        let mut charts = self.charts.lock().unwrap();
        for kind in ChartKind::ALL {
            charts.insert(kind, reply(kind));
        }
    }

    pub fn set_summary(&self, reply: Reply) {
        *self.summary.lock().unwrap() = reply;
    }

    pub fn chart_calls(&self) -> usize {
        self.chart_calls.load(Ordering::SeqCst)
    }

    pub fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn fetch_chart(&self, kind: ChartKind) -> LoadResult<ChartPayload> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.charts.lock().unwrap().get(&kind).cloned();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(LoadError::Http { status: 404 }),
        }
    }

    async fn fetch_summary(&self) -> LoadResult<SummaryPayload> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.summary.lock().unwrap().clone();
        reply.resolve().await
    }
}

/// One call to [`RecordingRenderer::render`]
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub container_id: String,
    pub figure: ChartPayload,
    pub options: RenderOptions,
}

/// [`RenderPort`] that records every call
#[derive(Default)]
pub struct RecordingRenderer {
    renders: Mutex<Vec<RenderCall>>,
    resizes: Mutex<Vec<String>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make renders into `container_id` fail
    pub fn fail_on(&self, container_id: &str) {
        self.failing.lock().unwrap().push(container_id.to_string());
    }

    pub fn renders(&self) -> Vec<RenderCall> {
        self.renders.lock().unwrap().clone()
    }

    pub fn renders_for(&self, container_id: &str) -> Vec<RenderCall> {
        self.renders()
            .into_iter()
            .filter(|call| call.container_id == container_id)
            .collect()
    }

    pub fn resizes(&self) -> Vec<String> {
        self.resizes.lock().unwrap().clone()
    }

    pub fn resize_count(&self, container_id: &str) -> usize {
        self.resizes
            .lock()
            .unwrap()
            .iter()
            .filter(|id| *id == container_id)
            .count()
    }
}

#[async_trait]
impl RenderPort for RecordingRenderer {
    async fn render(
        &self,
        container_id: &str,
        figure: &ChartPayload,
        options: &RenderOptions,
    ) -> Result<RenderedPlot, RenderError> {
        if self.failing.lock().unwrap().iter().any(|id| id == container_id) {
            return Err(RenderError::InvalidFigure("scripted failure".to_string()));
        }

        self.renders.lock().unwrap().push(RenderCall {
            container_id: container_id.to_string(),
            figure: figure.clone(),
            options: options.clone(),
        });
        Ok(RenderedPlot {
            markup: format!("<plot for=\"{}\">{}</plot>", container_id, figure.data),
            print: format!("<table for=\"{}\">{}</table>", container_id, figure.data),
        })
    }

    fn resize(&self, container_id: &str) {
        self.resizes.lock().unwrap().push(container_id.to_string());
    }
}
