//! Chart Orchestration
//!
//! Loads every dashboard chart concurrently, keeps the registry of loaded
//! figures and re-fits plots after viewport changes.
//!
//! Each chart load is isolated: a failure turns into an inline error panel
//! in that chart's container and never reaches the caller. Only a panic in
//! a load counts as an aggregation failure and raises the global banner.

use futures_util::future::join_all;
use futures_util::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::kind::{ChartKind, ChartSlot};
use super::registry::ChartRegistry;
use super::render::{apply_cosmetic_layout, RenderError, RenderOptions, RenderPort};
use crate::api::{ChartPayload, DashboardApi, LoadError};
use crate::load::{LoadEpoch, LoadOutcome, LoadToken};
use crate::surface::{HoverEffect, Panel, Surface};
use crate::util::Debouncer;

/// Banner shown when the bulk chart load itself fails
pub const CHARTS_FAILURE: &str = "Failed to load charts. Please refresh the page.";

/// Result of one [`ChartOrchestrator::load_all_charts`] pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Per container, in slot order
    pub outcomes: Vec<(String, LoadOutcome)>,
    /// A load panicked; the global banner was shown
    pub aggregation_failed: bool,
    /// A newer pass began before this one settled
    pub superseded: bool,
}

impl LoadReport {
    pub fn outcome(&self, container_id: &str) -> Option<&LoadOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == container_id)
            .map(|(_, outcome)| outcome)
    }

    pub fn rendered(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_rendered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failed()).count()
    }

    pub fn is_clean(&self) -> bool {
        !self.aggregation_failed && !self.superseded && self.failed() == 0
    }
}

pub struct ChartOrchestrator {
    api: Arc<dyn DashboardApi>,
    renderer: Arc<dyn RenderPort>,
    surface: Arc<dyn Surface>,
    registry: ChartRegistry,
    slots: Vec<ChartSlot>,
    epoch: LoadEpoch,
    resize_wait: Duration,
    resize_listener: OnceLock<Debouncer>,
}

impl ChartOrchestrator {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        renderer: Arc<dyn RenderPort>,
        surface: Arc<dyn Surface>,
        registry: ChartRegistry,
        slots: Vec<ChartSlot>,
    ) -> Self {
        Self {
            api,
            renderer,
            surface,
            registry,
            slots,
            epoch: LoadEpoch::new(),
            resize_wait: Duration::from_millis(250),
            resize_listener: OnceLock::new(),
        }
    }

    /// Quiet period before a burst of viewport changes triggers a resize
    pub fn with_resize_debounce(mut self, wait: Duration) -> Self {
        self.resize_wait = wait;
        self
    }

    pub fn registry(&self) -> &ChartRegistry {
        &self.registry
    }

    pub fn slots(&self) -> &[ChartSlot] {
        &self.slots
    }

    /// Whether the viewport listener has been installed
    pub fn resize_listener_installed(&self) -> bool {
        self.resize_listener.get().is_some()
    }

    /// Load every slot concurrently and wait for all of them to settle
    ///
    /// Starts a new load generation; loads of the previous one stop without
    /// touching the page. After the first clean pass the debounced resize
    /// listener is installed.
    pub async fn load_all_charts(&self) -> LoadReport {
        let token = self.epoch.begin();
        tracing::info!(generation = token.epoch(), charts = self.slots.len(), "Loading charts");

        let loads = self.slots.iter().map(|slot| {
            AssertUnwindSafe(self.load_slot(slot, token.clone())).catch_unwind()
        });
        let results = join_all(loads).await;

        let mut aggregation_failed = false;
        let outcomes = self
            .slots
            .iter()
            .zip(results)
            .map(|(slot, result)| {
                let outcome = result.unwrap_or_else(|panic| {
                    aggregation_failed = true;
                    let message = panic_message(panic.as_ref());
                    tracing::error!(
                        container_id = %slot.container_id,
                        chart_type = %slot.kind,
                        panic = %message,
                        "Chart load panicked"
                    );
                    LoadOutcome::Failed(message)
                });
                (slot.container_id.clone(), outcome)
            })
            .collect();

        let superseded = !token.is_current();

        if aggregation_failed {
            tracing::error!("Error loading charts");
            if !superseded {
                self.surface.show_global_error(CHARTS_FAILURE);
            }
        } else if !superseded {
            self.install_resize_listener();
        }

        LoadReport {
            outcomes,
            aggregation_failed,
            superseded,
        }
    }

    /// Load one chart into `container_id` as part of the current generation
    pub async fn load_chart(&self, container_id: &str, kind: ChartKind) -> LoadOutcome {
        let slot = ChartSlot::new(container_id, kind);
        self.load_slot(&slot, self.epoch.token()).await
    }

    async fn load_slot(&self, slot: &ChartSlot, token: LoadToken) -> LoadOutcome {
        let load_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "chart_load",
            container_id = %slot.container_id,
            chart_type = %slot.kind,
            load_id = %load_id
        );

        async move {
            if !token.is_current() {
                return LoadOutcome::Superseded;
            }
            self.surface.show_loading(&slot.container_id);

            match token.run(self.fetch_and_render(slot, &token)).await {
                None | Some(Err(LoadStop::Superseded)) => {
                    tracing::debug!("Chart load superseded");
                    LoadOutcome::Superseded
                }
                Some(Ok(())) => LoadOutcome::Rendered,
                Some(Err(LoadStop::Failed(e))) => {
                    if !token.is_current() {
                        return LoadOutcome::Superseded;
                    }
                    tracing::error!(error = %e, "Error loading chart {}", slot.kind);
                    self.surface
                        .show_error(&slot.container_id, &slot.kind.failure_message());
                    LoadOutcome::Failed(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch_and_render(&self, slot: &ChartSlot, token: &LoadToken) -> Result<(), LoadStop> {
        let payload = self.api.fetch_chart(slot.kind).await?.into_result()?;

        if !self
            .registry
            .insert_current(token, &slot.container_id, payload.clone())
            .await
        {
            return Err(LoadStop::Superseded);
        }

        let figure = ChartPayload {
            layout: Some(apply_cosmetic_layout(payload.layout)),
            ..payload
        };
        if !self.surface.has_container(&slot.container_id) {
            let missing = RenderError::MissingContainer(slot.container_id.clone());
            return Err(LoadError::from(missing).into());
        }
        let options = RenderOptions::for_chart(slot.kind);
        let plot = self
            .renderer
            .render(&slot.container_id, &figure, &options)
            .await
            .map_err(LoadError::from)?;

        if !token.is_current() {
            return Err(LoadStop::Superseded);
        }
        self.surface.set_panel(&slot.container_id, Panel::Plot(plot));
        self.surface
            .attach_hover(&slot.container_id, HoverEffect::default());

        tracing::info!("Chart rendered");
        Ok(())
    }

    /// Re-fit every loaded chart whose container still shows its plot
    ///
    /// Returns the number of charts resized.
    pub async fn resize_all_charts(&self) -> usize {
        resize_charts(&self.registry, self.renderer.as_ref(), self.surface.as_ref()).await
    }

    /// Viewport size changed; coalesced into one resize pass
    pub fn viewport_changed(&self) {
        if let Some(listener) = self.resize_listener.get() {
            listener.call();
        }
    }

    /// Drill-down hook for clicks on a plot
    pub fn on_chart_click(&self, container_id: &str, point: &Value) {
        tracing::info!(container_id = %container_id, point = %point, "Chart clicked");
    }

    fn install_resize_listener(&self) {
        self.resize_listener.get_or_init(|| {
            let registry = self.registry.clone();
            let renderer = self.renderer.clone();
            let surface = self.surface.clone();

            tracing::debug!(wait_ms = self.resize_wait.as_millis() as u64, "Resize listener installed");
            Debouncer::spawn(self.resize_wait, move || {
                let registry = registry.clone();
                let renderer = renderer.clone();
                let surface = surface.clone();
                async move {
                    resize_charts(&registry, renderer.as_ref(), surface.as_ref()).await;
                }
            })
        });
    }
}

/// Why a single chart load stopped
enum LoadStop {
    Failed(LoadError),
    Superseded,
}

impl From<LoadError> for LoadStop {
    fn from(e: LoadError) -> Self {
        LoadStop::Failed(e)
    }
}

async fn resize_charts(
    registry: &ChartRegistry,
    renderer: &dyn RenderPort,
    surface: &dyn Surface,
) -> usize {
    let mut resized = 0;
    for container_id in registry.container_ids().await {
        if surface.shows_plot(&container_id) {
            renderer.resize(&container_id);
            resized += 1;
        }
    }
    tracing::debug!(resized, "Charts resized");
    resized
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "chart load panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::default_slots;
    use crate::surface::{Document, NoticeLevel};
    use crate::testing::{figure, FakeApi, RecordingRenderer, Reply};
    use serde_json::json;

    struct Harness {
        api: Arc<FakeApi>,
        renderer: Arc<RecordingRenderer>,
        doc: Arc<Document>,
        orchestrator: Arc<ChartOrchestrator>,
    }

    fn harness(api: FakeApi) -> Harness {
        let api = Arc::new(api);
        let renderer = Arc::new(RecordingRenderer::new());
        let doc = Arc::new(Document::finance_dashboard(&default_slots()));
        let orchestrator = Arc::new(ChartOrchestrator::new(
            api.clone(),
            renderer.clone(),
            doc.clone(),
            ChartRegistry::new(),
            default_slots(),
        ));
        Harness {
            api,
            renderer,
            doc,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_valid_payload_renders_once_with_cosmetic_layout() {
        let h = harness(FakeApi::new());
        let report = h.orchestrator.load_all_charts().await;

        assert!(report.is_clean());
        assert_eq!(report.rendered(), 5);
        assert_eq!(h.api.chart_calls(), 5);

        let calls = h.renderer.renders_for("monthlyTrendsChart");
        assert_eq!(calls.len(), 1);
        let call = &calls[0];

        let sent = figure(ChartKind::MonthlyTrends, "initial");
        assert_eq!(call.figure.data, sent["data"]);

        let layout = call.figure.layout.as_ref().unwrap();
        assert_eq!(layout["title"], sent["layout"]["title"]);
        assert_eq!(layout["font"], json!({"family": "Inter, sans-serif", "size": 12}));
        assert_eq!(layout["paper_bgcolor"], json!("rgba(0,0,0,0)"));
        assert_eq!(layout["plot_bgcolor"], json!("rgba(0,0,0,0)"));
        assert_eq!(layout["margin"], json!({"t": 50, "b": 50, "l": 50, "r": 50}));
        assert_eq!(call.options, RenderOptions::for_chart(ChartKind::MonthlyTrends));

        assert!(matches!(h.doc.panel("monthlyTrendsChart"), Some(Panel::Plot(_))));
    }

    #[tokio::test]
    async fn test_registry_keeps_backend_payload() {
        let h = harness(FakeApi::new());
        h.orchestrator.load_all_charts().await;

        let stored = h.orchestrator.registry().get("expensePieChart").await.unwrap();
        let layout = stored.layout.unwrap();
        assert!(layout.get("font").is_none());
        assert_eq!(
            h.orchestrator.registry().container_ids().await.len(),
            5
        );
    }

    #[tokio::test]
    async fn test_missing_layout_still_gets_overlay() {
        let api = FakeApi::new().chart(
            ChartKind::IncomeSources,
            Reply::json(json!({"data": [{"type": "pie"}]})),
        );
        let h = harness(api);
        h.orchestrator.load_all_charts().await;

        let call = &h.renderer.renders_for("incomePieChart")[0];
        assert_eq!(call.figure.layout.as_ref().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_error_payload_skips_render() {
        let api = FakeApi::new().chart(
            ChartKind::CategoryBars,
            Reply::json(json!({"error": "No data available"})),
        );
        let h = harness(api);
        let report = h.orchestrator.load_all_charts().await;

        assert!(h.renderer.renders_for("categoryBarChart").is_empty());
        assert_eq!(
            h.doc.panel("categoryBarChart"),
            Some(Panel::Error("Failed to load category bars chart".to_string()))
        );
        assert_eq!(
            report.outcome("categoryBarChart"),
            Some(&LoadOutcome::Failed("No data available".to_string()))
        );
        assert_eq!(report.rendered(), 4);
        assert!(!report.aggregation_failed);
        assert!(h.orchestrator.registry().get("categoryBarChart").await.is_none());
        assert!(h.doc.notice_log().is_empty());
    }

    #[tokio::test]
    async fn test_http_and_render_failures_are_local() {
        let api = FakeApi::new().chart(ChartKind::IncomeSources, Reply::status(503));
        let h = harness(api);
        h.renderer.fail_on("cumulativeSavingsChart");

        let report = h.orchestrator.load_all_charts().await;

        assert_eq!(report.failed(), 2);
        assert_eq!(
            report.outcome("incomePieChart"),
            Some(&LoadOutcome::Failed("HTTP error! status: 503".to_string()))
        );
        assert_eq!(
            h.doc.panel("cumulativeSavingsChart").unwrap().error_message(),
            Some("Failed to load cumulative savings chart")
        );
        assert!(h.doc.notice_log().is_empty());
        assert!(h.orchestrator.resize_listener_installed());
    }

    #[tokio::test]
    async fn test_panicking_load_raises_global_banner() {
        let api = FakeApi::new().chart(ChartKind::MonthlyTrends, Reply::panic());
        let h = harness(api);

        let report = h.orchestrator.load_all_charts().await;

        assert!(report.aggregation_failed);
        assert_eq!(report.rendered(), 4);
        let notices = h.doc.notice_log();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, CHARTS_FAILURE);
        assert!(!h.orchestrator.resize_listener_installed());
    }

    #[tokio::test]
    async fn test_hover_effect_attached_after_render() {
        let h = harness(FakeApi::new());
        h.orchestrator.load_all_charts().await;

        h.doc.hover("expensePieChart", true);
        assert_eq!(h.doc.transform("expensePieChart").as_deref(), Some("scale(1.02)"));
        h.doc.hover("expensePieChart", false);
        assert_eq!(h.doc.transform("expensePieChart").as_deref(), Some("scale(1)"));
    }

    #[tokio::test]
    async fn test_load_chart_overwrites_registry_entry() {
        let h = harness(FakeApi::new());
        h.orchestrator.load_all_charts().await;

        h.api.set_chart(
            ChartKind::ExpenseCategories,
            Reply::json(figure(ChartKind::ExpenseCategories, "reloaded")),
        );
        let outcome = h
            .orchestrator
            .load_chart("expensePieChart", ChartKind::ExpenseCategories)
            .await;

        assert_eq!(outcome, LoadOutcome::Rendered);
        let stored = h.orchestrator.registry().get("expensePieChart").await.unwrap();
        assert_eq!(stored.data[0]["name"], json!("reloaded"));
        assert_eq!(h.orchestrator.registry().len().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newest_load_wins() {
        let api = FakeApi::new();
        api.set_all_charts(|kind| Reply::json(figure(kind, "old")).after(Duration::from_secs(3)));
        let h = harness(api);

        let first = tokio::spawn({
            let orchestrator = h.orchestrator.clone();
            async move { orchestrator.load_all_charts().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        h.api
            .set_all_charts(|kind| Reply::json(figure(kind, "new")).after(Duration::from_secs(1)));
        let second = h.orchestrator.load_all_charts().await;
        let first = first.await.unwrap();

        assert!(first.superseded);
        assert!(first
            .outcomes
            .iter()
            .all(|(_, outcome)| *outcome == LoadOutcome::Superseded));
        assert!(second.is_clean());

        // Let any stale work run to completion
        tokio::time::sleep(Duration::from_secs(5)).await;

        for slot in default_slots() {
            let stored = h.orchestrator.registry().get(&slot.container_id).await.unwrap();
            assert_eq!(stored.data[0]["name"], json!("new"));

            let renders = h.renderer.renders_for(&slot.container_id);
            assert_eq!(renders.len(), 1);
            assert_eq!(renders[0].figure.data[0]["name"], json!("new"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewport_burst_resizes_each_chart_once() {
        let h = harness(FakeApi::new());

        // No listener before the first load
        h.orchestrator.viewport_changed();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(h.renderer.resizes().is_empty());

        h.orchestrator.load_all_charts().await;
        for _ in 0..10 {
            h.orchestrator.viewport_changed();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        for slot in default_slots() {
            assert_eq!(h.renderer.resize_count(&slot.container_id), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_installed_once_across_loads() {
        let h = harness(FakeApi::new());
        h.orchestrator.load_all_charts().await;
        h.orchestrator.load_all_charts().await;

        h.orchestrator.viewport_changed();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(h.renderer.resize_count("expensePieChart"), 1);
    }

    #[tokio::test]
    async fn test_resize_skips_detached_containers() {
        let h = harness(FakeApi::new());
        h.orchestrator.load_all_charts().await;
        h.doc.remove_container("incomePieChart");

        assert_eq!(h.orchestrator.resize_all_charts().await, 4);
        assert_eq!(h.renderer.resize_count("incomePieChart"), 0);
    }

    #[tokio::test]
    async fn test_resize_skips_charts_whose_render_failed() {
        let h = harness(FakeApi::new());
        h.renderer.fail_on("categoryBarChart");
        h.orchestrator.load_all_charts().await;

        // The payload is registered even though drawing it failed
        assert!(h
            .orchestrator
            .registry()
            .container_ids()
            .await
            .contains(&"categoryBarChart".to_string()));
        assert!(h.doc.panel("categoryBarChart").unwrap().error_message().is_some());

        assert_eq!(h.orchestrator.resize_all_charts().await, 4);
        assert_eq!(h.renderer.resize_count("categoryBarChart"), 0);
        assert_eq!(h.renderer.resize_count("expensePieChart"), 1);
    }

    #[tokio::test]
    async fn test_missing_container_fails_only_that_chart() {
        let h = harness(FakeApi::new());
        h.doc.remove_container("monthlyTrendsChart");

        let report = h.orchestrator.load_all_charts().await;

        assert_eq!(report.rendered(), 4);
        assert_eq!(
            report.outcome("monthlyTrendsChart"),
            Some(&LoadOutcome::Failed(
                "Render error: container monthlyTrendsChart not found".to_string()
            ))
        );
        assert!(h.renderer.renders_for("monthlyTrendsChart").is_empty());
        assert!(h.doc.notice_log().is_empty());
    }

    #[tokio::test]
    async fn test_resize_with_empty_registry() {
        let h = harness(FakeApi::new());
        assert_eq!(h.orchestrator.resize_all_charts().await, 0);
    }

    #[test]
    fn test_chart_click_is_logged_only() {
        let h = harness(FakeApi::new());
        h.orchestrator
            .on_chart_click("expensePieChart", &json!({"label": "Rent", "value": 1200}));
        assert!(h.renderer.renders().is_empty());
        assert_eq!(h.api.chart_calls(), 0);
    }
}
