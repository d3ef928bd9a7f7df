//! Dashboard Shell
//!
//! Top-level controller for the page. Owns chart orchestration and the
//! insights panel and exposes the user-facing actions:
//!
//! - startup and refresh (charts and insights load concurrently)
//! - export of the current data as JSON or CSV
//! - printing of the dashboard or a single chart
//! - keyboard shortcuts, theme toggling, real-time polling hook

pub mod cards;
pub mod global;
pub mod realtime;
pub mod shortcuts;

pub use global::{install_panic_hook, spawn_logged};
pub use realtime::RealTimeUpdates;
pub use shortcuts::{shortcut_for, KeyEvent, KeyOutcome, ShortcutAction};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{DashboardApi, SummaryPayload};
use crate::charts::{ChartOrchestrator, ChartRegistry, ChartSlot, LoadReport, RenderPort};
use crate::config::DashboardConfig;
use crate::insights::InsightsController;
use crate::load::LoadOutcome;
use crate::surface::{Notice, SnapshotScope, Surface};
use crate::theme::{load_theme, save_theme, KeyValueStore, StoreError, Theme};
use crate::util::{
    chart_report, dashboard_report, export_data, DownloadSink, ExportArtifact, ExportFormat,
    OutputError, PrintSink,
};

pub const REFRESH_SUCCESS: &str = "Dashboard refreshed successfully!";

pub const NO_EXPORT_DATA: &str = "No data available to export";

/// Collaborators the shell drives
#[derive(Clone)]
pub struct ShellPorts {
    pub api: Arc<dyn DashboardApi>,
    pub renderer: Arc<dyn RenderPort>,
    pub surface: Arc<dyn Surface>,
    pub downloads: Arc<dyn DownloadSink>,
    pub printer: Arc<dyn PrintSink>,
    pub store: Arc<dyn KeyValueStore>,
}

/// Timings of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellSettings {
    pub resize_debounce: Duration,
    pub card_stagger: Duration,
    pub print_settle: Duration,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for ShellSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            resize_debounce: config.resize_debounce(),
            card_stagger: config.card_stagger(),
            print_settle: config.print_settle(),
        }
    }
}

/// Outcome of a full dashboard load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardReport {
    pub charts: LoadReport,
    pub insights: LoadOutcome,
}

impl DashboardReport {
    /// Panels showing an error instead of content
    pub fn failed_panels(&self) -> usize {
        self.charts.failed() + usize::from(self.insights.is_failed())
    }

    /// A newer load began before this one settled
    pub fn superseded(&self) -> bool {
        self.charts.superseded || self.insights == LoadOutcome::Superseded
    }

    pub fn is_clean(&self) -> bool {
        self.charts.is_clean() && self.insights.is_rendered()
    }
}

/// A completed export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReceipt {
    pub artifact: ExportArtifact,
    /// Where the download sink put it
    pub location: PathBuf,
}

#[derive(Serialize)]
struct DashboardExport<'a> {
    summary: &'a SummaryPayload,
    timestamp: String,
    charts: Vec<String>,
}

pub struct DashboardShell {
    charts: ChartOrchestrator,
    insights: InsightsController,
    surface: Arc<dyn Surface>,
    downloads: Arc<dyn DownloadSink>,
    printer: Arc<dyn PrintSink>,
    store: Arc<dyn KeyValueStore>,
    settings: ShellSettings,
    theme: Mutex<Theme>,
}

impl DashboardShell {
    pub fn new(ports: ShellPorts, slots: Vec<ChartSlot>, settings: ShellSettings) -> Self {
        let charts = ChartOrchestrator::new(
            ports.api.clone(),
            ports.renderer,
            ports.surface.clone(),
            ChartRegistry::new(),
            slots,
        )
        .with_resize_debounce(settings.resize_debounce);
        let insights = InsightsController::new(ports.api, ports.surface.clone());

        Self {
            charts,
            insights,
            surface: ports.surface,
            downloads: ports.downloads,
            printer: ports.printer,
            store: ports.store,
            settings,
            theme: Mutex::new(Theme::default()),
        }
    }

    pub fn charts(&self) -> &ChartOrchestrator {
        &self.charts
    }

    pub fn insights(&self) -> &InsightsController {
        &self.insights
    }

    /// Bring the page up: theme, card reveal, then the first full load
    pub async fn start(&self) -> DashboardReport {
        self.apply_saved_theme();
        self.surface.reveal_cards(self.settings.card_stagger);
        for id in self.surface.chart_containers() {
            self.surface.show_loading(&id);
        }

        let report = self.load_dashboard().await;
        tracing::info!(
            failed = report.failed_panels(),
            "Dashboard started"
        );
        report
    }

    /// Reload every panel and report the result once all loads settle
    ///
    /// No notice is shown if a newer refresh superseded this one.
    pub async fn refresh_dashboard(&self) -> DashboardReport {
        tracing::info!("Refreshing dashboard");
        for id in self.surface.chart_containers() {
            self.surface.show_loading(&id);
        }
        self.surface.show_loading(self.insights.container_id());

        let report = self.load_dashboard().await;

        if report.superseded() {
            tracing::debug!("Refresh superseded");
        } else if report.failed_panels() == 0 && !report.charts.aggregation_failed {
            self.surface.show_success(REFRESH_SUCCESS);
        } else {
            self.surface.notify(Notice::warning(format!(
                "Dashboard refreshed with {} panel(s) unavailable",
                report.failed_panels()
            )));
        }
        report
    }

    async fn load_dashboard(&self) -> DashboardReport {
        let (charts, insights) =
            tokio::join!(self.charts.load_all_charts(), self.insights.load_insights());

        if insights.is_rendered() {
            self.fill_summary_cards().await;
        }
        DashboardReport { charts, insights }
    }

    /// Write the current summary into the summary cards
    pub async fn fill_summary_cards(&self) {
        let Some(summary) = self.insights.summary().await else {
            return;
        };
        for (card_id, value) in cards::card_values(&summary) {
            self.surface.set_card(card_id, &value);
        }
    }

    /// Export the loaded summary and chart list
    ///
    /// Without a loaded summary an alert is raised and nothing is written.
    pub async fn export_dashboard_data(
        &self,
        format: ExportFormat,
    ) -> Result<Option<ExportReceipt>, OutputError> {
        let Some(summary) = self.insights.summary().await else {
            self.surface.alert(NO_EXPORT_DATA);
            return Ok(None);
        };

        let now = Utc::now();
        let export = DashboardExport {
            summary: &summary,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            charts: self.charts.registry().container_ids().await,
        };
        let data = serde_json::to_value(&export)?;
        let filename = format!("finance_dashboard_{}", now.format("%Y-%m-%d"));

        let artifact = export_data(&data, &filename, format)?;
        let location = self.downloads.save(&artifact).await?;
        tracing::info!(file = %artifact.filename, format = %format, "Dashboard data exported");

        Ok(Some(ExportReceipt { artifact, location }))
    }

    /// Print the whole dashboard
    pub async fn print_dashboard(&self) -> Result<PathBuf, OutputError> {
        let snapshot = self
            .surface
            .snapshot(&SnapshotScope::Dashboard)
            .unwrap_or_default();
        let document = dashboard_report(&snapshot, chrono::Local::now().date_naive());

        tokio::time::sleep(self.settings.print_settle).await;
        self.printer.print(&document).await
    }

    /// Print one chart; `Ok(None)` if the container does not exist
    pub async fn print_chart(&self, container_id: &str) -> Result<Option<PathBuf>, OutputError> {
        let Some(snapshot) = self
            .surface
            .snapshot(&SnapshotScope::Container(container_id.to_string()))
        else {
            return Ok(None);
        };
        let document = chart_report(&snapshot);

        tokio::time::sleep(self.settings.print_settle).await;
        self.printer.print(&document).await.map(Some)
    }

    /// Dispatch a key press through the shortcut table
    ///
    /// Failures of the triggered action are logged.
    pub async fn handle_key(&self, event: &KeyEvent) -> KeyOutcome {
        let Some(action) = shortcut_for(event) else {
            return KeyOutcome::ignored();
        };
        tracing::debug!(?action, "Shortcut");

        match action {
            ShortcutAction::Refresh => {
                self.refresh_dashboard().await;
            }
            ShortcutAction::Print => {
                if let Err(e) = self.print_dashboard().await {
                    tracing::error!(error = %e, "Print failed");
                }
            }
            ShortcutAction::ExportJson => {
                if let Err(e) = self.export_dashboard_data(ExportFormat::Json).await {
                    tracing::error!(error = %e, "Export failed");
                }
            }
        }
        KeyOutcome::handled(action)
    }

    /// Start the periodic update check
    pub fn enable_real_time_updates(&self, interval_minutes: u64) -> RealTimeUpdates {
        RealTimeUpdates::start(interval_minutes)
    }

    /// Viewport size changed
    pub fn viewport_changed(&self) {
        self.charts.viewport_changed();
    }

    /// Apply the stored theme preference to the page
    pub fn apply_saved_theme(&self) -> Theme {
        let theme = load_theme(self.store.as_ref());
        self.set_theme(theme);
        theme
    }

    /// Flip between light and dark and persist the choice
    pub fn toggle_theme(&self) -> Result<Theme, StoreError> {
        let next = self.theme().toggled();
        self.set_theme(next);
        save_theme(self.store.as_ref(), next)?;
        tracing::info!(theme = %next, "Theme changed");
        Ok(next)
    }

    pub fn theme(&self) -> Theme {
        *self.theme.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap_or_else(|e| e.into_inner()) = theme;
        self.surface.set_theme(theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{default_slots, ChartKind};
    use crate::insights::{INSIGHTS_CONTAINER, INSIGHTS_FAILURE};
    use crate::surface::{Document, NoticeLevel, Panel};
    use crate::testing::{figure, FakeApi, RecordingRenderer, Reply};
    use crate::theme::{MemoryStore, THEME_KEY};
    use crate::util::DirectorySink;
    use serde_json::{json, Value};

    struct Harness {
        api: Arc<FakeApi>,
        renderer: Arc<RecordingRenderer>,
        doc: Arc<Document>,
        store: Arc<MemoryStore>,
        out: tempfile::TempDir,
        shell: Arc<DashboardShell>,
    }

    fn summary() -> Value {
        json!({
            "insights": ["Your top expense category is Rent", "You saved 24.0% of income"],
            "total_income": 5200.0,
            "total_expenses": 3950.5,
            "net_savings": 1249.5,
            "income_transactions": 2,
            "expense_transactions": 40
        })
    }

    fn harness(api: FakeApi) -> Harness {
        let api = Arc::new(api);
        let renderer = Arc::new(RecordingRenderer::new());
        let doc = Arc::new(Document::finance_dashboard(&default_slots()));
        let store = Arc::new(MemoryStore::new());
        let out = tempfile::tempdir().unwrap();
        let sink = Arc::new(DirectorySink::new(out.path()));

        let shell = Arc::new(DashboardShell::new(
            ShellPorts {
                api: api.clone(),
                renderer: renderer.clone(),
                surface: doc.clone(),
                downloads: sink.clone(),
                printer: sink,
                store: store.clone(),
            },
            default_slots(),
            ShellSettings::default(),
        ));

        Harness {
            api,
            renderer,
            doc,
            store,
            out,
            shell,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_loads_everything() {
        let h = harness(FakeApi::new().summary(Reply::json(summary())));
        h.store.set_item(THEME_KEY, "dark").unwrap();

        let report = h.shell.start().await;

        assert!(report.is_clean());
        assert_eq!(h.doc.theme(), Theme::Dark);
        assert_eq!(h.renderer.renders().len(), 5);
        assert_eq!(h.api.summary_calls(), 1);
        assert_eq!(h.doc.card("totalIncome").as_deref(), Some("$5,200.00"));
        assert_eq!(h.doc.card("savingsRate").as_deref(), Some("24.0%"));
        assert_eq!(
            h.doc.card_reveal_delays()[3],
            Some(Duration::from_millis(450))
        );
        assert!(matches!(
            h.doc.panel(INSIGHTS_CONTAINER),
            Some(Panel::Insights(items)) if items.len() == 2
        ));
        assert!(h.doc.notice_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_notifies_after_loads_settle() {
        let h = harness(FakeApi::new().summary(Reply::json(summary())));
        h.shell.start().await;

        let report = h.shell.refresh_dashboard().await;

        assert!(report.is_clean());
        assert_eq!(h.renderer.renders().len(), 10);
        let notices = h.doc.active_notices();
        assert_eq!(notices, vec![Notice::success(REFRESH_SUCCESS)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_with_failures_warns() {
        let api = FakeApi::new().summary(Reply::status(500)).chart(
            ChartKind::MonthlyTrends,
            Reply::json(json!({"error": "No data available"})),
        );
        let h = harness(api);

        let report = h.shell.refresh_dashboard().await;

        assert_eq!(report.failed_panels(), 2);
        let notices = h.doc.notice_log();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(notices[0].message, "Dashboard refreshed with 2 panel(s) unavailable");
        assert_eq!(
            h.doc.panel(INSIGHTS_CONTAINER).unwrap().error_message(),
            Some(INSIGHTS_FAILURE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_refreshes_newest_wins() {
        let api = FakeApi::new();
        api.set_all_charts(|kind| Reply::json(figure(kind, "first")).after(Duration::from_secs(2)));
        api.set_summary(
            Reply::json(json!({"insights": ["first"]})).after(Duration::from_secs(2)),
        );
        let h = harness(api);

        let first = tokio::spawn({
            let shell = h.shell.clone();
            async move { shell.refresh_dashboard().await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;

        h.api
            .set_all_charts(|kind| Reply::json(figure(kind, "second")).after(Duration::from_millis(500)));
        h.api.set_summary(Reply::json(json!({"insights": ["second"]})));
        let second = h.shell.refresh_dashboard().await;
        let first = first.await.unwrap();

        assert!(first.superseded());
        assert!(second.is_clean());
        tokio::time::sleep(Duration::from_secs(5)).await;

        for slot in default_slots() {
            let renders = h.renderer.renders_for(&slot.container_id);
            assert_eq!(renders.len(), 1);
            assert_eq!(renders[0].figure.data[0]["name"], json!("second"));
            assert!(matches!(h.doc.panel(&slot.container_id), Some(Panel::Plot(_))));
        }
        let Some(Panel::Insights(items)) = h.doc.panel(INSIGHTS_CONTAINER) else {
            panic!("expected insights panel");
        };
        assert_eq!(items[0].text, "second");

        // Only the surviving refresh reports
        assert_eq!(h.doc.notice_log(), vec![Notice::success(REFRESH_SUCCESS)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_without_data_alerts() {
        let h = harness(FakeApi::new());

        let receipt = h.shell.export_dashboard_data(ExportFormat::Json).await.unwrap();

        assert!(receipt.is_none());
        assert_eq!(h.doc.alerts(), vec![NO_EXPORT_DATA.to_string()]);
        assert_eq!(std::fs::read_dir(h.out.path()).unwrap().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_json() {
        let h = harness(FakeApi::new().summary(Reply::json(summary())));
        h.shell.start().await;

        let receipt = h
            .shell
            .export_dashboard_data(ExportFormat::Json)
            .await
            .unwrap()
            .unwrap();

        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(
            receipt.artifact.filename,
            format!("finance_dashboard_{}.json", today)
        );
        assert_eq!(receipt.artifact.mime_type, "application/json");

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&receipt.location).unwrap()).unwrap();
        assert_eq!(written["summary"]["total_income"], json!(5200.0));
        assert_eq!(written["summary"]["insights"], summary()["insights"]);
        assert_eq!(written["charts"].as_array().unwrap().len(), 5);
        assert_eq!(written["charts"][0], json!("expensePieChart"));
        assert!(written["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_csv_of_summary_is_empty() {
        let h = harness(FakeApi::new().summary(Reply::json(summary())));
        h.shell.start().await;

        let receipt = h
            .shell
            .export_dashboard_data(ExportFormat::Csv)
            .await
            .unwrap()
            .unwrap();

        assert!(receipt.artifact.filename.ends_with(".csv"));
        assert_eq!(receipt.artifact.content, "");
        assert_eq!(std::fs::read_to_string(&receipt.location).unwrap(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_print_dashboard_waits_for_settle() {
        let h = harness(FakeApi::new().summary(Reply::json(summary())));
        h.shell.start().await;

        let started = tokio::time::Instant::now();
        let path = h.shell.print_dashboard().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));

        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("<h1>Finance Analytics Dashboard Report</h1>"));
        assert!(html.contains("Your top expense category is Rent"));
        assert!(html.contains("$5,200.00"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_print_chart() {
        let h = harness(FakeApi::new());
        h.shell.start().await;

        let path = h.shell.print_chart("incomePieChart").await.unwrap().unwrap();
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("<h2>Finance Analytics Report</h2>"));
        assert!(html.contains("<table for=\"incomePieChart\">"));
        assert!(!html.contains("<plot"));

        assert_eq!(h.shell.print_chart("noSuchChart").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortcuts() {
        let h = harness(FakeApi::new().summary(Reply::json(summary())));
        h.shell.start().await;

        let outcome = h.shell.handle_key(&KeyEvent::ctrl("s")).await;
        assert_eq!(outcome, KeyOutcome::handled(ShortcutAction::ExportJson));
        assert!(outcome.prevent_default);

        let outcome = h.shell.handle_key(&KeyEvent::meta("r")).await;
        assert_eq!(outcome.action, Some(ShortcutAction::Refresh));
        assert_eq!(h.api.chart_calls(), 10);

        let outcome = h.shell.handle_key(&KeyEvent::new("s")).await;
        assert_eq!(outcome, KeyOutcome::ignored());

        h.shell.handle_key(&KeyEvent::ctrl("p")).await;
        let files: Vec<String> = std::fs::read_dir(h.out.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert!(files.iter().any(|f| f.ends_with(".json")));
        assert!(files.iter().any(|f| f.starts_with("finance_dashboard_report_")));
    }

    #[tokio::test]
    async fn test_toggle_theme_persists() {
        let h = harness(FakeApi::new());
        assert_eq!(h.shell.apply_saved_theme(), Theme::Light);

        assert_eq!(h.shell.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(h.doc.theme(), Theme::Dark);
        assert_eq!(h.store.get_item(THEME_KEY).unwrap().as_deref(), Some("dark"));

        assert_eq!(h.shell.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(h.store.get_item(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_real_time_updates_never_refresh() {
        let h = harness(FakeApi::new());
        let updates = h.shell.enable_real_time_updates(1);

        tokio::time::sleep(Duration::from_secs(181)).await;

        assert_eq!(updates.ticks(), 3);
        assert_eq!(h.api.chart_calls(), 0);
        assert_eq!(h.api.summary_calls(), 0);
    }
}
