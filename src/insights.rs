//! Insights Panel
//!
//! Fetches the summary payload, keeps it as the dashboard's current
//! summary (the source for exports and summary cards) and renders its
//! insight lines.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::{DashboardApi, LoadError, SummaryPayload};
use crate::load::{LoadEpoch, LoadOutcome, LoadToken};
use crate::surface::{InsightItem, Panel, Surface};

pub const INSIGHTS_CONTAINER: &str = "insightsContainer";

pub const INSIGHTS_FAILURE: &str = "Failed to load insights";

pub const NO_INSIGHTS: &str =
    "No insights available yet. Try uploading more transaction data.";

/// Fade-in offset between consecutive insight items
const FADE_STEP: Duration = Duration::from_millis(100);

pub struct InsightsController {
    api: Arc<dyn DashboardApi>,
    surface: Arc<dyn Surface>,
    container_id: String,
    summary: RwLock<Option<SummaryPayload>>,
    epoch: LoadEpoch,
}

impl InsightsController {
    pub fn new(api: Arc<dyn DashboardApi>, surface: Arc<dyn Surface>) -> Self {
        Self {
            api,
            surface,
            container_id: INSIGHTS_CONTAINER.to_string(),
            summary: RwLock::new(None),
            epoch: LoadEpoch::new(),
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Fetch the summary and render its insights
    ///
    /// Supersedes any insights load still in flight. Failures end up in the
    /// container, never in the caller.
    pub async fn load_insights(&self) -> LoadOutcome {
        let token = self.epoch.begin();
        let load_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "insights_load",
            container_id = %self.container_id,
            load_id = %load_id
        );

        self.load_with(token).instrument(span).await
    }

    async fn load_with(&self, token: LoadToken) -> LoadOutcome {
        self.surface.show_loading(&self.container_id);

        let result = match token.run(self.api.fetch_summary()).await {
            Some(result) => result.and_then(SummaryPayload::into_result),
            None => return LoadOutcome::Superseded,
        };

        match result {
            Ok(summary) => {
                let mut current = self.summary.write().await;
                if !token.is_current() {
                    return LoadOutcome::Superseded;
                }
                self.display_insights(summary.insights());
                *current = Some(summary);
                tracing::info!("Insights loaded");
                LoadOutcome::Rendered
            }
            Err(e) => {
                if !token.is_current() {
                    return LoadOutcome::Superseded;
                }
                self.fail(&e);
                LoadOutcome::Failed(e.to_string())
            }
        }
    }

    fn fail(&self, error: &LoadError) {
        tracing::error!(error = %error, "Error loading insights");
        self.surface.show_error(&self.container_id, INSIGHTS_FAILURE);
    }

    /// Render `insights`, or the empty-state message when there are none
    pub fn display_insights(&self, insights: &[String]) {
        if insights.is_empty() {
            self.surface
                .set_panel(&self.container_id, Panel::Empty(NO_INSIGHTS.to_string()));
            return;
        }

        let items = insights
            .iter()
            .enumerate()
            .map(|(index, text)| InsightItem {
                text: text.clone(),
                delay: FADE_STEP * index as u32,
            })
            .collect();
        self.surface.set_panel(&self.container_id, Panel::Insights(items));
    }

    /// Summary from the last successful load
    pub async fn summary(&self) -> Option<SummaryPayload> {
        self.summary.read().await.clone()
    }
}
