//! Dashboard API Client
//!
//! HTTP client for the analytics backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::dto::{ChartPayload, SummaryPayload};
use super::error::{LoadError, LoadResult};
use crate::charts::ChartKind;
use crate::config::ApiConfig;

/// Read access to the dashboard backend
///
/// Implementations only perform the request and decode the body. A payload
/// carrying an `error` field is returned as-is; callers decide what to do
/// with it.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/charts/{kind}`
    async fn fetch_chart(&self, kind: ChartKind) -> LoadResult<ChartPayload>;

    /// `GET /api/summary`
    async fn fetch_summary(&self) -> LoadResult<SummaryPayload>;
}

/// `reqwest` implementation of [`DashboardApi`]
pub struct HttpDashboardApi {
    client: Client,
    base_url: String,
}

impl HttpDashboardApi {
    /// Create a client for the configured backend
    ///
    /// Requests have no timeout unless `request_timeout_secs` is set.
    pub fn new(config: &ApiConfig) -> Result<Self, LoadError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(LoadError::Request)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL for one chart type
    pub fn chart_url(&self, kind: ChartKind) -> String {
        format!(
            "{}/api/charts/{}",
            self.base_url,
            urlencoding::encode(kind.as_str())
        )
    }

    pub fn summary_url(&self) -> String {
        format!("{}/api/summary", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> LoadResult<T> {
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(LoadError::from)
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_chart(&self, kind: ChartKind) -> LoadResult<ChartPayload> {
        self.get_json(&self.chart_url(kind)).await
    }

    async fn fetch_summary(&self) -> LoadResult<SummaryPayload> {
        self.get_json(&self.summary_url()).await
    }
}
