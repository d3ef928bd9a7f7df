//! Dashboard Backend API
//!
//! Access layer for the analytics backend. Everything the dashboard shows
//! is computed server-side and fetched with plain `GET` + JSON:
//!
//! - `GET /api/charts/{chart_type}` - plot description for one chart
//! - `GET /api/summary` - summary figures and textual insights
//!
//! # Example
//!
//! ```rust,no_run
//! use finboard::api::{DashboardApi, HttpDashboardApi};
//! use finboard::charts::ChartKind;
//! use finboard::config::ApiConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpDashboardApi::new(&ApiConfig::default())?;
//!     let chart = api.fetch_chart(ChartKind::MonthlyTrends).await?;
//!     println!("layout: {:?}", chart.layout);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dto;
pub mod error;

pub use client::{DashboardApi, HttpDashboardApi};
pub use dto::{ChartPayload, SummaryPayload};
pub use error::{LoadError, LoadResult};
