//! Backend Payloads
//!
//! Response shapes of the dashboard backend. Both payloads may carry an
//! `error` field instead of (or next to) their data; callers check it with
//! `into_result` before using the payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::LoadError;

/// Plot description for one chart
///
/// `data` and `layout` are passed to the charting engine as received; the
/// client only overlays a few cosmetic layout fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub layout: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChartPayload {
    /// Reject payloads that carry a non-empty `error`
    pub fn into_result(self) -> Result<Self, LoadError> {
        match self.error {
            Some(message) if !message.is_empty() => Err(LoadError::Api(message)),
            _ => Ok(self),
        }
    }
}

/// Summary figures and insights
///
/// Fields other than `insights` and `error` are kept verbatim so exports
/// reproduce the backend response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SummaryPayload {
    /// Reject payloads that carry a non-empty `error`
    pub fn into_result(self) -> Result<Self, LoadError> {
        match self.error {
            Some(message) if !message.is_empty() => Err(LoadError::Api(message)),
            _ => Ok(self),
        }
    }

    /// Insight lines; a missing list is empty
    pub fn insights(&self) -> &[String] {
        self.insights.as_deref().unwrap_or(&[])
    }

    /// Numeric summary field, if present
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn total_income(&self) -> Option<f64> {
        self.number("total_income")
    }

    pub fn total_expenses(&self) -> Option<f64> {
        self.number("total_expenses")
    }

    pub fn net_savings(&self) -> Option<f64> {
        self.number("net_savings")
    }

    /// Net savings as a percentage of income
    pub fn savings_rate(&self) -> Option<f64> {
        let income = self.total_income()?;
        if income <= 0.0 {
            return None;
        }
        Some(self.net_savings()? / income * 100.0)
    }
}
