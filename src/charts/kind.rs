//! Chart Types
//!
//! The five charts the backend serves, and where each one goes on the page.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chart type identifier, as used in `/api/charts/{chart_type}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    ExpenseCategories,
    IncomeSources,
    MonthlyTrends,
    CategoryBars,
    CumulativeSavings,
}

impl ChartKind {
    /// Dashboard order
    pub const ALL: [ChartKind; 5] = [
        ChartKind::ExpenseCategories,
        ChartKind::IncomeSources,
        ChartKind::MonthlyTrends,
        ChartKind::CategoryBars,
        ChartKind::CumulativeSavings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::ExpenseCategories => "expense_categories",
            ChartKind::IncomeSources => "income_sources",
            ChartKind::MonthlyTrends => "monthly_trends",
            ChartKind::CategoryBars => "category_bars",
            ChartKind::CumulativeSavings => "cumulative_savings",
        }
    }

    /// Identifier with underscores as spaces
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Inline message shown when the chart cannot be loaded
    pub fn failure_message(&self) -> String {
        format!("Failed to load {} chart", self.display_name())
    }

    pub fn default_container(&self) -> &'static str {
        match self {
            ChartKind::ExpenseCategories => "expensePieChart",
            ChartKind::IncomeSources => "incomePieChart",
            ChartKind::MonthlyTrends => "monthlyTrendsChart",
            ChartKind::CategoryBars => "categoryBarChart",
            ChartKind::CumulativeSavings => "cumulativeSavingsChart",
        }
    }

    /// Card header on the page
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::ExpenseCategories => "Expense Categories",
            ChartKind::IncomeSources => "Income Sources",
            ChartKind::MonthlyTrends => "Monthly Trends",
            ChartKind::CategoryBars => "Spending by Category",
            ChartKind::CumulativeSavings => "Cumulative Savings",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown chart type: {0}")]
pub struct UnknownChartKind(pub String);

impl FromStr for ChartKind {
    type Err = UnknownChartKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownChartKind(s.to_string()))
    }
}

/// A chart type bound to its container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSlot {
    pub container_id: String,
    pub kind: ChartKind,
}

impl ChartSlot {
    pub fn new(container_id: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            container_id: container_id.into(),
            kind,
        }
    }
}

/// The fixed dashboard layout
pub fn default_slots() -> Vec<ChartSlot> {
    ChartKind::ALL
        .into_iter()
        .map(|kind| ChartSlot::new(kind.default_container(), kind))
        .collect()
}
