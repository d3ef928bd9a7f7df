//! Summary cards at the top of the dashboard.

use crate::api::SummaryPayload;
use crate::util::{format_currency, format_percentage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryCard {
    pub id: &'static str,
    pub label: &'static str,
}

pub const SUMMARY_CARDS: [SummaryCard; 4] = [
    SummaryCard {
        id: "totalIncome",
        label: "Total Income",
    },
    SummaryCard {
        id: "totalExpenses",
        label: "Total Expenses",
    },
    SummaryCard {
        id: "netSavings",
        label: "Net Savings",
    },
    SummaryCard {
        id: "savingsRate",
        label: "Savings Rate",
    },
];

/// Formatted value per card id; cards whose figure is missing are skipped
pub fn card_values(summary: &SummaryPayload) -> Vec<(&'static str, String)> {
    let mut values = Vec::new();
    if let Some(income) = summary.total_income() {
        values.push(("totalIncome", format_currency(income)));
    }
    if let Some(expenses) = summary.total_expenses() {
        values.push(("totalExpenses", format_currency(expenses)));
    }
    if let Some(net) = summary.net_savings() {
        values.push(("netSavings", format_currency(net)));
    }
    if let Some(rate) = summary.savings_rate() {
        values.push(("savingsRate", format_percentage(rate)));
    }
    values
}
