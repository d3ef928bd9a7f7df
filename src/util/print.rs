//! Printable Reports
//!
//! Wraps a content snapshot in a self-contained, inline-styled HTML document.
//! No external resources are referenced so the report prints the same
//! offline.

use chrono::NaiveDate;

/// A complete HTML document ready for a print sink
#[derive(Debug, Clone, PartialEq)]
pub struct PrintDocument {
    pub title: String,
    /// Base name for sinks that persist the document
    pub file_stem: String,
    pub html: String,
}

const DASHBOARD_STYLE: &str = r#"
    body {
        font-family: Arial, sans-serif;
        margin: 20px;
        color: #333;
    }
    .card {
        border: 1px solid #ddd;
        margin-bottom: 20px;
        border-radius: 8px;
    }
    .card-header {
        background: #f8f9fa;
        padding: 15px;
        border-bottom: 1px solid #ddd;
        font-weight: bold;
    }
    .card-body {
        padding: 15px;
    }
    .chart-container {
        width: 100%;
        height: 400px;
        margin: 20px 0;
    }
    .row {
        display: flex;
        flex-wrap: wrap;
    }
    .summary-card {
        flex: 1;
        min-width: 200px;
        margin: 10px;
    }
    @media print {
        body { margin: 0; }
        .card { break-inside: avoid; }
    }
"#;

const CHART_STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 20px; }
    .chart-container { width: 100%; height: 600px; }
"#;

/// Full-dashboard report with a generation date line
pub fn dashboard_report(snapshot: &str, generated_on: NaiveDate) -> PrintDocument {
    let title = "Finance Analytics Dashboard".to_string();
    let html = format!(
        "<html>\n<head>\n<title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <h1>Finance Analytics Dashboard Report</h1>\n\
         <p>Generated on: {date}</p>\n\
         {snapshot}\n</body>\n</html>\n",
        title = title,
        style = DASHBOARD_STYLE,
        date = generated_on.format("%-m/%-d/%Y"),
        snapshot = snapshot,
    );

    PrintDocument {
        title,
        file_stem: "finance_dashboard_report".to_string(),
        html,
    }
}

/// Single-chart report
pub fn chart_report(snapshot: &str) -> PrintDocument {
    let title = "Finance Analytics Chart".to_string();
    let html = format!(
        "<html>\n<head>\n<title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <h2>Finance Analytics Report</h2>\n\
         <div class=\"chart-container\">\n{snapshot}\n</div>\n</body>\n</html>\n",
        title = title,
        style = CHART_STYLE,
        snapshot = snapshot,
    );

    PrintDocument {
        title,
        file_stem: "finance_chart_report".to_string(),
        html,
    }
}
