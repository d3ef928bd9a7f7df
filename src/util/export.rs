//! Data Export
//!
//! Serializes dashboard data to a downloadable artifact. JSON is the fully
//! supported format; CSV goes through a generic converter that only
//! understands a non-empty array of records and yields an empty document
//! for anything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sink::OutputError;

/// Supported export formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A serialized export ready to be handed to a download sink
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    /// File name including the extension
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Serialize `data` in `format`, naming the file `<filename>.<ext>`
pub fn export_data(
    data: &Value,
    filename: &str,
    format: ExportFormat,
) -> Result<ExportArtifact, OutputError> {
    let content = match format {
        ExportFormat::Csv => convert_to_csv(data)?,
        ExportFormat::Json => serde_json::to_string_pretty(data)?,
    };

    Ok(ExportArtifact {
        filename: format!("{}.{}", filename, format.extension()),
        mime_type: format.mime_type(),
        content,
    })
}

/// Convert an array of records to CSV
///
/// Headers come from the keys of the first record. Header cells are written
/// bare and every value cell is quoted. Input that is not a non-empty array
/// of objects produces an empty string.
pub fn convert_to_csv(data: &Value) -> Result<String, OutputError> {
    let rows = match data.as_array() {
        Some(rows) if !rows.is_empty() => rows,
        _ => return Ok(String::new()),
    };

    let headers: Vec<&String> = match rows[0].as_object() {
        Some(first) => first.keys().collect(),
        None => return Ok(String::new()),
    };

    let mut header_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header_writer.write_record(&headers)?;
    let buffer = header_writer
        .into_inner()
        .map_err(flush_error)?;

    let mut row_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buffer);

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| cell_text(row.get(header.as_str())))
            .collect();
        row_writer.write_record(&cells)?;
    }

    let buffer = row_writer
        .into_inner()
        .map_err(flush_error)?;

    let mut content = String::from_utf8_lossy(&buffer).into_owned();
    if content.ends_with('\n') {
        content.pop();
    }

    Ok(content)
}

fn flush_error<W>(err: csv::IntoInnerError<W>) -> OutputError {
    OutputError::Io(std::io::Error::new(err.error().kind(), err.error().to_string()))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
