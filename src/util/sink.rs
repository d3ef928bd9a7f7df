//! Output Sinks
//!
//! Destinations for exported data files and printed reports. The native
//! build writes both into a directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::export::ExportArtifact;
use super::print::PrintDocument;

/// Errors from producing or writing an export or report
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Receives exported files (the "download" of the page)
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Store the artifact and return where it ended up
    async fn save(&self, artifact: &ExportArtifact) -> Result<PathBuf, OutputError>;
}

/// Receives printable documents (the print dialog of the page)
#[async_trait]
pub trait PrintSink: Send + Sync {
    /// Print the document and return where the output ended up
    async fn print(&self, document: &PrintDocument) -> Result<PathBuf, OutputError>;
}

/// Writes downloads and printed reports into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, filename: &str, content: &str) -> Result<PathBuf, OutputError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, artifact: &ExportArtifact) -> Result<PathBuf, OutputError> {
        let path = self.write(&artifact.filename, &artifact.content).await?;
        tracing::info!(path = %path.display(), bytes = artifact.content.len(), "Export written");
        Ok(path)
    }
}

#[async_trait]
impl PrintSink for DirectorySink {
    async fn print(&self, document: &PrintDocument) -> Result<PathBuf, OutputError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let filename = format!(
            "{}_{}_{}.html",
            document.file_stem,
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            &id[..8]
        );
        let path = self.write(&filename, &document.html).await?;
        tracing::info!(path = %path.display(), title = %document.title, "Report printed");
        Ok(path)
    }
}
