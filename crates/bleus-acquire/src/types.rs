use serde::{Deserialize, Serialize};

/// Page markup as it stood once the fetcher considered it ready.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
    /// RFC 3339 UTC timestamp of when the markup was read.
    pub fetched_at: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Provenance information written next to the CSV when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub url: String,
    pub fetched_at: String,
    /// How many `<table>` elements the page contained.
    pub source_tables: usize,
    pub rows: usize,
    pub columns: Vec<String>,
    pub output: String,
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub source_tables: usize,
    pub output: std::path::PathBuf,
}
