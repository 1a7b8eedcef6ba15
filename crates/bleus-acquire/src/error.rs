use bleus_model::TableError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Everything that can stop a scrape, grouped by pipeline stage.
#[derive(Debug, Error)]
pub enum ScrapeError {
    // Fetch
    #[error("browser session failed: {0}")]
    Browser(String),

    #[error("'{selector}' table on {url} not ready after {waited:?}")]
    RenderTimeout {
        url: String,
        selector: String,
        waited: Duration,
    },

    #[error("failed to set up HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to fetch {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    // Extract
    #[error("no <table> element found in the page")]
    NoTable,

    // Project
    #[error("table markup could not be read: {0}")]
    MalformedTable(String),

    #[error(transparent)]
    Projection(#[from] TableError),

    // Persist
    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV to {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize provenance for {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ScrapeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
