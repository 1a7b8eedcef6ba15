use std::path::PathBuf;
use std::time::Duration;

/// Page listing every match of the French national teams.
pub const DEFAULT_URL: &str = "https://www.chroniquesbleues.fr/Tableau-general-des-matchs-de";

/// Output CSV, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "matchs-equipe-de-france.csv";

pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// The page fills its table client-side; wait until the last one has rows
/// and stops changing.
pub const DEFAULT_READY_SELECTOR: &str = "table";
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// What to scrape and where to put it.
///
/// Every stage reads its inputs from here instead of from globals, so each
/// one can be driven with substituted values.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub url: String,
    pub output: PathBuf,
    /// Columns kept in the output, in output order.
    pub columns: Vec<String>,
    pub preview_rows: usize,
    /// Save the rendered page here before extraction.
    pub save_html: Option<PathBuf>,
    /// Write a `<output>.source.json` sidecar.
    pub provenance: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            columns: bleus_model::columns::match_columns(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            save_html: None,
            provenance: false,
        }
    }
}

/// Browser launch and readiness settings for [`crate::fetch::BrowserFetcher`].
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub sandbox: bool,
    /// Chromium binary; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    /// CSS selector; the page is rendered once its last match has rows and
    /// is unchanged between two polls.
    pub ready_selector: String,
    pub render_timeout: Duration,
    pub poll_interval: Duration,
    /// Extra delay once the table is ready.
    pub settle: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            executable: None,
            ready_selector: DEFAULT_READY_SELECTOR.to_string(),
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle: Duration::ZERO,
        }
    }
}
