use anyhow::{Context, Result};
use bleus_acquire::config::{
    DEFAULT_OUTPUT, DEFAULT_PREVIEW_ROWS, DEFAULT_READY_SELECTOR, DEFAULT_RENDER_TIMEOUT,
    DEFAULT_URL,
};
use bleus_acquire::{
    BrowserFetcher, BrowserOptions, FileFetcher, HttpFetcher, PageFetcher, ScrapeConfig,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "bleus")]
#[command(about = "Scrape the French national team match table to CSV")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    /// Page holding the match table
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Output CSV path (overwritten on every run)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// How to obtain the page
    #[arg(short, long, value_enum, default_value = "browser")]
    source: Source,

    /// Saved page to read with `--source file`
    #[arg(long, required_if_eq("source", "file"))]
    html: Option<PathBuf>,

    /// Columns to keep, in output order
    #[arg(long, value_delimiter = ',', default_values_t = bleus_model::columns::match_columns())]
    columns: Vec<String>,

    /// CSS selector of the table to wait for (its last match)
    #[arg(long, default_value = DEFAULT_READY_SELECTOR)]
    ready_selector: String,

    /// Seconds to wait for that table to fill in before giving up
    #[arg(long, default_value_t = DEFAULT_RENDER_TIMEOUT.as_secs_f64())]
    render_timeout: f64,

    /// Extra seconds to wait once the page is ready
    #[arg(long, default_value_t = 0.0)]
    settle: f64,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Launch Chromium without its sandbox (needed in some containers)
    #[arg(long)]
    no_sandbox: bool,

    /// Chromium executable (auto-detected by default)
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Rows printed as a preview (0 disables it)
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview: usize,

    /// Also save the rendered page to this path
    #[arg(long)]
    save_html: Option<PathBuf>,

    /// Write a `<output>.source.json` provenance file next to the CSV
    #[arg(long)]
    provenance: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, clap::ValueEnum)]
enum Source {
    /// Headless Chromium, waits for client-side rendering
    Browser,
    /// Plain HTTP GET, no script execution
    Http,
    /// A page saved earlier with --save-html
    File,
}

impl Cli {
    fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            url: self.url.clone(),
            output: self.output.clone(),
            columns: self.columns.clone(),
            preview_rows: self.preview,
            save_html: self.save_html.clone(),
            provenance: self.provenance,
        }
    }

    fn browser_options(&self) -> Result<BrowserOptions> {
        Ok(BrowserOptions {
            headless: !self.headed,
            sandbox: !self.no_sandbox,
            executable: self.chrome.clone(),
            ready_selector: self.ready_selector.clone(),
            render_timeout: seconds(self.render_timeout).context("invalid --render-timeout")?,
            settle: seconds(self.settle).context("invalid --settle")?,
            ..BrowserOptions::default()
        })
    }

    fn fetcher(&self) -> Result<Box<dyn PageFetcher>> {
        Ok(match self.source {
            Source::Browser => Box::new(BrowserFetcher::new(self.browser_options()?)),
            Source::Http => Box::new(HttpFetcher::new()?),
            Source::File => {
                let path = self.html.clone().context("--source file needs --html <PATH>")?;
                Box::new(FileFetcher::new(path))
            }
        })
    }
}

fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("'{value}' is not a valid duration in seconds"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing and CDP crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,chromiumoxide=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,chromiumoxide=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    tracing::info!("==== START ====");

    let config = cli.scrape_config();
    let fetcher = cli.fetcher()?;
    let report = bleus_acquire::run(fetcher.as_ref(), &config)
        .await
        .with_context(|| format!("scrape of {} failed", config.url))?;

    tracing::info!(
        rows = report.rows,
        columns = report.columns.len(),
        source_tables = report.source_tables,
        path = %report.output.display(),
        "Saved match table"
    );
    tracing::info!("==== END ====");

    Ok(())
}
