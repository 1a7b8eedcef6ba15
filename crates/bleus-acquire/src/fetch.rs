use crate::config::BrowserOptions;
use crate::error::{Result, ScrapeError};
use crate::types::RenderedPage;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use tokio::time::Instant;

const USER_AGENT: &str = "bleus/0.1 (national team match table scraper)";

/// Produces the markup of a page, however it has to be obtained.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RenderedPage>;
}

/// Loads the page in Chromium so client-side scripts can fill it in.
///
/// One browser session per fetch. The session is closed before `fetch`
/// returns, whether rendering succeeded or not.
pub struct BrowserFetcher {
    options: BrowserOptions,
}

impl BrowserFetcher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();
        if !self.options.headless {
            builder = builder.with_head();
        }
        if !self.options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.options.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(ScrapeError::Browser)
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<RenderedPage> {
        let page = browser.new_page(url).await?;
        let selector = self.options.ready_selector.as_str();
        wait_for_stable_table(&self.options, url, || table_shape(&page, selector)).await?;

        if !self.options.settle.is_zero() {
            tracing::debug!(settle_ms = self.options.settle.as_millis() as u64, "Settling");
            tokio::time::sleep(self.options.settle).await;
        }

        let html = page.content().await?;
        Ok(RenderedPage::new(url, html))
    }
}

/// Size of the page's last table matching the ready selector, at one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableShape {
    pub tables: usize,
    pub rows: usize,
}

async fn table_shape(page: &Page, selector: &str) -> Option<TableShape> {
    let tables = match page.find_elements(selector).await {
        Ok(found) => found,
        Err(err) => {
            tracing::trace!(selector, error = %err, "Selector query failed");
            return None;
        }
    };
    let rows = tables
        .last()?
        .find_elements("tr")
        .await
        .map_or(0, |rows| rows.len());
    Some(TableShape {
        tables: tables.len(),
        rows,
    })
}

/// Poll until the target table has rows and two consecutive polls see the
/// same shape, or fail once `render_timeout` has elapsed.
///
/// A table already present in the server markup (navigation, layout) is not
/// enough: the page is ready only when the last match has stopped changing.
/// `measure` yields `None` while nothing matches the selector.
pub(crate) async fn wait_for_stable_table<F, Fut>(
    options: &BrowserOptions,
    url: &str,
    mut measure: F,
) -> Result<TableShape>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<TableShape>>,
{
    let timeout = options.render_timeout;
    let started = Instant::now();
    let mut previous = None;

    loop {
        let current = measure().await;
        if let Some(shape) = current {
            if shape.rows > 0 && previous == Some(shape) {
                tracing::info!(
                    tables = shape.tables,
                    rows = shape.rows,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Page ready"
                );
                return Ok(shape);
            }
            tracing::trace!(tables = shape.tables, rows = shape.rows, "Table not settled");
        }
        previous = current;

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(ScrapeError::RenderTimeout {
                url: url.to_string(),
                selector: options.ready_selector.clone(),
                waited,
            });
        }
        tokio::time::sleep(options.poll_interval.min(timeout - waited)).await;
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<RenderedPage> {
        let config = self.browser_config()?;
        tracing::info!(headless = self.options.headless, "Launching browser");
        let (mut browser, mut handler) = Browser::launch(config).await?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!(error = %err, "CDP handler error");
                }
            }
        });

        tracing::info!(url, "Navigating");
        let rendered = self.render(&browser, url).await;

        if let Err(err) = browser.close().await {
            tracing::warn!(error = %err, "Failed to close browser");
        }
        if let Err(err) = browser.wait().await {
            tracing::warn!(error = %err, "Failed to reap browser process");
        }
        if let Err(err) = handler_task.await {
            tracing::debug!(error = %err, "CDP handler task ended abnormally");
        }
        tracing::debug!("Browser session closed");

        let page = rendered?;
        tracing::info!(bytes = page.html.len(), "Received rendered HTML");
        Ok(page)
    }
}

/// Plain HTTP GET, for pages that are complete without running scripts.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ScrapeError::HttpClient)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RenderedPage> {
        tracing::info!(url, "Fetching over HTTP");
        let http_err = |source| ScrapeError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        let html = response.text().await.map_err(http_err)?;
        tracing::info!(bytes = html.len(), "Received HTML");
        Ok(RenderedPage::new(url, html))
    }
}

/// Reads a page saved by an earlier run (see `--save-html`).
///
/// The `url` passed to `fetch` is only recorded as provenance.
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<RenderedPage> {
        tracing::info!(path = %self.path.display(), "Reading saved page");
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ScrapeError::io(&self.path, source))?;
        Ok(RenderedPage::new(url, html))
    }
}
