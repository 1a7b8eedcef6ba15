use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::extract::extract_last_table;
use crate::fetch::PageFetcher;
use crate::html_table::parse_html_table;
use crate::output;
use crate::types::{Provenance, RenderedPage, RunReport};

/// Fetch → extract → project → persist.
///
/// Stages run strictly in that order, each consuming the previous stage's
/// output once. The output file is only touched by the last stage, so any
/// earlier failure leaves a previous output file exactly as it was.
pub async fn run(fetcher: &dyn PageFetcher, config: &ScrapeConfig) -> Result<RunReport> {
    tracing::info!(url = %config.url, "Go to page");
    let page = fetcher.fetch(&config.url).await?;
    process(page, config)
}

/// Run every stage after fetching on an already rendered page.
pub fn process(page: RenderedPage, config: &ScrapeConfig) -> Result<RunReport> {
    if let Some(path) = &config.save_html {
        output::cache_html(path, &page.html)?;
    }

    let target = extract_last_table(&page.html)?;
    tracing::info!(
        tables = target.tables_on_page,
        bytes = target.markup.len(),
        "Extracted last table"
    );
    let RenderedPage { url, fetched_at, .. } = page;

    let table = parse_html_table(&target.markup)?;
    tracing::info!(rows = table.len(), columns = table.width(), "Parsed table");

    let table = table.select(&config.columns)?;
    if config.preview_rows > 0 {
        println!("{}", table.preview(config.preview_rows));
    }

    output::write_csv(&table, &config.output)?;

    if config.provenance {
        let provenance = Provenance {
            url,
            fetched_at,
            source_tables: target.tables_on_page,
            rows: table.len(),
            columns: table.headers.clone(),
            output: config.output.display().to_string(),
        };
        output::write_provenance(&output::provenance_path(&config.output), &provenance)?;
    }

    Ok(RunReport {
        rows: table.len(),
        columns: table.headers,
        source_tables: target.tables_on_page,
        output: config.output.clone(),
    })
}
