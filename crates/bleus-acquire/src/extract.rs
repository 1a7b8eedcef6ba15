use crate::error::{Result, ScrapeError};
use scraper::{Html, Selector};

/// The table picked out of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    /// Outer HTML of the selected `<table>`, as a standalone fragment.
    pub markup: String,
    /// How many `<table>` elements the page contained.
    pub tables_on_page: usize,
}

/// Select the last `<table>` of the page in document order.
///
/// Position is the only criterion: neither size nor content is considered.
/// Nested tables count like any other, so a table nested inside the last
/// top-level table comes after it.
pub fn extract_last_table(html: &str) -> Result<TargetTable> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("valid selector");

    let mut tables_on_page = 0;
    let mut last = None;
    for table in document.select(&table_sel) {
        tables_on_page += 1;
        last = Some(table);
    }

    let table = last.ok_or(ScrapeError::NoTable)?;
    tracing::debug!(tables = tables_on_page, "Selected last table on page");

    Ok(TargetTable {
        markup: table.html(),
        tables_on_page,
    })
}
