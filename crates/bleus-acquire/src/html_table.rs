// Reading an HTML <table> fragment into a rows × columns record set.
//
// Header rows come from <thead>, or failing that from the leading body rows
// made only of <th> cells. colspan/rowspan are expanded by repeating the
// cell text in every slot it covers, separately for head, body and foot.
// A rowspan reaching past the last row of its section is clipped there.

use crate::error::{Result, ScrapeError};
use crate::normalize::normalize_cell;
use bleus_model::Table;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, VecDeque};
use std::ops::Deref;

// Upper bounds from the HTML table model.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

/// Rows of a table grouped by section, each in document order.
#[derive(Debug, Default)]
struct Sections {
    head: Vec<Vec<Cell>>,
    body: Vec<Vec<Cell>>,
    foot: Vec<Vec<Cell>>,
}

/// Parse a markup fragment holding one `<table>` into a [`Table`].
///
/// Column names come from the last header row. A table without any header
/// row gets positional names `0`, `1`, … Rows made only of empty cells are
/// dropped.
pub fn parse_html_table(markup: &str) -> Result<Table> {
    let fragment = Html::parse_fragment(markup);
    let table_sel = Selector::parse("table").expect("valid selector");
    let table = fragment
        .select(&table_sel)
        .next()
        .ok_or_else(|| ScrapeError::MalformedTable("no <table> element in markup".into()))?;

    let mut sections = collect_sections(table);

    if sections.head.is_empty() {
        while sections
            .body
            .first()
            .is_some_and(|row| !row.is_empty() && row.iter().all(|c| c.is_header))
        {
            let row = sections.body.remove(0);
            sections.head.push(row);
        }
    }

    let head = expand_spans(&sections.head);
    let mut body = expand_spans(&sections.body);
    body.extend(expand_spans(&sections.foot));
    body.retain(|row| row.iter().any(|cell| !cell.is_empty()));

    if head.is_empty() && body.is_empty() {
        return Err(ScrapeError::MalformedTable("table has no rows".into()));
    }

    let width = head
        .iter()
        .chain(&body)
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    let headers = match head.last() {
        Some(names) => column_names(names, width),
        None => (0..width).map(|i| i.to_string()).collect(),
    };

    tracing::debug!(
        header_rows = head.len(),
        rows = body.len(),
        columns = width,
        "Parsed HTML table"
    );

    Ok(Table::new(headers, body))
}

fn collect_sections(table: ElementRef) -> Sections {
    let mut sections = Sections::default();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => sections.head.extend(section_rows(child)),
            "tbody" => sections.body.extend(section_rows(child)),
            "tfoot" => sections.foot.extend(section_rows(child)),
            "tr" => sections.body.push(row_cells(child)),
            _ => {}
        }
    }

    sections
}

fn section_rows(section: ElementRef) -> Vec<Vec<Cell>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .map(row_cells)
        .collect()
}

fn row_cells(tr: ElementRef) -> Vec<Cell> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| {
            let is_header = match el.value().name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(Cell {
                text: normalize_cell(&collect_all_text(el.id(), el.tree())),
                is_header,
                colspan: span_attr(el, "colspan", MAX_COLSPAN),
                rowspan: span_attr(el, "rowspan", MAX_ROWSPAN),
            })
        })
        .collect()
}

fn span_attr(el: ElementRef, name: &str, max: usize) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map_or(1, |n| n.min(max))
}

/// Collect all text content under a node, recursively.
///
/// `<br>` becomes a line break (later collapsed to a space); script and
/// style bodies are skipped.
fn collect_all_text(node_id: ego_tree::NodeId, tree: &ego_tree::Tree<Node>) -> String {
    let Some(node) = tree.get(node_id) else {
        return String::new();
    };
    let mut text = String::new();

    for child in node.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t.deref()),
            Node::Element(elem) => match elem.name() {
                "br" => text.push('\n'),
                "script" | "style" => {}
                _ => text.push_str(&collect_all_text(child.id(), tree)),
            },
            _ => {}
        }
    }

    text
}

/// A cell carried down into following rows by its rowspan.
struct Carried {
    column: usize,
    text: String,
    rows_left: usize,
}

/// Flatten span attributes into a plain grid of cell texts.
///
/// Never yields more rows than `rows` holds.
fn expand_spans(rows: &[Vec<Cell>]) -> Vec<Vec<String>> {
    let mut grid = Vec::with_capacity(rows.len());
    let mut carried: VecDeque<Carried> = VecDeque::new();

    for row in rows {
        let mut texts = Vec::new();
        let mut next_carried = VecDeque::new();
        let mut column = 0;

        for cell in row {
            while carried.front().is_some_and(|c| c.column <= column) {
                if let Some(prev) = carried.pop_front() {
                    texts.push(prev.text.clone());
                    carry_on(&mut next_carried, prev);
                    column += 1;
                }
            }

            for _ in 0..cell.colspan {
                texts.push(cell.text.clone());
                if cell.rowspan > 1 {
                    next_carried.push_back(Carried {
                        column,
                        text: cell.text.clone(),
                        rows_left: cell.rowspan - 1,
                    });
                }
                column += 1;
            }
        }

        for prev in carried.drain(..) {
            texts.push(prev.text.clone());
            carry_on(&mut next_carried, prev);
        }

        grid.push(texts);
        carried = next_carried;
    }

    if !carried.is_empty() {
        tracing::debug!(cells = carried.len(), "Clipped rowspan at end of section");
    }
    grid
}

fn carry_on(next: &mut VecDeque<Carried>, prev: Carried) {
    if prev.rows_left > 1 {
        next.push_back(Carried {
            rows_left: prev.rows_left - 1,
            ..prev
        });
    }
}

/// Final column names: blanks and overflow columns become `Unnamed: {i}`,
/// repeated names get `.1`, `.2`, … suffixes.
fn column_names(header: &[String], width: usize) -> Vec<String> {
    let mut names: Vec<String> = (0..width)
        .map(|i| match header.get(i) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Unnamed: {i}"),
        })
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in names.iter_mut() {
        let mut candidate = name.clone();
        let mut seen = counts.get(&candidate).copied().unwrap_or(0);
        while seen > 0 {
            counts.insert(candidate.clone(), seen + 1);
            candidate = format!("{candidate}.{seen}");
            seen = counts.get(&candidate).copied().unwrap_or(0);
        }
        counts.insert(candidate.clone(), seen + 1);
        *name = candidate;
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_thead_and_tbody() {
        let html = r#"
        <table>
            <thead><tr><th>#</th><th>Date</th><th>Adversaire</th></tr></thead>
            <tbody>
                <tr><td>1</td><td>1904-05-01</td><td>Belgique</td></tr>
                <tr><td>2</td><td>1905-02-12</td><td>Suisse</td></tr>
            </tbody>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, strings(&["#", "Date", "Adversaire"]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], strings(&["2", "1905-02-12", "Suisse"]));
    }

    #[test]
    fn test_leading_th_row_is_header() {
        let html = r#"
        <table>
            <tr><th>#</th><th>Ville</th></tr>
            <tr><td>1</td><td>Bruxelles</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, strings(&["#", "Ville"]));
        assert_eq!(table.rows, vec![strings(&["1", "Bruxelles"])]);
    }

    #[test]
    fn test_mixed_th_td_row_is_data() {
        // A row label in <th> does not make the row a header.
        let html = r#"
        <table>
            <tr><th>1</th><td>Bruxelles</td></tr>
            <tr><th>2</th><td>Paris</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, strings(&["0", "1"]));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_last_header_row_names_columns() {
        let html = r#"
        <table>
            <thead>
                <tr><th colspan="2">Match</th><th>Résultat</th></tr>
                <tr><th>#</th><th>Date</th><th>score</th></tr>
            </thead>
            <tr><td>1</td><td>1904-05-01</td><td>3-3</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, strings(&["#", "Date", "score"]));
    }

    #[test]
    fn test_colspan_and_rowspan_expanded() {
        let html = r#"
        <table>
            <tr><th>#</th><th>Date</th><th>Ville</th></tr>
            <tr><td>1</td><td rowspan="2">1904-05-01</td><td>Bruxelles</td></tr>
            <tr><td>2</td><td>Paris</td></tr>
            <tr><td>3</td><td colspan="2">annulé</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(
            table.rows,
            vec![
                strings(&["1", "1904-05-01", "Bruxelles"]),
                strings(&["2", "1904-05-01", "Paris"]),
                strings(&["3", "annulé", "annulé"]),
            ]
        );
    }

    #[test]
    fn test_rowspan_in_last_column() {
        let html = r#"
        <table>
            <tr><th>a</th><th>b</th></tr>
            <tr><td>1</td><td rowspan="2">x</td></tr>
            <tr><td>2</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.rows, vec![strings(&["1", "x"]), strings(&["2", "x"])]);
    }

    #[test]
    fn test_trailing_rowspan_clipped_at_section_end() {
        let rows = vec![
            vec![Cell {
                text: "x".into(),
                is_header: false,
                colspan: 1,
                rowspan: 3,
            }],
            vec![],
        ];
        let grid = expand_spans(&rows);
        assert_eq!(grid, vec![strings(&["x"]), strings(&["x"])]);
    }

    #[test]
    fn test_oversized_spans_stay_bounded() {
        let html = r#"
        <table>
            <tr><th>#</th><th>Date</th></tr>
            <tr><td>1</td><td rowspan="65534" colspan="1000">x</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.width(), 1001);
        assert_eq!(table.headers[2], "Unnamed: 2");
    }

    #[test]
    fn test_header_rowspan_does_not_leak_into_body() {
        let html = r#"
        <table>
            <thead><tr><th rowspan="2">#</th><th>Date</th></tr></thead>
            <tbody><tr><td>1</td><td>1904-05-01</td></tr></tbody>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, strings(&["#", "Date"]));
        assert_eq!(table.rows, vec![strings(&["1", "1904-05-01"])]);
    }

    #[test]
    fn test_short_rows_padded_and_extra_columns_named() {
        let html = r#"
        <table>
            <tr><th>#</th><th>Date</th></tr>
            <tr><td>1</td></tr>
            <tr><td>2</td><td>1905-02-12</td><td>note</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, strings(&["#", "Date", "Unnamed: 2"]));
        assert_eq!(table.rows[0], strings(&["1", "", ""]));
        assert_eq!(table.rows[1], strings(&["2", "1905-02-12", "note"]));
    }

    #[test]
    fn test_duplicate_headers_mangled() {
        let names = column_names(&strings(&["score", "score", "", "score"]), 4);
        assert_eq!(names, strings(&["score", "score.1", "Unnamed: 2", "score.2"]));
    }

    #[test]
    fn test_cell_text_flattened() {
        let html = r#"
        <table>
            <tr><th>
                Adversaire
            </th><th>score</th></tr>
            <tr><td><a href="/m/1"><b>Belgique</b></a><script>track()</script></td><td>3<br>3</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, strings(&["Adversaire", "score"]));
        assert_eq!(table.rows[0], strings(&["Belgique", "3 3"]));
    }

    #[test]
    fn test_blank_rows_dropped() {
        let html = r#"
        <table>
            <tr><th>#</th></tr>
            <tr><td> </td></tr>
            <tr></tr>
            <tr><td>1</td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.rows, vec![strings(&["1"])]);
    }

    #[test]
    fn test_tfoot_rows_come_last() {
        let html = r#"
        <table>
            <thead><tr><th>#</th></tr></thead>
            <tfoot><tr><td>total</td></tr></tfoot>
            <tbody><tr><td>1</td></tr></tbody>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.rows, vec![strings(&["1"]), strings(&["total"])]);
    }

    #[test]
    fn test_nested_table_rows_ignored() {
        let html = r#"
        <table>
            <tr><th>#</th><th>Détail</th></tr>
            <tr><td>1</td><td><table><tr><td>inner</td></tr></table></td></tr>
        </table>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][0], "1");
    }

    #[test]
    fn test_header_only_table() {
        let table = parse_html_table("<table><tr><th>#</th><th>Date</th></tr></table>").unwrap();
        assert_eq!(table.headers, strings(&["#", "Date"]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_no_table_in_markup() {
        let err = parse_html_table("<div>pas de tableau</div>").unwrap_err();
        assert!(matches!(err, ScrapeError::MalformedTable(_)));
    }

    #[test]
    fn test_empty_table() {
        let err = parse_html_table("<table></table>").unwrap_err();
        assert!(matches!(err, ScrapeError::MalformedTable(_)));
    }
}
