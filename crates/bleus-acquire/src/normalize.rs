use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Line breaks, or any run of two or more whitespace characters.
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+|\s{2,}").expect("valid regex"));

/// Normalize the raw text of a table cell.
///
/// Converts to NFC so accented French place names (Genève, Séville) compare
/// and serialize consistently, collapses whitespace runs left over from the
/// markup's indentation into single spaces, and trims both ends. A lone
/// non-breaking space inside a value is kept.
pub fn normalize_cell(raw: &str) -> String {
    let nfc: String = raw.nfc().collect();
    WHITESPACE_RUN.replace_all(&nfc, " ").trim().to_string()
}
