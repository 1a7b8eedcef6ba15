use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while reshaping a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column '{column}' not found in table (columns: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
}

/// A rectangular record set: named columns and rows of cell text.
///
/// Every row holds exactly `headers.len()` cells once it has gone through
/// [`Table::new`]. Cell values are kept as the text found in the source
/// markup; nothing is coerced to numbers or dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, padding short rows with empty cells and truncating long ones.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Number of data rows (the header row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Position of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Narrow the table to `columns`, in that order.
    ///
    /// Names are matched exactly (case-sensitive). Every requested column must
    /// exist: the first missing one aborts the projection rather than yielding
    /// a partial or padded table.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table, TableError> {
        let indices = columns
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.column_index(name).ok_or_else(|| TableError::MissingColumn {
                    column: name.to_string(),
                    available: self.headers.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let headers = indices.iter().map(|&i| self.headers[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Table { headers, rows })
    }

    /// A printable view of the first `limit` rows.
    pub fn preview(&self, limit: usize) -> Preview<'_> {
        Preview { table: self, limit }
    }
}

/// Aligned text rendering of the head of a [`Table`], for console inspection.
///
/// The left-most column is a positional row number that exists only in this
/// rendering; it never reaches the CSV output.
pub struct Preview<'a> {
    table: &'a Table,
    limit: usize,
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = &self.table.rows[..self.limit.min(self.table.rows.len())];

        let index_width = rows.len().saturating_sub(1).to_string().len();
        let mut widths: Vec<usize> = self
            .table
            .headers
            .iter()
            .map(|h| h.chars().count())
            .collect();
        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        write!(f, "{:index_width$}", "")?;
        for (header, &w) in self.table.headers.iter().zip(&widths) {
            write!(f, "  {header:>w$}")?;
        }

        for (i, row) in rows.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{i:>index_width$}")?;
            for (cell, &w) in row.iter().zip(&widths) {
                write!(f, "  {cell:>w$}")?;
            }
        }

        Ok(())
    }
}
