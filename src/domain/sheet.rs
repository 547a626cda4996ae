//! In-memory view of one worksheet: a header row plus data rows of cells.

use crate::utils::error::{MaintError, Result};

/// A single spreadsheet cell. `Empty` is a blank cell and stays distinct from
/// `Number(0.0)` and `Text("")`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }

    /// Cell rendered as text; blank cells become an empty string.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
        }
    }

    /// Integer value of the cell, if it holds one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Amount value of the cell. Blank cells count as zero; text must be a
    /// finite number, with either a decimal point or a decimal comma.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Cell::Empty => Some(0.0),
            Cell::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Some(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .or_else(|_| trimmed.replace(',', ".").parse::<f64>())
                    .ok()
                    .filter(|n| n.is_finite())
            }
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Number of columns: the widest of the header row and every data row.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, column)`; positions past the end of a ragged row read
    /// as blank.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Amount at `(row, column)`. Errors carry the 1-based position as seen in
    /// the spreadsheet, counting the header as line 1.
    pub fn amount(&self, row: usize, column: usize) -> Result<f64> {
        let cell = self.cell(row, column);
        cell.as_amount().ok_or_else(|| MaintError::InvalidCell {
            row: row + 2,
            column: column + 1,
            message: format!("amount '{}' is not a number", cell.to_text().trim()),
        })
    }
}
