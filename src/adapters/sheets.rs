use crate::domain::ports::SheetSource;
use crate::domain::sheet::{Cell, Sheet};
use crate::utils::error::{MaintError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::fs;
use std::path::Path;

/// Reads spreadsheet exports from disk: `.csv` through the csv crate,
/// everything else (`.xlsx`, `.xls`, `.ods`) through calamine.
#[derive(Debug, Clone, Default)]
pub struct FileSheetSource;

impl FileSheetSource {
    pub fn new() -> Self {
        Self
    }
}

impl SheetSource for FileSheetSource {
    fn read_sheet(&self, path: &Path) -> Result<Sheet> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let sheet = if is_csv {
            read_csv(path)?
        } else {
            read_workbook(path)?
        };
        tracing::debug!(
            "Read {} data rows ({} columns) from {}",
            sheet.len(),
            sheet.width(),
            path.display()
        );
        Ok(sheet)
    }
}

fn read_workbook(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(MaintError::SpreadsheetError(calamine::Error::Msg(
            "workbook contains no worksheet",
        )))??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|d| cell_from_data(d).to_text()).collect())
        .unwrap_or_default();

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>())
        .filter(|row| !is_blank_row(row))
        .collect();

    Ok(Sheet::new(headers, rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Error values (#N/A, #REF!, ...) carry no data.
        Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

fn read_csv(path: &Path) -> Result<Sheet> {
    let content = decode_text(fs::read(path)?);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(sniff_delimiter(&content))
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        if !is_blank_row(&row) {
            rows.push(row);
        }
    }

    Ok(Sheet::new(headers, rows))
}

/// UTF-8 when the bytes are valid UTF-8, otherwise Windows-1252 (what Excel
/// writes for "CSV (Trennzeichen-getrennt)" on German systems).
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            let bytes = e.into_bytes();
            tracing::debug!("CSV source is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Picks the delimiter that splits the first lines into the most consistent
/// multi-column layout. Falls back to `,`.
fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    let lines: Vec<&str> = content.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;
    for delimiter in CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| field_count(line, delimiter))
            .collect();

        let Some(&columns) = counts.first() else {
            break;
        };
        if columns <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&count| count == columns).count();
        let score = consistent * columns;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }
    best
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|record| record.ok())
        .map(|record| record.len())
        .unwrap_or(1)
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}
