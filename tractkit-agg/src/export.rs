//! Tabular export of merged records
//!
//! [`ExportTable`] is the format-independent table: header = lexically sorted
//! union of every label across all records, one row per record, empty cells
//! for labels a record lacks. [`ExportFormat`] encodes it as XLSX or CSV.

use crate::record::Record;
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::{Number, Value};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

/// Encoding failures
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XLSX encoding failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Too many columns for a worksheet: {0}")]
    TooManyColumns(usize),
}

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Number),
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Number(n) => Cell::Number(n.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl Cell {
    /// Text form used by delimited output
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// Header plus row-major cells
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ExportTable {
    /// Flatten each record and align it to the sorted label union
    pub fn from_records(records: &[Record]) -> Self {
        let flat: Vec<_> = records.iter().map(Record::flatten).collect();

        let header: Vec<String> = flat
            .iter()
            .flat_map(|fields| fields.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = flat
            .iter()
            .map(|fields| {
                header
                    .iter()
                    .map(|label| fields.get(label).map_or(Cell::Empty, Cell::from))
                    .collect()
            })
            .collect();

        Self { header, rows }
    }
}

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown export format '{0}': expected xlsx or csv")]
pub struct ExportFormatParseError(pub String);

impl FromStr for ExportFormat {
    type Err = ExportFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportFormatParseError(s.to_string())),
        }
    }
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "data_output.xlsx",
            ExportFormat::Csv => "data_output.csv",
        }
    }

    pub fn encode(self, table: &ExportTable) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Xlsx => encode_xlsx(table),
            ExportFormat::Csv => encode_csv(table),
        }
    }
}

fn encode_xlsx(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let columns = u16::try_from(table.header.len())
        .map_err(|_| ExportError::TooManyColumns(table.header.len()))?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, label) in (0..columns).zip(&table.header) {
        sheet.write_string(0, col, label)?;
    }

    for (row, cells) in (1u32..).zip(&table.rows) {
        for (col, cell) in (0..columns).zip(cells) {
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    sheet.write_string(row, col, s)?;
                }
                Cell::Number(n) => match n.as_f64() {
                    Some(f) => {
                        sheet.write_number(row, col, f)?;
                    }
                    None => {
                        sheet.write_string(row, col, n.to_string())?;
                    }
                },
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn encode_csv(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.header)?;
    for cells in &table.rows {
        writer.write_record(cells.iter().map(Cell::as_text))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
