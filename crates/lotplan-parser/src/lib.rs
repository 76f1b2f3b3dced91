//! # lotplan-parser
//!
//! Reads an uploaded production plan into a [`RawTable`].
//!
//! This crate provides:
//! - Spreadsheet reading (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) through calamine
//! - Delimited text reading (`.csv`, comma or semicolon separated)
//! - Loading from a path or from an in-memory upload
//!
//! Only the first worksheet is read and its first row is the header.
//!
//! ## Example
//!
//! ```rust
//! use lotplan_parser::{load_bytes, FileFormat};
//!
//! let upload = b"salle,lot,Produit\n101,L1,Syrup\n";
//! let table = load_bytes(upload, FileFormat::Csv).unwrap();
//! assert_eq!(table.headers, vec!["salle", "lot", "Produit"]);
//! assert_eq!(table.len(), 1);
//! ```

pub mod delimited;
pub mod spreadsheet;

use lotplan_core::RawTable;
use std::path::Path;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0} (expected .xlsx, .xls, .ods or .csv)")]
    UnsupportedFormat(String),

    #[error("Cannot read workbook: {0}")]
    Workbook(String),

    #[error("Workbook has no worksheet")]
    NoWorksheet,

    #[error("Sheet has no header row")]
    EmptySheet,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Any workbook calamine understands
    Spreadsheet,
    /// Comma or semicolon separated text
    Csv,
}

/// Detect the upload format from the file extension
pub fn detect_format(path: &Path) -> Option<FileFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(FileFormat::Spreadsheet),
        "csv" => Some(FileFormat::Csv),
        _ => None,
    }
}

/// Load an uploaded file held in memory
pub fn load_bytes(bytes: &[u8], format: FileFormat) -> Result<RawTable, ParseError> {
    match format {
        FileFormat::Spreadsheet => spreadsheet::read(bytes),
        FileFormat::Csv => delimited::read(bytes),
    }
}

/// Load a file from disk, choosing the reader by extension
pub fn load_file(path: &Path) -> Result<RawTable, ParseError> {
    let format = detect_format(path).ok_or_else(|| {
        ParseError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string(),
        )
    })?;
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loading upload");
    load_bytes(&bytes, format)
}

/// Header name used for blank header cells, numbered from zero like the column
pub(crate) fn unnamed_header(index: usize) -> String {
    format!("Unnamed: {}", index)
}
