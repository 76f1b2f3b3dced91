//! # lotplan-core
//!
//! Core domain model and traits for the lotplan schedule normalizer.
//!
//! This crate provides:
//! - Raw input types: `CellValue`, `RawRow`, `RawTable`
//! - Domain types: `Field`, `ScheduleEntry`, `Schedule`, `RejectedRow`, `Overlap`
//! - Core traits: `Normalizer`, `Renderer`
//! - Error types and diagnostics
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use lotplan_core::{CellValue, RawTable, ScheduleEntry};
//!
//! let mut table = RawTable::new(vec!["salle".into(), "lot".into()]);
//! table.push_cells(vec![CellValue::Number(101.0), CellValue::text("L-42")]);
//! assert_eq!(table.value(&table.rows[0], "salle").unwrap().to_text(), "101");
//!
//! let start = NaiveDate::from_ymd_opt(2025, 3, 24)
//!     .unwrap()
//!     .and_hms_opt(8, 0, 0)
//!     .unwrap();
//! let entry = ScheduleEntry::new("101", "L-42", "Syrup", start, 1.5).unwrap();
//! assert_eq!(entry.end.to_string(), "2025-03-24 09:30:00");
//! ```

pub mod diagnostics;

pub use diagnostics::{CollectingEmitter, Diagnostic, DiagnosticCode, DiagnosticEmitter, Severity};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Identifier of a production room or line
pub type ResourceId = String;

/// Identifier of a production lot or order
pub type LotId = String;

/// Nanoseconds per hour, used when turning fractional hours into a `Duration`
const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;

/// Add a fractional number of hours to a timestamp.
///
/// Returns `None` for negative, non-finite or overflowing durations. The
/// addition keeps nanosecond resolution, so no rounding to minutes happens.
pub fn add_hours(start: NaiveDateTime, hours: f64) -> Option<NaiveDateTime> {
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }
    let nanos = (hours * NANOS_PER_HOUR).round();
    if nanos >= i64::MAX as f64 {
        return None;
    }
    start.checked_add_signed(chrono::Duration::nanoseconds(nanos as i64))
}

/// Hours between two timestamps as a float
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta = end - start;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_HOUR,
        None => delta.num_seconds() as f64 / 3600.0,
    }
}

// ============================================================================
// Raw Input
// ============================================================================

/// A single typed spreadsheet cell
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// Day zero of the spreadsheet 1900 date system. Time-only cells land here.
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

impl CellValue {
    /// Create a text cell
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Coerce the cell to text.
    ///
    /// Integral numbers lose their fractional part (`101.0` -> `"101"`),
    /// datetimes at midnight become a bare date and time-only values a bare
    /// time, so that a date cell and a time cell can be concatenated.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => number_text(*n),
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => {
                if Some(dt.date()) == serial_epoch() {
                    dt.format("%H:%M:%S").to_string()
                } else if dt.time().num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }
}

fn number_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One data row of the uploaded sheet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based line in the source sheet (the header is line 1)
    pub line: usize,
    pub cells: Vec<CellValue>,
}

impl RawRow {
    pub fn new(line: usize, cells: Vec<CellValue>) -> Self {
        Self { line, cells }
    }

    /// Cell at a column index; short rows read as empty
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    /// True when every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

/// The uploaded sheet: header names plus data rows
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Create an empty table. Header names are trimmed.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row read from the given source line
    pub fn push(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    /// Append cells as the next line after the last row
    pub fn push_cells(&mut self, cells: Vec<CellValue>) {
        let line = self.rows.last().map(|r| r.line + 1).unwrap_or(2);
        self.rows.push(RawRow::new(line, cells));
    }

    /// Builder form of [`RawTable::push_cells`]
    pub fn with_row(mut self, cells: Vec<CellValue>) -> Self {
        self.push_cells(cells);
        self
    }

    /// Index of the column with exactly this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Look a row's value up by column name
    pub fn value<'a>(&self, row: &'a RawRow, name: &str) -> Option<&'a CellValue> {
        self.column_index(name).map(|idx| row.cell(idx))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Fields
// ============================================================================

/// The six logical fields every schedule row must provide
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Resource,
    Lot,
    Product,
    Date,
    Time,
    RunTime,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Resource,
        Field::Lot,
        Field::Product,
        Field::Date,
        Field::Time,
        Field::RunTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Resource => "resource",
            Field::Lot => "lot",
            Field::Product => "product",
            Field::Date => "date",
            Field::Time => "time",
            Field::RunTime => "run time",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// One normalized production run, ready to plot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub resource: ResourceId,
    pub lot_id: LotId,
    pub product: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_hours: f64,
}

impl ScheduleEntry {
    /// Build an entry, deriving `end` from `start` and the duration.
    ///
    /// Returns `None` if the duration is negative, not finite, or pushes
    /// `end` past the representable range.
    pub fn new(
        resource: impl Into<String>,
        lot_id: impl Into<String>,
        product: impl Into<String>,
        start: NaiveDateTime,
        duration_hours: f64,
    ) -> Option<Self> {
        let end = add_hours(start, duration_hours)?;
        Some(Self {
            resource: resource.into(),
            lot_id: lot_id.into(),
            product: product.into(),
            start,
            end,
            duration_hours,
        })
    }

    /// True if both entries occupy some common instant on the same resource
    pub fn overlaps(&self, other: &ScheduleEntry) -> bool {
        self.resource == other.resource && self.start < other.end && other.start < self.end
    }
}

/// Why a row was left out of the schedule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Date and time did not combine into a timestamp
    UnparsableTimestamp { value: String },
    /// Run time was not a usable number
    UnparsableDuration { value: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsableTimestamp { value } => write!(f, "unparsable date/time {:?}", value),
            Self::UnparsableDuration { value } => write!(f, "unparsable run time {:?}", value),
        }
    }
}

/// A dropped input row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: RejectReason,
}

/// The result of normalizing one uploaded table
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Entries in input row order
    pub entries: Vec<ScheduleEntry>,
    /// Rows that were dropped, in input order
    pub rejected: Vec<RejectedRow>,
}

impl Schedule {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            entries,
            rejected: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct resources in first-appearance order
    pub fn resources(&self) -> Vec<&str> {
        distinct(self.entries.iter().map(|e| e.resource.as_str()))
    }

    /// Distinct products in first-appearance order
    pub fn products(&self) -> Vec<&str> {
        distinct(self.entries.iter().map(|e| e.product.as_str()))
    }

    pub fn earliest_start(&self) -> Option<NaiveDateTime> {
        self.entries.iter().map(|e| e.start).min()
    }

    pub fn latest_end(&self) -> Option<NaiveDateTime> {
        self.entries.iter().map(|e| e.end).max()
    }

    /// Sum of all run durations in hours
    pub fn total_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.duration_hours).sum()
    }

    pub fn timestamp_rejects(&self) -> usize {
        self.rejected
            .iter()
            .filter(|r| matches!(r.reason, RejectReason::UnparsableTimestamp { .. }))
            .count()
    }

    pub fn duration_rejects(&self) -> usize {
        self.rejected
            .iter()
            .filter(|r| matches!(r.reason, RejectReason::UnparsableDuration { .. }))
            .count()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Two entries sharing a resource during some interval
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlap {
    pub resource: ResourceId,
    /// Index of the earlier-listed entry
    pub first: usize,
    /// Index of the later-listed entry
    pub second: usize,
    /// Length of the shared interval
    pub hours: f64,
}

// ============================================================================
// Traits
// ============================================================================

/// Turns a raw table into a schedule
pub trait Normalizer {
    fn normalize(&self, table: &RawTable) -> Result<Schedule, NormalizeError>;
}

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a schedule to the output format
    fn render(&self, schedule: &Schedule) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Normalization error. Either variant aborts the whole table.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Cannot convert run time {value:?} on line {line} to a number")]
    UnparsableDuration { line: usize, value: String },
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
