//! # lotplan-normalize
//!
//! Turns a loosely-named production plan into timeline intervals.
//!
//! This crate provides:
//! - Column resolution by exact header name or fuzzy substring
//! - Date + time parsing with an optional day-first preference
//! - Run time coercion (decimal commas, thousandths to hours)
//! - Same-resource overlap detection
//!
//! ## Example
//!
//! ```rust
//! use lotplan_core::{CellValue, Normalizer, RawTable};
//! use lotplan_normalize::ScheduleNormalizer;
//!
//! let headers = ["salle", "lot", "Produit", "Date Start", "Time Start", "Run Time"];
//! let table = RawTable::new(headers.iter().map(|h| h.to_string()).collect()).with_row(vec![
//!     CellValue::Number(101.0),
//!     CellValue::text("L-42"),
//!     CellValue::text("Syrup"),
//!     CellValue::text("2025-03-24"),
//!     CellValue::text("08:00"),
//!     CellValue::text("1500"),
//! ]);
//!
//! let schedule = ScheduleNormalizer::new().normalize(&table).unwrap();
//! assert_eq!(schedule.entries[0].resource, "101");
//! assert_eq!(schedule.entries[0].duration_hours, 90.0);
//! ```

pub mod columns;
pub mod conflicts;
pub mod duration;
pub mod timestamp;

pub use columns::{resolve, resolve_columns, ColumnMap, ColumnPolicy, ColumnRule, ExactColumns, FuzzyColumns};
pub use conflicts::find_overlaps;
pub use duration::{parse_run_time, run_time_hours};
pub use timestamp::parse_timestamp;

use lotplan_core::{
    Field, NormalizeError, Normalizer, RawRow, RawTable, RejectReason, RejectedRow, Schedule,
    ScheduleEntry,
};
use serde::{Deserialize, Serialize};

/// What to do with a row whose run time is not a number
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Leave the row out and record it as rejected
    #[default]
    Drop,
    /// Fail the whole table
    Abort,
}

/// Normalizer configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub columns: ColumnPolicy,
    /// Read `03/04/2025` as the 3rd of April
    pub day_first: bool,
    pub duration_policy: DurationPolicy,
}

/// Normalizes raw plan tables into a [`Schedule`]
#[derive(Clone, Debug, Default)]
pub struct ScheduleNormalizer {
    pub options: NormalizeOptions,
}

impl ScheduleNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Resolve columns by substring instead of exact name
    pub fn fuzzy(mut self) -> Self {
        self.options.columns = ColumnPolicy::fuzzy();
        self
    }

    pub fn day_first(mut self) -> Self {
        self.options.day_first = true;
        self
    }

    /// Fail the table on the first unparsable run time
    pub fn abort_on_bad_duration(mut self) -> Self {
        self.options.duration_policy = DurationPolicy::Abort;
        self
    }

    fn entry_for(&self, row: &RawRow, columns: &ColumnMap) -> Result<ScheduleEntry, RejectReason> {
        let text = |field: Field| row.cell(columns.get(field)).to_text();

        let date_time = format!("{} {}", text(Field::Date), text(Field::Time));
        let start = parse_timestamp(&date_time, self.options.day_first)
            .ok_or_else(|| RejectReason::UnparsableTimestamp { value: date_time.clone() })?;

        let run = text(Field::RunTime);
        let unparsable = || RejectReason::UnparsableDuration { value: run.clone() };
        let hours = parse_run_time(&run).map(run_time_hours).ok_or_else(unparsable)?;

        ScheduleEntry::new(
            text(Field::Resource),
            text(Field::Lot),
            text(Field::Product),
            start,
            hours,
        )
        .ok_or_else(unparsable)
    }
}

impl Normalizer for ScheduleNormalizer {
    fn normalize(&self, table: &RawTable) -> Result<Schedule, NormalizeError> {
        let columns = resolve_columns(&table.headers, &self.options.columns)?;

        let mut schedule = Schedule::default();
        for row in &table.rows {
            match self.entry_for(row, &columns) {
                Ok(entry) => schedule.entries.push(entry),
                Err(RejectReason::UnparsableDuration { value })
                    if self.options.duration_policy == DurationPolicy::Abort =>
                {
                    return Err(NormalizeError::UnparsableDuration {
                        line: row.line,
                        value,
                    });
                }
                Err(reason) => {
                    tracing::debug!(line = row.line, %reason, "dropping row");
                    schedule.rejected.push(RejectedRow {
                        line: row.line,
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            rows = table.len(),
            entries = schedule.entries.len(),
            bad_timestamps = schedule.timestamp_rejects(),
            bad_run_times = schedule.duration_rejects(),
            "normalized schedule"
        );
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lotplan_core::CellValue;
    use pretty_assertions::assert_eq;

    fn plan() -> RawTable {
        RawTable::new(
            ["salle", "lot", "Produit", "Date Start", "Time Start", "Run Time"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
        )
    }

    fn row(resource: CellValue, date: &str, time: &str, run: &str) -> Vec<CellValue> {
        vec![
            resource,
            CellValue::text("L1"),
            CellValue::text("Syrup"),
            CellValue::text(date),
            CellValue::text(time),
            CellValue::text(run),
        ]
    }

    #[test]
    fn derives_start_end_and_hours() {
        let table = plan().with_row(row(CellValue::text("101"), "2025-03-24", "08:00", "1500"));
        let schedule = ScheduleNormalizer::new().normalize(&table).unwrap();

        let entry = &schedule.entries[0];
        let start = NaiveDate::from_ymd_opt(2025, 3, 24)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(entry.start, start);
        assert_eq!(entry.duration_hours, 90.0);
        assert_eq!(entry.end, start + chrono::Duration::hours(90));
    }

    #[test]
    fn numeric_resource_becomes_text() {
        let table = plan().with_row(row(CellValue::Number(101.0), "2025-03-24", "08:00", "1500"));
        let schedule = ScheduleNormalizer::new().normalize(&table).unwrap();
        assert_eq!(schedule.entries[0].resource, "101");
    }

    #[test]
    fn bad_timestamp_is_dropped_and_recorded() {
        let table = plan()
            .with_row(row(CellValue::text("101"), "not a date", "08:00", "1500"))
            .with_row(row(CellValue::text("101"), "2025-03-24", "08:00", "1500"));
        let schedule = ScheduleNormalizer::new().normalize(&table).unwrap();

        assert_eq!(schedule.entries.len(), 1);
        assert_eq!(
            schedule.rejected,
            vec![RejectedRow {
                line: 2,
                reason: RejectReason::UnparsableTimestamp {
                    value: "not a date 08:00".into()
                }
            }]
        );
    }

    #[test]
    fn bad_duration_dropped_by_default() {
        let table = plan().with_row(row(CellValue::text("101"), "2025-03-24", "08:00", "n/a"));
        let schedule = ScheduleNormalizer::new().normalize(&table).unwrap();
        assert!(schedule.entries.is_empty());
        assert_eq!(schedule.duration_rejects(), 1);
    }

    #[test]
    fn bad_duration_aborts_when_asked() {
        let table = plan()
            .with_row(row(CellValue::text("101"), "2025-03-24", "08:00", "1500"))
            .with_row(row(CellValue::text("101"), "2025-03-24", "10:00", "abc"));
        let err = ScheduleNormalizer::new()
            .abort_on_bad_duration()
            .normalize(&table)
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::UnparsableDuration {
                line: 3,
                value: "abc".into()
            }
        );
    }

    #[test]
    fn timestamp_failure_wins_over_duration_failure() {
        let table = plan().with_row(row(CellValue::text("101"), "", "", "abc"));
        let schedule = ScheduleNormalizer::new()
            .abort_on_bad_duration()
            .normalize(&table)
            .unwrap();
        assert_eq!(schedule.timestamp_rejects(), 1);
        assert_eq!(schedule.duration_rejects(), 0);
    }

    #[test]
    fn missing_columns_produce_no_entries() {
        let table = RawTable::new(vec!["salle".into(), "lot".into()]);
        let err = ScheduleNormalizer::new().normalize(&table).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing columns: Produit, Date Start, Time Start, Run Time"
        );
    }

    #[test]
    fn day_first_option() {
        let table = plan().with_row(row(CellValue::text("101"), "03/04/2025", "08:00", "0"));
        let us = ScheduleNormalizer::new().normalize(&table).unwrap();
        let eu = ScheduleNormalizer::new().day_first().normalize(&table).unwrap();
        assert_eq!(us.entries[0].start.date(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(eu.entries[0].start.date(), NaiveDate::from_ymd_opt(2025, 4, 3).unwrap());
    }

    #[test]
    fn typed_date_and_time_cells_combine() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 24)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let time = NaiveDate::from_ymd_opt(1899, 12, 30)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let table = plan().with_row(vec![
            CellValue::text("101"),
            CellValue::text("L1"),
            CellValue::text("Syrup"),
            CellValue::DateTime(date),
            CellValue::DateTime(time),
            CellValue::Number(1000.0),
        ]);
        let schedule = ScheduleNormalizer::new().normalize(&table).unwrap();
        assert_eq!(schedule.entries[0].start.to_string(), "2025-03-24 14:30:00");
        assert_eq!(schedule.entries[0].duration_hours, 60.0);
    }

    #[test]
    fn input_order_is_preserved() {
        let table = plan()
            .with_row(row(CellValue::text("B"), "2025-03-25", "08:00", "100"))
            .with_row(row(CellValue::text("A"), "2025-03-24", "08:00", "100"));
        let schedule = ScheduleNormalizer::new().normalize(&table).unwrap();
        let resources: Vec<&str> = schedule.entries.iter().map(|e| e.resource.as_str()).collect();
        assert_eq!(resources, vec!["B", "A"]);
    }
}
