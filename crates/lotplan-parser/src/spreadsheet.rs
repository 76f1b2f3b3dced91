//! Workbook uploads via calamine

use crate::{unnamed_header, ParseError};
use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use lotplan_core::{CellValue, RawRow, RawTable};
use std::io::Cursor;

/// Day zero for time-of-day cells, whatever the workbook's date system
fn time_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30).map(|d| d.and_time(NaiveTime::MIN))
}

fn time_of_day(elapsed: Duration) -> Option<NaiveDateTime> {
    time_epoch()?.checked_add_signed(elapsed)
}

fn excel_datetime(dt: &ExcelDateTime) -> Option<NaiveDateTime> {
    // Serials below one day are times; they would land on 1904-01-01 otherwise
    if dt.is_duration() || (0.0..1.0).contains(&dt.as_f64()) {
        time_of_day(dt.as_duration()?)
    } else {
        dt.as_datetime()
    }
}

/// `2025-03-24` or `2025-03-24T08:00:00[.fff]` from an ODS date-value
fn iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// `PT08H00M00S` (optionally `P1DT..`, fractional seconds) from an ODS time-value
fn iso_duration(text: &str) -> Option<Duration> {
    let rest = text.trim().strip_prefix('P')?;
    let (days, time) = match rest.split_once('T') {
        Some((days, time)) => (days, time),
        None => (rest, ""),
    };

    let mut millis = 0.0;
    if !days.is_empty() {
        let days: f64 = days.strip_suffix('D')?.parse().ok()?;
        millis += days * 86_400_000.0;
    }

    let mut number = String::new();
    for c in time.chars() {
        let unit = match c {
            'H' => 3_600_000.0,
            'M' => 60_000.0,
            'S' => 1_000.0,
            _ => {
                number.push(c);
                continue;
            }
        };
        let value: f64 = number.parse().ok()?;
        millis += value * unit;
        number.clear();
    }
    if !number.is_empty() || !millis.is_finite() || millis < 0.0 {
        return None;
    }
    Some(Duration::milliseconds(millis.round() as i64))
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_datetime(dt)
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::text(s.as_str())),
        Data::DurationIso(s) => iso_duration(s)
            .and_then(time_of_day)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::text(s.as_str())),
        #[allow(unreachable_patterns)]
        _ => CellValue::Empty,
    }
}

pub fn read(bytes: &[u8]) -> Result<RawTable, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.len() > 1 {
        tracing::warn!(
            sheet = %sheet_names[0],
            ignored = sheet_names.len() - 1,
            "workbook has several sheets, only the first is read"
        );
    }

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)?
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    // Range coordinates are 0-based and skip leading empty rows
    let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(ParseError::EmptySheet)?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = cell_value(cell).to_text();
            if name.is_empty() {
                unnamed_header(idx)
            } else {
                name
            }
        })
        .collect();

    let mut table = RawTable::new(headers);
    for (offset, data_row) in rows.enumerate() {
        let row = RawRow::new(
            first_line + 1 + offset,
            data_row.iter().map(cell_value).collect(),
        );
        if row.is_blank() {
            continue;
        }
        table.push(row);
    }

    tracing::debug!(rows = table.len(), columns = table.headers.len(), "read worksheet");
    Ok(table)
}
