//! Findings reported by `lotplan check`

use std::path::Path;

use lotplan_core::{
    Diagnostic, DiagnosticCode, DiagnosticEmitter, NormalizeError, Normalizer, RejectReason,
    Schedule,
};
use lotplan_normalize::{find_overlaps, ColumnPolicy, ScheduleNormalizer};
use lotplan_render::{RangePolicy, TimelineLayout};

use crate::config::Settings;

/// Load and normalize `path`, emitting one diagnostic per finding.
///
/// Returns the schedule when the file could be normalized at all.
pub fn check_file(
    path: &Path,
    settings: &Settings,
    emitter: &mut dyn DiagnosticEmitter,
) -> Option<Schedule> {
    let table = match lotplan_parser::load_file(path) {
        Ok(table) => table,
        Err(e) => {
            emitter.emit(
                Diagnostic::new(DiagnosticCode::E003UnreadableInput, e.to_string()).with_file(path),
            );
            return None;
        }
    };

    let normalizer = ScheduleNormalizer::with_options(settings.normalize.clone());
    let schedule = match normalizer.normalize(&table) {
        Ok(schedule) => schedule,
        Err(e @ NormalizeError::MissingColumns(_)) => {
            let mut diagnostic = Diagnostic::new(DiagnosticCode::E001MissingColumns, e.to_string())
                .with_file(path)
                .with_note(format!("headers found: {}", table.headers.join(", ")));
            if matches!(settings.normalize.columns, ColumnPolicy::Exact(_)) {
                diagnostic = diagnostic.with_hint("pass --fuzzy to match headers by substring");
            }
            emitter.emit(diagnostic);
            return None;
        }
        Err(e @ NormalizeError::UnparsableDuration { line, .. }) => {
            emitter.emit(
                Diagnostic::new(DiagnosticCode::E002UnparsableDuration, e.to_string())
                    .with_file(path)
                    .with_line(line)
                    .with_hint("without --abort-on-bad-duration the row is dropped instead"),
            );
            return None;
        }
    };

    for row in &schedule.rejected {
        let code = match row.reason {
            RejectReason::UnparsableTimestamp { .. } => DiagnosticCode::W001UnparsableTimestamp,
            RejectReason::UnparsableDuration { .. } => DiagnosticCode::W002UnparsableDuration,
        };
        emitter.emit(
            Diagnostic::new(code, format!("row dropped: {}", row.reason))
                .with_file(path)
                .with_line(row.line),
        );
    }

    for overlap in find_overlaps(&schedule.entries) {
        let first = &schedule.entries[overlap.first];
        let second = &schedule.entries[overlap.second];
        emitter.emit(
            Diagnostic::new(
                DiagnosticCode::W003ResourceOverlap,
                format!(
                    "lots {} and {} overlap on resource {} for {:.2} h",
                    first.lot_id, second.lot_id, overlap.resource, overlap.hours
                ),
            )
            .with_file(path)
            .with_note(format!(
                "{} runs {} to {}",
                first.lot_id,
                first.start.format("%Y-%m-%d %H:%M"),
                first.end.format("%Y-%m-%d %H:%M")
            ))
            .with_note(format!(
                "{} runs {} to {}",
                second.lot_id,
                second.start.format("%Y-%m-%d %H:%M"),
                second.end.format("%Y-%m-%d %H:%M")
            )),
        );
    }

    if settings.layout.range == RangePolicy::CalendarWeek && !schedule.is_empty() {
        if let Ok(layout) = TimelineLayout::build(&schedule.entries, &settings.layout) {
            for idx in layout.outside_axis() {
                let entry = &schedule.entries[idx];
                emitter.emit(
                    Diagnostic::new(
                        DiagnosticCode::H001OutsideWeek,
                        format!(
                            "lot {} on resource {} is not fully inside the week of {}",
                            entry.lot_id,
                            entry.resource,
                            layout.axis.start.format("%Y-%m-%d")
                        ),
                    )
                    .with_file(path)
                    .with_hint("the chart clips it at the week boundary"),
                );
            }
        }
    }

    emitter.emit(
        Diagnostic::new(
            DiagnosticCode::I001ScheduleSummary,
            format!(
                "{} entries on {} resources, {} rows dropped, {:.1} h scheduled",
                schedule.entries.len(),
                schedule.resources().len(),
                schedule.rejected.len(),
                schedule.total_hours()
            ),
        )
        .with_file(path),
    );

    Some(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use lotplan_core::{CollectingEmitter, Severity};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const PLAN: &str = "\
salle,lot,Produit,Date Start,Time Start,Run Time
101,L-001,Syrup,2025-03-24,08:00,100
101,L-002,Syrup,2025-03-24,10:00,100
102,L-003,Tablets,someday,06:30,100
102,L-004,Tablets,2025-03-25,06:30,n/a
103,L-005,Gel,2025-03-30,20:00,100
";

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn codes(emitter: &CollectingEmitter) -> Vec<&'static str> {
        emitter.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn reports_dropped_rows_and_overlaps() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "plan.csv", PLAN);
        let mut emitter = CollectingEmitter::new();

        let schedule = check_file(&path, &Settings::default(), &mut emitter).unwrap();

        assert_eq!(schedule.entries.len(), 3);
        assert_eq!(codes(&emitter), vec!["W001", "W002", "W003", "I001"]);
        assert!(!emitter.has_errors());

        let dropped = &emitter.diagnostics[0];
        assert_eq!(dropped.line, Some(4));
        assert_eq!(dropped.message, "row dropped: unparsable date/time \"someday 06:30\"");

        // L-001 runs 6 h from 08:00, L-002 starts at 10:00
        assert_eq!(
            emitter.diagnostics[2].message,
            "lots L-001 and L-002 overlap on resource 101 for 4.00 h"
        );
        assert_eq!(
            emitter.diagnostics[3].message,
            "3 entries on 2 resources, 2 rows dropped, 18.0 h scheduled"
        );
    }

    #[test]
    fn week_range_adds_outside_hints() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "plan.csv", PLAN);
        let mut settings = Settings::default();
        settings.apply(&Overrides {
            week: true,
            ..Overrides::default()
        });
        let mut emitter = CollectingEmitter::new();

        check_file(&path, &settings, &mut emitter).unwrap();

        // L-005 starts Sunday 20:00 and runs past midnight
        assert_eq!(emitter.count(DiagnosticCode::H001OutsideWeek), 1);
        let hint = emitter
            .diagnostics
            .iter()
            .find(|d| d.code == DiagnosticCode::H001OutsideWeek)
            .unwrap();
        assert_eq!(hint.severity, Severity::Hint);
        assert!(hint.message.starts_with("lot L-005 on resource 103"));
        assert!(hint.message.ends_with("week of 2025-03-24"));
    }

    #[test]
    fn missing_columns_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "plan.csv", "Room,Order\n101,L-1\n");
        let mut emitter = CollectingEmitter::new();

        assert!(check_file(&path, &Settings::default(), &mut emitter).is_none());
        assert_eq!(codes(&emitter), vec!["E001"]);
        let d = &emitter.diagnostics[0];
        assert_eq!(
            d.message,
            "Missing columns: salle, lot, Produit, Date Start, Time Start, Run Time"
        );
        assert_eq!(d.notes, vec!["headers found: Room, Order".to_string()]);
        assert_eq!(d.hints.len(), 1);
    }

    #[test]
    fn abort_policy_is_an_error_with_line() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "plan.csv", PLAN);
        let mut settings = Settings::default();
        settings.apply(&Overrides {
            abort_on_bad_duration: true,
            ..Overrides::default()
        });
        let mut emitter = CollectingEmitter::new();

        assert!(check_file(&path, &settings, &mut emitter).is_none());
        assert_eq!(codes(&emitter), vec!["E002"]);
        assert_eq!(emitter.diagnostics[0].line, Some(5));
    }

    #[test]
    fn unreadable_input() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "plan.txt", "whatever");
        let mut emitter = CollectingEmitter::new();

        assert!(check_file(&path, &Settings::default(), &mut emitter).is_none());
        assert_eq!(codes(&emitter), vec!["E003"]);
        assert!(emitter.diagnostics[0].message.contains("Unsupported file format: txt"));
    }
}
