//! Plain-text preview of the cleaned table

use lotplan_core::{RenderError, Renderer, Schedule, ScheduleEntry};

const HEADERS: [&str; 6] = ["Resource", "Lot", "Product", "Start", "End", "Hours"];
const TIMESTAMP: &str = "%Y-%m-%d %H:%M";

/// Renders the schedule as an aligned text table for the console
#[derive(Clone, Copy, Debug, Default)]
pub struct TableRenderer;

fn cells(entry: &ScheduleEntry) -> [String; 6] {
    [
        entry.resource.clone(),
        entry.lot_id.clone(),
        entry.product.clone(),
        entry.start.format(TIMESTAMP).to_string(),
        entry.end.format(TIMESTAMP).to_string(),
        format!("{:.2}", entry.duration_hours),
    ]
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(value.chars().count()));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

impl Renderer for TableRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule) -> Result<String, RenderError> {
        let rows: Vec<[String; 6]> = schedule.entries.iter().map(cells).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |values: &[String]| -> String {
            values
                .iter()
                .enumerate()
                .map(|(col, value)| pad(value, widths[col], col == 5))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&line(&HEADERS.map(String::from)));
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.push('\n');
        for row in &rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        Ok(out)
    }
}
