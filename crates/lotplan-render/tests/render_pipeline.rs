//! Upload -> normalize -> render, the way the CLI drives it

use lotplan_core::{CellValue, Normalizer, Renderer, Schedule};
use lotplan_normalize::ScheduleNormalizer;
use lotplan_parser::{load_bytes, FileFormat};
use lotplan_render::{
    ExcelRenderer, HtmlDashboardRenderer, LayoutOptions, SvgRenderer, TableRenderer,
    TimelineLayout,
};
use pretty_assertions::assert_eq;

const PLAN: &str = "\
salle,lot,Produit,Date Start,Time Start,Run Time
101,L-001,Syrup,2025-03-26,10:00,100
101,L-002,Syrup,2025-03-26,11:00,50
102,L-003,Tablets,2025-03-27,06:00,200
103,L-004,Gel,2025-04-01,08:00,100
104,L-005,Gel,yesterday,08:00,100
";

fn schedule() -> Schedule {
    let table = load_bytes(PLAN.as_bytes(), FileFormat::Csv).unwrap();
    ScheduleNormalizer::new().normalize(&table).unwrap()
}

#[test]
fn calendar_week_layout_ignores_later_entries() {
    let schedule = schedule();
    let layout = TimelineLayout::build(
        &schedule.entries,
        &LayoutOptions::default().calendar_week(),
    )
    .unwrap();

    assert_eq!(layout.axis.start.to_string(), "2025-03-24 00:00:00");
    assert_eq!(layout.axis.end.to_string(), "2025-03-30 23:59:59");
    // L-004 falls in the following week
    assert_eq!(layout.outside_axis(), vec![3]);

    let resources: Vec<&str> = layout.tracks.iter().map(|t| t.resource.as_str()).collect();
    assert_eq!(resources, vec!["101", "102", "103"]);
}

#[test]
fn overlapping_lots_are_drawn_on_one_track() {
    let schedule = schedule();
    let layout = TimelineLayout::build(&schedule.entries, &LayoutOptions::default()).unwrap();

    // L-001 runs 6 h from 10:00, L-002 starts at 11:00
    let room = &layout.tracks[0];
    assert_eq!(room.bars.len(), 2);
    assert!(room.bars.iter().all(|b| b.conflict));
    assert!(!layout.tracks[1].bars[0].conflict);
}

#[test]
fn svg_and_dashboard_render() {
    let schedule = schedule();
    let svg = SvgRenderer::new()
        .title("Week 13")
        .layout(LayoutOptions::default().calendar_week())
        .render(&schedule)
        .unwrap();
    assert!(svg.contains("L-004"));
    assert!(svg.contains("Wed 12:00"));

    let html = HtmlDashboardRenderer::new().render(&schedule).unwrap();
    assert!(html.contains("Loaded 4 of 5 rows"));
    assert!(html.contains("Line 6: unparsable date/time"));
}

#[test]
fn text_preview_lists_every_entry() {
    let text = TableRenderer.render(&schedule()).unwrap();
    assert_eq!(text.lines().count(), 2 + 4);
    assert!(text.contains("L-003"));
    assert!(text.contains("12.00"));
}

#[test]
fn excel_export_reads_back() {
    let schedule = schedule();
    let bytes = ExcelRenderer::new().render(&schedule).unwrap();

    let table = load_bytes(&bytes, FileFormat::Spreadsheet).unwrap();
    assert_eq!(
        table.headers,
        vec!["Resource", "Lot", "Product", "Start", "End", "Duration (h)"]
    );
    assert_eq!(table.len(), 4);
    assert_eq!(table.rows[0].cell(1), &CellValue::text("L-001"));
    assert_eq!(table.rows[0].cell(3).to_text(), "2025-03-26 10:00:00");
    assert_eq!(table.rows[2].cell(5), &CellValue::Number(12.0));
}
