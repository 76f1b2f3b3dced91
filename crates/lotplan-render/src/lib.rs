//! # lotplan-render
//!
//! Rendering backends for lotplan schedules.
//!
//! This crate provides:
//! - Timeline layout (axis range, ticks, resource tracks, product colours)
//! - SVG timeline chart rendering
//! - Standalone HTML dashboard (preview table + interactive chart)
//! - Plain-text preview table
//! - Excel export of the cleaned table
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use lotplan_core::{Renderer, Schedule, ScheduleEntry};
//! use lotplan_render::{SvgRenderer, TableRenderer};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 3, 24)
//!     .unwrap()
//!     .and_hms_opt(8, 0, 0)
//!     .unwrap();
//! let schedule = Schedule::new(vec![
//!     ScheduleEntry::new("101", "L-42", "Syrup", start, 1.5).unwrap(),
//! ]);
//!
//! let svg = SvgRenderer::new().title("Week 13").render(&schedule).unwrap();
//! assert!(svg.contains("L-42"));
//!
//! let table = TableRenderer.render(&schedule).unwrap();
//! assert!(table.contains("1.50"));
//! ```

pub mod dashboard;
pub mod excel;
pub mod layout;
pub mod table;

pub use dashboard::HtmlDashboardRenderer;
pub use excel::ExcelRenderer;
pub use layout::{
    week_bounds, Bar, LayoutOptions, LegendItem, RangePolicy, Tick, TimeAxis, TimelineLayout,
    Track, DEFAULT_PALETTE,
};
pub use table::TableRenderer;

use lotplan_core::{RenderError, Renderer, Schedule};
use svg::node::element::{ClipPath, Definitions, Element, Group, Line, Rectangle, Text};
use svg::{Document, Node};

const PLOT_CLIP_ID: &str = "plot-area";

/// SVG timeline renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Width of the plot area (excluding labels) in pixels
    pub chart_width: u32,
    /// Height per resource track in pixels
    pub row_height: u32,
    /// Width of the resource label column in pixels
    pub label_width: u32,
    /// Header height in pixels
    pub header_height: u32,
    /// Padding around the chart
    pub padding: u32,
    /// Outline for bars that overlap another bar on the same track
    pub conflict_color: String,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Chart heading
    pub title: String,
    pub layout: LayoutOptions,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            chart_width: 960,
            row_height: 36,
            label_width: 120,
            header_height: 56,
            padding: 20,
            conflict_color: "#d62728".into(),
            background_color: "#ffffff".into(),
            grid_color: "#e5e5e5".into(),
            text_color: "#2c3e50".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
            title: "Production plan".into(),
            layout: LayoutOptions::default(),
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure plot width
    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width;
        self
    }

    /// Configure track height
    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Calculate the total width of the SVG
    pub fn total_width(&self) -> u32 {
        self.padding * 2 + self.label_width + self.chart_width
    }

    /// Calculate the total height for a number of tracks, legend included
    pub fn total_height(&self, track_count: usize) -> u32 {
        self.padding * 2 + self.header_height + (track_count as u32 * self.row_height) + 40
    }

    fn plot_left(&self) -> f64 {
        f64::from(self.padding + self.label_width)
    }

    fn plot_top(&self) -> u32 {
        self.padding + self.header_height
    }

    /// Convert a timestamp to an x position (unclamped)
    fn time_to_x(&self, axis: &TimeAxis, at: chrono::NaiveDateTime) -> f64 {
        self.plot_left() + axis.fraction(at) * f64::from(self.chart_width)
    }

    /// Create the header with tick labels and the date range
    fn render_header(&self, axis: &TimeAxis) -> Group {
        let mut group = Group::new().set("class", "header");

        let range_label = format!(
            "{} \u{2192} {}",
            axis.start.format("%Y-%m-%d %H:%M"),
            axis.end.format("%Y-%m-%d %H:%M")
        );
        group = group.add(
            Text::new(range_label)
                .set("x", self.plot_left())
                .set("y", self.padding + 36)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 1)
                .set("fill", self.text_color.as_str()),
        );

        let baseline = self.plot_top();
        for tick in &axis.ticks {
            let x = self.time_to_x(axis, tick.at);
            group = group.add(
                Line::new()
                    .set("x1", x)
                    .set("y1", baseline - 6)
                    .set("x2", x)
                    .set("y2", baseline)
                    .set("stroke", self.text_color.as_str())
                    .set("stroke-width", 1),
            );
            group = group.add(
                Text::new(tick.label.as_str())
                    .set("x", x)
                    .set("y", baseline - 9)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", self.font_size - 2)
                    .set("fill", self.text_color.as_str())
                    .set("text-anchor", "middle"),
            );
        }

        group
    }

    /// Track separators and tick grid lines
    fn render_grid(&self, axis: &TimeAxis, track_count: usize) -> Group {
        let mut group = Group::new().set("class", "grid");

        let top = self.plot_top();
        let bottom = top + track_count as u32 * self.row_height;
        for i in 0..=track_count {
            let y = top + i as u32 * self.row_height;
            group = group.add(
                Line::new()
                    .set("x1", self.padding)
                    .set("y1", y)
                    .set("x2", self.total_width() - self.padding)
                    .set("y2", y)
                    .set("stroke", self.grid_color.as_str())
                    .set("stroke-width", 1),
            );
        }

        for tick in &axis.ticks {
            let x = self.time_to_x(axis, tick.at);
            group = group.add(
                Line::new()
                    .set("x1", x)
                    .set("y1", top)
                    .set("x2", x)
                    .set("y2", bottom)
                    .set("stroke", self.grid_color.as_str())
                    .set("stroke-width", 1),
            );
        }

        group
    }

    /// Resource label plus all bars on one track
    fn render_track(&self, axis: &TimeAxis, track: &Track, row: usize) -> Group {
        let mut group = Group::new()
            .set("class", "track")
            .set("data-resource", track.resource.as_str());

        let y = self.plot_top() + row as u32 * self.row_height;
        let bar_height = (f64::from(self.row_height) * 0.6).round();
        let bar_y = f64::from(y) + (f64::from(self.row_height) - bar_height) / 2.0;

        group = group.add(
            Text::new(truncate(&track.resource, 16))
                .set("x", self.padding + 4)
                .set("y", y + self.row_height / 2 + 4)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size)
                .set("font-weight", "bold")
                .set("fill", self.text_color.as_str()),
        );

        let mut bars = Group::new().set("clip-path", format!("url(#{PLOT_CLIP_ID})"));
        for bar in &track.bars {
            bars = bars.add(self.render_bar(axis, bar, bar_y, bar_height));
        }
        group.add(bars)
    }

    fn render_bar(&self, axis: &TimeAxis, bar: &Bar, y: f64, height: f64) -> Group {
        let mut group = Group::new()
            .set("class", if bar.conflict { "bar conflict" } else { "bar" })
            .set("data-entry", bar.entry.to_string());

        let x_start = self.time_to_x(axis, bar.start);
        let x_end = self.time_to_x(axis, bar.end);
        // Zero-length runs stay visible
        let width = (x_end - x_start).max(2.0);

        let mut rect = Rectangle::new()
            .set("x", x_start)
            .set("y", y)
            .set("width", width)
            .set("height", height)
            .set("rx", 3)
            .set("ry", 3)
            .set("fill", bar.color.as_str())
            .set("fill-opacity", 0.85);
        if bar.conflict {
            rect = rect
                .set("stroke", self.conflict_color.as_str())
                .set("stroke-width", 2);
        }

        let mut tooltip = Element::new("title");
        tooltip.append(svg::node::Text::new(format!(
            "{} ({})\n{} \u{2192} {}\n{:.2} h",
            bar.label,
            bar.product,
            bar.start.format("%Y-%m-%d %H:%M"),
            bar.end.format("%Y-%m-%d %H:%M"),
            bar.duration_hours
        )));
        rect.append(tooltip);
        group = group.add(rect);

        group.add(
            Text::new(bar.label.as_str())
                .set("x", x_start + 3.0)
                .set("y", y + height / 2.0 + 4.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 2)
                .set("fill", "#ffffff"),
        )
    }

    /// Product colour legend
    fn render_legend(&self, legend: &[LegendItem], y_offset: u32) -> Group {
        let mut group = Group::new().set("class", "legend");
        let box_size = 12.0;
        let y = f64::from(y_offset) + 15.0;
        let mut x = f64::from(self.padding);

        for item in legend {
            group = group.add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", y - box_size + 2.0)
                    .set("width", box_size)
                    .set("height", box_size)
                    .set("rx", 2)
                    .set("fill", item.color.as_str()),
            );
            let label = truncate(&item.product, 24);
            let advance = box_size + 10.0 + label.chars().count() as f64 * 7.0;
            group = group.add(
                Text::new(label)
                    .set("x", x + box_size + 5.0)
                    .set("y", y)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", self.font_size - 1)
                    .set("fill", self.text_color.as_str()),
            );
            x += advance;
        }

        group
    }

    /// Build the document for an already computed layout
    pub fn document(&self, layout: &TimelineLayout) -> Document {
        let track_count = layout.tracks.len();
        let width = self.total_width();
        let height = self.total_height(track_count);

        let clip = ClipPath::new().set("id", PLOT_CLIP_ID).add(
            Rectangle::new()
                .set("x", self.plot_left())
                .set("y", self.plot_top())
                .set("width", self.chart_width)
                .set("height", track_count as u32 * self.row_height),
        );

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg")
            .add(Definitions::new().add(clip))
            .add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", self.background_color.as_str()),
            )
            .add(
                Text::new(self.title.as_str())
                    .set("x", self.padding)
                    .set("y", self.padding + 15)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", self.font_size + 4)
                    .set("font-weight", "bold")
                    .set("fill", self.text_color.as_str()),
            );

        document = document.add(self.render_grid(&layout.axis, track_count));
        document = document.add(self.render_header(&layout.axis));
        for (row, track) in layout.tracks.iter().enumerate() {
            document = document.add(self.render_track(&layout.axis, track, row));
        }

        let legend_y = self.plot_top() + track_count as u32 * self.row_height + 10;
        document.add(self.render_legend(&layout.legend, legend_y))
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule) -> Result<String, RenderError> {
        let layout = TimelineLayout::build(&schedule.entries, &self.layout)?;
        let document = self.document(&layout);

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}

/// Truncate a string to a maximum number of characters with ellipsis
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}\u{2026}", s.chars().take(max.saturating_sub(1)).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use lotplan_core::ScheduleEntry;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn test_schedule() -> Schedule {
        Schedule::new(vec![
            ScheduleEntry::new("101", "L-001", "Syrup", at(24, 8), 1.5).unwrap(),
            ScheduleEntry::new("101", "L-002", "Syrup", at(24, 9), 1.0).unwrap(),
            ScheduleEntry::new("102", "L-003", "Tablets", at(25, 6), 25.0).unwrap(),
        ])
    }

    #[test]
    fn svg_renderer_creation() {
        let renderer = SvgRenderer::new();
        assert_eq!(renderer.chart_width, 960);
        assert_eq!(renderer.row_height, 36);
    }

    #[test]
    fn svg_renderer_with_config() {
        let renderer = SvgRenderer::new().chart_width(1200).row_height(40).title("Plan");
        assert_eq!(renderer.chart_width, 1200);
        assert_eq!(renderer.row_height, 40);
        assert_eq!(renderer.title, "Plan");
    }

    #[test]
    fn svg_render_produces_valid_svg() {
        let svg = SvgRenderer::new().title("Week 13").render(&test_schedule()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("Week 13"));
        assert!(svg.contains("L-003"));
        assert!(svg.contains(r#"data-resource="102""#));
    }

    #[test]
    fn svg_render_colours_bars_by_product() {
        let svg = SvgRenderer::new().render(&test_schedule()).unwrap();
        assert!(svg.contains("#1f77b4"));
        assert!(svg.contains("#ff7f0e"));
        assert!(svg.contains("Tablets"));
    }

    #[test]
    fn svg_render_outlines_conflicts() {
        let renderer = SvgRenderer::new();
        let svg = renderer.render(&test_schedule()).unwrap();
        assert_eq!(svg.matches("bar conflict").count(), 2);
        assert!(svg.contains(&renderer.conflict_color));
    }

    #[test]
    fn svg_render_clips_bars_to_plot_area() {
        let svg = SvgRenderer::new()
            .layout(LayoutOptions::default().calendar_week())
            .render(&test_schedule())
            .unwrap();
        assert!(svg.contains("<clipPath"));
        assert!(svg.contains("url(#plot-area)"));
        assert!(svg.contains("Mon 00:00"));
    }

    #[test]
    fn svg_render_has_tooltips() {
        let svg = SvgRenderer::new().render(&test_schedule()).unwrap();
        assert!(svg.contains("<title>"));
        assert!(svg.contains("25.00 h"));
    }

    #[test]
    fn svg_render_empty_schedule_fails() {
        let result = SvgRenderer::new().render(&Schedule::default());
        assert!(matches!(result, Err(RenderError::InvalidData(_))));
    }

    #[test]
    fn truncate_long_string() {
        assert_eq!(truncate("Short", 20), "Short");
        assert_eq!(truncate("Salle de conditionnement", 10), "Salle de \u{2026}");
    }
}
