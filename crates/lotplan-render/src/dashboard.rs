//! Standalone HTML dashboard
//!
//! One self-contained page with:
//! - A summary banner with row counts
//! - The list of rows that were dropped
//! - The cleaned preview table
//! - The SVG timeline with zoom controls and hover tooltips

use crate::{SvgRenderer, TimelineLayout};
use lotplan_core::{RenderError, Renderer, Schedule};

/// HTML dashboard renderer configuration
#[derive(Clone, Debug, Default)]
pub struct HtmlDashboardRenderer {
    /// Chart settings; the page title is taken from here too
    pub chart: SvgRenderer,
    /// Cap on preview table rows (None shows all)
    pub preview_rows: Option<usize>,
}

impl HtmlDashboardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(mut self, chart: SvgRenderer) -> Self {
        self.chart = chart;
        self
    }

    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    fn render_banner(&self, schedule: &Schedule) -> String {
        let total = schedule.entries.len() + schedule.rejected.len();
        format!(
            r#"        <div class="banner ok">Loaded {entries} of {total} rows across {resources} resources ({hours:.1} h scheduled).</div>
"#,
            entries = schedule.entries.len(),
            total = total,
            resources = schedule.resources().len(),
            hours = schedule.total_hours(),
        )
    }

    fn render_rejected(&self, schedule: &Schedule) -> String {
        if schedule.rejected.is_empty() {
            return String::new();
        }
        let mut html = String::from(
            r#"        <div class="banner warn">
            <strong>Rows left out</strong>
            <ul>
"#,
        );
        for row in &schedule.rejected {
            html.push_str(&format!(
                "                <li>Line {}: {}</li>\n",
                row.line,
                html_escape(&row.reason.to_string())
            ));
        }
        html.push_str("            </ul>\n        </div>\n");
        html
    }

    fn render_table(&self, schedule: &Schedule) -> String {
        let limit = self.preview_rows.unwrap_or(usize::MAX);
        let mut html = String::from(
            r#"        <table class="preview">
            <thead><tr><th>Resource</th><th>Lot</th><th>Product</th><th>Start</th><th>End</th><th>Hours</th></tr></thead>
            <tbody>
"#,
        );
        for entry in schedule.entries.iter().take(limit) {
            html.push_str(&format!(
                "                <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{:.2}</td></tr>\n",
                html_escape(&entry.resource),
                html_escape(&entry.lot_id),
                html_escape(&entry.product),
                entry.start.format("%Y-%m-%d %H:%M"),
                entry.end.format("%Y-%m-%d %H:%M"),
                entry.duration_hours
            ));
        }
        html.push_str("            </tbody>\n        </table>\n");
        if schedule.entries.len() > limit {
            html.push_str(&format!(
                "        <p class=\"more\">{} more rows not shown</p>\n",
                schedule.entries.len() - limit
            ));
        }
        html
    }

    fn generate_css(&self) -> String {
        format!(
            r#"        :root {{
            --text-color: {text};
            --bg-color: {bg};
            --conflict-color: {conflict};
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: {font};
            background: var(--bg-color);
            color: var(--text-color);
            padding: 20px;
        }}
        h1 {{ font-size: 1.5rem; font-weight: 600; margin-bottom: 12px; }}
        h2 {{ font-size: 1.1rem; margin: 20px 0 8px; }}
        .banner {{ padding: 10px 14px; border-radius: 6px; margin-bottom: 10px; }}
        .banner.ok {{ background: #e6f4ea; color: #1e4620; }}
        .banner.warn {{ background: #fff4e5; color: #663c00; }}
        .banner ul {{ margin: 6px 0 0 20px; }}
        table.preview {{ border-collapse: collapse; font-size: 13px; }}
        table.preview th, table.preview td {{ border: 1px solid rgba(128,128,128,0.3); padding: 4px 8px; text-align: left; }}
        table.preview td.num {{ text-align: right; }}
        .table-wrapper {{ max-height: 360px; overflow-y: auto; }}
        .chart-controls button {{
            padding: 6px 14px;
            margin-right: 6px;
            border: 1px solid var(--text-color);
            background: transparent;
            color: var(--text-color);
            cursor: pointer;
            border-radius: 4px;
        }}
        .chart-wrapper {{
            overflow: auto;
            border: 1px solid rgba(128,128,128,0.3);
            border-radius: 8px;
            margin-top: 8px;
        }}
        .bar:hover rect {{ fill-opacity: 1; }}
"#,
            text = self.chart.text_color,
            bg = self.chart.background_color,
            conflict = self.chart.conflict_color,
            font = self.chart.font_family,
        )
    }

    fn generate_js(&self) -> &'static str {
        r#"        let currentZoom = 1;
        const chart = document.querySelector('#chart svg');

        function zoomIn() {
            currentZoom = Math.min(currentZoom * 1.25, 4);
            applyZoom();
        }

        function zoomOut() {
            currentZoom = Math.max(currentZoom / 1.25, 0.5);
            applyZoom();
        }

        function resetZoom() {
            currentZoom = 1;
            applyZoom();
        }

        function applyZoom() {
            chart.style.transform = `scale(${currentZoom})`;
            chart.style.transformOrigin = 'top left';
        }"#
    }
}

impl Renderer for HtmlDashboardRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule) -> Result<String, RenderError> {
        let layout = TimelineLayout::build(&schedule.entries, &self.chart.layout)?;
        let svg = self.chart.document(&layout).to_string();

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}    </style>
</head>
<body>
    <h1>{title}</h1>
{banner}{rejected}    <h2>Cleaned data</h2>
    <div class="table-wrapper">
{table}    </div>
    <h2>Timeline</h2>
    <div class="chart-controls">
        <button onclick="zoomIn()" title="Zoom In">+</button>
        <button onclick="zoomOut()" title="Zoom Out">&minus;</button>
        <button onclick="resetZoom()" title="Reset">Reset</button>
    </div>
    <div class="chart-wrapper" id="chart">
{svg}
    </div>
    <script>
{js}
    </script>
</body>
</html>
"#,
            title = html_escape(&self.chart.title),
            css = self.generate_css(),
            banner = self.render_banner(schedule),
            rejected = self.render_rejected(schedule),
            table = self.render_table(schedule),
            svg = svg,
            js = self.generate_js(),
        ))
    }
}

/// HTML-escape a string
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
