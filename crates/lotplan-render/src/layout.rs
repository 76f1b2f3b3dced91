//! Timeline layout
//!
//! Turns schedule entries into renderer-neutral geometry: the visible time
//! axis with its ticks, one track per resource and a product colour legend.
//! All renderers draw from a [`TimelineLayout`].

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use lotplan_core::{RenderError, ScheduleEntry};
use lotplan_normalize::find_overlaps;
use serde::{Deserialize, Serialize};

/// Categorical palette used for product colours
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Which window the time axis shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Earliest start to latest end
    #[default]
    Auto,
    /// Monday to Sunday of the week holding the earliest start
    CalendarWeek,
}

/// Layout configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub range: RangePolicy,
    /// Hours between ticks, clamped to 1..=24
    pub tick_hours: u32,
    /// strftime pattern for tick labels
    pub tick_format: String,
    pub color_by_product: bool,
    pub palette: Vec<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            range: RangePolicy::Auto,
            tick_hours: 6,
            tick_format: "%a %H:%M".into(),
            color_by_product: true,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LayoutOptions {
    pub fn calendar_week(mut self) -> Self {
        self.range = RangePolicy::CalendarWeek;
        self
    }

    pub fn tick_hours(mut self, hours: u32) -> Self {
        self.tick_hours = hours;
        self
    }

    /// Colour of the `index`-th distinct product, wrapping around the palette
    pub fn color_for(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
        } else {
            &self.palette[index % self.palette.len()]
        }
    }
}

/// Monday 00:00:00 and Sunday 23:59:59 of the week containing `at`
pub fn week_bounds(at: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let monday = at.date() - Duration::days(i64::from(at.weekday().num_days_from_monday()));
    let start = monday.and_time(NaiveTime::MIN);
    let end = start + Duration::days(7) - Duration::seconds(1);
    (start, end)
}

/// A labelled axis tick
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tick {
    pub at: NaiveDateTime,
    pub label: String,
}

/// The visible time window
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeAxis {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub ticks: Vec<Tick>,
}

impl TimeAxis {
    pub fn span_hours(&self) -> f64 {
        lotplan_core::hours_between(self.start, self.end)
    }

    /// Position of `at` along the axis, 0.0 at start and 1.0 at end.
    ///
    /// Not clamped: instants outside the window map below 0 or above 1.
    pub fn fraction(&self, at: NaiveDateTime) -> f64 {
        let span = self.span_hours();
        if span <= 0.0 {
            return 0.0;
        }
        lotplan_core::hours_between(self.start, at) / span
    }

    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start >= self.start && end <= self.end
    }
}

/// One entry drawn on a track
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    /// Index into the schedule entries
    pub entry: usize,
    pub label: String,
    pub product: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_hours: f64,
    pub color: String,
    /// Overlaps another bar on the same track
    pub conflict: bool,
}

/// One horizontal row of the chart
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Track {
    pub resource: String,
    pub bars: Vec<Bar>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegendItem {
    pub product: String,
    pub color: String,
}

/// Renderer-neutral chart geometry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineLayout {
    pub axis: TimeAxis,
    pub tracks: Vec<Track>,
    pub legend: Vec<LegendItem>,
}

impl TimelineLayout {
    pub fn build(entries: &[ScheduleEntry], options: &LayoutOptions) -> Result<Self, RenderError> {
        let (Some(first), Some(last)) = (
            entries.iter().map(|e| e.start).min(),
            entries.iter().map(|e| e.end).max(),
        ) else {
            return Err(RenderError::InvalidData("No entries to lay out".into()));
        };

        let (start, end) = match options.range {
            RangePolicy::Auto if last > first => (first, last),
            // Zero-length schedule still needs a visible window
            RangePolicy::Auto => (first, first + Duration::hours(1)),
            RangePolicy::CalendarWeek => week_bounds(first),
        };
        let ticks = ticks_between(start, end, options.tick_hours, &options.tick_format);
        let axis = TimeAxis { start, end, ticks };

        let mut legend: Vec<LegendItem> = Vec::new();
        if options.color_by_product {
            for entry in entries {
                if !legend.iter().any(|item| item.product == entry.product) {
                    legend.push(LegendItem {
                        product: entry.product.clone(),
                        color: options.color_for(legend.len()).to_string(),
                    });
                }
            }
        }

        let mut conflicted = vec![false; entries.len()];
        for overlap in find_overlaps(entries) {
            conflicted[overlap.first] = true;
            conflicted[overlap.second] = true;
        }

        let mut tracks: Vec<Track> = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            let color = legend
                .iter()
                .find(|item| item.product == entry.product)
                .map(|item| item.color.clone())
                .unwrap_or_else(|| options.color_for(0).to_string());
            let bar = Bar {
                entry: idx,
                label: entry.lot_id.clone(),
                product: entry.product.clone(),
                start: entry.start,
                end: entry.end,
                duration_hours: entry.duration_hours,
                color,
                conflict: conflicted[idx],
            };
            match tracks.iter_mut().find(|t| t.resource == entry.resource) {
                Some(track) => track.bars.push(bar),
                None => tracks.push(Track {
                    resource: entry.resource.clone(),
                    bars: vec![bar],
                }),
            }
        }

        tracing::debug!(
            tracks = tracks.len(),
            products = legend.len(),
            ticks = axis.ticks.len(),
            "built timeline layout"
        );
        Ok(Self {
            axis,
            tracks,
            legend,
        })
    }

    /// Entry indices of bars that do not fit inside the axis window
    pub fn outside_axis(&self) -> Vec<usize> {
        let mut outside: Vec<usize> = self
            .tracks
            .iter()
            .flat_map(|t| &t.bars)
            .filter(|b| !self.axis.contains(b.start, b.end))
            .map(|b| b.entry)
            .collect();
        outside.sort_unstable();
        outside
    }

    pub fn bar_count(&self) -> usize {
        self.tracks.iter().map(|t| t.bars.len()).sum()
    }
}

/// Upper bound on ticks per axis; longer axes fall back to day ticks
const MAX_TICKS: i64 = 500;

/// Ticks on whole hours divisible by `every`, from `start` to `end` inclusive
fn ticks_between(start: NaiveDateTime, end: NaiveDateTime, every: u32, format: &str) -> Vec<Tick> {
    let every = every.clamp(1, 24);
    if (end - start).num_hours() / i64::from(every) > MAX_TICKS {
        return day_ticks(start, end, format);
    }

    let mut next = start.date().and_hms_opt(start.hour(), 0, 0).unwrap_or(start);
    if next < start {
        next = match next.checked_add_signed(Duration::hours(1)) {
            Some(at) => at,
            None => return Vec::new(),
        };
    }
    while next.hour() % every != 0 {
        next = match next.checked_add_signed(Duration::hours(1)) {
            Some(at) => at,
            None => return Vec::new(),
        };
    }

    let mut ticks = Vec::new();
    let mut cursor = Some(next);
    while let Some(at) = cursor.filter(|at| *at <= end) {
        ticks.push(Tick {
            at,
            label: at.format(format).to_string(),
        });
        // Each day restarts at 00:00 when `every` does not divide 24
        cursor = at
            .checked_add_signed(Duration::hours(i64::from(every)))
            .map(|step| {
                if step.date() == at.date() {
                    step
                } else {
                    step.date().and_time(NaiveTime::MIN)
                }
            });
    }
    ticks
}

/// Midnight ticks spaced so that at most `MAX_TICKS` fit between `start` and `end`
fn day_ticks(start: NaiveDateTime, end: NaiveDateTime, format: &str) -> Vec<Tick> {
    let stride = Duration::days((end - start).num_days() / MAX_TICKS + 1);
    let midnight = start.date().and_time(NaiveTime::MIN);
    let first = if midnight < start {
        midnight.checked_add_signed(Duration::days(1))
    } else {
        Some(midnight)
    };

    let mut ticks = Vec::new();
    let mut cursor = first;
    while let Some(at) = cursor.filter(|at| *at <= end) {
        ticks.push(Tick {
            at,
            label: at.format(format).to_string(),
        });
        cursor = at.checked_add_signed(stride);
    }
    ticks
}
