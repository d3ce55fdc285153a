//! Statistics dashboard aggregation.
//!
//! Turns the yearly accident series and the per-airport distribution into a
//! [`DashboardView`]: the full trend series, a summary strip of the most
//! recent years, and ring-chart slices with their label placement.
//!
//! Supplied ratios (`rate`, `percentage`) are displayed as given and never
//! recomputed from the raw counts.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of years shown in the summary strip.
pub const TRAILING_YEARS: usize = 3;

/// Decimal places of the rate in the summary strip.
pub const RATE_PRECISION: usize = 3;

/// Distance between the ring's outer edge and a slice label.
pub const LABEL_OFFSET: f64 = 22.0;

/// Extra digits inspected when deciding whether a value sits exactly halfway
/// between two fixed-point renderings.
const TIE_DIGITS: usize = 40;

/// Slice colors, assigned by input position modulo the palette length.
pub const PALETTE: [&str; 6] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#6366f1",
];

/// Accidents of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStat {
    /// Year, as displayed.
    pub year: String,
    /// Number of flights that year.
    pub flights: u64,
    /// Number of accidents that year.
    pub accidents: u32,
    /// Accidents normalized against traffic, precomputed upstream.
    pub rate: f64,
}

/// Accidents at one airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportStat {
    /// Airport name.
    pub name: String,
    /// Number of accidents.
    pub count: u32,
    /// Share of all accidents, rounded upstream.
    pub percentage: f64,
}

/// Horizontal alignment of a label relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    /// Text starts at the anchor (label right of the ring).
    Start,
    /// Text ends at the anchor (label left of the ring).
    End,
}

/// Geometry of the ring chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartGeometry {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Inner radius of the ring.
    pub inner_radius: f64,
    /// Outer radius of the ring.
    pub outer_radius: f64,
    /// Gap between consecutive non-empty slices, in degrees.
    pub padding_angle: f64,
    /// Distance of labels beyond the outer radius.
    pub label_offset: f64,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            cx: 100.0,
            cy: 100.0,
            inner_radius: 55.0,
            outer_radius: 70.0,
            padding_angle: 5.0,
            label_offset: LABEL_OFFSET,
        }
    }
}

/// Angular extent of one slice, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliceAngles {
    /// Start angle.
    pub start: f64,
    /// End angle.
    pub end: f64,
    /// Angle halfway between start and end.
    pub mid: f64,
}

/// Position and content of a slice label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelPlacement {
    /// Anchor x.
    pub x: f64,
    /// Anchor y.
    pub y: f64,
    /// Alignment relative to the anchor.
    pub anchor: TextAnchor,
    /// Category name, first line.
    pub name: String,
    /// Count and percentage callout, second line.
    pub callout: String,
}

/// One slice of the airport ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    /// Airport name.
    pub name: String,
    /// Accident count.
    pub count: u32,
    /// Supplied percentage.
    pub percentage: f64,
    /// Fill color.
    pub color: &'static str,
    /// Angular extent.
    pub angles: SliceAngles,
    /// Label.
    pub label: LabelPlacement,
}

/// One tile of the recent-years strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTile {
    /// `<year>년`.
    pub year_label: String,
    /// `<accidents>건`.
    pub accidents_label: String,
    /// Rate with fixed decimals.
    pub rate_label: String,
}

/// Everything the statistics dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Full yearly series, in input order.
    pub trend: Vec<YearStat>,
    /// Title of the summary strip.
    pub recent_title: String,
    /// Most recent years, in input order.
    pub recent: Vec<SummaryTile>,
    /// Airport ring slices, in input order.
    pub distribution: Vec<PieSlice>,
    /// Sum of all airport counts.
    pub total_count: u64,
    /// Ring chart geometry used for the slices.
    pub geometry: ChartGeometry,
    /// Decimal places used for rates.
    pub rate_precision: usize,
}

impl DashboardView {
    /// Text at the center of the ring.
    #[must_use]
    pub fn total_label(&self) -> String {
        format!("{}건", self.total_count)
    }

    /// A rate formatted the way the summary strip shows it.
    #[must_use]
    pub fn rate_text(&self, rate: f64) -> String {
        format_fixed(rate, self.rate_precision)
    }
}

/// Options for building a dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    /// Ring geometry.
    pub geometry: ChartGeometry,
    /// Size of the recent-years strip.
    pub trailing_years: usize,
    /// Decimal places of the rate.
    pub rate_precision: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            geometry: ChartGeometry::default(),
            trailing_years: TRAILING_YEARS,
            rate_precision: RATE_PRECISION,
        }
    }
}

/// The last `n` items of a series, in their original order.
///
/// Shorter series are returned whole.
#[must_use]
pub fn trailing_window<T>(series: &[T], n: usize) -> &[T] {
    &series[series.len().saturating_sub(n)..]
}

/// Format `value` with exactly `precision` decimals.
///
/// Values exactly halfway between two renderings round away from zero
/// (`0.5625` → `0.563`); everything else rounds to nearest.
#[must_use]
pub fn format_fixed(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{value:.precision$}");
    }
    let exact = format!("{:.*}", precision + TIE_DIGITS, value);
    let (head, tail) = exact.split_at(exact.len() - TIE_DIGITS);
    let is_tie = tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0');
    if is_tie {
        round_up_digits(head.trim_end_matches('.'))
    } else {
        format!("{value:.precision$}")
    }
}

/// Add one unit in the last place to a decimal string, away from zero.
fn round_up_digits(truncated: &str) -> String {
    let mut chars: Vec<char> = truncated.chars().collect();
    let bump = chars.iter().rposition(|c| c.is_ascii_digit() && *c != '9');
    let from = bump.map_or(0, |i| i + 1);
    for c in &mut chars[from..] {
        if *c == '9' {
            *c = '0';
        }
    }
    match bump {
        Some(i) => {
            chars[i] = chars[i]
                .to_digit(10)
                .and_then(|d| char::from_digit(d + 1, 10))
                .unwrap_or('0');
        }
        None => {
            let sign = usize::from(chars.first() == Some(&'-'));
            chars.insert(sign, '1');
        }
    }
    chars.into_iter().collect()
}

/// Label anchor for a slice whose mid-angle is `mid_angle` degrees.
#[must_use]
pub fn label_anchor(cx: f64, cy: f64, outer_radius: f64, mid_angle: f64) -> (f64, f64) {
    label_anchor_with_offset(cx, cy, outer_radius, LABEL_OFFSET, mid_angle)
}

/// Label anchor with an explicit offset beyond the outer radius.
#[must_use]
pub fn label_anchor_with_offset(
    cx: f64,
    cy: f64,
    outer_radius: f64,
    offset: f64,
    mid_angle: f64,
) -> (f64, f64) {
    let radius = outer_radius + offset;
    let radians = -mid_angle * PI / 180.0;
    (cx + radius * radians.cos(), cy + radius * radians.sin())
}

/// Alignment of a label anchored at `x` on a chart centered at `cx`.
#[must_use]
pub fn text_anchor(x: f64, cx: f64) -> TextAnchor {
    if x > cx {
        TextAnchor::Start
    } else {
        TextAnchor::End
    }
}

/// The `"<count>건(<percentage>%)"` callout.
#[must_use]
pub fn callout_text(count: u32, percentage: f64) -> String {
    format!("{count}건({percentage}%)")
}

/// Color of the slice at `index`.
#[must_use]
pub fn slice_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Place the label of one slice.
#[must_use]
pub fn place_label(
    geometry: &ChartGeometry,
    mid_angle: f64,
    name: &str,
    count: u32,
    percentage: f64,
) -> LabelPlacement {
    let (x, y) = label_anchor_with_offset(
        geometry.cx,
        geometry.cy,
        geometry.outer_radius,
        geometry.label_offset,
        mid_angle,
    );
    LabelPlacement {
        x,
        y,
        anchor: text_anchor(x, geometry.cx),
        name: name.to_string(),
        callout: callout_text(count, percentage),
    }
}

/// Angular layout of ring slices over a full circle.
///
/// Slices run counter-clockwise from 0°, sized by value, with
/// `padding_angle` between consecutive non-empty slices. Empty slices take no
/// room and get no padding.
#[must_use]
pub fn slice_angles(values: &[u32], padding_angle: f64) -> Vec<SliceAngles> {
    let total: f64 = values.iter().map(|v| f64::from(*v)).sum();
    let non_empty = values.iter().filter(|v| **v > 0).count();
    #[allow(clippy::cast_precision_loss)]
    let real_total = 360.0 - non_empty as f64 * padding_angle;

    let mut layout: Vec<SliceAngles> = Vec::with_capacity(values.len());
    for value in values {
        let value = f64::from(*value);
        let start = match layout.last() {
            None => 0.0,
            Some(prev) if value > 0.0 => prev.end + padding_angle,
            Some(prev) => prev.end,
        };
        let share = if total > 0.0 { value / total } else { 0.0 };
        let end = start + share * real_total;
        layout.push(SliceAngles {
            start,
            end,
            mid: (start + end) / 2.0,
        });
    }
    layout
}

/// Build the dashboard with default options.
#[must_use]
pub fn build_dashboard(yearly: &[YearStat], airports: &[AirportStat]) -> DashboardView {
    build_dashboard_with(yearly, airports, &DashboardOptions::default())
}

/// Build the dashboard with explicit options.
#[must_use]
pub fn build_dashboard_with(
    yearly: &[YearStat],
    airports: &[AirportStat],
    options: &DashboardOptions,
) -> DashboardView {
    let recent = trailing_window(yearly, options.trailing_years)
        .iter()
        .map(|stat| SummaryTile {
            year_label: format!("{}년", stat.year),
            accidents_label: format!("{}건", stat.accidents),
            rate_label: format_fixed(stat.rate, options.rate_precision),
        })
        .collect();

    let counts: Vec<u32> = airports.iter().map(|a| a.count).collect();
    let distribution: Vec<PieSlice> = airports
        .iter()
        .zip(slice_angles(&counts, options.geometry.padding_angle))
        .enumerate()
        .map(|(index, (airport, angles))| PieSlice {
            name: airport.name.clone(),
            count: airport.count,
            percentage: airport.percentage,
            color: slice_color(index),
            angles,
            label: place_label(
                &options.geometry,
                angles.mid,
                &airport.name,
                airport.count,
                airport.percentage,
            ),
        })
        .collect();

    let total_count = airports.iter().map(|a| u64::from(a.count)).sum();
    debug!(
        years = yearly.len(),
        airports = airports.len(),
        total_count,
        "Built dashboard"
    );

    DashboardView {
        trend: yearly.to_vec(),
        recent_title: format!("최근 {}개년 사고 추이", options.trailing_years),
        recent,
        distribution,
        total_count,
        geometry: options.geometry,
        rate_precision: options.rate_precision,
    }
}
