//! SVG chart generation for the dashboard page.
//!
//! Every function returns a self-contained `<svg>` element (or an empty-state paragraph)
//! that is inlined into the HTML page. Charts only lay out values they are given.

use super::html::escape_html;
use crate::aggregates::histogram::HistogramBin;
use crate::aggregates::scatter::ScatterPoint;
use crate::format::format_axis_value;
use std::f64::consts::PI;
use std::fmt::Write;

/// Series colors, reused cyclically.
pub const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// Scatter plots draw at most this many points.
pub const MAX_SCATTER_POINTS: usize = 5_000;

const EMPTY_STATE: &str = r#"<p class="chart-empty">No data for the current selection.</p>"#;

fn color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

fn svg_open(width: u32, height: u32, title: &str) -> String {
    format!(
        r#"<svg class="chart" viewBox="0 0 {w} {h}" width="100%" preserveAspectRatio="xMidYMid meet" role="img" aria-label="{t}" xmlns="http://www.w3.org/2000/svg"><title>{t}</title>"#,
        w = width,
        h = height,
        t = escape_html(title)
    )
}

/// Pie chart of `(label, value)` slices with a legend showing percentages.
pub fn pie_chart(title: &str, series: &[(String, f64)]) -> String {
    let total: f64 = series.iter().map(|(_, v)| v.max(0.0)).sum();
    if series.is_empty() || total <= 0.0 {
        return EMPTY_STATE.to_string();
    }

    let (width, cx, cy, r) = (560u32, 150.0, 150.0, 120.0);
    let legend_rows = series.len() as u32;
    let height = 300u32.max(40 + legend_rows * 22);
    let mut svg = svg_open(width, height, title);

    let mut angle = -PI / 2.0;
    for (i, (label, value)) in series.iter().enumerate() {
        let fraction = value.max(0.0) / total;
        if fraction <= 0.0 {
            continue;
        }
        let fill = color(i);
        if fraction >= 0.999_999 {
            let _ = write!(
                svg,
                r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}"><title>{label}: 100%</title></circle>"#,
                label = escape_html(label)
            );
            continue;
        }
        let sweep = fraction * 2.0 * PI;
        let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
        let end = angle + sweep;
        let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
        let large_arc = if sweep > PI { 1 } else { 0 };
        let _ = write!(
            svg,
            r#"<path d="M{cx:.1},{cy:.1} L{x0:.2},{y0:.2} A{r:.1},{r:.1} 0 {large_arc} 1 {x1:.2},{y1:.2} Z" fill="{fill}" stroke="white" stroke-width="1"><title>{label}: {pct:.1}%</title></path>"#,
            label = escape_html(label),
            pct = fraction * 100.0
        );
        angle = end;
    }

    for (i, (label, value)) in series.iter().enumerate() {
        let y = 30 + i as u32 * 22;
        let pct = value.max(0.0) / total * 100.0;
        let _ = write!(
            svg,
            r#"<rect x="310" y="{ry}" width="14" height="14" fill="{fill}"/><text x="332" y="{ty}" class="legend">{label} ({pct:.1}%)</text>"#,
            ry = y,
            ty = y + 12,
            fill = color(i),
            label = escape_html(&truncate_label(label, 28))
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Horizontal bar chart of `(label, value)` pairs in the order given.
pub fn bar_chart(title: &str, series: &[(String, f64)], format_value: &dyn Fn(f64) -> String) -> String {
    if series.is_empty() {
        return EMPTY_STATE.to_string();
    }
    let max_value = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let (width, label_w, value_w, row_h, top) = (560u32, 190.0, 70.0, 26.0, 10.0);
    let bar_area = width as f64 - label_w - value_w - 10.0;
    let height = (top * 2.0 + row_h * series.len() as f64).ceil() as u32;

    let mut svg = svg_open(width, height, title);
    for (i, (label, value)) in series.iter().enumerate() {
        let y = top + row_h * i as f64;
        let bar_w = if max_value > 0.0 {
            (value.max(0.0) / max_value) * bar_area
        } else {
            0.0
        };
        let _ = write!(
            svg,
            r#"<text x="{lx:.1}" y="{ty:.1}" class="axis-label" text-anchor="end">{short}</text><rect x="{bx:.1}" y="{by:.1}" width="{bar_w:.2}" height="{bh:.1}" fill="{fill}"><title>{full}: {val}</title></rect><text x="{vx:.1}" y="{ty:.1}" class="value-label">{val}</text>"#,
            lx = label_w - 8.0,
            ty = y + row_h * 0.65,
            short = escape_html(&truncate_label(label, 26)),
            bx = label_w,
            by = y + 3.0,
            bh = row_h - 6.0,
            fill = color(0),
            full = escape_html(label),
            val = escape_html(&format_value(*value)),
            vx = label_w + bar_w + 6.0,
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Scatter plot of ride distance against booking value, colored by vehicle type.
///
/// Large point clouds are thinned with a fixed stride to at most [`MAX_SCATTER_POINTS`].
pub fn scatter_chart(title: &str, points: &[ScatterPoint]) -> String {
    if points.is_empty() {
        return EMPTY_STATE.to_string();
    }
    let stride = points.len().div_ceil(MAX_SCATTER_POINTS).max(1);
    let shown: Vec<&ScatterPoint> = points.iter().step_by(stride).collect();

    let mut groups: Vec<String> = Vec::new();
    for p in &shown {
        let key = p.vehicle_type.clone().unwrap_or_else(|| "Unknown".to_string());
        if !groups.contains(&key) {
            groups.push(key);
        }
    }

    let (x_min, x_max) = extent(shown.iter().map(|p| p.distance));
    let (y_min, y_max) = extent(shown.iter().map(|p| p.value));
    let (width, height) = (760u32, 380u32);
    let (left, right, top, bottom) = (60.0, 150.0, 15.0, 45.0);
    let plot_w = width as f64 - left - right;
    let plot_h = height as f64 - top - bottom;
    let sx = |x: f64| left + (x - x_min) / (x_max - x_min) * plot_w;
    let sy = |y: f64| top + plot_h - (y - y_min) / (y_max - y_min) * plot_h;

    let mut svg = svg_open(width, height, title);
    let _ = write!(
        svg,
        r#"<line x1="{left}" y1="{yb:.1}" x2="{xr:.1}" y2="{yb:.1}" class="axis"/><line x1="{left}" y1="{top}" x2="{left}" y2="{yb:.1}" class="axis"/>"#,
        yb = top + plot_h,
        xr = left + plot_w
    );
    for i in 0..=4 {
        let fx = x_min + (x_max - x_min) * i as f64 / 4.0;
        let fy = y_min + (y_max - y_min) * i as f64 / 4.0;
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{xy:.1}" class="tick" text-anchor="middle">{xl}</text><text x="{yx:.1}" y="{y:.1}" class="tick" text-anchor="end">{yl}</text>"#,
            x = sx(fx),
            xy = top + plot_h + 16.0,
            xl = format_axis_value(fx),
            yx = left - 6.0,
            y = sy(fy) + 4.0,
            yl = format_axis_value(fy)
        );
    }
    let _ = write!(
        svg,
        r#"<text x="{x:.1}" y="{y}" class="axis-title" text-anchor="middle">Ride Distance</text><text x="14" y="{ym:.1}" class="axis-title" text-anchor="middle" transform="rotate(-90 14 {ym:.1})">Booking Value</text>"#,
        x = left + plot_w / 2.0,
        y = height - 6,
        ym = top + plot_h / 2.0
    );

    for p in &shown {
        let key = p.vehicle_type.as_deref().unwrap_or("Unknown");
        let idx = groups.iter().position(|g| g == key).unwrap_or(0);
        let _ = write!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="2.5" fill="{}" fill-opacity="0.6"/>"#,
            sx(p.distance),
            sy(p.value),
            color(idx)
        );
    }

    for (i, group) in groups.iter().enumerate() {
        let y = top + 10.0 + i as f64 * 20.0;
        let _ = write!(
            svg,
            r#"<circle cx="{cx:.1}" cy="{y:.1}" r="5" fill="{fill}"/><text x="{tx:.1}" y="{ty:.1}" class="legend">{label}</text>"#,
            cx = left + plot_w + 20.0,
            fill = color(i),
            tx = left + plot_w + 32.0,
            ty = y + 4.0,
            label = escape_html(&truncate_label(group, 16))
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Vertical histogram with touching bars.
pub fn histogram_chart(title: &str, bins: &[HistogramBin], fill: &str) -> String {
    if bins.is_empty() {
        return EMPTY_STATE.to_string();
    }
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let (width, height) = (400u32, 280u32);
    let (left, right, top, bottom) = (50.0, 10.0, 15.0, 40.0);
    let plot_w = width as f64 - left - right;
    let plot_h = height as f64 - top - bottom;
    let bar_w = plot_w / bins.len() as f64;

    let mut svg = svg_open(width, height, title);
    for (i, bin) in bins.iter().enumerate() {
        let h = bin.count as f64 / max_count * plot_h;
        let x = left + bar_w * i as f64;
        let _ = write!(
            svg,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" stroke="white" stroke-width="1"><title>{lo:.2}–{hi:.2}: {count}</title></rect>"#,
            y = top + plot_h - h,
            w = bar_w,
            lo = bin.lower,
            hi = bin.upper,
            count = bin.count
        );
    }
    let first = bins[0].lower;
    let last = bins[bins.len() - 1].upper;
    let _ = write!(
        svg,
        r#"<line x1="{left}" y1="{yb:.1}" x2="{xr:.1}" y2="{yb:.1}" class="axis"/><text x="{left}" y="{ty:.1}" class="tick" text-anchor="middle">{first:.2}</text><text x="{xr:.1}" y="{ty:.1}" class="tick" text-anchor="middle">{last:.2}</text><text x="{mx:.1}" y="{ty:.1}" class="tick" text-anchor="middle">{mid:.2}</text><text x="{yx:.1}" y="{top_y:.1}" class="tick" text-anchor="end">{max}</text><text x="{yx:.1}" y="{yb:.1}" class="tick" text-anchor="end">0</text>"#,
        yb = top + plot_h,
        xr = left + plot_w,
        ty = top + plot_h + 16.0,
        mx = left + plot_w / 2.0,
        mid = (first + last) / 2.0,
        yx = left - 6.0,
        top_y = top + 8.0,
        max = max_count as u64
    );
    svg.push_str("</svg>");
    svg
}

/// Min and max of `values`, widened so the range is never empty.
fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(l, v)| (l.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_series_render_placeholder() {
        assert!(pie_chart("x", &[]).contains("chart-empty"));
        assert!(bar_chart("x", &[], &|v| v.to_string()).contains("chart-empty"));
        assert!(scatter_chart("x", &[]).contains("chart-empty"));
        assert!(histogram_chart("x", &[], "#000").contains("chart-empty"));
    }

    #[test]
    fn test_pie_chart_single_slice_is_circle() {
        let svg = pie_chart("Status", &series(&[("Completed", 3.0)]));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("Completed (100.0%)"));
    }

    #[test]
    fn test_pie_chart_slices_and_legend() {
        let svg = pie_chart("Status", &series(&[("Completed", 3.0), ("Cancelled", 1.0)]));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("Completed (75.0%)"));
        assert!(svg.contains("Cancelled (25.0%)"));
    }

    #[test]
    fn test_bar_chart_escapes_labels() {
        let svg = bar_chart("Pickups", &series(&[("<Airport>", 5.0)]), &|v| format!("{v:.0}"));
        assert!(svg.contains("&lt;Airport&gt;"));
        assert!(!svg.contains("<Airport>"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn test_scatter_chart_thins_large_inputs() {
        let points: Vec<ScatterPoint> = (0..(MAX_SCATTER_POINTS * 2 + 10))
            .map(|i| ScatterPoint {
                distance: i as f64,
                value: (i * 2) as f64,
                vehicle_type: Some("Auto".to_string()),
            })
            .collect();
        let svg = scatter_chart("Distance", &points);
        // One legend marker plus the plotted points.
        let circles = svg.matches("<circle").count() - 1;
        assert!(circles <= MAX_SCATTER_POINTS);
        assert!(circles > 0);
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("abcdefghijkl", 5), "abcd…");
    }
}
