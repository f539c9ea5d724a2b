//! ## Dashboard Page
//!
//! Turns a [`DashboardSummary`] into one self-contained HTML page: metric tiles, inline SVG
//! charts and the sidebar filter form. Nothing here computes data; every number comes from
//! the summary.

pub mod charts;
pub mod html;

use self::charts::{bar_chart, histogram_chart, pie_chart, scatter_chart, PALETTE};
use self::html::{escape_html, inline_css};
use crate::aggregates::frequency::FrequencyTable;
use crate::aggregates::DashboardSummary;
use crate::filter::VehicleTypeFilter;
use crate::format::{format_count, format_currency};

pub const CAPTION: &str = "Bookings • Cancellations • Revenue • Ratings";
pub const FOOTER: &str = "Uber Dataset • Ride Insights Dashboard";

/// Query parameter carrying the vehicle-type selection.
pub const VEHICLE_TYPE_PARAM: &str = "vehicle_type";

/// Page-level inputs that do not come from the aggregates.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub title: &'a str,
    /// Options offered by the vehicle-type multi-select.
    pub vehicle_types: &'a [String],
    pub filter: &'a VehicleTypeFilter,
}

/// Renders the full dashboard page.
pub fn render_dashboard(ctx: &PageContext<'_>, summary: &DashboardSummary) -> String {
    let body = [
        render_metrics(summary),
        render_section(
            "📊 Booking Status Distribution",
            &chart_block(
                "Booking Status Breakdown",
                pie_chart("Booking Status Breakdown", &summary.booking_status.as_series()),
            ),
        ),
        render_section(
            "🚙 Vehicle Type Usage",
            &chart_block(
                "Rides by Vehicle Type",
                count_bars("Rides by Vehicle Type", &summary.vehicle_usage),
            ),
        ),
        render_section(
            "📍 Top 10 Pickup Locations",
            &chart_block(
                "Top Pickup Locations",
                count_bars("Top Pickup Locations", &summary.top_pickup_locations),
            ),
        ),
        render_section(
            "💰 Revenue by Vehicle Type",
            &chart_block(
                "Revenue by Vehicle Type",
                bar_chart(
                    "Revenue by Vehicle Type",
                    &summary
                        .revenue_by_vehicle
                        .iter()
                        .map(|e| (e.vehicle_type.clone(), e.revenue))
                        .collect::<Vec<_>>(),
                    &format_currency,
                ),
            ),
        ),
        render_section(
            "📏 Distance vs Booking Value",
            &chart_block(
                "Ride Distance vs Booking Value",
                scatter_chart("Ride Distance vs Booking Value", &summary.distance_vs_value),
            ),
        ),
        render_section(
            "⭐ Ratings Distribution",
            &two_columns(
                &chart_block(
                    "Driver Ratings",
                    histogram_chart("Driver Ratings", &summary.driver_ratings.bins, PALETTE[0]),
                ),
                &chart_block(
                    "Customer Ratings",
                    histogram_chart("Customer Ratings", &summary.customer_ratings.bins, PALETTE[2]),
                ),
            ),
        ),
        render_section(
            "❌ Cancellation Reasons",
            &two_columns(
                &chart_block(
                    "Customer Cancellations",
                    count_bars("Customer Cancellations", &summary.customer_cancellations),
                ),
                &chart_block(
                    "Driver Cancellations",
                    count_bars("Driver Cancellations", &summary.driver_cancellations),
                ),
            ),
        ),
    ]
    .concat();
    render_page(ctx, &body)
}

/// Renders the page with an error message in place of the charts.
pub fn render_error_page(ctx: &PageContext<'_>, message: &str) -> String {
    let body = format!(
        r#"<div class="error" role="alert"><strong>Could not load the bookings dataset.</strong><pre>{}</pre></div>"#,
        escape_html(message)
    );
    render_page(ctx, &body)
}

fn render_page(ctx: &PageContext<'_>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="layout">
        {sidebar}
        <main>
            <header>
                <h1>🚗 {title}</h1>
                <p class="caption">{caption}</p>
            </header>
            {body}
            <footer>{footer}</footer>
        </main>
    </div>
</body>
</html>"#,
        title = escape_html(ctx.title),
        css = inline_css(),
        sidebar = render_sidebar(ctx),
        caption = escape_html(CAPTION),
        body = body,
        footer = escape_html(FOOTER),
    )
}

fn render_sidebar(ctx: &PageContext<'_>) -> String {
    let options: String = ctx
        .vehicle_types
        .iter()
        .map(|vt| {
            let selected = if ctx.filter.contains(vt) { " selected" } else { "" };
            format!(
                r#"<option value="{v}"{selected}>{v}</option>"#,
                v = escape_html(vt)
            )
        })
        .collect();
    format!(
        r#"<aside>
            <h2>Filters</h2>
            <form method="get" action="/">
                <label for="{param}">Vehicle Type</label>
                <select id="{param}" name="{param}" multiple size="{size}">{options}</select>
                <p class="hint">Leave empty to include every vehicle type.</p>
                <button type="submit">Apply</button><a class="reset" href="/">Reset</a>
            </form>
        </aside>"#,
        param = VEHICLE_TYPE_PARAM,
        size = ctx.vehicle_types.len().clamp(3, 10),
    )
}

fn render_metrics(summary: &DashboardSummary) -> String {
    let kpis = &summary.kpis;
    let tiles = [
        ("Total Bookings", kpis.total_bookings_label()),
        ("Completed Rides", kpis.completed_rides_label()),
        ("Total Revenue", kpis.total_revenue_label()),
        ("Avg Ride Distance", kpis.avg_ride_distance_label()),
    ];
    let inner: String = tiles
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="metric"><div class="label">{}</div><div class="value">{}</div></div>"#,
                escape_html(label),
                escape_html(value)
            )
        })
        .collect();
    format!(r#"<div class="metrics">{}</div>"#, inner)
}

fn render_section(heading: &str, content: &str) -> String {
    format!(
        "<section><h2>{}</h2>{}</section>",
        escape_html(heading),
        content
    )
}

fn chart_block(title: &str, chart: String) -> String {
    format!(
        r#"<div class="chart-block"><h3 class="chart-title">{}</h3>{}</div>"#,
        escape_html(title),
        chart
    )
}

fn two_columns(left: &str, right: &str) -> String {
    format!(r#"<div class="columns">{}{}</div>"#, left, right)
}

fn count_bars(title: &str, table: &FrequencyTable) -> String {
    bar_chart(title, &table.as_series(), &|v| format_count(v.max(0.0) as u64))
}
