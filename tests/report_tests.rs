use ride_insights::aggregates::{summarize, SummaryOptions};
use ride_insights::exceptions::DashboardResult;
use ride_insights::filter::VehicleTypeFilter;
use ride_insights::report::{render_dashboard, render_error_page, PageContext, FOOTER};
use ride_insights::settings::DEFAULT_TITLE;

mod shared;
use shared::{dataset, sample_rows};

const SECTION_HEADINGS: [&str; 7] = [
    "Booking Status Distribution",
    "Vehicle Type Usage",
    "Top 10 Pickup Locations",
    "Revenue by Vehicle Type",
    "Distance vs Booking Value",
    "Ratings Distribution",
    "Cancellation Reasons",
];

async fn render(filter: &VehicleTypeFilter) -> DashboardResult<String> {
    let data = dataset(&sample_rows());
    let summary = summarize(&data, filter, &SummaryOptions::default()).await?;
    let ctx = PageContext {
        title: DEFAULT_TITLE,
        vehicle_types: data.vehicle_types(),
        filter,
    };
    Ok(render_dashboard(&ctx, &summary))
}

#[tokio::test]
async fn test_dashboard_contains_metrics_and_sections() -> DashboardResult<()> {
    let page = render(&VehicleTypeFilter::all()).await?;
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains(&format!("<title>{}</title>", DEFAULT_TITLE)));
    for label in [
        "Total Bookings",
        "Completed Rides",
        "Total Revenue",
        "Avg Ride Distance",
    ] {
        assert!(page.contains(label), "missing metric {label}");
    }
    assert!(page.contains("₹ 860"));
    assert!(page.contains("10.69"));

    let mut last = 0;
    for heading in SECTION_HEADINGS {
        let pos = page
            .find(heading)
            .unwrap_or_else(|| panic!("missing section {heading}"));
        assert!(pos > last, "section {heading} out of order");
        last = pos;
    }
    assert!(page.contains(FOOTER));
    assert!(page.matches("<svg").count() >= 9);
    Ok(())
}

#[tokio::test]
async fn test_sidebar_reflects_selection() -> DashboardResult<()> {
    let page = render(&VehicleTypeFilter::new(["Bike"])).await?;
    assert!(page.contains(r#"name="vehicle_type" multiple"#));
    assert!(page.contains(r#"<option value="Bike" selected>Bike</option>"#));
    assert!(page.contains(r#"<option value="Auto">Auto</option>"#));
    assert!(page.contains(r#"<option value="Go Sedan">Go Sedan</option>"#));
    // Only Bike rows: one completed ride worth 80.
    assert!(page.contains("₹ 80"));
    Ok(())
}

#[tokio::test]
async fn test_empty_selection_renders_empty_states() -> DashboardResult<()> {
    let page = render(&VehicleTypeFilter::new(["Boat"])).await?;
    assert!(page.contains("₹ 0"));
    assert!(page.contains("n/a"));
    assert!(page.contains("No data"));
    Ok(())
}

#[test]
fn test_error_page_escapes_message() {
    let filter = VehicleTypeFilter::all();
    let ctx = PageContext {
        title: DEFAULT_TITLE,
        vehicle_types: &[],
        filter: &filter,
    };
    let page = render_error_page(&ctx, "Data file not found: <bookings & co>.csv");
    assert!(page.contains(r#"role="alert""#));
    assert!(page.contains("&lt;bookings &amp; co&gt;.csv"));
    assert!(!page.contains("<bookings"));
    assert!(!page.contains("Total Bookings"));
}
