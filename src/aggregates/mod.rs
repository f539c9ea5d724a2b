//! # Aggregators
//!
//! Each submodule computes one family of dashboard aggregates from a (filtered) bookings
//! DataFrame. Every aggregator implements [`Aggregator`]: it only reads the DataFrame and
//! returns a small summary structure, so the same view can feed any number of them.
//!
//! [`DashboardSummary`] runs the full fixed set that the dashboard renders.

pub mod frequency;
pub mod histogram;
pub mod kpis;
pub mod revenue;
pub mod scatter;

use crate::exceptions::{DashboardError, DashboardResult};
use crate::filter::{filtered_view, VehicleTypeFilter};
use crate::loader::BookingDataset;
use crate::schema::{
    f64_at, BOOKING_STATUS, CUSTOMER_CANCELLATION_REASON, CUSTOMER_RATING,
    DRIVER_CANCELLATION_REASON, DRIVER_RATINGS, PICKUP_LOCATION, VEHICLE_TYPE,
};
use crate::settings::{DashboardSettings, DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_N};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::*;
use datafusion_expr::Expr;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

use self::frequency::{FrequencyTable, ValueCounts};
use self::histogram::{Histogram, RatingHistogram};
use self::kpis::{AverageDistance, CompletedRides, Kpis, TotalBookings, TotalRevenue};
use self::revenue::{RevenueByVehicle, RevenueEntry};
use self::scatter::{DistanceValuePairs, ScatterPoint};

/// A pure computation from a bookings DataFrame to a summary value.
#[async_trait]
pub trait Aggregator {
    type Output: Send;

    /// Computes the aggregate. The input DataFrame is not consumed.
    async fn compute(&self, df: &DataFrame) -> DashboardResult<Self::Output>;
}

/// Evaluates a single aggregate expression over the whole DataFrame and returns it as `f64`.
/// Returns `None` when the aggregate is null (e.g. `SUM` over no rows).
pub(crate) async fn collect_scalar_f64(df: &DataFrame, expr: Expr) -> DashboardResult<Option<f64>> {
    let batches = df
        .clone()
        .aggregate(vec![], vec![expr.alias("value")])?
        .collect()
        .await?;
    match first_row(&batches) {
        Some(batch) => f64_at(batch.column(0), 0),
        None => Err(DashboardError::UnexpectedResult(
            "Aggregate query returned no rows".to_string(),
        )),
    }
}

/// First batch that has at least one row.
pub(crate) fn first_row(batches: &[RecordBatch]) -> Option<&RecordBatch> {
    batches.iter().find(|b| b.num_rows() > 0)
}

/// Knobs for the frequency tables and histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl From<&DashboardSettings> for SummaryOptions {
    fn from(settings: &DashboardSettings) -> Self {
        Self {
            top_n: settings.top_n,
            histogram_bins: settings.histogram_bins,
        }
    }
}

/// Every aggregate shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    pub booking_status: FrequencyTable,
    pub vehicle_usage: FrequencyTable,
    pub top_pickup_locations: FrequencyTable,
    pub revenue_by_vehicle: Vec<RevenueEntry>,
    pub distance_vs_value: Vec<ScatterPoint>,
    pub driver_ratings: Histogram,
    pub customer_ratings: Histogram,
    pub customer_cancellations: FrequencyTable,
    pub driver_cancellations: FrequencyTable,
}

impl DashboardSummary {
    /// Computes every aggregate over `df`.
    pub async fn compute(df: &DataFrame, options: &SummaryOptions) -> DashboardResult<Self> {
        let start = Instant::now();
        let top_n = Some(options.top_n);

        let (bookings, completed, revenue, distance) =
            (TotalBookings, CompletedRides, TotalRevenue, AverageDistance);
        let (total_bookings, completed_rides, total_revenue, avg_ride_distance) = futures::try_join!(
            bookings.compute(df),
            completed.compute(df),
            revenue.compute(df),
            distance.compute(df),
        )?;

        let status_counts = ValueCounts::new(BOOKING_STATUS, None);
        let vehicle_counts = ValueCounts::new(VEHICLE_TYPE, None);
        let pickup_counts = ValueCounts::new(PICKUP_LOCATION, top_n);
        let (booking_status, vehicle_usage, top_pickup_locations) = futures::try_join!(
            status_counts.compute(df),
            vehicle_counts.compute(df),
            pickup_counts.compute(df),
        )?;

        let (revenue_groups, scatter_pairs) = (RevenueByVehicle, DistanceValuePairs);
        let (revenue_by_vehicle, distance_vs_value) = futures::try_join!(
            revenue_groups.compute(df),
            scatter_pairs.compute(df),
        )?;

        let driver_histogram = RatingHistogram::new(DRIVER_RATINGS, options.histogram_bins);
        let customer_histogram = RatingHistogram::new(CUSTOMER_RATING, options.histogram_bins);
        let (driver_ratings, customer_ratings) = futures::try_join!(
            driver_histogram.compute(df),
            customer_histogram.compute(df),
        )?;

        let customer_reasons = ValueCounts::new(CUSTOMER_CANCELLATION_REASON, top_n);
        let driver_reasons = ValueCounts::new(DRIVER_CANCELLATION_REASON, top_n);
        let (customer_cancellations, driver_cancellations) = futures::try_join!(
            customer_reasons.compute(df),
            driver_reasons.compute(df),
        )?;

        debug!(elapsed = ?start.elapsed(), total_bookings, "Computed dashboard summary");

        Ok(Self {
            kpis: Kpis {
                total_bookings,
                completed_rides,
                total_revenue,
                avg_ride_distance,
            },
            booking_status,
            vehicle_usage,
            top_pickup_locations,
            revenue_by_vehicle,
            distance_vs_value,
            driver_ratings,
            customer_ratings,
            customer_cancellations,
            driver_cancellations,
        })
    }
}

/// Filters the cached dataset by `filter` and computes the full summary.
pub async fn summarize(
    dataset: &BookingDataset,
    filter: &VehicleTypeFilter,
    options: &SummaryOptions,
) -> DashboardResult<DashboardSummary> {
    let view = filtered_view(dataset.frame().await?, filter)?;
    DashboardSummary::compute(&view, options).await
}
