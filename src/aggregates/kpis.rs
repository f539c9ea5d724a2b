//! ## Headline Metrics
//!
//! The four metric tiles at the top of the dashboard:
//!
//! - [`TotalBookings`]: number of bookings in the view.
//! - [`CompletedRides`]: bookings whose status is exactly `"Completed"`.
//! - [`TotalRevenue`]: sum of booking values (nulls skipped, 0 for an empty view).
//! - [`AverageDistance`]: mean ride distance rounded to 2 decimals (NaN without data).

use super::{collect_scalar_f64, first_row, Aggregator};
use crate::exceptions::DashboardResult;
use crate::format::{format_count, format_currency, format_number};
use crate::schema::{f64_at, BOOKING_STATUS, BOOKING_VALUE, COMPLETED_STATUS, RIDE_DISTANCE};
use async_trait::async_trait;
use datafusion::functions_aggregate::expr_fn::{avg, sum};
use datafusion::prelude::DataFrame;
use datafusion_expr::{ident, lit};
use datafusion_functions::math::expr_fn::round;
use serde::Serialize;

/// Values shown on the metric tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_bookings: u64,
    pub completed_rides: u64,
    pub total_revenue: f64,
    pub avg_ride_distance: f64,
}

impl Kpis {
    pub fn total_bookings_label(&self) -> String {
        format_count(self.total_bookings)
    }

    pub fn completed_rides_label(&self) -> String {
        format_count(self.completed_rides)
    }

    pub fn total_revenue_label(&self) -> String {
        format_currency(self.total_revenue)
    }

    pub fn avg_ride_distance_label(&self) -> String {
        format_number(self.avg_ride_distance, 2)
    }
}

pub struct TotalBookings;

#[async_trait]
impl Aggregator for TotalBookings {
    type Output = u64;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<u64> {
        Ok(df.clone().count().await? as u64)
    }
}

pub struct CompletedRides;

#[async_trait]
impl Aggregator for CompletedRides {
    type Output = u64;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<u64> {
        let completed = df
            .clone()
            .filter(ident(BOOKING_STATUS).eq(lit(COMPLETED_STATUS)))?
            .count()
            .await?;
        Ok(completed as u64)
    }
}

pub struct TotalRevenue;

#[async_trait]
impl Aggregator for TotalRevenue {
    type Output = f64;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<f64> {
        let total = collect_scalar_f64(df, sum(ident(BOOKING_VALUE))).await?;
        Ok(total.unwrap_or(0.0))
    }
}

pub struct AverageDistance;

#[async_trait]
impl Aggregator for AverageDistance {
    type Output = f64;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<f64> {
        let batches = df
            .clone()
            .aggregate(vec![], vec![avg(ident(RIDE_DISTANCE)).alias("mean")])?
            .select(vec![round(vec![ident("mean"), lit(2i64)]).alias("value")])?
            .collect()
            .await?;
        let mean = match first_row(&batches) {
            Some(batch) => f64_at(batch.column(0), 0)?,
            None => None,
        };
        Ok(mean.unwrap_or(f64::NAN))
    }
}
