//! ## Revenue by Vehicle Type
//!
//! Sum of booking values per vehicle type, ordered by vehicle type. Bookings without a
//! vehicle type are left out; groups whose values are all missing sum to 0.

use super::Aggregator;
use crate::exceptions::DashboardResult;
use crate::schema::{f64_at, string_at, BOOKING_VALUE, VEHICLE_TYPE};
use async_trait::async_trait;
use datafusion::functions_aggregate::expr_fn::sum;
use datafusion::prelude::DataFrame;
use datafusion_expr::ident;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueEntry {
    pub vehicle_type: String,
    pub revenue: f64,
}

pub struct RevenueByVehicle;

#[async_trait]
impl Aggregator for RevenueByVehicle {
    type Output = Vec<RevenueEntry>;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<Vec<RevenueEntry>> {
        let batches = df
            .clone()
            .filter(ident(VEHICLE_TYPE).is_not_null())?
            .aggregate(
                vec![ident(VEHICLE_TYPE)],
                vec![sum(ident(BOOKING_VALUE)).alias("revenue")],
            )?
            .sort(vec![ident(VEHICLE_TYPE).sort(true, false)])?
            .collect()
            .await?;

        let mut entries = Vec::new();
        for batch in &batches {
            for row in 0..batch.num_rows() {
                if let Some(vehicle_type) = string_at(batch.column(0), row)? {
                    entries.push(RevenueEntry {
                        vehicle_type,
                        revenue: f64_at(batch.column(1), row)?.unwrap_or(0.0),
                    });
                }
            }
        }
        Ok(entries)
    }
}

/// Looks up the revenue of one vehicle type.
pub fn revenue_of(entries: &[RevenueEntry], vehicle_type: &str) -> Option<f64> {
    entries
        .iter()
        .find(|e| e.vehicle_type == vehicle_type)
        .map(|e| e.revenue)
}
