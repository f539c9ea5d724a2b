//! ## Distance vs Booking Value
//!
//! Point cloud for the scatter plot: one `(distance, value, vehicle type)` triple per
//! booking that has both a distance and a value.

use super::Aggregator;
use crate::exceptions::DashboardResult;
use crate::filter::DropMissing;
use crate::schema::{f64_at, string_at, BOOKING_VALUE, RIDE_DISTANCE, VEHICLE_TYPE};
use crate::view_pipeline;
use async_trait::async_trait;
use datafusion::prelude::DataFrame;
use datafusion_expr::ident;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub distance: f64,
    pub value: f64,
    pub vehicle_type: Option<String>,
}

pub struct DistanceValuePairs;

#[async_trait]
impl Aggregator for DistanceValuePairs {
    type Output = Vec<ScatterPoint>;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<Vec<ScatterPoint>> {
        let complete = view_pipeline!(DropMissing::new(vec![
            RIDE_DISTANCE.to_string(),
            BOOKING_VALUE.to_string(),
        ]))
        .apply(df.clone())?;
        let batches = complete
            .select(vec![
                ident(RIDE_DISTANCE),
                ident(BOOKING_VALUE),
                ident(VEHICLE_TYPE),
            ])?
            .collect()
            .await?;

        let mut points = Vec::new();
        for batch in &batches {
            for row in 0..batch.num_rows() {
                let distance = f64_at(batch.column(0), row)?;
                let value = f64_at(batch.column(1), row)?;
                if let (Some(distance), Some(value)) = (distance, value) {
                    points.push(ScatterPoint {
                        distance,
                        value,
                        vehicle_type: string_at(batch.column(2), row)?,
                    });
                }
            }
        }
        Ok(points)
    }
}
