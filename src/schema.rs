//! ## Booking Schema
//!
//! Column names of the bookings file and the row-wise [`BookingRecord`] view of the data.
//!
//! Header names are matched exactly (case and spacing included). The loader projects these
//! nine columns out of the file and normalizes their types to [`booking_schema`], so every
//! other module can rely on Utf8 categorical columns and Float64 numeric columns.

use crate::exceptions::{DashboardError, DashboardResult};
use arrow::array::{Array, ArrayRef};
use arrow::record_batch::RecordBatch;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::scalar::ScalarValue;
use serde::Serialize;
use std::sync::Arc;

pub const BOOKING_STATUS: &str = "Booking Status";
pub const VEHICLE_TYPE: &str = "Vehicle Type";
pub const BOOKING_VALUE: &str = "Booking Value";
pub const RIDE_DISTANCE: &str = "Ride Distance";
pub const DRIVER_RATINGS: &str = "Driver Ratings";
pub const CUSTOMER_RATING: &str = "Customer Rating";
pub const PICKUP_LOCATION: &str = "Pickup Location";
pub const CUSTOMER_CANCELLATION_REASON: &str = "Reason for cancelling by Customer";
pub const DRIVER_CANCELLATION_REASON: &str = "Driver Cancellation Reason";

/// Status value counted by the "Completed Rides" tile.
pub const COMPLETED_STATUS: &str = "Completed";

pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    BOOKING_STATUS,
    VEHICLE_TYPE,
    PICKUP_LOCATION,
    CUSTOMER_CANCELLATION_REASON,
    DRIVER_CANCELLATION_REASON,
];

pub const NUMERIC_COLUMNS: [&str; 4] =
    [BOOKING_VALUE, RIDE_DISTANCE, DRIVER_RATINGS, CUSTOMER_RATING];

/// All columns the dashboard reads, in the order they appear in the loaded table.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    BOOKING_STATUS,
    VEHICLE_TYPE,
    BOOKING_VALUE,
    RIDE_DISTANCE,
    DRIVER_RATINGS,
    CUSTOMER_RATING,
    PICKUP_LOCATION,
    CUSTOMER_CANCELLATION_REASON,
    DRIVER_CANCELLATION_REASON,
];

/// Returns true if `name` is one of the numeric columns.
pub fn is_numeric_column(name: &str) -> bool {
    NUMERIC_COLUMNS.iter().any(|c| *c == name)
}

/// Schema of the normalized bookings table. Every field is nullable.
pub fn booking_schema() -> SchemaRef {
    let fields: Vec<Field> = REQUIRED_COLUMNS
        .iter()
        .map(|name| {
            let data_type = if is_numeric_column(name) {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(*name, data_type, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

/// One row of the bookings dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRecord {
    pub booking_status: Option<String>,
    pub vehicle_type: Option<String>,
    pub booking_value: Option<f64>,
    pub ride_distance: Option<f64>,
    pub driver_rating: Option<f64>,
    pub customer_rating: Option<f64>,
    pub pickup_location: Option<String>,
    pub customer_cancellation_reason: Option<String>,
    pub driver_cancellation_reason: Option<String>,
}

/// Converts normalized record batches into row-wise records.
pub fn records_from_batches(batches: &[RecordBatch]) -> DashboardResult<Vec<BookingRecord>> {
    let mut records = Vec::new();
    for batch in batches {
        let column = |name: &str| column_by_name(batch, name);
        let status = column(BOOKING_STATUS)?;
        let vehicle = column(VEHICLE_TYPE)?;
        let value = column(BOOKING_VALUE)?;
        let distance = column(RIDE_DISTANCE)?;
        let driver_rating = column(DRIVER_RATINGS)?;
        let customer_rating = column(CUSTOMER_RATING)?;
        let pickup = column(PICKUP_LOCATION)?;
        let customer_reason = column(CUSTOMER_CANCELLATION_REASON)?;
        let driver_reason = column(DRIVER_CANCELLATION_REASON)?;

        for row in 0..batch.num_rows() {
            records.push(BookingRecord {
                booking_status: string_at(status, row)?,
                vehicle_type: string_at(vehicle, row)?,
                booking_value: f64_at(value, row)?,
                ride_distance: f64_at(distance, row)?,
                driver_rating: f64_at(driver_rating, row)?,
                customer_rating: f64_at(customer_rating, row)?,
                pickup_location: string_at(pickup, row)?,
                customer_cancellation_reason: string_at(customer_reason, row)?,
                driver_cancellation_reason: string_at(driver_reason, row)?,
            });
        }
    }
    Ok(records)
}

/// Looks up a column of `batch` by name.
pub(crate) fn column_by_name<'a>(batch: &'a RecordBatch, name: &str) -> DashboardResult<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DashboardError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

/// Reads a string cell, accepting any of Arrow's UTF-8 layouts.
pub(crate) fn string_at(array: &ArrayRef, row: usize) -> DashboardResult<Option<String>> {
    if array.is_null(row) {
        return Ok(None);
    }
    match ScalarValue::try_from_array(array, row)? {
        ScalarValue::Utf8(v) | ScalarValue::LargeUtf8(v) | ScalarValue::Utf8View(v) => Ok(v),
        other => Err(DashboardError::UnexpectedResult(format!(
            "Expected a string value, found {:?}",
            other.data_type()
        ))),
    }
}

/// Reads a numeric cell as `f64`.
pub(crate) fn f64_at(array: &ArrayRef, row: usize) -> DashboardResult<Option<f64>> {
    if array.is_null(row) {
        return Ok(None);
    }
    match ScalarValue::try_from_array(array, row)? {
        ScalarValue::Float64(v) => Ok(v),
        ScalarValue::Float32(v) => Ok(v.map(f64::from)),
        ScalarValue::Int64(v) => Ok(v.map(|x| x as f64)),
        ScalarValue::Int32(v) => Ok(v.map(f64::from)),
        ScalarValue::UInt64(v) => Ok(v.map(|x| x as f64)),
        other => Err(DashboardError::UnexpectedResult(format!(
            "Expected a numeric value, found {:?}",
            other.data_type()
        ))),
    }
}

/// Reads an integer cell (row counts) as `u64`.
pub(crate) fn count_at(array: &ArrayRef, row: usize) -> DashboardResult<u64> {
    if array.is_null(row) {
        return Ok(0);
    }
    match ScalarValue::try_from_array(array, row)? {
        ScalarValue::Int64(Some(v)) => Ok(v.max(0) as u64),
        ScalarValue::UInt64(Some(v)) => Ok(v),
        ScalarValue::Int32(Some(v)) => Ok(v.max(0) as u64),
        other => Err(DashboardError::UnexpectedResult(format!(
            "Expected an integer count, found {:?}",
            other.data_type()
        ))),
    }
}
