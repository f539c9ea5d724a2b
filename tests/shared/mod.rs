#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use ride_insights::loader::BookingDataset;
use ride_insights::schema::booking_schema;

/// One booking used to build in-memory fixtures.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub status: Option<&'static str>,
    pub vehicle: Option<&'static str>,
    pub value: Option<f64>,
    pub distance: Option<f64>,
    pub driver_rating: Option<f64>,
    pub customer_rating: Option<f64>,
    pub pickup: Option<&'static str>,
    pub customer_reason: Option<&'static str>,
    pub driver_reason: Option<&'static str>,
}

/// A completed booking with the given vehicle type and value.
pub fn row(status: &'static str, vehicle: &'static str, value: f64) -> Row {
    Row {
        status: Some(status),
        vehicle: Some(vehicle),
        value: Some(value),
        distance: Some(10.0),
        driver_rating: Some(4.5),
        customer_rating: Some(4.5),
        pickup: Some("Central"),
        ..Default::default()
    }
}

fn strings(rows: &[Row], f: impl Fn(&Row) -> Option<&'static str>) -> ArrayRef {
    Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn floats(rows: &[Row], f: impl Fn(&Row) -> Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
}

/// Builds a batch in the normalized bookings schema.
pub fn bookings_batch(rows: &[Row]) -> RecordBatch {
    RecordBatch::try_new(
        booking_schema(),
        vec![
            strings(rows, |r| r.status),
            strings(rows, |r| r.vehicle),
            floats(rows, |r| r.value),
            floats(rows, |r| r.distance),
            floats(rows, |r| r.driver_rating),
            floats(rows, |r| r.customer_rating),
            strings(rows, |r| r.pickup),
            strings(rows, |r| r.customer_reason),
            strings(rows, |r| r.driver_reason),
        ],
    )
    .unwrap()
}

pub fn dataset(rows: &[Row]) -> BookingDataset {
    BookingDataset::from_batches(vec![bookings_batch(rows)]).unwrap()
}

/// A small mixed dataset: 6 bookings over 3 vehicle types.
pub fn sample_rows() -> Vec<Row> {
    vec![
        Row {
            pickup: Some("Airport"),
            distance: Some(12.0),
            driver_rating: Some(4.8),
            customer_rating: Some(4.9),
            ..row("Completed", "Auto", 120.0)
        },
        Row {
            pickup: Some("Airport"),
            distance: Some(3.5),
            driver_rating: Some(4.1),
            customer_rating: Some(4.0),
            ..row("Completed", "Go Sedan", 250.0)
        },
        Row {
            pickup: Some("Station"),
            value: None,
            distance: None,
            driver_rating: None,
            customer_rating: None,
            customer_reason: Some("Driver is not moving towards pickup location"),
            ..row("Cancelled by Customer", "Auto", 0.0)
        },
        Row {
            pickup: Some("Mall"),
            value: None,
            distance: None,
            driver_rating: None,
            customer_rating: None,
            driver_reason: Some("Personal & Car related issues"),
            ..row("Cancelled by Driver", "Bike", 0.0)
        },
        Row {
            pickup: Some("Station"),
            distance: Some(7.25),
            driver_rating: Some(3.2),
            customer_rating: Some(4.4),
            ..row("Completed", "Bike", 80.0)
        },
        Row {
            pickup: Some("Airport"),
            distance: Some(20.0),
            driver_rating: Some(5.0),
            customer_rating: Some(3.0),
            ..row("Completed", "Go Sedan", 410.0)
        },
    ]
}

pub const CSV_HEADER: &str = "Date,Booking ID,Booking Status,Vehicle Type,Pickup Location,Booking Value,Ride Distance,Driver Ratings,Customer Rating,Reason for cancelling by Customer,Driver Cancellation Reason";

/// CSV contents shaped like the real export, including extra columns and `null` tokens.
pub fn sample_csv() -> String {
    [
        CSV_HEADER,
        "2024-03-23,CNR001,Completed,Auto,Airport,120,12.0,4.8,4.9,null,null",
        "2024-03-23,CNR002,Completed,Go Sedan,Airport,250,3.5,4.1,4.0,null,null",
        "2024-03-24,CNR003,Cancelled by Customer,Auto,Station,null,null,null,null,Driver is not moving towards pickup location,null",
        "2024-03-24,CNR004,Cancelled by Driver,Bike,Mall,null,null,null,null,null,Personal & Car related issues",
        "2024-03-25,CNR005,Completed,Bike,Station,80,7.25,3.2,4.4,,",
        "2024-03-25,CNR006,Completed,Go Sedan,Airport,410,20.0,5.0,3.0,null,null",
    ]
    .join("\n")
        + "\n"
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
