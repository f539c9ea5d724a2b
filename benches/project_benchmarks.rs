use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ride_insights::aggregates::{summarize, SummaryOptions};
use ride_insights::filter::VehicleTypeFilter;
use ride_insights::loader::BookingDataset;
use ride_insights::schema::booking_schema;
use std::sync::Arc;
use tokio::runtime::Runtime;

const VEHICLES: [&str; 7] = [
    "Auto", "Bike", "eBike", "Go Mini", "Go Sedan", "Premier Sedan", "Uber XL",
];
const STATUSES: [&str; 5] = [
    "Completed",
    "Completed",
    "Cancelled by Driver",
    "Cancelled by Customer",
    "No Driver Found",
];

/// Deterministic synthetic bookings.
fn synthetic_dataset(rows: usize) -> BookingDataset {
    let completed = |i: usize| STATUSES[i % STATUSES.len()] == "Completed";
    let numeric = |f: fn(usize) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(
            (0..rows)
                .map(|i| completed(i).then(|| f(i)))
                .collect::<Vec<_>>(),
        ))
    };
    let text = |f: &dyn Fn(usize) -> Option<String>| -> ArrayRef {
        Arc::new(StringArray::from((0..rows).map(f).collect::<Vec<_>>()))
    };

    let batch = RecordBatch::try_new(
        booking_schema(),
        vec![
            text(&|i| Some(STATUSES[i % STATUSES.len()].to_string())),
            text(&|i| Some(VEHICLES[(i * 7 + 3) % VEHICLES.len()].to_string())),
            numeric(|i| 50.0 + ((i * 37) % 950) as f64),
            numeric(|i| 1.0 + ((i * 13) % 490) as f64 / 10.0),
            numeric(|i| 3.0 + ((i * 11) % 21) as f64 / 10.0),
            numeric(|i| 3.0 + ((i * 17) % 21) as f64 / 10.0),
            text(&|i| Some(format!("Location {}", (i * 31) % 150))),
            text(&|i| (STATUSES[i % STATUSES.len()] == "Cancelled by Customer")
                .then(|| "Driver asked to cancel".to_string())),
            text(&|i| (STATUSES[i % STATUSES.len()] == "Cancelled by Driver")
                .then(|| "Customer related issue".to_string())),
        ],
    )
    .unwrap();
    BookingDataset::from_batches(vec![batch]).unwrap()
}

fn bench_summary(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let dataset = synthetic_dataset(50_000);
    let options = SummaryOptions::default();
    let all = VehicleTypeFilter::all();
    let subset = VehicleTypeFilter::new(["Auto", "Go Sedan"]);

    c.bench_function("summarize_all_vehicle_types", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(summarize(&dataset, &all, &options).await.unwrap())
        })
    });
    c.bench_function("summarize_vehicle_subset", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(summarize(&dataset, &subset, &options).await.unwrap())
        })
    });
}

criterion_group!(benches, bench_summary);
criterion_main!(benches);
