use std::fs::File;

use parquet::arrow::ArrowWriter;
use ride_insights::exceptions::{DashboardError, DashboardResult};
use ride_insights::loader::{load_bookings, DataFormat, DatasetCache};
use ride_insights::schema::booking_schema;

mod shared;
use shared::{bookings_batch, sample_csv, sample_rows, write_file, CSV_HEADER};

#[tokio::test]
async fn test_load_csv_normalizes_columns() -> DashboardResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "uber_bookings.csv", &sample_csv());

    let dataset = load_bookings(&path).await?;
    assert_eq!(dataset.num_rows(), 6);
    assert_eq!(dataset.schema(), booking_schema());
    assert_eq!(dataset.vehicle_types(), ["Auto", "Go Sedan", "Bike"]);

    let records = dataset.records()?;
    assert_eq!(records[0].booking_status.as_deref(), Some("Completed"));
    assert_eq!(records[0].booking_value, Some(120.0));
    assert_eq!(records[4].ride_distance, Some(7.25));

    // "null" tokens and empty cells both become real nulls.
    assert_eq!(records[0].customer_cancellation_reason, None);
    assert_eq!(records[2].booking_value, None);
    assert_eq!(records[2].driver_rating, None);
    assert_eq!(
        records[2].customer_cancellation_reason.as_deref(),
        Some("Driver is not moving towards pickup location")
    );
    assert_eq!(records[4].driver_cancellation_reason, None);
    Ok(())
}

#[tokio::test]
async fn test_load_csv_nulls_non_finite_numbers() -> DashboardResult<()> {
    let dir = tempfile::tempdir()?;
    let contents = [
        CSV_HEADER,
        "2024-03-23,CNR001,Completed,Auto,Airport,120,12.0,inf,4.9,null,null",
        "2024-03-23,CNR002,Completed,Auto,Airport,-inf,3.5,4.1,NaN,null,null",
        "2024-03-23,CNR003,Completed,Auto,Airport,90,4.0,4.5,4.0,null,null",
    ]
    .join("\n");
    let path = write_file(dir.path(), "bookings.csv", &contents);

    let records = load_bookings(&path).await?.records()?;
    assert_eq!(records[0].driver_rating, None);
    assert_eq!(records[0].booking_value, Some(120.0));
    assert_eq!(records[1].booking_value, None);
    assert_eq!(records[1].customer_rating, None);
    assert_eq!(records[2].driver_rating, Some(4.5));
    Ok(())
}

#[tokio::test]
async fn test_load_is_idempotent() -> DashboardResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "uber_bookings.csv", &sample_csv());

    let first = load_bookings(&path).await?.records()?;
    let second = load_bookings(&path).await?.records()?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_bookings(&dir.path().join("uber_bookings.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::DataFileNotFound(_)));
}

#[tokio::test]
async fn test_missing_required_column() {
    let dir = tempfile::tempdir().unwrap();
    let header = CSV_HEADER.replace(",Driver Cancellation Reason", "");
    let path = write_file(
        dir.path(),
        "uber_bookings.csv",
        &format!("{}\n2024-03-23,CNR001,Completed,Auto,Airport,120,12.0,4.8,4.9,null\n", header),
    );
    let err = load_bookings(&path).await.unwrap_err();
    match err {
        DashboardError::MissingColumn(msg) => assert!(msg.contains("Driver Cancellation Reason")),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[tokio::test]
async fn test_header_names_are_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let header = CSV_HEADER.replace("Vehicle Type", "vehicle type");
    let path = write_file(
        dir.path(),
        "uber_bookings.csv",
        &format!("{}\n2024-03-23,CNR001,Completed,Auto,Airport,120,12.0,4.8,4.9,null,null\n", header),
    );
    let err = load_bookings(&path).await.unwrap_err();
    assert!(matches!(err, DashboardError::MissingColumn(_)));
}

#[tokio::test]
async fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "uber_bookings.json", "{}");
    let err = load_bookings(&path).await.unwrap_err();
    assert!(matches!(err, DashboardError::UnsupportedFormat(_)));
}

#[test]
fn test_format_detection() {
    use std::path::Path;
    assert_eq!(
        DataFormat::from_path(Path::new("data/rides.CSV")).unwrap(),
        DataFormat::Csv
    );
    assert_eq!(
        DataFormat::from_path(Path::new("rides.parquet")).unwrap(),
        DataFormat::Parquet
    );
    assert!(DataFormat::from_path(Path::new("rides")).is_err());
}

#[tokio::test]
async fn test_load_parquet() -> DashboardResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("uber_bookings.parquet");
    let batch = bookings_batch(&sample_rows());
    let mut writer = ArrowWriter::try_new(File::create(&path)?, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    let dataset = load_bookings(&path).await?;
    assert_eq!(dataset.num_rows(), 6);
    let records = dataset.records()?;
    assert_eq!(records[1].vehicle_type.as_deref(), Some("Go Sedan"));
    assert_eq!(records[1].booking_value, Some(250.0));
    assert_eq!(records[2].booking_value, None);
    Ok(())
}

#[tokio::test]
async fn test_cache_loads_once() -> DashboardResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "uber_bookings.csv", &sample_csv());
    let cache = DatasetCache::new(&path);

    let first = cache.get().await?;
    let second = cache.get().await?;
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.load_count(), 1);

    // Changing the file is not observed until the cache is invalidated.
    std::fs::remove_file(&path)?;
    assert_eq!(cache.get().await?.num_rows(), 6);

    write_file(dir.path(), "uber_bookings.csv", &format!("{}\n", CSV_HEADER));
    cache.invalidate().await;
    let reloaded = cache.get().await?;
    assert_eq!(reloaded.num_rows(), 0);
    assert_eq!(cache.load_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_cache_does_not_keep_failures() -> DashboardResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("uber_bookings.csv");
    let cache = DatasetCache::new(&path);

    assert!(matches!(
        cache.get().await,
        Err(DashboardError::DataFileNotFound(_))
    ));
    assert_eq!(cache.load_count(), 0);

    write_file(dir.path(), "uber_bookings.csv", &sample_csv());
    assert_eq!(cache.get().await?.num_rows(), 6);
    assert_eq!(cache.load_count(), 1);
    Ok(())
}
