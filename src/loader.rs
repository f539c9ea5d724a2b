//! ## Bookings Loader
//!
//! Reads the bookings file into memory and keeps it for the lifetime of the process.
//!
//! - [`load_bookings`] reads a CSV (or Parquet) file, projects the nine dashboard columns
//!   and normalizes their types. Missing-value tokens such as `null` or `NA` become real nulls
//!   and numeric columns are `TRY_CAST` to `Float64`, with infinities and NaN nulled too.
//! - [`BookingDataset`] owns the loaded batches in a DataFusion [`MemTable`], so every
//!   interaction builds its DataFrame from memory instead of the file.
//! - [`DatasetCache`] loads the dataset on first use and hands out the same
//!   `Arc<BookingDataset>` until [`DatasetCache::invalidate`] is called. Failed loads are
//!   not cached.

use crate::exceptions::{DashboardError, DashboardResult};
use crate::schema::{booking_schema, is_numeric_column, records_from_batches, string_at};
use crate::schema::{BookingRecord, REQUIRED_COLUMNS, VEHICLE_TYPE};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;
use datafusion::scalar::ScalarValue;
use datafusion_expr::{cast, ident, lit, try_cast, Case as DFCase, Expr};
use datafusion_functions::string::expr_fn::btrim;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Name under which the bookings table is registered in the session.
pub const BOOKINGS_TABLE: &str = "bookings";

/// Cell values treated as missing.
pub const MISSING_VALUE_TOKENS: [&str; 8] = ["", "null", "NULL", "NaN", "nan", "NA", "N/A", "None"];

/// Supported on-disk formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Parquet,
}

impl DataFormat {
    /// Detects the format from the extension of `path`.
    pub fn from_path(path: &Path) -> DashboardResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            _ => Err(DashboardError::UnsupportedFormat(format!(
                "{} (expected a .csv or .parquet file)",
                path.display()
            ))),
        }
    }
}

/// The bookings table held in memory.
pub struct BookingDataset {
    ctx: SessionContext,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    vehicle_types: Vec<String>,
}

impl BookingDataset {
    /// Wraps normalized record batches (see [`booking_schema`]) in a queryable table.
    pub fn from_batches(batches: Vec<RecordBatch>) -> DashboardResult<Self> {
        let schema = booking_schema();
        let mem_table = MemTable::try_new(schema.clone(), vec![batches.clone()])?;
        let ctx = SessionContext::new();
        ctx.register_table(BOOKINGS_TABLE, Arc::new(mem_table))?;
        let vehicle_types = distinct_in_order(&batches, VEHICLE_TYPE)?;
        Ok(Self {
            ctx,
            schema,
            batches,
            vehicle_types,
        })
    }

    /// Returns a fresh DataFrame over the full dataset.
    pub async fn frame(&self) -> DashboardResult<DataFrame> {
        self.ctx
            .table(BOOKINGS_TABLE)
            .await
            .map_err(DashboardError::from)
    }

    /// Distinct non-null vehicle types, in order of first appearance.
    pub fn vehicle_types(&self) -> &[String] {
        &self.vehicle_types
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Row-wise copy of every booking.
    pub fn records(&self) -> DashboardResult<Vec<BookingRecord>> {
        records_from_batches(&self.batches)
    }
}

impl std::fmt::Debug for BookingDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingDataset")
            .field("rows", &self.num_rows())
            .field("vehicle_types", &self.vehicle_types)
            .finish()
    }
}

/// Loads the bookings file at `path`.
pub async fn load_bookings(path: &Path) -> DashboardResult<BookingDataset> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(DashboardError::DataFileNotFound(format!(
                "{} is not a file",
                path.display()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DashboardError::DataFileNotFound(path.display().to_string()))
        }
        Err(e) => return Err(DashboardError::from(e)),
    }
    let format = DataFormat::from_path(path)?;
    let path_str = path.to_str().ok_or_else(|| {
        DashboardError::InvalidParameter(format!("Path {} is not valid UTF-8", path.display()))
    })?;

    // A single partition keeps rows in file order.
    let ctx = SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1));
    let raw = match format {
        DataFormat::Csv => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e))
                .unwrap_or_else(|| ".csv".to_string());
            // Read every column as text; numeric coercion happens in `normalize_columns`
            // so stray tokens like "null" never fail the parse.
            let inferred = ctx
                .read_csv(
                    path_str,
                    CsvReadOptions::new().has_header(true).file_extension(&ext),
                )
                .await?;
            let text_schema = Schema::new(
                inferred
                    .schema()
                    .fields()
                    .iter()
                    .map(|f| Field::new(f.name(), DataType::Utf8, true))
                    .collect::<Vec<_>>(),
            );
            ctx.read_csv(
                path_str,
                CsvReadOptions::new()
                    .has_header(true)
                    .file_extension(&ext)
                    .schema(&text_schema),
            )
            .await?
        }
        DataFormat::Parquet => ctx.read_parquet(path_str, ParquetReadOptions::default()).await?,
    };

    let normalized = normalize_columns(raw)?;
    let batches = normalized.collect().await?;
    let dataset = BookingDataset::from_batches(batches)?;
    info!(
        path = %path.display(),
        rows = dataset.num_rows(),
        vehicle_types = dataset.vehicle_types().len(),
        "Loaded bookings dataset"
    );
    Ok(dataset)
}

/// Validates that every required column exists in the DataFrame.
fn validate_columns(df: &DataFrame) -> DashboardResult<()> {
    let schema = df.schema();
    for col_name in REQUIRED_COLUMNS {
        if schema.field_with_unqualified_name(col_name).is_err() {
            return Err(DashboardError::MissingColumn(format!(
                "Column '{}' not found in bookings file",
                col_name
            )));
        }
    }
    Ok(())
}

/// Projects the required columns and coerces them to the types of [`booking_schema`].
fn normalize_columns(df: DataFrame) -> DashboardResult<DataFrame> {
    validate_columns(&df)?;
    let exprs: Vec<Expr> = REQUIRED_COLUMNS
        .iter()
        .map(|name| {
            if is_numeric_column(name) {
                non_finite_to_null(try_cast(
                    missing_tokens_to_null(cast(ident(*name), DataType::Utf8)),
                    DataType::Float64,
                ))
                .alias(*name)
            } else {
                missing_tokens_to_null(cast(ident(*name), DataType::Utf8)).alias(*name)
            }
        })
        .collect();
    df.select(exprs).map_err(DashboardError::from)
}

/// `CASE WHEN value > -inf AND value < inf THEN value END`
///
/// Text such as `inf` parses as a float; infinities and NaN are treated as missing.
fn non_finite_to_null(value: Expr) -> Expr {
    Expr::Case(DFCase {
        expr: None,
        when_then_expr: vec![(
            Box::new(
                value
                    .clone()
                    .gt(lit(f64::NEG_INFINITY))
                    .and(value.clone().lt(lit(f64::INFINITY))),
            ),
            Box::new(value),
        )],
        else_expr: None,
    })
}

/// `CASE WHEN btrim(value) IN (<tokens>) THEN NULL ELSE value END`
fn missing_tokens_to_null(value: Expr) -> Expr {
    let tokens: Vec<Expr> = MISSING_VALUE_TOKENS.iter().map(|t| lit(*t)).collect();
    Expr::Case(DFCase {
        expr: None,
        when_then_expr: vec![(
            Box::new(btrim(vec![value.clone()]).in_list(tokens, false)),
            Box::new(lit(ScalarValue::Utf8(None))),
        )],
        else_expr: Some(Box::new(value)),
    })
}

/// Distinct non-null values of a string column, in order of first appearance.
fn distinct_in_order(batches: &[RecordBatch], col_name: &str) -> DashboardResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for batch in batches {
        let array = crate::schema::column_by_name(batch, col_name)?;
        for row in 0..batch.num_rows() {
            if let Some(value) = string_at(array, row)? {
                if seen.insert(value.clone()) {
                    values.push(value);
                }
            }
        }
    }
    Ok(values)
}

/// Process-wide cache for the bookings dataset.
///
/// The first successful [`DatasetCache::get`] loads the file; later calls reuse it.
/// An error is returned to the caller and not stored, so the next call loads again.
pub struct DatasetCache {
    path: PathBuf,
    slot: Mutex<Option<Arc<BookingDataset>>>,
    loads: AtomicUsize,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// Returns the cached dataset, loading it first if needed.
    pub async fn get(&self) -> DashboardResult<Arc<BookingDataset>> {
        let mut slot = self.slot.lock().await;
        if let Some(dataset) = slot.as_ref() {
            debug!("Serving bookings dataset from cache");
            return Ok(Arc::clone(dataset));
        }
        let dataset = match load_bookings(&self.path).await {
            Ok(dataset) => Arc::new(dataset),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load bookings dataset");
                return Err(e);
            }
        };
        self.loads.fetch_add(1, Ordering::Relaxed);
        *slot = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drops the cached dataset; the next [`DatasetCache::get`] reads the file again.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!(path = %self.path.display(), "Invalidated bookings cache");
        }
    }

    /// Number of successful loads so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
