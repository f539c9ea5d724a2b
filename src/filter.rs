//! ## Filter Stages
//!
//! View stages that narrow the bookings DataFrame:
//!
//! - [`VehicleTypeFilter`]: keeps rows whose vehicle type is in the selected set.
//!   An empty selection keeps every row.
//! - [`DropMissing`]: removes rows that have a missing value in any of the given columns.
//!
//! [`filtered_view`] is the entry point used for every interaction.

use crate::exceptions::{DashboardError, DashboardResult};
use crate::pipeline::ViewStage;
use crate::view_pipeline;
use crate::schema::VEHICLE_TYPE;
use datafusion::prelude::*;
use datafusion_expr::{ident, lit, Expr};
use std::collections::BTreeSet;
use tracing::debug;

/// Validates that every column in `target_cols` exists in the DataFrame.
fn validate_columns(df: &DataFrame, target_cols: &[String]) -> DashboardResult<()> {
    let schema = df.schema();
    for col_name in target_cols {
        if schema.field_with_unqualified_name(col_name).is_err() {
            return Err(DashboardError::MissingColumn(format!(
                "Column '{}' not found in DataFrame",
                col_name
            )));
        }
    }
    Ok(())
}

/// Keeps bookings whose vehicle type is one of `selected`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleTypeFilter {
    selected: BTreeSet<String>,
}

impl VehicleTypeFilter {
    /// Creates a filter from the selected vehicle types. Duplicates are ignored.
    pub fn new<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that selects nothing, which means "no filter".
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn contains(&self, vehicle_type: &str) -> bool {
        self.selected.contains(vehicle_type)
    }
}

impl ViewStage for VehicleTypeFilter {
    fn name(&self) -> &str {
        "vehicle_type_filter"
    }

    fn apply(&self, df: DataFrame) -> DashboardResult<DataFrame> {
        validate_columns(&df, &[VEHICLE_TYPE.to_string()])?;
        if self.selected.is_empty() {
            return Ok(df);
        }
        let values: Vec<Expr> = self.selected.iter().map(|v| lit(v.as_str())).collect();
        df.filter(ident(VEHICLE_TYPE).in_list(values, false))
            .map_err(DashboardError::from)
    }
}

/// Removes rows that contain a missing value in the given columns.
#[derive(Debug, Clone)]
pub struct DropMissing {
    pub columns: Vec<String>,
}

impl DropMissing {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }
}

impl ViewStage for DropMissing {
    fn name(&self) -> &str {
        "drop_missing"
    }

    fn apply(&self, df: DataFrame) -> DashboardResult<DataFrame> {
        validate_columns(&df, &self.columns)?;
        let combined = self
            .columns
            .iter()
            .map(|col_name| ident(col_name).is_not_null())
            .reduce(|acc, expr| acc.and(expr));
        match combined {
            Some(predicate) => df.filter(predicate).map_err(DashboardError::from),
            None => Ok(df),
        }
    }
}

/// Applies the vehicle-type selection to the full bookings DataFrame.
pub fn filtered_view(df: DataFrame, filter: &VehicleTypeFilter) -> DashboardResult<DataFrame> {
    debug!(
        selected = ?filter.selected().collect::<Vec<_>>(),
        "Applying vehicle type filter"
    );
    view_pipeline!(filter.clone()).apply(df)
}
