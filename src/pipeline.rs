//! ## View Pipeline
//!
//! Core abstraction for narrowing the bookings DataFrame before aggregation.
//!
//! ### Overview
//!
//! - The [`ViewStage`] trait is one step that turns a DataFrame into a (usually smaller) DataFrame.
//!   Stages only extend the logical plan; nothing executes until an aggregate collects.
//! - The [`ViewPipeline`] struct chains stages in order.
//! - The [`crate::view_pipeline`] macro boxes stages and builds a pipeline in one call.

use crate::exceptions::{DashboardError, DashboardResult};
use datafusion::prelude::*;
use std::time::Instant;
use tracing::debug;

/// One step of a view pipeline.
pub trait ViewStage {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Applies the stage, returning a new DataFrame.
    fn apply(&self, df: DataFrame) -> DashboardResult<DataFrame>;
}

/// A sequence of stages applied one after another.
///
/// An empty pipeline is valid and returns its input unchanged.
#[derive(Default)]
pub struct ViewPipeline {
    stages: Vec<Box<dyn ViewStage + Send + Sync>>,
}

impl ViewPipeline {
    pub fn new(stages: Vec<Box<dyn ViewStage + Send + Sync>>) -> Self {
        Self { stages }
    }

    /// Appends a stage.
    pub fn with_stage<S>(mut self, stage: S) -> Self
    where
        S: ViewStage + Send + Sync + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Applies every stage in order.
    pub fn apply(&self, df: DataFrame) -> DashboardResult<DataFrame> {
        let mut current_df = df;
        for stage in &self.stages {
            let start = Instant::now();
            current_df = stage.apply(current_df).map_err(|e| match e {
                DashboardError::MissingColumn(msg) => DashboardError::MissingColumn(msg),
                other => DashboardError::InvalidParameter(format!(
                    "Error in view stage '{}': {}",
                    stage.name(),
                    other
                )),
            })?;
            debug!(stage = stage.name(), elapsed = ?start.elapsed(), "Applied view stage");
        }
        Ok(current_df)
    }
}

/// Builds a [`ViewPipeline`] from a list of stages, boxing each one.
///
/// # Example
///
/// ```rust,no_run
/// use ride_insights::view_pipeline;
/// use ride_insights::filter::{DropMissing, VehicleTypeFilter};
///
/// let pipeline = view_pipeline!(
///     VehicleTypeFilter::new(vec!["Auto".to_string()]),
///     DropMissing::new(vec!["Ride Distance".to_string()]),
/// );
/// ```
#[macro_export]
macro_rules! view_pipeline {
    ($($stage:expr),+ $(,)?) => {
        {
            let stages: Vec<Box<dyn $crate::pipeline::ViewStage + Send + Sync>> = vec![
                $(
                    Box::new($stage),
                )+
            ];
            $crate::pipeline::ViewPipeline::new(stages)
        }
    };
}
