//! ## Frequency Tables
//!
//! [`ValueCounts`] counts how often each non-null value of a categorical column occurs.
//! Results are ordered by count descending, with ties broken by label ascending so the
//! order does not depend on how DataFusion partitions the groups. An optional limit keeps
//! only the first `n` rows ("top 10 pickup locations").

use super::Aggregator;
use crate::exceptions::DashboardResult;
use crate::filter::DropMissing;
use crate::schema::{count_at, string_at};
use crate::view_pipeline;
use async_trait::async_trait;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::prelude::DataFrame;
use datafusion_expr::ident;
use serde::Serialize;

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: u64,
}

/// Value counts of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    pub column: String,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Sum of all counts in the table.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count for `label`, or 0 if it is not in the table.
    pub fn count_of(&self, label: &str) -> u64 {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map_or(0, |e| e.count)
    }

    /// `(label, value)` pairs, the shape the chart renderer takes.
    pub fn as_series(&self) -> Vec<(String, f64)> {
        self.entries
            .iter()
            .map(|e| (e.label.clone(), e.count as f64))
            .collect()
    }
}

/// Counts occurrences of each non-null value of `column`.
#[derive(Debug, Clone)]
pub struct ValueCounts {
    pub column: String,
    pub limit: Option<usize>,
}

impl ValueCounts {
    pub fn new(column: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            column: column.into(),
            limit,
        }
    }
}

#[async_trait]
impl Aggregator for ValueCounts {
    type Output = FrequencyTable;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<FrequencyTable> {
        let labelled =
            view_pipeline!(DropMissing::new(vec![self.column.clone()])).apply(df.clone())?;
        let column = ident(&self.column);
        let grouped = labelled
            .aggregate(vec![column.clone()], vec![count(column.clone()).alias("count")])?
            .sort(vec![ident("count").sort(false, false), column.sort(true, false)])?
            .limit(0, self.limit)?;
        let batches = grouped.collect().await?;

        let mut entries = Vec::new();
        for batch in &batches {
            let labels = batch.column(0);
            let counts = batch.column(1);
            for row in 0..batch.num_rows() {
                if let Some(label) = string_at(labels, row)? {
                    entries.push(FrequencyEntry {
                        label,
                        count: count_at(counts, row)?,
                    });
                }
            }
        }
        Ok(FrequencyTable {
            column: self.column.clone(),
            entries,
        })
    }
}
