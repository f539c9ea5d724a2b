//! ## Rating Histograms
//!
//! [`RatingHistogram`] splits the non-null values of a numeric column into equal-width bins
//! spanning `[min, max]`. Every bin is half-open `[lower, upper)` except the last one, which
//! also includes `max`. When all values are equal the range is widened by 0.5 on each side
//! so the bins still have a width. Non-finite values are ignored, and a column without finite
//! values produces no bins.

use super::{first_row, Aggregator};
use crate::exceptions::{DashboardError, DashboardResult};
use crate::schema::{count_at, f64_at};
use async_trait::async_trait;
use datafusion::functions_aggregate::expr_fn::{count, max, min};
use datafusion::prelude::DataFrame;
use datafusion::scalar::ScalarValue;
use datafusion_expr::{ident, lit, Case as DFCase, Expr};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Number of values that fell into any bin.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Computes `bins` equal-width `(lower, upper)` edges covering `[min, max]`.
///
/// The last upper edge is exactly `max` (or `max + 0.5` for a degenerate range).
pub fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<(f64, f64)> {
    if bins == 0 || !min.is_finite() || !max.is_finite() || min > max {
        return Vec::new();
    }
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;
    (0..bins)
        .map(|i| {
            let lower = lo + width * i as f64;
            let upper = if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            };
            (lower, upper)
        })
        .collect()
}

/// `CASE WHEN col >= l0 AND col < u0 THEN 0 ... WHEN col >= ln AND col <= un THEN n END`
fn build_bin_index_expr(col_name: &str, edges: &[(f64, f64)]) -> Expr {
    let n = edges.len();
    let when_then_expr = edges
        .iter()
        .enumerate()
        .map(|(i, (lower, upper))| {
            let condition = if i == n - 1 {
                ident(col_name)
                    .gt_eq(lit(*lower))
                    .and(ident(col_name).lt_eq(lit(*upper)))
            } else {
                ident(col_name)
                    .gt_eq(lit(*lower))
                    .and(ident(col_name).lt(lit(*upper)))
            };
            (Box::new(condition), Box::new(lit(i as i64)))
        })
        .collect::<Vec<_>>();
    Expr::Case(DFCase {
        expr: None,
        when_then_expr,
        else_expr: Some(Box::new(lit(ScalarValue::Int64(None)))),
    })
}

/// `-inf < col < inf`; false for NaN as well.
fn is_finite(col_name: &str) -> Expr {
    ident(col_name)
        .gt(lit(f64::NEG_INFINITY))
        .and(ident(col_name).lt(lit(f64::INFINITY)))
}

/// Histogram of a numeric column with a fixed number of bins.
#[derive(Debug, Clone)]
pub struct RatingHistogram {
    pub column: String,
    pub bins: usize,
}

impl RatingHistogram {
    pub fn new(column: impl Into<String>, bins: usize) -> Self {
        Self {
            column: column.into(),
            bins,
        }
    }

    async fn value_range(&self, df: &DataFrame) -> DashboardResult<Option<(f64, f64)>> {
        let batches = df
            .clone()
            .aggregate(
                vec![],
                vec![
                    min(ident(&self.column)).alias("min"),
                    max(ident(&self.column)).alias("max"),
                ],
            )?
            .collect()
            .await?;
        let Some(batch) = first_row(&batches) else {
            return Ok(None);
        };
        match (f64_at(batch.column(0), 0)?, f64_at(batch.column(1), 0)?) {
            (Some(lo), Some(hi)) => Ok(Some((lo, hi))),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl Aggregator for RatingHistogram {
    type Output = Histogram;

    async fn compute(&self, df: &DataFrame) -> DashboardResult<Histogram> {
        if df.schema().field_with_unqualified_name(&self.column).is_err() {
            return Err(DashboardError::MissingColumn(format!(
                "Column '{}' not found in DataFrame",
                self.column
            )));
        }
        let finite = df.clone().filter(is_finite(&self.column))?;
        let edges = match self.value_range(&finite).await? {
            Some((lo, hi)) => bin_edges(lo, hi, self.bins),
            None => Vec::new(),
        };
        if edges.is_empty() {
            return Ok(Histogram {
                column: self.column.clone(),
                bins: Vec::new(),
            });
        }

        let batches = finite
            .select(vec![build_bin_index_expr(&self.column, &edges).alias("bin")])?
            .aggregate(vec![ident("bin")], vec![count(lit(1i64)).alias("count")])?
            .collect()
            .await?;

        let mut counts = vec![0u64; edges.len()];
        for batch in &batches {
            for row in 0..batch.num_rows() {
                if let Some(bin) = f64_at(batch.column(0), row)? {
                    let idx = bin as usize;
                    if idx < counts.len() {
                        counts[idx] += count_at(batch.column(1), row)?;
                    }
                }
            }
        }

        Ok(Histogram {
            column: self.column.clone(),
            bins: edges
                .into_iter()
                .zip(counts)
                .map(|((lower, upper), count)| HistogramBin {
                    lower,
                    upper,
                    count,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_edges_cover_range() {
        let edges = bin_edges(3.0, 5.0, 10);
        assert_eq!(edges.len(), 10);
        assert_eq!(edges[0].0, 3.0);
        assert_eq!(edges[9].1, 5.0);
        for pair in edges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        assert!((edges[0].1 - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_bin_edges_degenerate_range() {
        let edges = bin_edges(4.0, 4.0, 10);
        assert_eq!(edges.len(), 10);
        assert_eq!(edges[0].0, 3.5);
        assert_eq!(edges[9].1, 4.5);
    }

    #[test]
    fn test_bin_edges_invalid_input() {
        assert!(bin_edges(1.0, 2.0, 0).is_empty());
        assert!(bin_edges(f64::NAN, 2.0, 10).is_empty());
        assert!(bin_edges(3.0, 2.0, 10).is_empty());
    }
}
