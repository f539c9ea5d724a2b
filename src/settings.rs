//! ## Dashboard Settings
//!
//! Runtime configuration for the dashboard. Every value has a default, and two of them can be
//! overridden from the environment:
//!
//! - `RIDE_INSIGHTS_DATA`: path to the bookings file (CSV or Parquet).
//! - `RIDE_INSIGHTS_ADDR`: socket address the HTTP server binds to.

use crate::exceptions::{DashboardError, DashboardResult};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DATA_PATH_ENV_VAR: &str = "RIDE_INSIGHTS_DATA";
pub const BIND_ADDR_ENV_VAR: &str = "RIDE_INSIGHTS_ADDR";

pub const DEFAULT_DATA_PATH: &str = "uber_bookings.csv";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_TITLE: &str = "Uber Ride Analysis Dashboard";
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Configuration shared by the loader, the aggregators and the server.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub data_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub title: String,
    /// Row limit for the "top N" frequency tables.
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl DashboardSettings {
    /// Reads overrides from the process environment.
    pub fn from_env() -> DashboardResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> DashboardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(path) = lookup(DATA_PATH_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            settings.data_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup(BIND_ADDR_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            settings.bind_addr = parse_addr(&addr)?;
        }
        Ok(settings)
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            title: DEFAULT_TITLE.to_string(),
            top_n: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

fn parse_addr(value: &str) -> DashboardResult<SocketAddr> {
    value.trim().parse().map_err(|_| {
        DashboardError::InvalidParameter(format!(
            "{} must be a socket address like {}, got '{}'",
            BIND_ADDR_ENV_VAR, DEFAULT_BIND_ADDR, value
        ))
    })
}
