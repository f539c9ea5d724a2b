//! # Ride Insights
//!
//! A single-page analysis dashboard for ride-booking data, built on Apache DataFusion.
//!
//! The flow is linear: [`loader`] reads the bookings file once and caches it,
//! [`filter`] narrows it to the selected vehicle types, [`aggregates`] computes the
//! fixed set of metrics and tables, and [`report`] renders them as an HTML page that
//! [`server`] serves over HTTP.

pub mod aggregates;
pub mod exceptions;
pub mod filter;
pub mod format;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod server;
pub mod settings;
