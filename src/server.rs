//! ## HTTP Surface
//!
//! Serves the dashboard with `axum`. Every request reruns filter → aggregate → render
//! against the cached dataset.
//!
//! | Route          | Response                                     |
//! |----------------|----------------------------------------------|
//! | `GET /`        | HTML dashboard                               |
//! | `GET /api/summary` | The same aggregates as JSON              |
//! | `GET /healthz` | `ok`                                         |
//!
//! The vehicle-type selection travels as repeated `vehicle_type` query parameters,
//! which is what a `<select multiple>` form submits.

use crate::aggregates::{summarize, SummaryOptions};
use crate::exceptions::DashboardResult;
use crate::filter::VehicleTypeFilter;
use crate::loader::DatasetCache;
use crate::report::{render_dashboard, render_error_page, PageContext, VEHICLE_TYPE_PARAM};
use crate::settings::DashboardSettings;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DatasetCache>,
    pub settings: Arc<DashboardSettings>,
}

impl AppState {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            cache: Arc::new(DatasetCache::new(settings.data_path.clone())),
            settings: Arc::new(settings),
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/summary", get(summary_json))
        .route("/healthz", get(healthz))
        .with_state(app_state)
}

/// Reads the vehicle-type selection from a raw query string.
pub fn parse_selection(query: Option<&str>) -> VehicleTypeFilter {
    let Some(query) = query else {
        return VehicleTypeFilter::all();
    };
    VehicleTypeFilter::new(
        url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, value)| key == VEHICLE_TYPE_PARAM && !value.is_empty())
            .map(|(_, value)| value.into_owned()),
    )
}

async fn dashboard(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let filter = parse_selection(query.as_deref());
    let start = Instant::now();
    match render_for(&state, &filter).await {
        Ok(page) => {
            info!(elapsed = ?start.elapsed(), "Rendered dashboard");
            Html(page).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Dashboard unavailable");
            let ctx = PageContext {
                title: &state.settings.title,
                vehicle_types: &[],
                filter: &filter,
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_error_page(&ctx, &e.to_string())),
            )
                .into_response()
        }
    }
}

async fn render_for(state: &AppState, filter: &VehicleTypeFilter) -> DashboardResult<String> {
    let dataset = state.cache.get().await?;
    let options = SummaryOptions::from(state.settings.as_ref());
    let summary = summarize(&dataset, filter, &options).await?;
    let ctx = PageContext {
        title: &state.settings.title,
        vehicle_types: dataset.vehicle_types(),
        filter,
    };
    Ok(render_dashboard(&ctx, &summary))
}

async fn summary_json(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let filter = parse_selection(query.as_deref());
    let result = async {
        let dataset = state.cache.get().await?;
        let options = SummaryOptions::from(state.settings.as_ref());
        summarize(&dataset, &filter, &options).await
    }
    .await;
    match result {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({"data": summary, "success": true})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string(), "success": false})),
        )
            .into_response(),
    }
}

async fn healthz() -> &'static str {
    "ok"
}
