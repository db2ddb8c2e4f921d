//! Public site content: testimonials, tariffs and page configuration.

use axum::extract::{Query, State};
use serde::Serialize;
use serde_json::Value;

use super::{success, ApiResult};
use crate::models::{Tariff, Testimonial};
use crate::AppState;

/// Settings the pages need at load time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub payments_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_id: Option<String>,
    pub search_debounce_ms: u64,
}

/// GET /api/testimonials
pub async fn list_testimonials(State(state): State<AppState>) -> ApiResult<Vec<Testimonial>> {
    success(state.backend.testimonials().await?)
}

/// GET /api/tariffs
pub async fn list_tariffs(State(state): State<AppState>) -> ApiResult<Vec<Tariff>> {
    success(state.backend.tariffs().await?)
}

/// GET /api/tariffs/meta
pub async fn get_tariffs_meta(State(state): State<AppState>) -> ApiResult<Value> {
    success(state.backend.tariffs_meta().await?)
}

/// GET /api/tariffs/search - Filters are passed through untouched.
pub async fn search_tariffs(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Tariff>> {
    success(state.backend.search_tariffs(&params).await?)
}

/// GET /api/site/config
pub async fn get_site_config(State(state): State<AppState>) -> ApiResult<SiteConfig> {
    let config = &state.config;
    success(SiteConfig {
        payments_enabled: config.payment_public_key.is_some(),
        payment_public_key: config.payment_public_key.clone(),
        analytics_id: config.analytics_id.clone(),
        search_debounce_ms: state.search.window().as_millis() as u64,
    })
}
