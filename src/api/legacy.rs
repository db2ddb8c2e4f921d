//! Read-only legacy inscriptions view.
//!
//! Kept for staff bookmarks. It sits behind both the bearer token and the
//! shared admin secret; the secret alone grants nothing.

use axum::{
    extract::{Query, State},
    Extension,
};

use super::admin_inscriptions::{inscription_table, InscriptionTable};
use super::{success, ApiResult};
use crate::backend::BearerToken;
use crate::listing::InscriptionQuery;
use crate::AppState;

/// GET /legacy/inscriptions?secret=
pub async fn legacy_inscriptions(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<InscriptionQuery>,
) -> ApiResult<InscriptionTable> {
    success(inscription_table(&state, &token, &query).await?)
}
