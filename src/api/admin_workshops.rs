//! In-person workshop administration: rosters and rescheduling.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{success, ApiResult};
use crate::backend::BearerToken;
use crate::errors::AppError;
use crate::models::{Inscription, RescheduleRequest};
use crate::schedule::{ensure_selectable, selector_options, SelectorOption, WorkshopRoster};
use crate::AppState;

/// GET /api/admin/workshops/:workshop_id/inscriptions
pub async fn list_workshop_inscriptions(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(workshop_id): Path<String>,
) -> ApiResult<Vec<Inscription>> {
    success(state.backend.workshop_inscriptions(&token, &workshop_id).await?)
}

/// GET /api/admin/workshops/:workshop_id/details - Students grouped by slot.
pub async fn get_workshop_roster(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(workshop_id): Path<String>,
) -> ApiResult<WorkshopRoster> {
    let details = state.backend.workshop_details(&token, &workshop_id).await?;
    success(WorkshopRoster::build(details))
}

/// GET /api/admin/workshop-inscriptions/:id/available-turnos
pub async fn get_available_turnos(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> ApiResult<Vec<SelectorOption>> {
    let turnos = state.backend.available_turnos(&token, &id).await?;
    success(selector_options(turnos, None))
}

/// PUT /api/admin/workshop-inscriptions/:id/schedule - Move a student to another slot.
pub async fn reschedule_inscription(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(request): Json<RescheduleRequest>,
) -> ApiResult<Inscription> {
    let turno_id = request.turno_id.trim();
    if turno_id.is_empty() {
        return Err(AppError::field("turnoId", "Selecciona un turno"));
    }

    let available = state.backend.available_turnos(&token, &id).await?;
    let turno = ensure_selectable(&available, turno_id)?;

    let request = RescheduleRequest {
        turno_id: turno.id.clone(),
    };
    let inscription = state.backend.reschedule(&token, &id, &request).await?;
    tracing::info!(inscription_id = %id, turno_id = %request.turno_id, "inscription rescheduled");
    success(inscription)
}
