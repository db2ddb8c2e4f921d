//! Admin slot management.
//!
//! Every write answers with the course's schedule as re-read from the
//! backend, never with a locally patched copy.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::{success, ApiResult, Confirmation};
use crate::backend::BearerToken;
use crate::errors::AppError;
use crate::models::{NewTurno, TurnoPatch};
use crate::schedule::{validate_new_turno, ScheduleView};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub course_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub is_blocked: bool,
}

async fn schedule(
    state: &AppState,
    token: &BearerToken,
    course_id: &str,
) -> Result<ScheduleView, AppError> {
    let turnos = state.backend.list_turnos(course_id, Some(token)).await?;
    Ok(ScheduleView::build(course_id, turnos))
}

/// GET /api/admin/courses/:course_id/turnos - Schedule with capacity indicators.
pub async fn get_schedule(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(course_id): Path<String>,
) -> ApiResult<ScheduleView> {
    success(schedule(&state, &token, &course_id).await?)
}

/// POST /api/admin/turnos - Add a slot.
pub async fn create_turno(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Json(input): Json<NewTurno>,
) -> ApiResult<ScheduleView> {
    let turno = validate_new_turno(input)?;
    let created = state.backend.create_turno(&token, &turno).await?;
    tracing::info!(turno_id = %created.id, course_id = %turno.course_id, "turno created");
    success(schedule(&state, &token, &turno.course_id).await?)
}

/// PATCH /api/admin/turnos/:id/block?courseId= - Block or unblock a slot.
///
/// A `{"isBlocked": bool}` body is applied as-is. Without one the current
/// flag is read back and flipped.
pub async fn toggle_turno_block(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Query(course): Query<CourseRef>,
    body: Option<Json<BlockRequest>>,
) -> ApiResult<ScheduleView> {
    let blocked = match body {
        Some(Json(request)) => request.is_blocked,
        None => {
            let current = state
                .backend
                .list_turnos(&course.course_id, Some(&token))
                .await?
                .into_iter()
                .find(|t| t.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Turno {} no encontrado", id)))?;
            !current.is_blocked
        }
    };

    let patch = TurnoPatch {
        is_blocked: Some(blocked),
    };
    state.backend.update_turno(&token, &id, &patch).await?;
    tracing::info!(turno_id = %id, blocked, "turno block updated");

    success(schedule(&state, &token, &course.course_id).await?)
}

/// DELETE /api/admin/turnos/:id?courseId=&confirm=true - Remove a slot.
pub async fn delete_turno(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Query(course): Query<CourseRef>,
    Query(confirmation): Query<Confirmation>,
) -> ApiResult<ScheduleView> {
    confirmation.require("este turno")?;
    state.backend.delete_turno(&token, &id).await?;
    tracing::info!(turno_id = %id, "turno deleted");
    success(schedule(&state, &token, &course.course_id).await?)
}
