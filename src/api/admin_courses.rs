//! Admin course management.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use super::{success, ApiResult, Confirmation, Deleted};
use crate::backend::BearerToken;
use crate::listing::{CourseColumn, CourseQuery, TableView};
use crate::models::Course;
use crate::validation::CourseInput;
use crate::AppState;

/// GET /api/admin/courses - Paginated, sortable course table.
pub async fn list_admin_courses(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<CourseQuery>,
) -> ApiResult<TableView<Course, CourseColumn>> {
    let page = state.backend.list_courses_admin(&token, &query).await?;
    success(TableView::new(page, query.sort(), query.limit))
}

/// POST /api/admin/courses - Create a course.
pub async fn create_course(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Json(input): Json<CourseInput>,
) -> ApiResult<Course> {
    let input = input.into_checked()?;
    let course = state.backend.create_course(&token, &input).await?;
    tracing::info!(course_id = %course.id, "course created");
    success(course)
}

/// PUT /api/admin/courses/:id - Replace a course's fields.
pub async fn update_course(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(input): Json<CourseInput>,
) -> ApiResult<Course> {
    let input = input.into_checked()?;
    let course = state.backend.update_course(&token, &id, &input).await?;
    tracing::info!(course_id = %course.id, "course updated");
    success(course)
}

/// DELETE /api/admin/courses/:id?confirm=true - Delete a course.
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Query(confirmation): Query<Confirmation>,
) -> ApiResult<Deleted> {
    confirmation.require("este curso")?;
    state.backend.delete_course(&token, &id).await?;
    tracing::info!(course_id = %id, "course deleted");
    success(Deleted { id })
}
