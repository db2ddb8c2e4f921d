//! Public catalog endpoints: course cards, course detail and the slot picker.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{success, ApiResult};
use crate::backend::find_course;
use crate::models::Course;
use crate::schedule::{selector_options, SelectorOption};
use crate::AppState;

/// How a visitor gets into a course from its card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseEntry {
    /// In-person workshop: pick a slot, then fill the inscription form.
    Enroll,
    /// Zero-price course: inscription form only.
    Free,
    /// Online paid course: payment button.
    Pay,
}

impl PurchaseEntry {
    pub fn for_course(course: &Course) -> Self {
        if course.is_presencial {
            PurchaseEntry::Enroll
        } else if course.is_free() {
            PurchaseEntry::Free
        } else {
            PurchaseEntry::Pay
        }
    }
}

/// Course card as the catalog grid renders it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCard {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub price_label: String,
    pub short_description: String,
    pub image_url: String,
    pub category: String,
    pub is_presencial: bool,
    pub entry: PurchaseEntry,
}

impl From<&Course> for CourseCard {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            price: course.price,
            price_label: price_label(course.price),
            short_description: course.short_description.clone(),
            image_url: course.image_url.clone(),
            category: course.category.clone(),
            is_presencial: course.is_presencial,
            entry: PurchaseEntry::for_course(course),
        }
    }
}

/// `Gratis` for free courses, otherwise pesos with `.` thousands and `,` cents.
pub fn price_label(price: f64) -> String {
    if price <= 0.0 {
        return "Gratis".to_string();
    }

    let cents = (price * 100.0).round() as u64;
    let (whole, fraction) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if fraction == 0 {
        format!("$ {}", grouped)
    } else {
        format!("$ {},{:02}", grouped, fraction)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub course: Course,
    pub card: CourseCard,
}

#[derive(Debug, Deserialize)]
pub struct PickerQuery {
    #[serde(default)]
    pub selected: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnoPicker {
    pub course_id: String,
    pub options: Vec<SelectorOption>,
    pub has_availability: bool,
}

/// GET /api/catalog - Course cards for the catalog grid.
pub async fn list_catalog(State(state): State<AppState>) -> ApiResult<Vec<CourseCard>> {
    let courses = state.backend.list_courses().await?;
    success(courses.iter().map(CourseCard::from).collect())
}

/// GET /api/catalog/:id - Course detail page.
pub async fn get_course_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CourseDetail> {
    let course = find_course(state.backend.as_ref(), &id).await?;
    let card = CourseCard::from(&course);
    success(CourseDetail { course, card })
}

/// GET /api/catalog/paid/:title - Content unlocked after paying for a course.
pub async fn get_course_paid(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> ApiResult<Value> {
    success(state.backend.course_paid(&title).await?)
}

/// GET /api/courses/:id/turnos - Slot picker for an in-person course.
pub async fn get_turno_picker(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<PickerQuery>,
) -> ApiResult<TurnoPicker> {
    let turnos = state.backend.list_turnos(&course_id, None).await?;
    let options = selector_options(turnos, query.selected.as_deref());
    let has_availability = options.iter().any(|o| o.selectable);
    success(TurnoPicker {
        course_id,
        options,
        has_availability,
    })
}
