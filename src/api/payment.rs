//! Payment endpoints for paid online courses.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{success, ApiResult};
use crate::backend::find_course;
use crate::errors::AppError;
use crate::models::PreferenceRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub course_id: String,
    #[serde(default)]
    pub payer_email: Option<String>,
}

/// What the payment widget needs to render.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWidget {
    pub preference_id: String,
    pub public_key: String,
    pub course_title: String,
    pub price: f64,
}

/// POST /api/payment/preference - Create a checkout preference for a paid course.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<PaymentWidget> {
    let public_key = state
        .config
        .payment_public_key
        .clone()
        .ok_or_else(|| AppError::Unavailable("Los pagos no están disponibles".to_string()))?;

    let course = find_course(state.backend.as_ref(), &request.course_id).await?;
    if course.is_free() {
        return Err(AppError::BadRequest(
            "Este curso es gratuito, no requiere pago".to_string(),
        ));
    }

    let preference = state
        .backend
        .create_preference(&PreferenceRequest {
            course_id: course.id.clone(),
            title: course.title.clone(),
            price: course.price,
            quantity: 1,
            payer_email: request
                .payer_email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        })
        .await?;

    tracing::info!(course_id = %course.id, preference_id = %preference.preference_id, "checkout created");

    success(PaymentWidget {
        preference_id: preference.preference_id,
        public_key,
        course_title: course.title,
        price: course.price,
    })
}

/// GET /api/payment/data - Payment result lookup, parameters passed through.
pub async fn get_payment_data(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Value> {
    success(state.backend.payment_data(&params).await?)
}
