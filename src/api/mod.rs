//! REST API module.
//!
//! Contains all routes and handlers the site's pages call.

mod accounts;
mod admin_courses;
mod admin_inscriptions;
mod admin_turnos;
mod admin_workshops;
mod catalog;
mod enrollment;
mod legacy;
mod payment;
mod site;

pub use accounts::*;
pub use admin_courses::*;
pub use admin_inscriptions::*;
pub use admin_turnos::*;
pub use admin_workshops::*;
pub use catalog::*;
pub use enrollment::*;
pub use legacy::*;
pub use payment::*;
pub use site::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::BackendApi;
use crate::errors::AppError;
use crate::models::EmailRequest;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Explicit confirmation for destructive actions (`?confirm=true`).
#[derive(Debug, Default, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub confirm: bool,
}

impl Confirmation {
    pub fn require(&self, what: &str) -> Result<(), AppError> {
        if self.confirm {
            Ok(())
        } else {
            Err(AppError::ConfirmationRequired(format!(
                "Confirma que deseas eliminar {}",
                what
            )))
        }
    }
}

/// Acknowledgement of a deletion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub id: String,
}

/// Send an email without letting its failure affect the caller.
///
/// Returns whether the backend accepted it.
pub(crate) async fn send_best_effort(backend: &dyn BackendApi, email: EmailRequest) -> bool {
    match backend.send_email(&email).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(kind = ?email.kind, "confirmation email not sent: {}", e);
            false
        }
    }
}
