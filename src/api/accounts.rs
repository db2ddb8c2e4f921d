//! Login and registration, proxied to the backend.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::{AppError, FieldErrors};
use crate::models::{AuthSession, LoginRequest, RegisterRequest};
use crate::validation::{validate_email, validate_name, NameField};
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AuthSession> {
    let mut errors = FieldErrors::new();
    if request.email.trim().is_empty() {
        errors.insert("email".into(), "El email es obligatorio".into());
    }
    if request.password.is_empty() {
        errors.insert("password".into(), "La contraseña es obligatoria".into());
    }
    if !errors.is_empty() {
        return Err(AppError::form(errors));
    }

    let request = LoginRequest {
        email: request.email.trim().to_string(),
        password: request.password,
    };
    success(state.backend.login(&request).await?)
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let mut errors = FieldErrors::new();
    if let Some(message) = validate_name(&request.nombre, NameField::Nombre) {
        errors.insert("nombre".into(), message);
    }
    if !request.apellido.trim().is_empty() {
        if let Some(message) = validate_name(&request.apellido, NameField::Apellido) {
            errors.insert("apellido".into(), message);
        }
    }
    if let Some(message) = validate_email(&request.email) {
        errors.insert("email".into(), message);
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            "password".into(),
            format!(
                "La contraseña debe tener al menos {} caracteres",
                MIN_PASSWORD_LEN
            ),
        );
    }
    if !errors.is_empty() {
        return Err(AppError::form(errors));
    }

    let request = RegisterRequest {
        nombre: request.nombre.trim().to_string(),
        apellido: request.apellido.trim().to_string(),
        email: request.email.trim().to_string(),
        password: request.password,
    };
    success(state.backend.register(&request).await?)
}
