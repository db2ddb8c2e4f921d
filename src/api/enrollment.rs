//! Public inscription endpoint.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{extract::State, Json};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{send_best_effort, success, ApiResult};
use crate::backend::find_course;
use crate::errors::AppError;
use crate::models::{EmailRequest, Inscription, NewInscription};
use crate::schedule::ensure_selectable;
use crate::validation::InscriptionForm;
use crate::AppState;

pub const FREE_SUCCESS_MESSAGE: &str =
    "¡Inscripción exitosa! Revisa tu correo para acceder al curso.";
pub const PAID_SUCCESS_MESSAGE: &str =
    "¡Inscripción registrada! Revisa tu correo para completar el pago.";

/// Submissions currently in flight, keyed by email and course.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl SubmissionGuard {
    fn entries(&self) -> MutexGuard<'_, HashSet<String>> {
        match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Claim `(email, course)`; `None` while another submission holds it.
    pub fn begin(self: &Arc<Self>, email: &str, course_id: &str) -> Option<SubmissionPermit> {
        let key = format!("{}|{}", email.trim().to_lowercase(), course_id);
        if !self.entries().insert(key.clone()) {
            return None;
        }
        Some(SubmissionPermit {
            guard: Arc::clone(self),
            key,
        })
    }
}

/// Releases its claim when dropped.
#[derive(Debug)]
pub struct SubmissionPermit {
    guard: Arc<SubmissionGuard>,
    key: String,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.guard.entries().remove(&self.key);
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    pub course_id: String,
    #[serde(flatten)]
    pub form: InscriptionForm,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentOutcome {
    pub inscription: Inscription,
    pub message: String,
    /// Blank form for the page to reset to.
    pub form: InscriptionForm,
}

/// POST /api/inscriptions - Enroll a visitor in a course.
pub async fn submit_inscription(
    State(state): State<AppState>,
    Json(request): Json<EnrollmentRequest>,
) -> ApiResult<EnrollmentOutcome> {
    let EnrollmentRequest { course_id, form } = request;

    // Field errors never reach the backend.
    form.check().map_err(AppError::form)?;

    let course = find_course(state.backend.as_ref(), &course_id).await?;

    let turno_id = if course.is_presencial {
        let Some(selected) = form.selected_turno() else {
            return Err(AppError::field("turnoId", "Selecciona un turno"));
        };
        let turnos = state.backend.list_turnos(&course.id, None).await?;
        Some(ensure_selectable(&turnos, selected)?.id.clone())
    } else {
        None
    };

    let _permit = state
        .submissions
        .begin(&form.email, &course.id)
        .ok_or_else(|| {
            AppError::Conflict("Ya estamos procesando tu inscripción a este curso".to_string())
        })?;

    let payload = NewInscription {
        nombre: form.nombre.trim().to_string(),
        apellido: form.apellido.trim().to_string(),
        email: form.email.trim().to_string(),
        celular: form.celular.trim().to_string(),
        course_id: course.id.clone(),
        turno_id,
        course: course.snapshot(),
        year: Utc::now().year(),
    };

    let inscription = state.backend.create_inscription(&payload).await?;
    tracing::info!(
        inscription_id = %inscription.id,
        course_id = %course.id,
        "inscription created"
    );

    send_best_effort(
        state.backend.as_ref(),
        EmailRequest::inscription_confirmation(
            &payload.email,
            &payload.nombre,
            &course.title,
            course.deeplink.clone(),
        ),
    )
    .await;

    let message = if course.is_free() {
        FREE_SUCCESS_MESSAGE
    } else {
        PAID_SUCCESS_MESSAGE
    };

    success(EnrollmentOutcome {
        inscription,
        message: message.to_string(),
        form: InscriptionForm::default(),
    })
}
