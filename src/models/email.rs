//! Transactional email requests forwarded to the backend mailer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    InscriptionConfirmation,
    PaymentConfirmation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub kind: EmailKind,
    pub nombre: String,
    pub course_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,
}

impl EmailRequest {
    pub fn inscription_confirmation(
        to: &str,
        nombre: &str,
        course_title: &str,
        deeplink: Option<String>,
    ) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("Inscripción confirmada: {}", course_title),
            kind: EmailKind::InscriptionConfirmation,
            nombre: nombre.to_string(),
            course_title: course_title.to_string(),
            deeplink,
        }
    }

    pub fn payment_confirmation(to: &str, nombre: &str, course_title: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("Recibimos tu pago: {}", course_title),
            kind: EmailKind::PaymentConfirmation,
            nombre: nombre.to_string(),
            course_title: course_title.to_string(),
            deeplink: None,
        }
    }
}
