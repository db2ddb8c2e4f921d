//! Inscription (enrollment) model.

use serde::{Deserialize, Serialize};

use super::{de, CourseSnapshot};

/// Payment state of an inscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// A student's enrollment as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inscription {
    #[serde(alias = "_id", deserialize_with = "de::id")]
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    #[serde(default)]
    pub celular: String,
    #[serde(default, deserialize_with = "de::id")]
    pub course_id: String,
    #[serde(default)]
    pub course_title: String,
    #[serde(default, deserialize_with = "de::opt_amount")]
    pub course_price: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub turno_id: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "de::opt_amount")]
    pub deposit_amount: Option<f64>,
    #[serde(default)]
    pub deposit_date: Option<String>,
    #[serde(default)]
    pub is_reserved: bool,
    #[serde(default)]
    pub fecha_inscripcion: Option<String>,
}

/// Payload posted when a student enrolls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInscription {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub celular: String,
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turno_id: Option<String>,
    #[serde(flatten)]
    pub course: CourseSnapshot,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

/// Deposit (seña) recorded against an inscription.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositUpdate {
    pub deposit_amount: f64,
    pub deposit_date: String,
}

/// Total number of inscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscriptionCount {
    #[serde(alias = "count")]
    pub total: u64,
}
