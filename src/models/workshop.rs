//! Workshop inscription models used by the scheduling back-office.

use serde::{Deserialize, Serialize};

use super::{Course, Inscription, Turno};

/// Everything the backend knows about one workshop: its slots and enrollments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
    #[serde(default)]
    pub turnos: Vec<Turno>,
    #[serde(default)]
    pub inscriptions: Vec<Inscription>,
}

/// Request body for moving an inscription to another slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub turno_id: String,
}
