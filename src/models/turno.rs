//! Turno (workshop time slot) model.

use serde::{Deserialize, Serialize};

use super::de;

/// A bookable weekly slot of an in-person course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turno {
    #[serde(alias = "_id", deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::id")]
    pub course_id: String,
    pub dia_semana: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub cupo_maximo: u32,
    #[serde(default)]
    pub cupos_inscriptos: u32,
    #[serde(default)]
    pub is_blocked: bool,
}

impl Turno {
    pub fn is_full(&self) -> bool {
        self.cupos_inscriptos >= self.cupo_maximo
    }

    pub fn remaining(&self) -> u32 {
        self.cupo_maximo.saturating_sub(self.cupos_inscriptos)
    }

    /// Whether a student may pick this slot.
    pub fn is_selectable(&self) -> bool {
        !self.is_blocked && !self.is_full()
    }
}

/// Request body for creating a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTurno {
    pub course_id: String,
    pub dia_semana: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub cupo_maximo: u32,
}

/// Partial update for a slot.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
}
