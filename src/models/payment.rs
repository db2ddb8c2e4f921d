//! Payment preference models.

use serde::{Deserialize, Serialize};

/// Request sent to the backend to open a checkout preference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRequest {
    pub course_id: String,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
}

/// Server-issued preference id the payment widget is opened with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    #[serde(alias = "id")]
    pub preference_id: String,
}
