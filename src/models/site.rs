//! Read-only display data: testimonials and tariff sheets.

use serde::{Deserialize, Serialize};

use super::de;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(alias = "_id", deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A published fee schedule. The nested content is rendered as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tariff {
    #[serde(rename = "type")]
    pub kind: String,
    pub period_identifier: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub content: serde_json::Value,
}
