//! Course model as served by the backend catalog.

use serde::{Deserialize, Serialize};

use super::de;

/// A course offered on the site, online or in person.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(alias = "_id", deserialize_with = "de::id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "de::amount")]
    pub price: f64,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default, alias = "image")]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_presencial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_paid: Option<String>,
}

impl Course {
    pub fn is_free(&self) -> bool {
        self.price <= 0.0
    }

    /// Freeze what the student sees right now, independent of later edits.
    pub fn snapshot(&self) -> CourseSnapshot {
        CourseSnapshot {
            course_title: self.title.clone(),
            course_price: self.price,
            short_description: self.short_description.clone(),
            deeplink: self.deeplink.clone(),
        }
    }
}

/// Immutable copy of the course as it was at signup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSnapshot {
    pub course_title: String,
    pub course_price: f64,
    pub short_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,
}
