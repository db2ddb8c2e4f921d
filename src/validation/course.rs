//! Schema for the admin course form.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{field_messages, strip_tags, strip_tags_opt};
use crate::errors::AppError;
use crate::models::de;

/// Images shipped with the site that a course card may use.
pub const COURSE_IMAGES: &[&str] = &[
    "/images/cursos/corte-y-confeccion.jpg",
    "/images/cursos/molderia.jpg",
    "/images/cursos/costura-basica.jpg",
    "/images/cursos/alta-costura.jpg",
    "/images/cursos/bordado.jpg",
    "/images/cursos/taller-presencial.jpg",
];

/// Course fields as the admin form submits them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    #[validate(length(min = 3, max = 100, message = "El título debe tener entre 3 y 100 caracteres"))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 250,
        message = "La descripción corta debe tener entre 10 y 250 caracteres"
    ))]
    pub short_description: String,
    #[validate(length(min = 50, message = "La descripción larga debe tener al menos 50 caracteres"))]
    pub long_description: String,
    #[serde(alias = "image")]
    #[validate(custom(function = "listed_image"))]
    pub image_url: String,
    #[validate(length(min = 2, max = 50, message = "La categoría debe tener entre 2 y 50 caracteres"))]
    pub category: String,
    #[serde(deserialize_with = "de::amount")]
    #[validate(range(min = 0.0, max = 999_999.0, message = "El precio debe estar entre 0 y 999.999"))]
    pub price: f64,
    #[serde(default)]
    pub is_presencial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "El deeplink debe ser una URL válida"))]
    pub deeplink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "La URL del video no es válida"))]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "La URL del curso pago no es válida"))]
    pub course_paid: Option<String>,
}

#[allow(clippy::ptr_arg)]
fn listed_image(value: &String) -> Result<(), ValidationError> {
    if COURSE_IMAGES.contains(&value.as_str()) {
        return Ok(());
    }
    let mut err = ValidationError::new("image");
    err.message = Some(Cow::Borrowed("Selecciona una de las imágenes disponibles"));
    Err(err)
}

impl CourseInput {
    /// Strip markup from every text field. Blank optional URLs become absent.
    pub fn sanitized(self) -> Self {
        Self {
            title: strip_tags(&self.title),
            short_description: strip_tags(&self.short_description),
            long_description: strip_tags(&self.long_description),
            image_url: strip_tags(&self.image_url),
            category: strip_tags(&self.category),
            price: self.price,
            is_presencial: self.is_presencial,
            deeplink: strip_tags_opt(self.deeplink),
            video_url: strip_tags_opt(self.video_url),
            course_paid: strip_tags_opt(self.course_paid),
        }
    }

    /// Sanitize, then validate. The returned input is what gets persisted.
    pub fn into_checked(self) -> Result<Self, AppError> {
        let input = self.sanitized();
        match input.validate() {
            Ok(()) => Ok(input),
            Err(errors) => Err(AppError::form(field_messages(&errors))),
        }
    }
}
