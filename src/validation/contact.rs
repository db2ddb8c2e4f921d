//! Contact-data rules for the public inscription form.

use std::borrow::Cow;
use std::sync::LazyLock;

use phonenumber::country;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::field_messages;
use crate::errors::FieldErrors;

/// Regions whose mobile numbers the academy accepts.
pub const ALLOWED_PHONE_REGIONS: [country::Id; 13] = [
    country::Id::AR,
    country::Id::UY,
    country::Id::CL,
    country::Id::BO,
    country::Id::PE,
    country::Id::PY,
    country::Id::VE,
    country::Id::CO,
    country::Id::MX,
    country::Id::BR,
    country::Id::EC,
    country::Id::US,
    country::Id::CA,
];

const NAME_MIN: u64 = 2;
const NAME_MAX: u64 = 50;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-zÁÉÍÓÚáéíóúÑñÜü'’ -]+$").expect("name pattern compiles")
});

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const NAME_LENGTH_MESSAGE: &str = "debe tener entre 2 y 50 caracteres";
const NAME_PATTERN_MESSAGE: &str = "solo puede contener letras, espacios, apóstrofes y guiones";
const EMAIL_MESSAGE: &str = "Ingresa un email válido (ejemplo: nombre@dominio.com)";

/// Which person-name field is being checked; only affects the wording.
#[derive(Debug, Clone, Copy)]
pub enum NameField {
    Nombre,
    Apellido,
}

impl NameField {
    fn label(self) -> &'static str {
        match self {
            NameField::Nombre => "nombre",
            NameField::Apellido => "apellido",
        }
    }
}

/// Validate a first name or surname. Returns the error message, if any.
pub fn validate_name(value: &str, field: NameField) -> Option<String> {
    let label = field.label();
    let value = value.trim();

    if value.is_empty() {
        return Some(format!("El {} es obligatorio", label));
    }
    let len = value.chars().count() as u64;
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Some(format!("El {} {}", label, NAME_LENGTH_MESSAGE));
    }
    if !NAME_PATTERN.is_match(value) {
        return Some(format!("El {} {}", label, NAME_PATTERN_MESSAGE));
    }
    None
}

/// Validate an email against the `local@domain.tld` shape.
pub fn validate_email(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some("El email es obligatorio".to_string());
    }
    if EMAIL_PATTERN.is_match(value) {
        None
    } else {
        Some(EMAIL_MESSAGE.to_string())
    }
}

/// Validate a mobile number: it must parse, be a valid number and belong to
/// one of [`ALLOWED_PHONE_REGIONS`].
pub fn validate_phone(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some("El celular es obligatorio".to_string());
    }

    let invalid = || {
        Some("Ingresa un celular válido con código de país (ejemplo: +5491122223333)".to_string())
    };

    let Ok(number) = phonenumber::parse(None, value) else {
        return invalid();
    };
    if !phonenumber::is_valid(&number) {
        return invalid();
    }

    match number.country().id() {
        Some(region) if ALLOWED_PHONE_REGIONS.contains(&region) => None,
        _ => Some("Solo aceptamos celulares de países de América".to_string()),
    }
}

#[allow(clippy::ptr_arg)]
fn phone_rule(value: &String) -> Result<(), ValidationError> {
    match validate_phone(value) {
        None => Ok(()),
        Some(message) => {
            let mut err = ValidationError::new("phone");
            err.message = Some(Cow::Owned(message));
            Err(err)
        }
    }
}

/// The public inscription form as the page submits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionForm {
    #[serde(default)]
    #[validate(
        length(min = 2, max = 50, message = "El nombre debe tener entre 2 y 50 caracteres"),
        regex(
            path = *NAME_PATTERN,
            message = "El nombre solo puede contener letras, espacios, apóstrofes y guiones"
        )
    )]
    pub nombre: String,
    #[serde(default)]
    #[validate(
        length(min = 2, max = 50, message = "El apellido debe tener entre 2 y 50 caracteres"),
        regex(
            path = *NAME_PATTERN,
            message = "El apellido solo puede contener letras, espacios, apóstrofes y guiones"
        )
    )]
    pub apellido: String,
    #[serde(default)]
    #[validate(regex(path = *EMAIL_PATTERN, message = "Ingresa un email válido (ejemplo: nombre@dominio.com)"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "phone_rule"))]
    pub celular: String,
    #[serde(default)]
    pub turno_id: Option<String>,
}

impl InscriptionForm {
    /// Copy with surrounding whitespace removed from the contact fields.
    pub fn trimmed(&self) -> Self {
        Self {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            email: self.email.trim().to_string(),
            celular: self.celular.trim().to_string(),
            turno_id: self.turno_id.clone(),
        }
    }

    /// Run every field rule on the trimmed form and collect the failures.
    ///
    /// Blank fields report as missing rather than as too short.
    pub fn check(&self) -> Result<(), FieldErrors> {
        let form = self.trimmed();

        let required = [
            ("nombre", &form.nombre, "El nombre es obligatorio"),
            ("apellido", &form.apellido, "El apellido es obligatorio"),
            ("email", &form.email, "El email es obligatorio"),
            ("celular", &form.celular, "El celular es obligatorio"),
        ];
        let mut errors: FieldErrors = required
            .into_iter()
            .filter(|(_, value, _)| value.is_empty())
            .map(|(field, _, message)| (field.to_string(), message.to_string()))
            .collect();

        if let Err(invalid) = form.validate() {
            for (field, message) in field_messages(&invalid) {
                errors.entry(field).or_insert(message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The selected slot, ignoring blank values.
    pub fn selected_turno(&self) -> Option<&str> {
        self.turno_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
