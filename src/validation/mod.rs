//! Client-side validation rules applied before anything reaches the backend.
//!
//! Failures never leave the gateway: they come back as per-field messages.

mod contact;
mod course;
mod sanitize;

pub use contact::*;
pub use course::*;
pub use sanitize::*;

use validator::ValidationErrors;

use crate::errors::{AppError, FieldErrors};

/// Check a deposit (seña) against the price the student signed up for.
///
/// The deposit must be strictly positive and strictly below the course price.
pub fn validate_deposit(amount: f64, course_price: f64) -> Result<f64, AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::field(
            "amount",
            "El monto de la seña debe ser un número mayor a 0",
        ));
    }
    if !course_price.is_finite() || course_price <= 0.0 {
        return Err(AppError::field(
            "coursePrice",
            "El precio del curso debe ser un número mayor a 0",
        ));
    }
    if amount >= course_price {
        return Err(AppError::field(
            "amount",
            "El monto de la seña debe ser menor al precio del curso",
        ));
    }
    Ok(amount)
}

/// Flatten validator output into wire-named field messages.
fn field_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Valor inválido ({})", err.code));
                (camel_case(&field), message)
            })
        })
        .collect()
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
