//! Client side of the course backend REST API.
//!
//! The backend owns persistence, seat enforcement, payments and email
//! delivery. Handlers talk to it only through [`BackendApi`], so tests can
//! swap in an in-memory implementation.

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::errors::AppError;
use crate::listing::{CourseQuery, ExportFormat, InscriptionQuery};
use crate::models::{
    AuthSession, Course, DepositUpdate, EmailRequest, Inscription, InscriptionCount, LoginRequest,
    NewInscription, NewTurno, Page, PaymentStatus, Preference, PreferenceRequest,
    RegisterRequest, RescheduleRequest, Tariff, Testimonial, Turno, TurnoPatch, WorkshopDetails,
};
use crate::validation::CourseInput;

/// JWT forwarded from the admin's request to the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// A downloaded export, ready to be re-served.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn list_courses_admin(
        &self,
        token: &BearerToken,
        query: &CourseQuery,
    ) -> Result<Page<Course>, AppError>;
    async fn create_course(&self, token: &BearerToken, input: &CourseInput)
        -> Result<Course, AppError>;
    async fn update_course(
        &self,
        token: &BearerToken,
        id: &str,
        input: &CourseInput,
    ) -> Result<Course, AppError>;
    async fn delete_course(&self, token: &BearerToken, id: &str) -> Result<(), AppError>;
    async fn course_paid(&self, title: &str) -> Result<Value, AppError>;

    /// Slots of a course. With a token the backend includes blocked slots.
    async fn list_turnos(
        &self,
        course_id: &str,
        admin: Option<&BearerToken>,
    ) -> Result<Vec<Turno>, AppError>;
    async fn create_turno(&self, token: &BearerToken, turno: &NewTurno) -> Result<Turno, AppError>;
    async fn update_turno(
        &self,
        token: &BearerToken,
        id: &str,
        patch: &TurnoPatch,
    ) -> Result<Turno, AppError>;
    async fn delete_turno(&self, token: &BearerToken, id: &str) -> Result<(), AppError>;

    async fn create_inscription(&self, inscription: &NewInscription)
        -> Result<Inscription, AppError>;
    async fn list_inscriptions(
        &self,
        token: &BearerToken,
        query: &InscriptionQuery,
    ) -> Result<Page<Inscription>, AppError>;
    async fn count_inscriptions(&self, token: &BearerToken) -> Result<InscriptionCount, AppError>;
    async fn update_payment_status(
        &self,
        token: &BearerToken,
        id: &str,
        status: PaymentStatus,
    ) -> Result<Inscription, AppError>;
    async fn register_deposit(
        &self,
        token: &BearerToken,
        id: &str,
        deposit: &DepositUpdate,
    ) -> Result<Inscription, AppError>;
    async fn export_inscriptions(
        &self,
        token: &BearerToken,
        query: &InscriptionQuery,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError>;

    async fn workshop_inscriptions(
        &self,
        token: &BearerToken,
        workshop_id: &str,
    ) -> Result<Vec<Inscription>, AppError>;
    async fn workshop_details(
        &self,
        token: &BearerToken,
        workshop_id: &str,
    ) -> Result<WorkshopDetails, AppError>;
    async fn reschedule(
        &self,
        token: &BearerToken,
        inscription_id: &str,
        request: &RescheduleRequest,
    ) -> Result<Inscription, AppError>;
    async fn available_turnos(
        &self,
        token: &BearerToken,
        inscription_id: &str,
    ) -> Result<Vec<Turno>, AppError>;

    async fn create_preference(&self, request: &PreferenceRequest)
        -> Result<Preference, AppError>;
    async fn payment_data(&self, query: &[(String, String)]) -> Result<Value, AppError>;

    async fn send_email(&self, email: &EmailRequest) -> Result<(), AppError>;

    async fn testimonials(&self) -> Result<Vec<Testimonial>, AppError>;
    async fn tariffs(&self) -> Result<Vec<Tariff>, AppError>;
    async fn tariffs_meta(&self) -> Result<Value, AppError>;
    async fn search_tariffs(&self, query: &[(String, String)]) -> Result<Vec<Tariff>, AppError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, AppError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, AppError>;
}

/// Look a course up in the public catalog.
pub async fn find_course(backend: &dyn BackendApi, id: &str) -> Result<Course, AppError> {
    backend
        .list_courses()
        .await?
        .into_iter()
        .find(|course| course.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Curso {} no encontrado", id)))
}

/// Filename announced by a `Content-Disposition` header.
///
/// Prefers the RFC 5987 `filename*` form over the plain `filename` one.
pub fn disposition_filename(header: &str) -> Option<String> {
    let params: Vec<(String, &str)> = header
        .split(';')
        .skip(1)
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            Some((key.trim().to_ascii_lowercase(), value.trim()))
        })
        .collect();

    let extended = params.iter().find(|(k, _)| k == "filename*").and_then(|(_, v)| {
        // charset'language'percent-encoded
        let encoded = v.splitn(3, '\'').nth(2)?;
        percent_decode_str(encoded.trim_matches('"'))
            .decode_utf8()
            .ok()
            .map(|name| name.into_owned())
    });

    extended
        .or_else(|| {
            params
                .iter()
                .find(|(k, _)| k == "filename")
                .map(|(_, v)| v.trim_matches('"').to_string())
        })
        .map(|name| name.replace(['/', '\\'], "_"))
        .filter(|name| !name.trim().is_empty())
}
