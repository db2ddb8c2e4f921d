//! reqwest implementation of [`BackendApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::{disposition_filename, BackendApi, BearerToken, ExportFile};
use crate::errors::{backend_message, AppError};
use crate::listing::{CourseQuery, ExportFormat, InscriptionQuery};
use crate::models::{
    AuthSession, Course, DepositUpdate, EmailRequest, Inscription, InscriptionCount, LoginRequest,
    NewInscription, NewTurno, Page, PaymentStatus, PaymentStatusUpdate, Preference,
    PreferenceRequest, RegisterRequest, RescheduleRequest, Tariff, Testimonial, Turno, TurnoPatch,
    WorkshopDetails,
};
use crate::validation::CourseInput;

/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the course backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build http client: {}", e)))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("Invalid backend URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Internal(format!(
                "Backend URL {} cannot carry a path",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Backend URL for the given path segments, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request, attaching the bearer token when given.
    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&BearerToken>,
    ) -> RequestBuilder {
        let url = self.endpoint(segments);
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%method, path = url.path(), %request_id, "backend request");

        let builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);

        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token.as_str())),
            None => builder,
        }
    }

    /// Send a request and turn any non-success status into [`AppError::Backend`].
    async fn send(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = backend_message(&body);
        tracing::warn!(status = status.as_u16(), %message, "backend returned an error");
        Err(AppError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        let response = self.send(builder).await?;
        Ok(response.json::<T>().await?)
    }

    async fn empty(&self, builder: RequestBuilder) -> Result<(), AppError> {
        self.send(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        self.json(self.request(Method::GET, &["api", "courses"], None)).await
    }

    async fn list_courses_admin(
        &self,
        token: &BearerToken,
        query: &CourseQuery,
    ) -> Result<Page<Course>, AppError> {
        let builder = self
            .request(Method::GET, &["api", "courses", "admin"], Some(token))
            .query(&query.to_params());
        self.json(builder).await
    }

    async fn create_course(
        &self,
        token: &BearerToken,
        input: &CourseInput,
    ) -> Result<Course, AppError> {
        let builder = self
            .request(Method::POST, &["api", "courses"], Some(token))
            .json(input);
        self.json(builder).await
    }

    async fn update_course(
        &self,
        token: &BearerToken,
        id: &str,
        input: &CourseInput,
    ) -> Result<Course, AppError> {
        let path = ["api", "courses", id];
        let builder = self.request(Method::PUT, &path, Some(token)).json(input);
        self.json(builder).await
    }

    async fn delete_course(&self, token: &BearerToken, id: &str) -> Result<(), AppError> {
        let path = ["api", "courses", id];
        self.empty(self.request(Method::DELETE, &path, Some(token))).await
    }

    async fn course_paid(&self, title: &str) -> Result<Value, AppError> {
        let path = ["api", "courses", "course-paid", title];
        self.json(self.request(Method::GET, &path, None)).await
    }

    async fn list_turnos(
        &self,
        course_id: &str,
        admin: Option<&BearerToken>,
    ) -> Result<Vec<Turno>, AppError> {
        let path = ["api", "turnos", "course", course_id];
        let mut builder = self.request(Method::GET, &path, admin);
        if admin.is_some() {
            builder = builder.query(&[("admin", "true")]);
        }
        self.json(builder).await
    }

    async fn create_turno(&self, token: &BearerToken, turno: &NewTurno) -> Result<Turno, AppError> {
        let builder = self
            .request(Method::POST, &["api", "turnos"], Some(token))
            .json(turno);
        self.json(builder).await
    }

    async fn update_turno(
        &self,
        token: &BearerToken,
        id: &str,
        patch: &TurnoPatch,
    ) -> Result<Turno, AppError> {
        let path = ["api", "turnos", id];
        let builder = self.request(Method::PATCH, &path, Some(token)).json(patch);
        self.json(builder).await
    }

    async fn delete_turno(&self, token: &BearerToken, id: &str) -> Result<(), AppError> {
        let path = ["api", "turnos", id];
        self.empty(self.request(Method::DELETE, &path, Some(token))).await
    }

    async fn create_inscription(
        &self,
        inscription: &NewInscription,
    ) -> Result<Inscription, AppError> {
        let builder = self
            .request(Method::POST, &["api", "inscriptions"], None)
            .json(inscription);
        self.json(builder).await
    }

    async fn list_inscriptions(
        &self,
        token: &BearerToken,
        query: &InscriptionQuery,
    ) -> Result<Page<Inscription>, AppError> {
        let builder = self
            .request(Method::GET, &["api", "inscriptions"], Some(token))
            .query(&query.to_params());
        self.json(builder).await
    }

    async fn count_inscriptions(&self, token: &BearerToken) -> Result<InscriptionCount, AppError> {
        let builder = self.request(Method::GET, &["api", "inscriptions", "count"], Some(token));
        self.json(builder).await
    }

    async fn update_payment_status(
        &self,
        token: &BearerToken,
        id: &str,
        status: PaymentStatus,
    ) -> Result<Inscription, AppError> {
        let path = ["api", "inscriptions", id, "payment-status"];
        let builder = self
            .request(Method::PATCH, &path, Some(token))
            .json(&PaymentStatusUpdate {
                payment_status: status,
            });
        self.json(builder).await
    }

    async fn register_deposit(
        &self,
        token: &BearerToken,
        id: &str,
        deposit: &DepositUpdate,
    ) -> Result<Inscription, AppError> {
        let path = ["api", "inscriptions", id, "deposit"];
        let builder = self.request(Method::PATCH, &path, Some(token)).json(deposit);
        self.json(builder).await
    }

    async fn export_inscriptions(
        &self,
        token: &BearerToken,
        query: &InscriptionQuery,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let mut params = query.filter_params();
        params.push(("format", format.extension().to_string()));

        let builder = self
            .request(Method::GET, &["api", "inscriptions", "export"], Some(token))
            .query(&params);
        let response = self.send(builder).await?;

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let filename = header(CONTENT_DISPOSITION)
            .and_then(|h| disposition_filename(&h))
            .unwrap_or_else(|| format!("inscripciones.{}", format.extension()));
        let content_type =
            header(CONTENT_TYPE).unwrap_or_else(|| format.content_type().to_string());

        let bytes = response.bytes().await?.to_vec();
        Ok(ExportFile {
            filename,
            content_type,
            bytes,
        })
    }

    async fn workshop_inscriptions(
        &self,
        token: &BearerToken,
        workshop_id: &str,
    ) -> Result<Vec<Inscription>, AppError> {
        let path = ["api", "workshop-inscriptions", workshop_id];
        self.json(self.request(Method::GET, &path, Some(token))).await
    }

    async fn workshop_details(
        &self,
        token: &BearerToken,
        workshop_id: &str,
    ) -> Result<WorkshopDetails, AppError> {
        let path = ["api", "workshop-inscriptions", workshop_id, "details"];
        self.json(self.request(Method::GET, &path, Some(token))).await
    }

    async fn reschedule(
        &self,
        token: &BearerToken,
        inscription_id: &str,
        request: &RescheduleRequest,
    ) -> Result<Inscription, AppError> {
        let path = ["api", "workshop-inscriptions", inscription_id, "schedule"];
        let builder = self.request(Method::PUT, &path, Some(token)).json(request);
        self.json(builder).await
    }

    async fn available_turnos(
        &self,
        token: &BearerToken,
        inscription_id: &str,
    ) -> Result<Vec<Turno>, AppError> {
        let path = [
            "api",
            "workshop-inscriptions",
            "inscription",
            inscription_id,
            "available-turnos",
        ];
        self.json(self.request(Method::GET, &path, Some(token))).await
    }

    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, AppError> {
        let builder = self
            .request(Method::POST, &["api", "payment", "create-preference"], None)
            .json(request);
        self.json(builder).await
    }

    async fn payment_data(&self, query: &[(String, String)]) -> Result<Value, AppError> {
        let builder = self
            .request(Method::GET, &["api", "payment", "data"], None)
            .query(query);
        self.json(builder).await
    }

    async fn send_email(&self, email: &EmailRequest) -> Result<(), AppError> {
        let builder = self
            .request(Method::POST, &["api", "email", "send-email"], None)
            .json(email);
        self.empty(builder).await
    }

    async fn testimonials(&self) -> Result<Vec<Testimonial>, AppError> {
        self.json(self.request(Method::GET, &["api", "testimonials"], None))
            .await
    }

    async fn tariffs(&self) -> Result<Vec<Tariff>, AppError> {
        self.json(self.request(Method::GET, &["api", "tariffs"], None)).await
    }

    async fn tariffs_meta(&self) -> Result<Value, AppError> {
        self.json(self.request(Method::GET, &["api", "tariffs", "meta"], None))
            .await
    }

    async fn search_tariffs(&self, query: &[(String, String)]) -> Result<Vec<Tariff>, AppError> {
        let builder = self
            .request(Method::GET, &["api", "tariffs", "search"], None)
            .query(query);
        self.json(builder).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, AppError> {
        let builder = self.request(Method::POST, &["auth", "login"], None).json(request);
        self.json(builder).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, AppError> {
        let builder = self.request(Method::POST, &["auth", "register"], None).json(request);
        self.json(builder).await
    }
}
