//! Admin inscription table: listing, live search, payments and export.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use super::{send_best_effort, success, ApiResult};
use crate::auth::session_key;
use crate::backend::BearerToken;
use crate::errors::AppError;
use crate::listing::{ExportFormat, InscriptionColumn, InscriptionQuery, TableView};
use crate::models::{de, DepositUpdate, EmailRequest, Inscription, InscriptionCount, PaymentStatus};
use crate::validation::validate_deposit;
use crate::AppState;

pub type InscriptionTable = TableView<Inscription, InscriptionColumn>;

/// Bytes escaped in an RFC 5987 `filename*` value.
const FILENAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A live-search result tagged with the ticket that produced it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSearchView {
    pub ticket: u64,
    #[serde(flatten)]
    pub table: InscriptionTable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    #[serde(alias = "status")]
    pub payment_status: PaymentStatus,
    /// Status the admin's table showed before the change.
    #[serde(default)]
    pub previous_status: Option<PaymentStatus>,
}

impl PaymentStatusRequest {
    /// Only a move into `paid` earns the confirmation email.
    fn becomes_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
            && self.previous_status != Some(PaymentStatus::Paid)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusOutcome {
    pub inscription: Inscription,
    pub confirmation_email_sent: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    #[serde(deserialize_with = "de::amount")]
    pub amount: f64,
    #[serde(deserialize_with = "de::amount")]
    pub course_price: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: ExportFormat,
}

pub(crate) async fn inscription_table(
    state: &AppState,
    token: &BearerToken,
    query: &InscriptionQuery,
) -> Result<InscriptionTable, AppError> {
    let page = state.backend.list_inscriptions(token, query).await?;
    Ok(TableView::new(page, query.sort(), query.limit))
}

/// GET /api/admin/inscriptions - Filtered, sorted, paginated table.
pub async fn list_inscriptions(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<InscriptionQuery>,
) -> ApiResult<InscriptionTable> {
    success(inscription_table(&state, &token, &query).await?)
}

/// GET /api/admin/inscriptions/live-search - Debounced search-as-you-type.
///
/// Answers 204 when a newer keystroke of the same session superseded this
/// one, either during the quiet window or while the backend was answering.
pub async fn live_search_inscriptions(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<InscriptionQuery>,
) -> Result<Response, AppError> {
    let session = session_key(&token);

    let Some(ticket) = state.search.settle(&session).await else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    // The ticket is settled whether or not the backend answered.
    let table = inscription_table(&state, &token, &query).await;
    if !state.search.complete(&session, ticket).await {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let table = table?;

    Ok(success(LiveSearchView {
        ticket: ticket.value(),
        table,
    })
    .into_response())
}

/// GET /api/admin/inscriptions/count
pub async fn count_inscriptions(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> ApiResult<InscriptionCount> {
    success(state.backend.count_inscriptions(&token).await?)
}

/// PATCH /api/admin/inscriptions/:id/payment-status
///
/// Moving an inscription into `paid` also sends the payment confirmation
/// email. Re-marking an already paid one does not.
pub async fn update_payment_status(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(request): Json<PaymentStatusRequest>,
) -> ApiResult<PaymentStatusOutcome> {
    let inscription = state
        .backend
        .update_payment_status(&token, &id, request.payment_status)
        .await?;
    tracing::info!(
        inscription_id = %id,
        status = request.payment_status.as_str(),
        "payment status updated"
    );

    let confirmation_email_sent = if request.becomes_paid() {
        send_best_effort(
            state.backend.as_ref(),
            EmailRequest::payment_confirmation(
                &inscription.email,
                &inscription.nombre,
                &inscription.course_title,
            ),
        )
        .await
    } else {
        false
    };

    success(PaymentStatusOutcome {
        inscription,
        confirmation_email_sent,
    })
}

/// PATCH /api/admin/inscriptions/:id/deposit - Register a partial payment.
pub async fn register_deposit(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(request): Json<DepositRequest>,
) -> ApiResult<Inscription> {
    let amount = validate_deposit(request.amount, request.course_price)?;

    let deposit = DepositUpdate {
        deposit_amount: amount,
        deposit_date: Utc::now().to_rfc3339(),
    };
    let inscription = state.backend.register_deposit(&token, &id, &deposit).await?;
    tracing::info!(inscription_id = %id, amount, "deposit registered");
    success(inscription)
}

/// GET /api/admin/inscriptions/export?format=csv|xlsx - Download the filtered table.
pub async fn export_inscriptions(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<InscriptionQuery>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let file = state
        .backend
        .export_inscriptions(&token, &query, params.format)
        .await?;
    tracing::info!(filename = %file.filename, bytes = file.bytes.len(), "inscriptions exported");

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(params.format.content_type()));
    let disposition = HeaderValue::from_str(&attachment_header(&file.filename))
        .map_err(|e| AppError::Internal(format!("Invalid export filename: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// `Content-Disposition` value with an ASCII fallback and the exact UTF-8 name.
pub fn attachment_header(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(filename, FILENAME_ESCAPE)
    )
}
