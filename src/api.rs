// 🌐 REST API - Axum router and handlers
//
// POST /transactions           submit a transaction
// GET  /transactions           list, filtered by IBAN, sorted by amount
// GET  /transactions/status    settlement status for a reference
// GET  /health                 liveness
//
// Errors are answered as plain text.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::dto::{ListQuery, StatusQuery, TransactionDto, TransactionStatusDto};
use crate::error::LedgerError;
use crate::operations::Ledger;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
}

// ============================================================================
// Error Mapping
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    /// Body or query string could not be parsed
    Rejected(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::DuplicateReference(_)) => StatusCode::CONFLICT,
            ApiError::Ledger(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ApiError::Rejected(message) => message,
            ApiError::Ledger(e) if status.is_server_error() => {
                // Never leak storage details to the client
                tracing::error!(error = %e, "request failed");
                "Internal server error".to_string()
            }
            ApiError::Ledger(e) => e.to_string(),
        };

        (status, message).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

/// POST /transactions - Submit a transaction against the account
async fn post_transaction(
    State(state): State<AppState>,
    body: Result<Json<TransactionDto>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionDto>), ApiError> {
    let Json(dto) = body?;
    let created = state.ledger.create_transaction(dto)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /transactions - List transactions
async fn get_transactions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<TransactionDto>>, ApiError> {
    let Query(query) = query?;
    let transactions = state.ledger.list_transactions(&query)?;

    Ok(Json(transactions))
}

/// GET /transactions/status - Settlement status of one transaction
async fn get_transaction_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<TransactionStatusDto>, ApiError> {
    let Query(query) = query?;
    let reference = query.required_reference()?;
    let status = state.ledger.transaction_status(reference, query.channel)?;

    Ok(Json(status))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(ledger: Ledger) -> Router {
    let state = AppState { ledger };

    Router::new()
        .route("/health", get(health_check))
        .route("/transactions", get(get_transactions).post(post_transaction))
        .route("/transactions/status", get(get_transaction_status))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
