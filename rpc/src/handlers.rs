//! RPC request handlers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use kycgate_types::{AccountId, KycState};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::server::RpcState;

/// Operations the HTTP layer exposes. Implemented by the node.
#[async_trait]
pub trait KycApi: Send + Sync {
    async fn create_verification(
        &self,
        account_id: &AccountId,
    ) -> Result<CreateVerificationResponse, RpcError>;

    async fn check_status(
        &self,
        account_id: &AccountId,
    ) -> Result<VerificationStatusResponse, RpcError>;

    /// `body` is the raw request body; the signature covers these exact bytes.
    async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookResponse, RpcError>;
}

// ── Verification ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVerificationResponse {
    pub verification_url: String,
    pub reference: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatusResponse {
    pub kyc_state: KycState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

// ── Webhook ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub reference: String,
    pub kyc_state: KycState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

// ── Node ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn parse_account(raw: String) -> Result<AccountId, RpcError> {
    AccountId::new(raw).map_err(|e| RpcError::InvalidRequest(e.to_string()))
}

pub(crate) async fn create_verification(
    State(state): State<Arc<RpcState>>,
    Path(account_id): Path<String>,
) -> Result<Json<CreateVerificationResponse>, RpcError> {
    let account_id = parse_account(account_id)?;
    state.api.create_verification(&account_id).await.map(Json)
}

pub(crate) async fn verification_status(
    State(state): State<Arc<RpcState>>,
    Path(account_id): Path<String>,
) -> Result<Json<VerificationStatusResponse>, RpcError> {
    let account_id = parse_account(account_id)?;
    state.api.check_status(&account_id).await.map(Json)
}

pub(crate) async fn kyc_webhook(
    State(state): State<Arc<RpcState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, RpcError> {
    let signature = headers
        .get(state.signature_header.as_str())
        .and_then(|v| v.to_str().ok());
    state.api.handle_webhook(&body, signature).await.map(Json)
}

pub(crate) async fn metrics(State(state): State<Arc<RpcState>>) -> Result<impl IntoResponse, RpcError> {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&state.registry.gather(), &mut buf)
        .map_err(|e| RpcError::Server(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], buf))
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
