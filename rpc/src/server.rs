//! Axum-based RPC server.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use prometheus::Registry;
use tower_http::trace::TraceLayer;

use crate::error::RpcError;
use crate::handlers::{self, KycApi};

/// Shared state handed to every handler.
pub struct RpcState {
    pub api: Arc<dyn KycApi>,
    /// Registry rendered at `/metrics`.
    pub registry: Registry,
    /// Header carrying the webhook signature.
    pub signature_header: String,
}

/// Build the router with all routes.
pub fn router(state: Arc<RpcState>) -> Router {
    Router::new()
        .route(
            "/accounts/:account_id/verification",
            post(handlers::create_verification).get(handlers::verification_status),
        )
        .route("/webhooks/kyc", post(handlers::kyc_webhook))
        .route("/metrics", get(handlers::metrics))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct RpcServer {
    pub bind_address: String,
    pub port: u16,
    pub state: Arc<RpcState>,
}

impl RpcServer {
    pub fn new(bind_address: impl Into<String>, port: u16, state: Arc<RpcState>) -> Self {
        Self {
            bind_address: bind_address.into(),
            port,
            state,
        }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start(
        &self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        let addr = format!("{}:{}", self.bind_address, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        tracing::info!(%addr, "RPC server listening");
        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
