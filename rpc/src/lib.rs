//! HTTP API for kycgate.
//!
//! Provides endpoints for:
//! - Opening a verification session for an account
//! - Polling an account's verification status
//! - Receiving provider webhooks
//! - Health and Prometheus metrics
//!
//! The business logic lives behind [`KycApi`], implemented by the node, so this
//! crate does not depend on it.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use handlers::{
    CreateVerificationResponse, HealthResponse, KycApi, VerificationStatusResponse,
    WebhookResponse,
};
pub use server::{router, RpcServer, RpcState};
