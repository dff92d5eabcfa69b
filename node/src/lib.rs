//! kycgate service node.
//!
//! The node wires the pieces together:
//! - Opens the LMDB account and session stores
//! - Connects to the verification provider
//! - Runs the shared verification reconciler behind [`KycService`]
//! - Serves the HTTP API and Prometheus metrics
//! - Applies referral bonuses on a background worker

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod service;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::ServiceError;
pub use logging::{init_logging, LogFormat};
pub use metrics::KycMetrics;
pub use node::{KycNode, NodeBackends};
pub use service::{KycService, ServiceParts, WebhookReport};
pub use shutdown::{ShutdownController, ShutdownReason};
