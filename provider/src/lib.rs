//! Gateway to the third-party identity-verification provider.
//!
//! The provider is an opaque HTTP service. This crate opens verification
//! sessions, fetches verdicts, checks that every synchronous response is
//! authentic, and turns the provider's loosely shaped status document into a
//! [`kycgate_types::VerificationResult`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gateway;
pub mod http;
pub mod parse;
pub mod wire;

pub use config::{ProviderConfig, ResponseAuthenticity};
pub use diagnostics::{DiagnosticRecord, DiagnosticSink, FileDiagnosticSink, NoopDiagnosticSink};
pub use error::ProviderError;
pub use gateway::{ApplicantContext, CreatedSession, ProviderGateway};
pub use http::HttpProviderGateway;
pub use parse::{map_event, parse_status_document};
pub use wire::WebhookNotification;
