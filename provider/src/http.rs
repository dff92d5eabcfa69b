//! reqwest-backed [`ProviderGateway`].

use std::sync::Arc;

use async_trait::async_trait;
use kycgate_crypto::{check_signature, SignatureCheck};
use kycgate_types::{Clock, SessionReference, VerificationResult};
use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::{DiagnosticRecord, DiagnosticSink};
use crate::gateway::{ApplicantContext, CreatedSession, ProviderGateway};
use crate::parse::parse_status_document;
use crate::wire::{
    ApplicantAttributes, CapabilityFlags, SessionRequest, SessionResponse, StatusRequest,
};
use crate::{ProviderConfig, ProviderError, ResponseAuthenticity};

/// Longest upstream error body kept in [`ProviderError::UpstreamRejected`].
const MAX_ERROR_BODY: usize = 512;

pub struct HttpProviderGateway {
    client: reqwest::Client,
    config: ProviderConfig,
    reference_prefix: String,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl HttpProviderGateway {
    pub fn new(
        config: ProviderConfig,
        reference_prefix: impl Into<String>,
        clock: Arc<dyn Clock>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ProviderError> {
        let reference_prefix = reference_prefix.into();
        if reference_prefix.is_empty() || reference_prefix.contains('-') {
            return Err(ProviderError::Config(format!(
                "reference prefix {reference_prefix:?} must be non-empty and free of '-'"
            )));
        }
        if config.secret_key.is_empty() {
            return Err(ProviderError::Config("provider secret key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;
        Ok(Self {
            client,
            config,
            reference_prefix,
            clock,
            diagnostics,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body and return the authenticated response document.
    async fn call<B: Serialize>(
        &self,
        operation: &'static str,
        reference: &SessionReference,
        path: &str,
        body: &B,
    ) -> Result<Value, ProviderError> {
        let mut record = DiagnosticRecord::new(
            self.clock.now_millis(),
            operation,
            reference.as_str(),
            serde_json::to_value(body).unwrap_or(Value::Null),
        );
        let result = self.send(path, body, &mut record).await;
        if let Err(e) = &result {
            record.error = Some(e.to_string());
        }
        self.diagnostics.record(&record);
        result
    }

    async fn send<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        record: &mut DiagnosticRecord,
    ) -> Result<Value, ProviderError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .basic_auth(
                &self.config.client_id,
                Some(self.config.secret_key.expose_str()),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = resp.status();
        record.status = Some(status.as_u16());
        let signature = resp
            .headers()
            .get(self.config.signature_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            let body: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(ProviderError::UpstreamRejected {
                status: status.as_u16(),
                body,
            });
        }

        self.check_authenticity(&bytes, signature.as_deref())?;

        let doc: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::ResponseUnparseable(e.to_string()))?;
        record.response = Some(doc.clone());
        Ok(doc)
    }

    fn check_authenticity(&self, body: &[u8], signature: Option<&str>) -> Result<(), ProviderError> {
        let reason = match check_signature(body, self.config.secret_key.expose(), signature) {
            SignatureCheck::Valid => return Ok(()),
            SignatureCheck::Missing => "missing response signature",
            SignatureCheck::Invalid => "response signature mismatch",
        };
        match self.config.response_auth {
            ResponseAuthenticity::Enforce => {
                tracing::warn!(target: "security", reason, "rejecting provider response");
                Err(ProviderError::Authenticity(reason.to_string()))
            }
            ResponseAuthenticity::Warn => {
                tracing::warn!(target: "security", reason, "accepting unauthenticated provider response");
                Ok(())
            }
        }
    }
}

/// The reference echoed by the provider, when present, must be the one we sent.
fn check_echoed_reference(doc: &Value, expected: &SessionReference) -> Result<(), ProviderError> {
    match doc.get("reference").and_then(Value::as_str) {
        Some(echoed) if echoed != expected.as_str() => Err(ProviderError::ResponseUnparseable(
            format!("response reference {echoed} does not match {expected}"),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn create_session(
        &self,
        applicant: &ApplicantContext,
    ) -> Result<CreatedSession, ProviderError> {
        let reference = SessionReference::generate(
            &self.reference_prefix,
            &applicant.account_id,
            self.clock.now_millis(),
        )
        .map_err(|e| ProviderError::Config(e.to_string()))?;

        let request = SessionRequest {
            reference: reference.as_str(),
            callback_url: &self.config.callback_url,
            redirect_url: self.config.redirect_url.as_deref(),
            applicant_attributes: ApplicantAttributes {
                email: applicant.email.as_deref(),
                country: applicant.country.as_deref(),
                full_name: applicant.full_name.as_deref(),
                language: applicant.language.as_deref(),
            },
            capability_flags: CapabilityFlags::default(),
        };

        let doc = self
            .call("session", &reference, &self.config.session_path, &request)
            .await?;
        check_echoed_reference(&doc, &reference)?;

        let response: SessionResponse = serde_json::from_value(doc)
            .map_err(|e| ProviderError::ResponseUnparseable(e.to_string()))?;
        if let Some(error) = response
            .error
            .filter(|e| !(e.is_null() || e.as_str() == Some("")))
        {
            return Err(ProviderError::UpstreamRejected {
                status: 200,
                body: error.to_string(),
            });
        }
        let verification_url = response.verification_url.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::ResponseUnparseable(format!(
                "no verification_url (event {})",
                response.event.as_deref().unwrap_or("none")
            ))
        })?;

        tracing::info!(account = %applicant.account_id, reference = %reference, "provider session created");
        Ok(CreatedSession {
            reference,
            verification_url,
        })
    }

    async fn fetch_status(
        &self,
        reference: &SessionReference,
    ) -> Result<VerificationResult, ProviderError> {
        let request = StatusRequest {
            reference: reference.as_str(),
        };
        let doc = self
            .call("status", reference, &self.config.status_path, &request)
            .await?;
        check_echoed_reference(&doc, reference)?;
        let result = parse_status_document(&doc)?;
        tracing::debug!(reference = %reference, event = %result.provider_event, "provider status fetched");
        Ok(result)
    }
}
