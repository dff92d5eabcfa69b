//! Nullable verification provider — scripted verdicts, recorded calls.

use async_trait::async_trait;
use kycgate_provider::{ApplicantContext, CreatedSession, ProviderError, ProviderGateway};
use kycgate_types::{SessionReference, VerificationResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A provider that answers from a script instead of the network.
///
/// `fetch_status` returns queued failures first, then the sticky status set
/// with [`NullProvider::set_status`] (pending until told otherwise).
pub struct NullProvider {
    prefix: String,
    next_millis: AtomicU64,
    status: Mutex<VerificationResult>,
    fetch_failures: Mutex<VecDeque<ProviderError>>,
    create_failures: Mutex<VecDeque<ProviderError>>,
    created: Mutex<Vec<ApplicantContext>>,
    fetched: Mutex<Vec<SessionReference>>,
}

impl NullProvider {
    pub fn new() -> Self {
        Self {
            prefix: "kyc".into(),
            next_millis: AtomicU64::new(1_700_000_000_000),
            status: Mutex::new(VerificationResult::pending("request.pending")),
            fetch_failures: Mutex::new(VecDeque::new()),
            create_failures: Mutex::new(VecDeque::new()),
            created: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, result: VerificationResult) {
        *self.status.lock().unwrap() = result;
    }

    pub fn fail_next_fetch(&self, error: ProviderError) {
        self.fetch_failures.lock().unwrap().push_back(error);
    }

    pub fn fail_next_create(&self, error: ProviderError) {
        self.create_failures.lock().unwrap().push_back(error);
    }

    /// Applicants for which a session was opened.
    pub fn created_sessions(&self) -> Vec<ApplicantContext> {
        self.created.lock().unwrap().clone()
    }

    /// How many times `fetch_status` was called.
    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub fn fetched_references(&self) -> Vec<SessionReference> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Default for NullProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderGateway for NullProvider {
    async fn create_session(
        &self,
        applicant: &ApplicantContext,
    ) -> Result<CreatedSession, ProviderError> {
        if let Some(e) = self.create_failures.lock().unwrap().pop_front() {
            return Err(e);
        }
        let millis = self.next_millis.fetch_add(1, Ordering::SeqCst);
        let reference = SessionReference::generate(&self.prefix, &applicant.account_id, millis)
            .map_err(|e| ProviderError::Config(e.to_string()))?;
        self.created.lock().unwrap().push(applicant.clone());
        Ok(CreatedSession {
            verification_url: format!("https://verify.null/{reference}"),
            reference,
        })
    }

    async fn fetch_status(
        &self,
        reference: &SessionReference,
    ) -> Result<VerificationResult, ProviderError> {
        self.fetched.lock().unwrap().push(reference.clone());
        if let Some(e) = self.fetch_failures.lock().unwrap().pop_front() {
            return Err(e);
        }
        Ok(self.status.lock().unwrap().clone())
    }
}
