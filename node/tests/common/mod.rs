//! Shared fixtures for node tests.
#![allow(dead_code)]

use std::sync::Arc;

use kycgate_crypto::compute_signature;
use kycgate_node::{KycNode, NodeBackends, NodeConfig};
use kycgate_nullables::{NullClock, NullProvider, NullStore};
use kycgate_store::AccountRecord;
use kycgate_types::{
    AccountId, IdentityAttributes, RawDate, SecretKey, VerificationEvent, VerificationResult,
};

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub struct Fixture {
    pub node: KycNode,
    pub store: Arc<NullStore>,
    pub provider: Arc<NullProvider>,
}

pub fn config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.webhook_secret = SecretKey::from(WEBHOOK_SECRET);
    config.fingerprint_secret = SecretKey::from("test-fingerprint-key");
    config.provider.secret_key = SecretKey::from("test-provider-secret");
    config
}

pub fn fixture() -> Fixture {
    fixture_with(config())
}

pub fn fixture_with(config: NodeConfig) -> Fixture {
    let store = Arc::new(NullStore::new());
    let provider = Arc::new(NullProvider::new());
    let node = KycNode::with_backends(
        config,
        NodeBackends {
            accounts: store.clone(),
            sessions: store.clone(),
            gateway: provider.clone(),
            clock: Arc::new(NullClock::default()),
        },
    )
    .unwrap();
    Fixture {
        node,
        store,
        provider,
    }
}

pub fn id(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

pub fn account(s: &str) -> AccountRecord {
    let mut record = AccountRecord::new(id(s), "ada obi");
    record.email = Some(format!("{s}@example.test"));
    record.country = Some("NG".into());
    record
}

pub fn attributes() -> IdentityAttributes {
    IdentityAttributes {
        country: Some("Nigeria".into()),
        date_of_birth: Some(RawDate::Text("1990-05-17".into())),
        given_name: Some("Ada".into()),
        family_name: Some("Obi".into()),
        full_name: None,
        document_number: Some("A1234".into()),
    }
}

pub fn accepted(confidence: u8) -> VerificationResult {
    VerificationResult {
        event: VerificationEvent::Accepted,
        face_match_confidence: confidence,
        attributes: attributes(),
        declined_reason: None,
        provider_event: "verification.accepted".into(),
    }
}

pub fn webhook_body(reference: &str, event: &str) -> Vec<u8> {
    format!(r#"{{"reference":"{reference}","event":"{event}"}}"#).into_bytes()
}

pub fn sign(body: &[u8]) -> String {
    compute_signature(body, WEBHOOK_SECRET.as_bytes())
}
