//! Route-level tests against the axum router with a scripted API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use kycgate_rpc::{
    router, CreateVerificationResponse, KycApi, RpcError, RpcState, VerificationStatusResponse,
    WebhookResponse,
};
use kycgate_types::{AccountId, KycState};
use prometheus::{IntCounter, Registry};
use tower::ServiceExt;

#[derive(Default)]
struct ScriptedApi {
    webhook_calls: Mutex<Vec<(Vec<u8>, Option<String>)>>,
}

#[async_trait]
impl KycApi for ScriptedApi {
    async fn create_verification(
        &self,
        account_id: &AccountId,
    ) -> Result<CreateVerificationResponse, RpcError> {
        match account_id.as_str() {
            "ghost" => Err(RpcError::NotFound(format!("account {account_id}"))),
            "banned" => Err(RpcError::Forbidden {
                code: Some("account_suspended".into()),
                message: "account suspended".into(),
            }),
            _ => Ok(CreateVerificationResponse {
                verification_url: "https://verify.example.test/s/1".into(),
                reference: format!("kyc-{account_id}-1700000000000"),
            }),
        }
    }

    async fn check_status(
        &self,
        account_id: &AccountId,
    ) -> Result<VerificationStatusResponse, RpcError> {
        match account_id.as_str() {
            "flaky" => Err(RpcError::Upstream("timed out".into())),
            "broken" => Err(RpcError::Server("lmdb: map full".into())),
            _ => Ok(VerificationStatusResponse {
                kyc_state: KycState::Rejected,
                code: Some("face_match_low_confidence".into()),
                message: Some("retake".into()),
                remaining_attempts: Some(3),
            }),
        }
    }

    async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookResponse, RpcError> {
        self.webhook_calls
            .lock()
            .unwrap()
            .push((body.to_vec(), signature.map(str::to_string)));
        match signature {
            Some("good") => Ok(WebhookResponse {
                reference: "kyc-acc1-1".into(),
                kyc_state: KycState::Verified,
                code: None,
            }),
            Some("dup") => Err(RpcError::Conflict {
                code: Some("duplicate_identity".into()),
                message: "already verified elsewhere".into(),
                remaining_attempts: Some(3),
            }),
            _ => Err(RpcError::Unauthorized),
        }
    }
}

fn app(api: Arc<ScriptedApi>) -> axum::Router {
    let registry = Registry::new();
    let counter = IntCounter::new("kycgate_test_total", "test counter").unwrap();
    registry.register(Box::new(counter.clone())).unwrap();
    counter.inc();
    router(Arc::new(RpcState {
        api,
        registry,
        signature_header: "x-kyc-signature".into(),
    }))
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_verification_returns_link() {
    let resp = app(Arc::default())
        .oneshot(
            Request::post("/accounts/acc1/verification")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["reference"], "kyc-acc1-1700000000000");
    assert_eq!(body["verification_url"], "https://verify.example.test/s/1");
}

#[tokio::test]
async fn api_errors_map_to_status_codes() {
    let cases = [
        ("POST", "/accounts/ghost/verification", StatusCode::NOT_FOUND),
        ("POST", "/accounts/banned/verification", StatusCode::FORBIDDEN),
        ("GET", "/accounts/flaky/verification", StatusCode::BAD_GATEWAY),
        ("GET", "/accounts/broken/verification", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (method, uri, expected) in cases {
        let resp = app(Arc::default())
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), expected, "{method} {uri}");
    }
}

#[tokio::test]
async fn server_errors_do_not_leak_details() {
    let resp = app(Arc::default())
        .oneshot(
            Request::get("/accounts/broken/verification")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["error"], "server_error");
    assert!(!body["message"].as_str().unwrap().contains("lmdb"));
}

#[tokio::test]
async fn status_omits_absent_fields() {
    let resp = app(Arc::default())
        .oneshot(
            Request::get("/accounts/acc1/verification")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["kyc_state"], "rejected");
    assert_eq!(body["code"], "face_match_low_confidence");
    assert_eq!(body["remaining_attempts"], 3);
}

#[tokio::test]
async fn webhook_passes_raw_body_and_configured_header() {
    let api = Arc::new(ScriptedApi::default());
    let raw = br#"{"event":"verification.accepted",  "reference":"kyc-acc1-1"}"#;
    let resp = app(api.clone())
        .oneshot(
            Request::post("/webhooks/kyc")
                .header("x-kyc-signature", "good")
                .header("content-type", "application/json")
                .body(Body::from(raw.to_vec()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["kyc_state"], "verified");

    let calls = api.webhook_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, raw.to_vec());
    assert_eq!(calls[0].1.as_deref(), Some("good"));
}

#[tokio::test]
async fn webhook_without_signature_is_unauthorized() {
    let api = Arc::new(ScriptedApi::default());
    let resp = app(api.clone())
        .oneshot(
            Request::post("/webhooks/kyc")
                .header("signature", "good")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(api.webhook_calls.lock().unwrap()[0].1, None);
}

#[tokio::test]
async fn webhook_duplicate_is_conflict() {
    let resp = app(Arc::default())
        .oneshot(
            Request::post("/webhooks/kyc")
                .header("x-kyc-signature", "dup")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["code"], "duplicate_identity");
    assert_eq!(body["remaining_attempts"], 3);
}

#[tokio::test]
async fn forbidden_body_carries_code() {
    let resp = app(Arc::default())
        .oneshot(
            Request::post("/accounts/banned/verification")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "account_suspended");
    assert!(body.get("remaining_attempts").is_none());
}

#[tokio::test]
async fn invalid_account_id_is_bad_request() {
    let resp = app(Arc::default())
        .oneshot(
            Request::get("/accounts/has%20space/verification")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_render_prometheus_text() {
    let resp = app(Arc::default())
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("kycgate_test_total 1"));
}

#[tokio::test]
async fn health_reports_ok() {
    let resp = app(Arc::default())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");
}
