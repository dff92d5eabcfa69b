//! Side channel that records raw provider exchanges for support staff.
//!
//! Records contain applicant data and must only be written somewhere access
//! controlled. A sink failure never affects the call being recorded.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One request/response pair.
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticRecord {
    /// RFC 3339 UTC.
    pub at: String,
    pub operation: &'static str,
    pub reference: String,
    pub request: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiagnosticRecord {
    /// `at_millis` is epoch milliseconds from the gateway's clock.
    pub fn new(at_millis: u64, operation: &'static str, reference: &str, request: Value) -> Self {
        let at = i64::try_from(at_millis)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        Self {
            at,
            operation,
            reference: reference.to_string(),
            request,
            status: None,
            response: None,
            error: None,
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: &DiagnosticRecord);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _record: &DiagnosticRecord) {}
}

/// Appends newline-delimited JSON to `<dir>/provider-<YYYY-MM-DD>.jsonl`.
#[derive(Debug)]
pub struct FileDiagnosticSink {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDiagnosticSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn file_for(&self, record: &DiagnosticRecord) -> PathBuf {
        let day = record.at.get(..10).unwrap_or("unknown");
        self.dir.join(format!("provider-{day}.jsonl"))
    }

    fn append(&self, record: &DiagnosticRecord) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        std::fs::create_dir_all(&self.dir)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(record))?
            .write_all(&line)
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn record(&self, record: &DiagnosticRecord) {
        if let Err(e) = self.append(record) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to write provider diagnostic");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOON_2023_11_14: u64 = 1_699_963_200_000;

    #[test]
    fn timestamp_comes_from_caller() {
        let rec = DiagnosticRecord::new(NOON_2023_11_14, "status", "r", json!({}));
        assert_eq!(rec.at, "2023-11-14T12:00:00+00:00");
    }

    #[test]
    fn file_sink_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileDiagnosticSink::new(dir.path().join("diag"));

        let mut rec = DiagnosticRecord::new(
            NOON_2023_11_14,
            "status",
            "kyc-a-1",
            json!({ "reference": "kyc-a-1" }),
        );
        rec.status = Some(200);
        sink.record(&rec);
        sink.record(&DiagnosticRecord::new(
            NOON_2023_11_14 + 1,
            "session",
            "kyc-a-2",
            json!({}),
        ));

        let file = sink.file_for(&rec);
        assert!(file.ends_with("provider-2023-11-14.jsonl"));
        let text = std::fs::read_to_string(file).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["operation"], "status");
        assert_eq!(lines[0]["status"], 200);
        assert!(lines[1].get("status").is_none());
    }

    #[test]
    fn unwritable_sink_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let sink = FileDiagnosticSink::new(blocker.join("sub"));
        sink.record(&DiagnosticRecord::new(0, "status", "r", json!({})));
    }
}
