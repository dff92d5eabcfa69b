//! Shutdown coordination for the node's long-running tasks: the HTTP server
//! and the referral reward worker.
//!
//! The first trigger wins and is remembered, so `KycNode::run` can tell an
//! operator signal apart from an HTTP server that died on its own.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio::signal;
use tokio::sync::broadcast;

/// What started the shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    /// The HTTP server exited with an error.
    ServerFailed,
    /// `KycNode::stop` or a test asked for it.
    Requested,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interrupt => "sigint",
            Self::Terminate => "sigterm",
            Self::ServerFailed => "server_failed",
            Self::Requested => "requested",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
    reason: Arc<OnceLock<ShutdownReason>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            reason: Arc::new(OnceLock::new()),
        }
    }

    /// Receiver for tasks that `select!` on shutdown, such as the reward worker.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Record `reason` if nothing triggered earlier, then notify every task.
    pub fn trigger(&self, reason: ShutdownReason) {
        if self.reason.set(reason).is_ok() {
            tracing::info!(%reason, "shutdown triggered");
        }
        let _ = self.tx.send(());
    }

    pub fn shutdown(&self) {
        self.trigger(ShutdownReason::Requested);
    }

    /// The first reason given, if shutdown has started.
    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().copied()
    }

    pub fn is_triggered(&self) -> bool {
        self.reason.get().is_some()
    }

    /// Resolves once shutdown has been triggered, even if that happened
    /// before the call.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }

    /// Wait for SIGINT or SIGTERM and trigger shutdown with it.
    pub async fn wait_for_signal(&self) -> ShutdownReason {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable, relying on SIGINT");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let reason = tokio::select! {
            _ = ctrl_c => ShutdownReason::Interrupt,
            _ = terminate => ShutdownReason::Terminate,
        };
        self.trigger(reason);
        reason
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
