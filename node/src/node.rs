//! Node assembly and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use kycgate_identity::FingerprintComputer;
use kycgate_provider::{
    DiagnosticSink, FileDiagnosticSink, HttpProviderGateway, NoopDiagnosticSink, ProviderGateway,
};
use kycgate_rpc::{RpcServer, RpcState};
use kycgate_store::{AccountStore, SessionStore};
use kycgate_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use kycgate_types::{Clock, SystemClock};
use kycgate_verification::{QueuedRewardTrigger, RewardWorker, VerificationReconciler};
use tokio::task::JoinHandle;

use crate::metrics::KycMetrics;
use crate::service::{KycService, ServiceParts};
use crate::{NodeConfig, ServiceError, ShutdownController, ShutdownReason};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage, provider and clock a node runs on.
pub struct NodeBackends {
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub gateway: Arc<dyn ProviderGateway>,
    pub clock: Arc<dyn Clock>,
}

pub struct KycNode {
    config: NodeConfig,
    /// Present when the node owns an LMDB environment.
    env: Option<LmdbEnvironment>,
    service: Arc<KycService>,
    metrics: Arc<KycMetrics>,
    shutdown: ShutdownController,
    reward_worker: Option<RewardWorker>,
    task_handles: Vec<JoinHandle<()>>,
}

impl KycNode {
    /// Open the LMDB environment and connect to the real provider.
    pub fn new(config: NodeConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        check_data_dir(&config.data_dir).map_err(ServiceError::Config)?;

        let env = LmdbEnvironment::open(&config.data_dir, config.map_size)?;
        let report = check_integrity(&env)?;
        if !report.is_healthy() {
            for error in &report.errors {
                tracing::error!(%error, "integrity check failed");
            }
            return Err(ServiceError::Config(format!(
                "data directory {} failed the integrity check ({} errors)",
                config.data_dir.display(),
                report.errors.len()
            )));
        }
        tracing::info!(
            path = %config.data_dir.display(),
            entries = report.total_entries,
            verified = report.verified_accounts,
            "LMDB environment opened"
        );

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let diagnostics: Arc<dyn DiagnosticSink> = match &config.diagnostics_dir {
            Some(dir) => Arc::new(FileDiagnosticSink::new(dir)),
            None => Arc::new(NoopDiagnosticSink),
        };
        let gateway = HttpProviderGateway::new(
            config.provider.clone(),
            config.params.reference_prefix.clone(),
            Arc::clone(&clock),
            diagnostics,
        )?;

        let backends = NodeBackends {
            accounts: Arc::new(env.account_store()),
            sessions: Arc::new(env.session_store()),
            gateway: Arc::new(gateway),
            clock,
        };
        let mut node = Self::with_backends(config, backends)?;
        node.env = Some(env);
        Ok(node)
    }

    /// Assemble a node over the given backends.
    pub fn with_backends(config: NodeConfig, backends: NodeBackends) -> Result<Self, ServiceError> {
        let metrics = Arc::new(KycMetrics::new()?);
        let (rewards, reward_worker) = QueuedRewardTrigger::new(Arc::clone(&backends.accounts));

        let reconciler = Arc::new(VerificationReconciler::new(
            Arc::clone(&backends.accounts),
            FingerprintComputer::new(config.fingerprint_secret.clone()),
            Arc::new(rewards),
            config.params.clone(),
            Arc::clone(&backends.clock),
        ));

        let service = Arc::new(KycService::new(ServiceParts {
            accounts: backends.accounts,
            sessions: backends.sessions,
            gateway: backends.gateway,
            reconciler,
            webhook_secret: config.webhook_secret.clone(),
            clock: backends.clock,
            metrics: Arc::clone(&metrics),
        }));

        Ok(Self {
            config,
            env: None,
            service,
            metrics,
            shutdown: ShutdownController::new(),
            reward_worker: Some(reward_worker),
            task_handles: Vec::new(),
        })
    }

    pub fn service(&self) -> &Arc<KycService> {
        &self.service
    }

    pub fn metrics(&self) -> &Arc<KycMetrics> {
        &self.metrics
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    fn rpc_state(&self) -> Arc<RpcState> {
        Arc::new(RpcState {
            api: self.service.clone(),
            registry: self.metrics.registry.clone(),
            signature_header: self.config.webhook_signature_header.clone(),
        })
    }

    /// The HTTP API without binding a socket.
    pub fn router(&self) -> axum::Router {
        kycgate_rpc::router(self.rpc_state())
    }

    /// Spawn the reward worker and the HTTP server.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        if let Some(worker) = self.reward_worker.take() {
            let shutdown_rx = self.shutdown.subscribe();
            self.task_handles.push(tokio::spawn(worker.run(shutdown_rx)));
        }

        let server = RpcServer::new(
            self.config.bind_address.clone(),
            self.config.http_port,
            self.rpc_state(),
        );
        let shutdown = self.shutdown.clone();
        let rpc_handle = tokio::spawn(async move {
            let signal = shutdown.clone();
            let stop = async move {
                signal.triggered().await;
                tracing::info!("RPC server shutting down");
            };
            match server.start(stop).await {
                Ok(()) => tracing::info!("RPC server exited"),
                Err(e) => {
                    tracing::error!("RPC server error: {e}");
                    shutdown.trigger(ShutdownReason::ServerFailed);
                }
            }
        });
        self.task_handles.push(rpc_handle);

        tracing::info!(
            bind = %self.config.bind_address,
            port = self.config.http_port,
            "kycgate node started"
        );
        Ok(())
    }

    /// Signal every task and wait for them, bounded by a timeout.
    pub async fn stop(&mut self) -> Result<(), ServiceError> {
        tracing::info!("kycgate node stopping");
        self.shutdown.shutdown();

        let handles: Vec<JoinHandle<()>> = self.task_handles.drain(..).collect();
        let wait_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        let timed_out = tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all)
            .await
            .is_err();

        if let Some(env) = &self.env {
            match env.force_sync() {
                Ok(()) => tracing::info!("LMDB flushed to disk"),
                Err(e) => tracing::warn!("LMDB force_sync failed: {e}"),
            }
        }

        if timed_out {
            tracing::warn!(
                "shutdown timeout ({:?}), some tasks may still be running",
                SHUTDOWN_TIMEOUT
            );
            return Err(ServiceError::ShutdownTimeout);
        }
        tracing::info!("kycgate node stopped");
        Ok(())
    }

    /// Start, run until SIGINT/SIGTERM or an internal failure, then stop.
    pub async fn run(mut self) -> Result<(), ServiceError> {
        self.start().await?;
        let shutdown = self.shutdown.clone();
        tokio::select! {
            _ = shutdown.wait_for_signal() => {}
            _ = shutdown.triggered() => {}
        }
        if let Some(reason) = shutdown.reason() {
            tracing::info!(%reason, "kycgate node leaving run loop");
        }
        self.stop().await
    }
}
