//! Fire-and-forget referral bonus.
//!
//! Granting is decoupled from reconciliation: the reconciler enqueues a grant
//! and returns, and a background [`RewardWorker`] applies it. Failures are
//! logged, never retried, and never roll back the verification.

use std::sync::Arc;

use kycgate_store::AccountStore;
use kycgate_types::AccountId;
use tokio::sync::{broadcast, mpsc};

/// Bonus owed to both sides of a referral once the referred account verifies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferralGrant {
    pub referrer: AccountId,
    pub referred: AccountId,
    pub points: u64,
}

pub trait RewardTrigger: Send + Sync {
    /// Must not block.
    fn trigger(&self, grant: ReferralGrant);
}

/// Sends grants over an unbounded channel to a [`RewardWorker`].
#[derive(Clone)]
pub struct QueuedRewardTrigger {
    tx: mpsc::UnboundedSender<ReferralGrant>,
}

impl QueuedRewardTrigger {
    /// Create a trigger and the worker that drains it.
    pub fn new(store: Arc<dyn AccountStore>) -> (Self, RewardWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, RewardWorker { store, rx })
    }
}

impl RewardTrigger for QueuedRewardTrigger {
    fn trigger(&self, grant: ReferralGrant) {
        if let Err(e) = self.tx.send(grant) {
            tracing::warn!(
                referrer = %e.0.referrer,
                referred = %e.0.referred,
                "reward worker gone, referral bonus dropped"
            );
        }
    }
}

pub struct RewardWorker {
    store: Arc<dyn AccountStore>,
    rx: mpsc::UnboundedReceiver<ReferralGrant>,
}

impl RewardWorker {
    /// Apply grants until shutdown or until every trigger is dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                grant = self.rx.recv() => match grant {
                    Some(grant) => self.apply(&grant),
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!("reward worker shutting down");
                    break;
                }
            }
        }
    }

    /// Credit both accounts. Each side is independent; one failing does not
    /// stop the other.
    pub fn apply(&self, grant: &ReferralGrant) {
        for account in [&grant.referrer, &grant.referred] {
            match self.store.add_points(account, grant.points) {
                Ok(balance) => tracing::info!(
                    account = %account,
                    points = grant.points,
                    balance,
                    "referral bonus credited"
                ),
                Err(e) => tracing::warn!(
                    account = %account,
                    points = grant.points,
                    error = %e,
                    "referral bonus failed"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kycgate_nullables::NullStore;
    use kycgate_store::AccountRecord;

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    #[tokio::test]
    async fn worker_credits_both_sides() {
        let store = Arc::new(NullStore::new());
        store.insert(AccountRecord::new(id("referrer"), "r"));
        store.insert(AccountRecord::new(id("referred"), "d"));

        let (trigger, worker) = QueuedRewardTrigger::new(store.clone());
        let (_tx, shutdown) = broadcast::channel(1);
        let handle = tokio::spawn(worker.run(shutdown));

        trigger.trigger(ReferralGrant {
            referrer: id("referrer"),
            referred: id("referred"),
            points: 50,
        });
        drop(trigger);
        handle.await.unwrap();

        assert_eq!(store.get_account(&id("referrer")).unwrap().points, 50);
        assert_eq!(store.get_account(&id("referred")).unwrap().points, 50);
    }

    #[tokio::test]
    async fn missing_account_does_not_block_other_side() {
        let store = Arc::new(NullStore::new());
        store.insert(AccountRecord::new(id("referred"), "d"));
        let (_trigger, worker) = QueuedRewardTrigger::new(store.clone());

        worker.apply(&ReferralGrant {
            referrer: id("gone"),
            referred: id("referred"),
            points: 50,
        });
        assert_eq!(store.get_account(&id("referred")).unwrap().points, 50);
    }

    #[tokio::test]
    async fn shutdown_stops_worker() {
        let store = Arc::new(NullStore::new());
        let (_trigger, worker) = QueuedRewardTrigger::new(store);
        let (tx, shutdown) = broadcast::channel(1);
        let handle = tokio::spawn(worker.run(shutdown));
        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn trigger_after_worker_dropped_does_not_panic() {
        let store = Arc::new(NullStore::new());
        let (trigger, worker) = QueuedRewardTrigger::new(store);
        drop(worker);
        trigger.trigger(ReferralGrant {
            referrer: id("a"),
            referred: id("b"),
            points: 1,
        });
    }
}
