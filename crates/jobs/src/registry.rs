//! Table of running customer jobs.
//!
//! [`JobRegistry`] is created once at startup and shared behind an `Arc`.
//! It owns a master [`CancellationToken`]; every job gets a child token so a
//! single job can be stopped on its own while [`JobRegistry::shutdown`]
//! stops them all.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use orderpulse_core::types::DbId;
use orderpulse_events::EventSink;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::JobConfig;
use crate::gateway::EntityGateway;
use crate::worker::{self, JobContext};

/// Bookkeeping for one running job.
struct JobHandle {
    /// Child of the registry's master token.
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Keeps at most one running job per customer.
pub struct JobRegistry {
    jobs: RwLock<HashMap<DbId, JobHandle>>,
    ctx: JobContext,
    shutdown_grace: std::time::Duration,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
}

impl JobRegistry {
    pub fn new(
        gateway: Arc<dyn EntityGateway>,
        sink: Arc<dyn EventSink>,
        config: JobConfig,
    ) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            ctx: JobContext {
                gateway,
                sink,
                amounts: config.amounts,
                period: config.period,
            },
            shutdown_grace: config.shutdown_grace,
            cancel: CancellationToken::new(),
        }
    }

    /// Start the job for `customer_id` unless one is already running.
    ///
    /// The first cycle runs as soon as the worker task is scheduled. Concurrent
    /// calls for the same customer spawn a single worker. After
    /// [`shutdown`](Self::shutdown) this does nothing.
    pub async fn start(&self, customer_id: DbId) {
        let mut jobs = self.jobs.write().await;

        if self.cancel.is_cancelled() {
            tracing::warn!(customer_id, "Job registry is shut down, not starting job");
            return;
        }

        match jobs.entry(customer_id) {
            Entry::Occupied(mut slot) => {
                if !slot.get().task.is_finished() {
                    tracing::debug!(customer_id, "Order job already running");
                    return;
                }
                // The worker only ends on cancellation, so a finished task
                // without a cancelled token panicked.
                tracing::warn!(customer_id, "Replacing order job whose worker exited");
                slot.insert(self.spawn(customer_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(self.spawn(customer_id));
            }
        }
    }

    /// Stop the job for `customer_id`, if any.
    ///
    /// Signals the worker and returns without waiting for it. A cycle that is
    /// already running completes; no further cycle starts.
    pub async fn stop(&self, customer_id: DbId) {
        let removed = self.jobs.write().await.remove(&customer_id);

        match removed {
            Some(handle) => {
                handle.cancel.cancel();
                tracing::info!(customer_id, "Order job stopped");
            }
            None => {
                tracing::debug!(customer_id, "No order job to stop");
            }
        }
    }

    /// Start jobs for every id in `customer_ids`. Ids already running are
    /// left alone.
    pub async fn resume<I>(&self, customer_ids: I)
    where
        I: IntoIterator<Item = DbId>,
    {
        let mut count = 0usize;
        for customer_id in customer_ids {
            self.start(customer_id).await;
            count += 1;
        }
        tracing::info!(count, "Resumed order jobs");
    }

    pub async fn is_running(&self, customer_id: DbId) -> bool {
        self.jobs.read().await.contains_key(&customer_id)
    }

    pub async fn active_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Ids of customers with a running job, ascending.
    pub async fn active_ids(&self) -> Vec<DbId> {
        let mut ids: Vec<DbId> = self.jobs.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Stop every job and wait for the workers to exit.
    ///
    /// Each worker gets up to the configured grace period. Later calls to
    /// [`start`](Self::start) are ignored.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down job registry");
        self.cancel.cancel();

        let drained: Vec<(DbId, JobHandle)> = self.jobs.write().await.drain().collect();
        for (customer_id, handle) in drained {
            handle.cancel.cancel();
            if tokio::time::timeout(self.shutdown_grace, handle.task)
                .await
                .is_err()
            {
                tracing::warn!(customer_id, "Order job did not stop within grace period");
            }
        }

        tracing::info!("Job registry shut down complete");
    }

    // ---- private helpers ----

    fn spawn(&self, customer_id: DbId) -> JobHandle {
        let cancel = self.cancel.child_token();
        let task = tokio::spawn(worker::run(customer_id, self.ctx.clone(), cancel.clone()));
        JobHandle { cancel, task }
    }
}

impl Drop for JobRegistry {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
