// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Long-lived consumer tasks binding a queue to one handler.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::bulk::CommandBulk;
use crate::errors::BoxError;
use crate::handler::BulkHandler;
use crate::queue::SynchronizedQueue;

/// How long a worker waits on an empty queue before re-checking the
/// cancellation token.
pub const POP_TIMEOUT: Duration = Duration::from_millis(100);

/// Handler that forwards completed bulks onto a queue, decoupling the
/// producing session from whichever worker pool consumes the queue.
pub struct QueueSink {
    queue: SynchronizedQueue<CommandBulk>,
}

impl QueueSink {
    #[must_use]
    pub fn new(queue: SynchronizedQueue<CommandBulk>) -> Self {
        Self { queue }
    }
}

impl BulkHandler for QueueSink {
    fn handle(&self, bulk: &CommandBulk) -> Result<(), BoxError> {
        self.queue.push(bulk.clone());
        Ok(())
    }
}

/// One or more consumer tasks popping bulks from a shared queue and
/// invoking a single bound handler on each.
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl WorkerPool {
    /// Spawns `workers` consumer tasks sharing `queue`, each invoking
    /// `handler` on every bulk popped.
    #[must_use]
    pub fn start(
        queue: SynchronizedQueue<CommandBulk>,
        handler: Arc<dyn BulkHandler>,
        workers: usize,
        cancel_token: CancellationToken,
    ) -> Self {
        let workers = (0..workers)
            .map(|worker_id| {
                let queue = queue.clone();
                let handler = Arc::clone(&handler);
                let token = cancel_token.clone();
                tokio::spawn(run_worker(worker_id, queue, handler, token))
            })
            .collect();
        Self {
            workers,
            cancel_token,
        }
    }

    /// Cancels the pool and waits for the workers to drain the queue and
    /// exit. Bulks already queued are all delivered before this returns.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("bulk worker task failed: {e}");
            }
        }
    }
}

async fn run_worker(
    worker_id: usize,
    queue: SynchronizedQueue<CommandBulk>,
    handler: Arc<dyn BulkHandler>,
    cancel_token: CancellationToken,
) {
    debug!("bulk worker {worker_id} started");
    // Cancellation stops the intake of new work only once the queue is
    // drained; queued bulks are never discarded.
    while !cancel_token.is_cancelled() || !queue.is_empty() {
        if let Some(bulk) = queue.try_pop(POP_TIMEOUT).await {
            if let Err(e) = handler.handle(&bulk) {
                error!("unexpected error during command bulk handling: {e}");
            }
        }
    }
    debug!("bulk worker {worker_id} stopped");
}
