use std::sync::Arc;

use tokio::spawn;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::importer::{log_rejection, DealImporter};
use crate::models::{DealRecord, PersistedDeal, Rejection};
use crate::storage::DealStore;

/// A value tagged with its position in the submitted sequence.
pub type Sequenced<T> = (usize, T);

/// Everything one worker did with its shard.
#[derive(Debug, Default)]
pub struct WorkerReport {
    pub committed: Vec<Sequenced<PersistedDeal>>,
    pub rejected: Vec<Sequenced<Rejection>>
}

/// Owns one shard of a batch and imports its deals one at a time.
///
/// Deals routed to the same worker are imported in the order they were accepted.
/// The queue is bounded, so a slow worker holds back the dispatcher instead of
/// buffering the whole input.
pub struct ImportWorker {
    worker_id: usize,
    sender: mpsc::Sender<Sequenced<DealRecord>>,
    handle: JoinHandle<WorkerReport>
}

impl ImportWorker {
    /// Spawns the worker task with room for `capacity` queued deals.
    pub fn new<S: DealStore>(worker_id: usize, importer: Arc<DealImporter<S>>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Sequenced<DealRecord>>(capacity.max(1));

        let handle = spawn(async move {
            let mut report = WorkerReport::default();

            while let Some((sequence, record)) = receiver.recv().await {
                match importer.import_one(&record) {
                    Ok(deal) => {
                        debug!("Worker [{worker_id}] committed deal [{}] at position [{sequence}]", deal.deal_unique_id());
                        report.committed.push((sequence, deal));
                    }
                    Err(error) => {
                        log_rejection(&error);
                        report.rejected.push((sequence, Rejection::from(&error)));
                    }
                }
            }

            report
        });

        Self { worker_id, sender, handle }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Queues a deal, waiting while the queue is full. Returns `false` if the
    /// worker has already stopped.
    pub async fn accept(&self, sequence: usize, record: DealRecord) -> bool {
        self.sender.send((sequence, record)).await.is_ok()
    }

    /// Closes the queue, waits for it to drain and returns the outcome of every deal.
    pub async fn despawn(self) -> Result<WorkerReport, JoinError> {
        drop(self.sender);
        self.handle.await
    }
}
