use std::fs::File;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::available_parallelism;

use anyhow::Context;
use csv::{ReaderBuilder, Trim};
use futures::future::join_all;
use tokio::spawn;
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{error, info};

use crate::actors::ImportWorker;
use crate::importer::DealImporter;
use crate::models::{DealRecord, PersistedDeal, Rejection};
use crate::storage::DealStore;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_BACKPRESSURE: usize = 256;

/// Outcome of a batch, both lists in submission order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub imported: Vec<PersistedDeal>,
    pub rejected: Vec<Rejection>
}

impl BatchReport {
    pub fn received(&self) -> usize {
        self.imported.len() + self.rejected.len()
    }
}

/// Concurrent batch coordinator.
///
/// Deals are sharded across a fixed pool of workers by their unique identifier,
/// so two deals with the same identifier are always handled by the same worker
/// in submission order. The result lists accepted deals in submission order.
pub struct AsyncEngine<S: DealStore> {
    importer: Arc<DealImporter<S>>,
    workers: usize,
    backpressure: usize
}

impl<S: DealStore> AsyncEngine<S> {
    pub fn new(importer: Arc<DealImporter<S>>) -> Self {
        Self {
            importer,
            workers: available_parallelism().map(NonZeroUsize::get).unwrap_or(DEFAULT_WORKERS),
            backpressure: DEFAULT_BACKPRESSURE
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Bounds both the input channel and each worker's queue, so at most
    /// `backpressure * (workers + 1)` deals are in memory at once.
    pub fn with_backpressure(mut self, backpressure: usize) -> Self {
        self.backpressure = backpressure.max(1);
        self
    }

    /// Imports every deal in a CSV file.
    ///
    /// Fields that do not parse are reported as structural rejections of their
    /// row. Only rows the CSV reader cannot decode at all are logged and skipped.
    ///
    /// # Errors
    /// Fails only if the file cannot be opened.
    pub async fn run(&self, path: &str) -> anyhow::Result<BatchReport> {
        let file = File::open(path).with_context(|| format!("Error opening CSV at path: {path}"))?;

        let (sender, receiver) = mpsc::channel::<DealRecord>(self.backpressure);
        let csv_handle = self.spawn_csv_reader(file, sender);
        let report = self.process_records(receiver).await;

        if let Err(error) = csv_handle.await {
            error!("CSV ingestion failed: {error}");
        }

        Ok(report)
    }

    /// Imports an in-memory batch. Never fails as a whole.
    pub async fn import_batch(&self, records: Vec<DealRecord>) -> Vec<PersistedDeal> {
        let (sender, receiver) = mpsc::channel::<DealRecord>(self.backpressure);

        let feeder = spawn(async move {
            for record in records {
                if sender.send(record).await.is_err() {
                    break;
                }
            }
        });

        let report = self.process_records(receiver).await;

        if let Err(error) = feeder.await {
            error!("Batch feeder failed: {error}");
        }

        report.imported
    }

    fn spawn_csv_reader(&self, file: File, sender: mpsc::Sender<DealRecord>) -> JoinHandle<()> {
        spawn_blocking(move || {
            let mut reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_reader(BufReader::new(file));

            for result in reader.deserialize::<DealRecord>() {
                match result {
                    Ok(record) => {
                        if sender.blocking_send(record).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        error!("CSV deserialization error: {error}");
                    }
                }
            }
        })
    }

    async fn process_records(&self, mut receiver: mpsc::Receiver<DealRecord>) -> BatchReport {
        let workers: Vec<ImportWorker> = (0..self.workers)
            .map(|worker_id| ImportWorker::new(worker_id, self.importer.clone(), self.backpressure))
            .collect();

        let mut received = 0;

        while let Some(record) = receiver.recv().await {
            let worker = &workers[shard_for(&record, workers.len())];
            let identifier = record.identifier().to_string();

            if !worker.accept(received, record).await {
                error!("Import worker [{}] could not accept deal [{identifier}]", worker.worker_id());
            }

            received += 1;
        }

        let despawns = workers.into_iter().map(|worker| worker.despawn());
        let mut imported = Vec::with_capacity(received);
        let mut rejected = Vec::new();

        for result in join_all(despawns).await {
            match result {
                Ok(report) => {
                    imported.extend(report.committed);
                    rejected.extend(report.rejected);
                }
                Err(error) => error!("An import worker did not despawn gracefully: {error:?}")
            }
        }

        //NOTE: Workers finish independently, restore submission order before handing the batch back.
        imported.sort_by_key(|(sequence, _)| *sequence);
        rejected.sort_by_key(|(sequence, _)| *sequence);

        info!("Imported {}/{} deals", imported.len(), received);

        BatchReport {
            imported: imported.into_iter().map(|(_, deal)| deal).collect(),
            rejected: rejected.into_iter().map(|(_, rejection)| rejection).collect()
        }
    }
}

fn shard_for(record: &DealRecord, shards: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    record.deal_unique_id.hash(&mut hasher);

    (hasher.finish() % shards as u64) as usize
}
