mod import_worker;

pub use import_worker::{ImportWorker, Sequenced, WorkerReport};
