//! Import pipeline for FX deals: validation, duplicate rejection and per-deal
//! atomic persistence, with sequential and concurrent batch coordinators.

pub mod actors;
pub mod engine;
pub mod importer;
pub mod models;
pub mod storage;
pub mod types;
pub mod validation;
