//! `eggs-production`: egg-production records (model, storage port, service).
//!
//! This crate is transport-agnostic. HTTP lives in `eggs-api`; the Postgres
//! adapter lives in `eggs-infra`.

pub mod record;
pub mod service;
pub mod store;

pub use record::{EggProductionRecord, RecordStatus};
pub use service::EggProductionService;
pub use store::{EggProductionStore, InMemoryEggProductionStore, StoreError};
