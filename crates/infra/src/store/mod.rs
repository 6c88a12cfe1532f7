//! Record store adapters.

pub mod postgres;

pub use postgres::PostgresEggProductionStore;
