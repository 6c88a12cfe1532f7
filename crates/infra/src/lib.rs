//! Infrastructure layer: Postgres record store, remote signing keys.

pub mod jwks;
pub mod store;

pub use jwks::JwksValidator;
pub use store::PostgresEggProductionStore;
