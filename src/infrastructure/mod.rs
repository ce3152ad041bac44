//! Infrastructure layer — persistence and external adapters

pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig};
pub use database::repositories::SeaOrmRepositoryProvider;
