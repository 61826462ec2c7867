pub mod manager;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod query_builder;
pub mod repositories;

pub use manager::{DatabaseError, DatabaseManager};
pub use migrations::run_migrations;
