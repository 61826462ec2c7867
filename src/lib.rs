pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod services;

pub use app::{router, AppState, Repositories};
pub use config::AppConfig;
