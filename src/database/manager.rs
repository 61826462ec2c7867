use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::pagination::PageError;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {}", .0.as_deref().unwrap_or("unknown"))]
    UniqueViolation(Option<String>),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    /// Classifies a driver error, pulling unique violations out so callers can
    /// turn them into conflicts.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::UniqueViolation(db_err.constraint().map(str::to_string));
            }
        }
        DatabaseError::Sqlx(err)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        Self::from_sqlx(err)
    }
}

/// Builds the application's single connection pool. The pool is handed to
/// repositories explicitly; nothing here is cached globally.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config)
            .connect_with(Self::connect_options(config)?)
            .await?;
        info!(max_connections = config.max_connections, "Created database pool");
        Ok(pool)
    }

    /// Pool that opens connections on first use. Startup does not fail when
    /// the database is down; `/health` reports it instead.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        Ok(Self::pool_options(config).connect_lazy_with(Self::connect_options(config)?))
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.connection_timeout.max(1)))
    }

    fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        let connection_string = Self::connection_string(&config.url)?;
        let statement_level = if config.enable_query_logging {
            LevelFilter::Debug
        } else {
            LevelFilter::Off
        };
        Ok(PgConnectOptions::from_str(&connection_string)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?
            .log_statements(statement_level)
            .log_slow_statements(
                LevelFilter::Warn,
                Duration::from_millis(config.slow_query_threshold_ms),
            ))
    }

    fn connection_string(raw: &str) -> Result<String, DatabaseError> {
        if raw.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let url = url::Url::parse(raw.trim()).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        if url.path().trim_start_matches('/').is_empty() {
            return Err(DatabaseError::ConfigMissing("database name in DATABASE_URL"));
        }
        Ok(url.into())
    }
}
