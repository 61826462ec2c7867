use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;

use crate::app::{router, AppState, Repositories};
use crate::config::AppConfig;
use crate::database::{run_migrations, DatabaseManager};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides API_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Apply migrations before accepting requests")]
    pub migrate: bool,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }

    tracing::info!("Starting Dove API in {:?} mode", config.environment);

    // Connections open on first use, so a database outage shows up on /health
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    if args.migrate {
        let applied = run_migrations(&pool).await.context("migrations failed")?;
        tracing::info!(applied, "Migrations applied");
    }

    let bind_addr = config.bind_address();
    let state = AppState::new(config, pool.clone(), Repositories::postgres(&pool));
    let app = router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Dove API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
