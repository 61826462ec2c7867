use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{run_migrations, DatabaseManager};

pub async fn handle(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    let applied = run_migrations(&pool).await?;
    pool.close().await;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "applied": applied })),
        OutputFormat::Text => println!("Applied {} migration statements", applied),
    }
    Ok(())
}
