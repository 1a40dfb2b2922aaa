use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::info;

use wallet_sync::config::AppConfig;
use wallet_sync::utils::logging;

/// Execute the migrate command
pub async fn execute(config: &AppConfig, steps: Option<u32>) -> anyhow::Result<()> {
    logging::log_database_connection_details(&config.database.url);

    let connection = Database::connect(config.database.url.as_str())
        .await
        .context("Failed to connect to database")?;

    let all_migrations = Migrator::get_migration_files();
    info!("Found {} migration files", all_migrations.len());

    match steps {
        Some(n) => info!("Running {} migrations", n),
        None => info!("Running all pending migrations"),
    }

    Migrator::up(&connection, steps)
        .await
        .context("Failed to run migrations")?;

    info!("Migrations applied");
    Ok(())
}
