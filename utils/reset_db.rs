use event_media_kit::{config, db};
use migration::{Migrator, MigratorTrait};

/// Rolls back every migration, dropping all tables. Media files are left in place.
#[tokio::main]
async fn main() -> Result<(), sea_orm::DbErr> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = config::get_config();
    let db = db::connect(&config.database_url).await?;

    Migrator::reset(&db).await?;
    tracing::info!("Database reset successfully");
    Ok(())
}
