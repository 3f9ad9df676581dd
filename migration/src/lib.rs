pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_sessions_table;
mod m20250102_000003_create_events_table;
mod m20250102_000004_create_event_images_table;
mod m20250102_000005_create_event_videos_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_sessions_table::Migration),
            Box::new(m20250102_000003_create_events_table::Migration),
            Box::new(m20250102_000004_create_event_images_table::Migration),
            Box::new(m20250102_000005_create_event_videos_table::Migration),
        ]
    }
}
