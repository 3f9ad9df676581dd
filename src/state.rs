use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::services::storage::MediaStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: MediaStorage,
    pub config: Config,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self {
            db,
            storage: MediaStorage::from_config(&config),
            config,
        }
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
