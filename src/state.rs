use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    /// Partition-addressed document storage (categories, profiles,
    /// submissions, assignments).
    pub store: Arc<dyn DocumentStore>,
    /// Relational pool for the credential table.
    pub pool: PgPool,
    pub config: Config,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
