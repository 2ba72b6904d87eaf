/// Factory: build the `AuthBackend` from application `Config`.
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::session_store::{SessionPolicy, SessionStore};
use crate::services::auth::{AuthBackend, SessionAuthBackend};
use crate::services::cache::ValkeyClient;

pub async fn build_auth_backend(config: &Config) -> Result<Arc<dyn AuthBackend>, AppError> {
    let cache = ValkeyClient::new(&config.valkey_url).await.map_err(|e| {
        tracing::error!(error = %e, "failed to connect to valkey");
        AppError::Internal
    })?;

    // Connections are opened on first use, so public traffic never waits on the database.
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&config.database_url)
        .map_err(|e| {
            tracing::error!(error = %e, "invalid DATABASE_URL");
            AppError::Internal
        })?;

    let policy = SessionPolicy::from_config(&config.session, config.app_env.is_production());
    let sessions = SessionStore::new(Arc::new(cache), policy);

    Ok(Arc::new(SessionAuthBackend::new(sessions, db)))
}
