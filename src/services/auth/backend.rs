use async_trait::async_trait;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::repos::profile_repo;
use crate::services::auth::session_store::SessionStore;
use crate::services::auth::{AuthBackend, AuthError, Role, SessionLookup};
use crate::services::cache::CacheClient;

/// `AuthBackend` over the cache-backed session store and the `profiles`
/// table.
pub struct SessionAuthBackend<C: CacheClient> {
    sessions: SessionStore<C>,
    db: PgPool,
}

impl<C: CacheClient> SessionAuthBackend<C> {
    pub fn new(sessions: SessionStore<C>, db: PgPool) -> Self {
        Self { sessions, db }
    }
}

#[async_trait]
impl<C: CacheClient> AuthBackend for SessionAuthBackend<C> {
    async fn current_user(&self, cookies: &CookieJar) -> Result<SessionLookup, AuthError> {
        let Some(token) = cookies.get(self.sessions.cookie_name()) else {
            return Ok(SessionLookup::anonymous());
        };

        debug!(backend = self.sessions.backend_name(), "resolving session");
        self.sessions.resolve(token.value(), Utc::now()).await
    }

    async fn role_of(&self, user_id: Uuid) -> Result<Role, AuthError> {
        let row = profile_repo::find_role(&self.db, user_id)
            .await?
            .ok_or(AuthError::ProfileNotFound)?;

        row.role.parse()
    }
}
