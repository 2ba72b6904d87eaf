//! Opaque-token sessions stored in the cache.
//!
//! A session record lives under `session:<sha256(token) hex>`. When a
//! session is inside the refresh window it is rotated: a new token is stored
//! with the full TTL and the old record is kept for a short grace period,
//! marked superseded so a retried request carrying it is not rotated twice.

use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::services::auth::{AuthError, Principal, SessionLookup};
use crate::services::cache::CacheClient;

const KEY_PREFIX: &str = "session";

#[derive(Debug, Clone)]
pub struct SessionPolicy {
    pub cookie_name: String,
    pub ttl_seconds: u64,
    pub refresh_window_seconds: u64,
    pub rotation_grace_seconds: u64,
    pub secure_cookie: bool,
}

impl SessionPolicy {
    pub fn from_config(config: &SessionConfig, secure_cookie: bool) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            ttl_seconds: config.ttl_seconds,
            refresh_window_seconds: config.refresh_window_seconds,
            rotation_grace_seconds: config.rotation_grace_seconds,
            secure_cookie,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    #[serde(default)]
    superseded: bool,
}

#[derive(Clone)]
pub struct SessionStore<C: CacheClient> {
    cache: Arc<C>,
    policy: SessionPolicy,
}

impl<C: CacheClient> SessionStore<C> {
    pub fn new(cache: Arc<C>, policy: SessionPolicy) -> Self {
        Self { cache, policy }
    }

    pub fn cookie_name(&self) -> &str {
        &self.policy.cookie_name
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Resolve `token` as of `now`, rotating it when it expires within the
    /// refresh window.
    pub async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<SessionLookup, AuthError> {
        let key = session_key(token);

        let Some(raw) = self.cache.get_string(&key).await? else {
            debug!("session token not found");
            return Ok(SessionLookup::anonymous());
        };

        let record: SessionRecord = serde_json::from_str(&raw)?;
        if record.expires_at <= now {
            debug!(user_id = %record.user_id, "session expired");
            return Ok(SessionLookup::anonymous());
        }

        let principal = Principal {
            user_id: record.user_id,
        };

        let remaining = record.expires_at - now;
        if record.superseded
            || remaining > ChronoDuration::seconds(self.policy.refresh_window_seconds as i64)
        {
            return Ok(SessionLookup::authenticated(principal));
        }

        // A failed rotation leaves the current token in place; it is still valid.
        match self.rotate(&key, &record, now).await {
            Ok(cookie) => Ok(SessionLookup {
                principal: Some(principal),
                rotated: vec![cookie],
            }),
            Err(err) => {
                warn!(user_id = %record.user_id, error = %err, "session rotation failed");
                Ok(SessionLookup::authenticated(principal))
            }
        }
    }

    async fn rotate(
        &self,
        old_key: &str,
        record: &SessionRecord,
        now: DateTime<Utc>,
    ) -> Result<Cookie<'static>, AuthError> {
        let user_id = record.user_id;
        let token = generate_session_token()?;
        let ttl = self.policy.ttl_seconds;

        let fresh = SessionRecord {
            user_id,
            expires_at: now + ChronoDuration::seconds(ttl as i64),
            superseded: false,
        };
        self.cache
            .set_with_ttl(
                &session_key(&token),
                &serde_json::to_string(&fresh)?,
                Duration::from_secs(ttl),
            )
            .await?;

        // The grace period never outlives the old token.
        let grace_until = record
            .expires_at
            .min(now + ChronoDuration::seconds(self.policy.rotation_grace_seconds as i64));
        let grace = (grace_until - now).num_seconds().max(1) as u64;
        let retired = SessionRecord {
            user_id,
            expires_at: grace_until,
            superseded: true,
        };
        self.cache
            .set_with_ttl(
                old_key,
                &serde_json::to_string(&retired)?,
                Duration::from_secs(grace),
            )
            .await?;

        debug!(user_id = %user_id, ttl_seconds = ttl, "session rotated");

        Ok(self.session_cookie(token))
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.policy.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.policy.secure_cookie)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(self.policy.ttl_seconds as i64))
            .build()
    }
}

pub(super) fn session_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{}:{}", KEY_PREFIX, hex::encode(hasher.finalize()))
}

fn generate_session_token() -> Result<String, AuthError> {
    // 32 bytes of entropy -> URL-safe base64 without padding.
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).map_err(|_| AuthError::TokenGeneration)?;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
