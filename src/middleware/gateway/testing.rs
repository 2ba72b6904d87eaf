//! Test double for the auth backend.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::services::auth::{AuthBackend, AuthError, Principal, Role, SessionLookup};
use crate::services::cache::CacheError;

pub const SESSION_COOKIE: &str = "session";

/// Accepts `session=valid` (plus any token it rotates to) and counts calls.
pub struct FakeAuth {
    user_id: Uuid,
    role: Role,
    valid_tokens: Vec<String>,
    rotate_to: Option<(String, String)>,
    fail_sessions: bool,
    fail_roles: bool,
    session_calls: AtomicUsize,
    role_calls: AtomicUsize,
    last_jar: Mutex<Option<CookieJar>>,
}

impl FakeAuth {
    pub fn with_role(role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            role,
            valid_tokens: vec!["valid".to_string()],
            rotate_to: None,
            fail_sessions: false,
            fail_roles: false,
            session_calls: AtomicUsize::new(0),
            role_calls: AtomicUsize::new(0),
            last_jar: Mutex::new(None),
        }
    }

    pub fn student() -> Self {
        Self::with_role(Role::Student)
    }

    pub fn rotating(mut self, name: &str, value: &str) -> Self {
        self.valid_tokens.push(value.to_string());
        self.rotate_to = Some((name.to_string(), value.to_string()));
        self
    }

    pub fn failing_sessions(mut self) -> Self {
        self.fail_sessions = true;
        self
    }

    pub fn failing_roles(mut self) -> Self {
        self.fail_roles = true;
        self
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
        }
    }

    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    pub fn role_calls(&self) -> usize {
        self.role_calls.load(Ordering::SeqCst)
    }

    pub fn last_jar(&self) -> Option<CookieJar> {
        self.last_jar.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn current_user(&self, cookies: &CookieJar) -> Result<SessionLookup, AuthError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_jar.lock().unwrap() = Some(cookies.clone());

        if self.fail_sessions {
            return Err(AuthError::Cache(CacheError::BackendConnection(
                "connection refused".into(),
            )));
        }

        let valid = cookies
            .get(SESSION_COOKIE)
            .is_some_and(|c| self.valid_tokens.iter().any(|t| t == c.value()));
        if !valid {
            return Ok(SessionLookup::anonymous());
        }

        let rotated = self
            .rotate_to
            .iter()
            .map(|(name, value)| Cookie::new(name.clone(), value.clone()))
            .collect();

        Ok(SessionLookup {
            principal: Some(self.principal()),
            rotated,
        })
    }

    async fn role_of(&self, user_id: Uuid) -> Result<Role, AuthError> {
        self.role_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(user_id, self.user_id, "role looked up for unexpected user");

        if self.fail_roles {
            return Err(AuthError::ProfileNotFound);
        }
        Ok(self.role)
    }
}
