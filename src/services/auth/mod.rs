//! Auth backend seam used by the gateway.
//!
//! The gateway only ever talks to `dyn AuthBackend`: one call to resolve the
//! session from cookies (which may rotate the token) and one point lookup of
//! the principal's role.

pub mod backend;
pub mod factory;
pub mod session_store;

pub use backend::SessionAuthBackend;
pub use factory::build_auth_backend;

use std::str::FromStr;

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use thiserror::Error;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::cache::CacheError;

/// The authenticated principal behind a valid session.
///
/// Inserted into request extensions when the gateway allows a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// Result of resolving a session from request cookies.
///
/// `rotated` carries every cookie the backend wants written back to the
/// client (and into the forwarded request). Unknown or expired tokens are
/// reported as anonymous with nothing to write.
#[derive(Debug, Default)]
pub struct SessionLookup {
    pub principal: Option<Principal>,
    pub rotated: Vec<Cookie<'static>>,
}

impl SessionLookup {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            rotated: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("malformed session record: {0}")]
    MalformedSession(#[from] serde_json::Error),
    #[error("profile not found")]
    ProfileNotFound,
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("session token generation failed")]
    TokenGeneration,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Validate the session carried by `cookies`, rotating it when close to
    /// expiry.
    async fn current_user(&self, cookies: &CookieJar) -> Result<SessionLookup, AuthError>;

    async fn role_of(&self, user_id: Uuid) -> Result<Role, AuthError>;
}
