//! Session refresh: the third gateway stage.
//!
//! Runs only for protected routes. Backend errors are treated as "no
//! session" so the decider sends the user to sign in rather than an error
//! page.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::middleware::gateway::draft::{CookieWrites, ResponseDraft};
use crate::services::auth::{AuthBackend, Principal};

/// Validate the session and relay any rotated cookies.
///
/// The backend sees the request cookies overlaid with cookies already written
/// by earlier stages. Rotated cookies are written into `request_headers` (so
/// downstream reads see the fresh token) and merged on top of `draft`.
pub async fn refresh_session(
    auth: &dyn AuthBackend,
    request_headers: &mut HeaderMap,
    draft: ResponseDraft,
) -> (Option<Principal>, ResponseDraft) {
    let jar = draft.cookies().overlay(CookieJar::from_headers(request_headers));

    let lookup = match auth.current_user(&jar).await {
        Ok(lookup) => lookup,
        Err(err) => {
            warn!(error = %err, "session validation failed; continuing unauthenticated");
            return (None, draft);
        }
    };

    let rotated = CookieWrites::from(lookup.rotated);
    if rotated.is_empty() {
        return (lookup.principal, draft);
    }

    rotated.apply_to_request(request_headers);

    let later = rotated
        .iter()
        .cloned()
        .fold(ResponseDraft::new(), ResponseDraft::with_cookie);

    (lookup.principal, draft.merge(later))
}
