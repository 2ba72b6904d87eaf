//! Request-boundary gateway.
//!
//! Runs in front of every page request, in order:
//! 1. locale resolution (may redirect)
//! 2. route classification over the locale-stripped path
//! 3. session refresh, protected routes only
//! 4. authorization decision
//!
//! Stage contributions are accumulated in a `ResponseDraft` and applied once
//! to whatever response leaves the gateway. The gateway never produces an
//! error response: every path ends in a pass-through or a redirect.

pub mod classify;
pub mod decide;
pub mod draft;
pub mod locale;
pub mod matcher;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use std::borrow::Cow;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{
        HeaderName, HeaderValue, Request, StatusCode,
        header::{ACCEPT_LANGUAGE, LOCATION},
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use crate::i18n::ResolvedLocale;
use crate::state::AppState;

use classify::classify;
use decide::{Decision, decide};
use draft::ResponseDraft;
use locale::{LOCALE_HEADER, LocaleOutcome, resolve_locale, with_query};
use matcher::{collapse_slashes, gateway_applies, is_site_relative};
use session::refresh_session;

/// Wrap `router` (pages and fallback) with the gateway.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, gateway_middleware))
}

/// What the gateway decided for one request.
#[derive(Debug)]
pub enum Verdict {
    Forward(ResponseDraft),
    Redirect {
        location: String,
        draft: ResponseDraft,
    },
}

/// Run the four stages for `req`.
///
/// On `Forward`, `req` has been prepared for downstream handlers: the
/// `x-locale` header and `ResolvedLocale` extension are set, rotated session
/// cookies are in the `Cookie` header and, for protected routes, the
/// `Principal` is in the extensions.
pub async fn evaluate(state: &AppState, req: &mut Request<Body>) -> Verdict {
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    // Empty segments are redirected away before any stage sees the path.
    if let Cow::Owned(collapsed) = collapse_slashes(&path) {
        debug!(path = %path, collapsed = %collapsed, "collapsing repeated slashes");
        return Verdict::Redirect {
            location: with_query(&collapsed, query.as_deref()),
            draft: ResponseDraft::new(),
        };
    }

    let cookies = CookieJar::from_headers(req.headers());
    let accept_language = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (locale, draft) = match resolve_locale(
        &state.locales,
        &path,
        query.as_deref(),
        &cookies,
        accept_language.as_deref(),
    ) {
        LocaleOutcome::Redirect { location, draft } => {
            debug!(path = %path, location = %location, "locale redirect");
            return Verdict::Redirect { location, draft };
        }
        LocaleOutcome::Continue { locale, draft } => (locale, draft),
    };

    if let Ok(value) = HeaderValue::from_str(locale.as_str()) {
        req.headers_mut()
            .insert(HeaderName::from_static(LOCALE_HEADER), value);
    }
    req.extensions_mut().insert(ResolvedLocale(locale.clone()));

    let route = classify(&state.locales, &path);
    if !route.is_protected() {
        return Verdict::Forward(draft);
    }

    let (principal, draft) = refresh_session(state.auth.as_ref(), req.headers_mut(), draft).await;

    let decision = decide(
        state.auth.as_ref(),
        &state.locales,
        &locale,
        &route,
        principal.as_ref(),
        &path,
    )
    .await;

    debug!(
        path = %path,
        locale = %locale,
        logical_path = %route.logical_path,
        access = ?route.access,
        authenticated = principal.is_some(),
        decision = ?decision,
        "gateway decision"
    );

    match decision {
        Decision::Allow => {
            if let Some(principal) = principal {
                req.extensions_mut().insert(principal);
            }
            Verdict::Forward(draft)
        }
        Decision::SignIn { location } | Decision::Landing { location } => {
            Verdict::Redirect { location, draft }
        }
    }
}

async fn gateway_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if !gateway_applies(req.uri().path()) {
        return next.run(req).await;
    }

    match evaluate(&state, &mut req).await {
        Verdict::Forward(draft) => {
            let mut response = next.run(req).await;
            draft.apply_under(&mut response);
            response
        }
        Verdict::Redirect { location, draft } => redirect(&location, draft),
    }
}

fn redirect(location: &str, draft: ResponseDraft) -> Response {
    let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();

    let value = Some(location)
        .filter(|l| is_site_relative(l))
        .and_then(|l| HeaderValue::from_str(l).ok())
        .unwrap_or_else(|| {
            warn!(location, "redirect target is off-site or not a header value; using /");
            HeaderValue::from_static("/")
        });
    response.headers_mut().insert(LOCATION, value);

    draft.apply_to(&mut response);
    response
}
