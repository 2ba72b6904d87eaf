//! Locale resolution: the first gateway stage.
//!
//! Resolution for un-prefixed paths: stored preference cookie, then
//! `Accept-Language` (when detection is enabled), then the default locale.
//! A non-default URL prefix always wins.

use axum::http::HeaderValue;
use axum::http::header::CONTENT_LANGUAGE;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::i18n::{Locale, LocaleSettings, negotiate_accept_language};
use crate::middleware::gateway::draft::ResponseDraft;

pub const LOCALE_COOKIE: &str = "locale";

/// Request header carrying the resolved locale to downstream handlers.
pub const LOCALE_HEADER: &str = "x-locale";

/// Partner landing page served in Japanese to first-time visitors.
const PARTNER_LANDING_PATH: &str = "/partners/vertice-society";
const PARTNER_LANDING_LOCALE: &str = "ja";

const LOCALE_COOKIE_MAX_AGE_DAYS: i64 = 365;

#[derive(Debug)]
pub enum LocaleOutcome {
    Redirect {
        location: String,
        draft: ResponseDraft,
    },
    Continue {
        locale: Locale,
        draft: ResponseDraft,
    },
}

pub fn resolve_locale(
    locales: &LocaleSettings,
    path: &str,
    query: Option<&str>,
    cookies: &CookieJar,
    accept_language: Option<&str>,
) -> LocaleOutcome {
    let stored_raw = cookies.get(LOCALE_COOKIE).map(|c| c.value().to_string());
    let stored = stored_raw.as_deref().and_then(|v| locales.find(v));

    // Only first-time visitors are sent to the Japanese landing page;
    // any stored preference, even an unsupported one, opts out.
    if path == PARTNER_LANDING_PATH
        && stored_raw.is_none()
        && let Some(ja) = locales.find(PARTNER_LANDING_LOCALE)
        && !locales.is_default(ja)
    {
        debug!(path, "partner landing defaults to {}", ja);
        return LocaleOutcome::Redirect {
            location: with_query(&locales.localize(ja, path), query),
            draft: preference(ja, None),
        };
    }

    if let Some((prefixed, rest)) = locales.split_prefix(path) {
        if locales.is_default(prefixed) {
            // The default locale is never prefixed: /en/blog -> /blog
            return LocaleOutcome::Redirect {
                location: with_query(rest, query),
                draft: preference(prefixed, stored_raw.as_deref()),
            };
        }
        return LocaleOutcome::Continue {
            locale: prefixed.clone(),
            draft: preference(prefixed, stored_raw.as_deref()),
        };
    }

    let negotiated = stored
        .or_else(|| {
            if !locales.detection_enabled() {
                return None;
            }
            accept_language.and_then(|h| negotiate_accept_language(locales, h))
        })
        .unwrap_or(locales.default_locale());

    if locales.is_default(negotiated) {
        LocaleOutcome::Continue {
            locale: negotiated.clone(),
            draft: preference(negotiated, stored_raw.as_deref()),
        }
    } else {
        LocaleOutcome::Redirect {
            location: with_query(&locales.localize(negotiated, path), query),
            draft: preference(negotiated, stored_raw.as_deref()),
        }
    }
}

/// `Content-Language` plus a preference cookie write when the stored value
/// differs from `locale`.
fn preference(locale: &Locale, stored: Option<&str>) -> ResponseDraft {
    let mut draft = ResponseDraft::new();
    if let Ok(value) = HeaderValue::from_str(locale.as_str()) {
        draft = draft.with_header(CONTENT_LANGUAGE, value);
    }
    if stored != Some(locale.as_str()) {
        draft = draft.with_cookie(preference_cookie(locale));
    }
    draft
}

fn preference_cookie(locale: &Locale) -> Cookie<'static> {
    Cookie::build((LOCALE_COOKIE, locale.as_str().to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::days(LOCALE_COOKIE_MAX_AGE_DAYS))
        .build()
}

pub(crate) fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    }
}
