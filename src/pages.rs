//! Stand-in for page rendering.
//!
//! Pages are rendered elsewhere; this fallback reports what the gateway
//! handed downstream (locale, logical path, principal) so the pipeline can be
//! exercised end to end.

use axum::{
    Extension, Json,
    extract::State,
    http::Uri,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::i18n::{LocaleSettings, ResolvedLocale};
use crate::middleware::gateway::classify::logical_path;
use crate::services::auth::Principal;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PageContext {
    pub locale: String,
    pub path: String,
    pub logical_path: String,
    pub user_id: Option<Uuid>,
}

pub async fn render(
    State(state): State<AppState>,
    uri: Uri,
    locale: Option<Extension<ResolvedLocale>>,
    principal: Option<Extension<Principal>>,
) -> Result<Json<PageContext>, AppError> {
    // Static files and internal assets are not served here.
    let Some(Extension(ResolvedLocale(locale))) = locale else {
        return Err(AppError::not_found("page"));
    };

    let path = uri.path();
    let logical = logical_path(&state.locales, path);
    if has_unknown_locale_prefix(&state.locales, logical) {
        return Err(AppError::not_found("page"));
    }

    Ok(Json(PageContext {
        locale: locale.to_string(),
        path: path.to_string(),
        logical_path: logical.to_string(),
        user_id: principal.map(|Extension(p)| p.user_id),
    }))
}

/// `/fr/about` on an en/ja site: the first segment is shaped like a language
/// tag (`xx` or `xx-yy`) but is not a supported locale.
fn has_unknown_locale_prefix(locales: &LocaleSettings, logical_path: &str) -> bool {
    let first = logical_path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();

    let mut parts = first.split('-');
    let primary = parts.next().unwrap_or_default();
    let region = parts.next();
    if parts.next().is_some() {
        return false;
    }

    let tag_shaped = primary.len() == 2
        && primary.bytes().all(|b| b.is_ascii_lowercase())
        && region.is_none_or(|r| r.len() == 2 && r.bytes().all(|b| b.is_ascii_alphabetic()));

    tag_shaped && locales.find(first).is_none() && locales.find(primary).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::test_settings;

    #[test]
    fn unknown_locale_prefixes_are_detected() {
        let locales = test_settings();
        assert!(has_unknown_locale_prefix(&locales, "/fr/about"));
        assert!(has_unknown_locale_prefix(&locales, "/pt-br"));
        assert!(!has_unknown_locale_prefix(&locales, "/blog"));
        assert!(!has_unknown_locale_prefix(&locales, "/"));
        assert!(!has_unknown_locale_prefix(&locales, "/en-us/about"));
        assert!(!has_unknown_locale_prefix(&locales, "/learn/dashboard"));
    }
}
