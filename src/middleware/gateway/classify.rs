//! Route classification over the locale-stripped path.

use crate::i18n::LocaleSettings;
use crate::middleware::gateway::matcher::collapse_slashes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Admin,
}

/// Evaluated top to bottom; the first matching prefix wins.
const ROUTE_TABLE: &[(&str, Access)] = &[
    ("/learn/dashboard", Access::Protected),
    ("/learn/account", Access::Protected),
    ("/admin", Access::Admin),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteClassification {
    pub access: Access,
    pub logical_path: String,
}

impl RouteClassification {
    pub fn is_protected(&self) -> bool {
        !matches!(self.access, Access::Public)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.access, Access::Admin)
    }
}

/// Strip a non-default locale prefix from `path`.
///
/// `/ja/learn` → `/learn`, `/ja` → `/`. Un-prefixed paths are already logical.
pub fn logical_path<'a>(locales: &LocaleSettings, path: &'a str) -> &'a str {
    for locale in locales.non_default() {
        let Some(rest) = path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(locale.as_str()))
        else {
            continue;
        };
        if rest.is_empty() {
            return "/";
        }
        if rest.starts_with('/') {
            return rest;
        }
    }
    path
}

pub fn classify(locales: &LocaleSettings, path: &str) -> RouteClassification {
    let collapsed = collapse_slashes(path);
    let logical = logical_path(locales, &collapsed);
    let normalized = match logical.trim_end_matches('/') {
        "" => "/",
        p => p,
    };

    let access = ROUTE_TABLE
        .iter()
        .find(|(prefix, _)| nested_under(normalized, prefix))
        .map(|(_, access)| *access)
        .unwrap_or(Access::Public);

    RouteClassification {
        access,
        logical_path: logical.to_string(),
    }
}

fn nested_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
