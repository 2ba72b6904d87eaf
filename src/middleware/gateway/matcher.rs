//! Which requests the gateway runs for, and the path shape it works on.

use std::borrow::Cow;

/// First path segments the gateway never touches: API routes, bundler
/// assets and the CMS studio.
const EXCLUDED_SEGMENTS: &[&str] = &["api", "_assets", "studio"];

/// Returns `false` for API routes, internal asset paths and static files
/// (a last segment with an extension).
pub fn gateway_applies(path: &str) -> bool {
    let trimmed = path.trim_start_matches('/');
    let first = trimmed.split('/').next().unwrap_or_default();
    if EXCLUDED_SEGMENTS.contains(&first) {
        return false;
    }

    let last = trimmed.rsplit('/').next().unwrap_or_default();
    !last.contains('.')
}

/// Collapse runs of `/` into one. Borrowed when `path` is already canonical.
///
/// `//admin` and `/ja//learn/dashboard` name the same pages as `/admin` and
/// `/ja/learn/dashboard`; every later stage works on the collapsed form.
pub fn collapse_slashes(path: &str) -> Cow<'_, str> {
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }

    let mut collapsed = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(ch);
    }
    Cow::Owned(collapsed)
}

/// `true` when `location` is a path on this site: it starts with a single
/// `/` and is not a scheme-relative (`//host`) or backslash (`/\host`) form.
pub fn is_site_relative(location: &str) -> bool {
    let mut chars = location.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/') | Some('\\'))
}
