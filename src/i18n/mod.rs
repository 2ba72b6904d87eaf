//! Supported locales and locale-aware path helpers.
//!
//! The default locale is served without a URL prefix (`/blog`); every other
//! supported locale is prefixed (`/ja/blog`).

mod negotiation;

pub use negotiation::negotiate_accept_language;

use std::fmt;

/// A supported language tag (`en`, `ja`, ...). Always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The locale resolved for the current request.
///
/// Inserted into request extensions by the gateway; resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale(pub Locale);

#[derive(Debug, Clone)]
pub struct LocaleSettings {
    supported: Vec<Locale>,
    default: Locale,
    detection: bool,
}

impl LocaleSettings {
    /// Returns `None` when `default` is not one of `supported`.
    pub fn new(supported: Vec<String>, default: String, detection: bool) -> Option<Self> {
        let mut locales: Vec<Locale> = Vec::with_capacity(supported.len());
        for tag in supported {
            let locale = Locale(tag.to_ascii_lowercase());
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }

        let default = Locale(default.to_ascii_lowercase());
        if !locales.contains(&default) {
            return None;
        }

        Some(Self {
            supported: locales,
            default,
            detection,
        })
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    pub fn is_default(&self, locale: &Locale) -> bool {
        *locale == self.default
    }

    /// Whether `Accept-Language` is consulted for un-prefixed paths.
    pub fn detection_enabled(&self) -> bool {
        self.detection
    }

    pub fn supported(&self) -> &[Locale] {
        &self.supported
    }

    pub fn find(&self, tag: &str) -> Option<&Locale> {
        self.supported
            .iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(tag))
    }

    pub fn non_default(&self) -> impl Iterator<Item = &Locale> {
        self.supported.iter().filter(|l| **l != self.default)
    }

    /// Split a leading locale segment off `path`, for any supported locale
    /// (the default included).
    ///
    /// `/ja/blog` → `(ja, "/blog")`, `/ja` → `(ja, "/")`, `/japan` → `None`.
    pub fn split_prefix<'a>(&self, path: &'a str) -> Option<(&Locale, &'a str)> {
        let trimmed = path.strip_prefix('/')?;
        let (candidate, rest) = match trimmed.find('/') {
            Some(pos) => (&trimmed[..pos], &trimmed[pos..]),
            None => (trimmed, ""),
        };

        let locale = self.supported.iter().find(|l| l.as_str() == candidate)?;
        if rest.is_empty() {
            Some((locale, "/"))
        } else {
            Some((locale, rest))
        }
    }

    /// Build the public path of `logical_path` in `locale`.
    ///
    /// The default locale is un-prefixed; `/` under a prefixed locale is `/ja`.
    pub fn localize(&self, locale: &Locale, logical_path: &str) -> String {
        if self.is_default(locale) {
            return logical_path.to_string();
        }
        if logical_path == "/" || logical_path.is_empty() {
            format!("/{}", locale)
        } else {
            format!("/{}{}", locale, logical_path)
        }
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> LocaleSettings {
    LocaleSettings::new(vec!["en".into(), "ja".into()], "en".into(), true)
        .expect("en is supported")
}
