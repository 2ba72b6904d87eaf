/*
 * Responsibility
 * - 環境変数から設定を読み込む (DATABASE_URL, VALKEY_URL, ロケール, セッション設定など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::i18n::LocaleSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Session cookie / rotation policy handed to the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: u64,
    pub refresh_window_seconds: u64,
    pub rotation_grace_seconds: u64,
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub valkey_url: String,

    pub locales: LocaleSettings,
    pub session: SessionConfig,

    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let valkey_url =
            std::env::var("VALKEY_URL").map_err(|_| ConfigError::Missing("VALKEY_URL"))?;

        let locales = parse_locales(
            &std::env::var("LOCALES").unwrap_or_else(|_| "en,ja".to_string()),
            &std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),
            parse_flag(std::env::var("LOCALE_DETECTION").ok().as_deref(), true)
                .ok_or(ConfigError::Invalid("LOCALE_DETECTION"))?,
        )?;

        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session".to_string()),
            ttl_seconds: env_u64("SESSION_TTL_SECONDS", 3600)?,
            refresh_window_seconds: env_u64("SESSION_REFRESH_WINDOW_SECONDS", 300)?,
            rotation_grace_seconds: env_u64("SESSION_ROTATION_GRACE_SECONDS", 30)?,
        };

        if session.cookie_name.trim().is_empty() {
            return Err(ConfigError::Invalid("SESSION_COOKIE_NAME"));
        }
        if session.refresh_window_seconds >= session.ttl_seconds {
            return Err(ConfigError::Invalid("SESSION_REFRESH_WINDOW_SECONDS"));
        }

        let request_timeout_seconds = env_u64("REQUEST_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            valkey_url,
            locales,
            session,
            request_timeout_seconds,
        })
    }
}

fn env_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<u64>().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: Option<&str>, default: bool) -> Option<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => Some(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        },
    }
}

fn parse_locales(
    raw: &str,
    default: &str,
    detection: bool,
) -> Result<LocaleSettings, ConfigError> {
    let supported = raw
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    if supported.is_empty() {
        return Err(ConfigError::Invalid("LOCALES"));
    }

    LocaleSettings::new(supported, default.trim().to_ascii_lowercase(), detection)
        .ok_or(ConfigError::Invalid("DEFAULT_LOCALE"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_locale_list_and_default() {
        let settings = parse_locales("en, JA", "en", true).unwrap();
        assert_eq!(settings.default_locale().as_str(), "en");
        assert!(settings.find("ja").is_some());
    }

    #[test]
    fn rejects_default_outside_supported_list() {
        let err = parse_locales("en,ja", "fr", true).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid("DEFAULT_LOCALE")));
    }

    #[test]
    fn rejects_empty_locale_list() {
        let err = parse_locales(" , ", "en", true).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid("LOCALES")));
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag(None, true), Some(true));
        assert_eq!(parse_flag(Some("off"), true), Some(false));
        assert_eq!(parse_flag(Some("YES"), false), Some(true));
        assert_eq!(parse_flag(Some("maybe"), false), None);
    }
}
