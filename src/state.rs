/*
 * Responsibility
 * - Router / gateway に紐づける共有コンテキスト (AppState)
 *   - auth: セッション検証・role 参照 (AuthBackend)
 *   - locales: 対応ロケールと既定ロケール
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::i18n::LocaleSettings;
use crate::services::auth::AuthBackend;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthBackend>,
    pub locales: Arc<LocaleSettings>,
}

impl AppState {
    pub fn new(auth: Arc<dyn AuthBackend>, locales: LocaleSettings) -> Self {
        Self {
            auth,
            locales: Arc::new(locales),
        }
    }
}
