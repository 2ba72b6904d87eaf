/*
 * Responsibility
 * - middleware の公開インターフェース
 * - gateway: ロケール解決 → ルート分類 → セッション更新 → 認可
 * - http / security_headers: 全リクエスト共通の横断的関心事
 */
pub mod gateway;
pub mod http;
pub mod security_headers;
