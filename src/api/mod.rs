/*
 * Responsibility
 * - /api 配下の URL 構造 (gateway の対象外)
 */
pub mod handlers;
mod routes;

pub use routes::routes;
