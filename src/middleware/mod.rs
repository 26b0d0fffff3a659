/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer 検証 (保護対象の Router にだけ掛ける)
 * - http / cors / security_headers: 全 route 共通
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
