/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認証済みリクエストの Identity を handler に提供する
 * - 検証は middleware::auth::access の責務。ここは受け取るだけ
 */

mod core;

pub use self::core::AuthCtxExtractor;
