//! access token (HS256 JWT) 検証 → Identity を extensions に入れる
//!
//! 判定そのものは `TokenAuthenticator::authenticate` が行う。
//! ここは axum の middleware として、その結果を
//! - Ok(identity): request extensions に入れて next へ
//! - Err(e):       401 を返して打ち切り (handler は呼ばれない)
//! に振り分けるだけの薄いアダプタ。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// 保護対象の Router に認証を掛ける。
///
/// 例：
/// ```ignore
/// let notes = middleware::auth::access::apply(notes, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    // route_layer: マッチしない path は 401 ではなく 404 のまま
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match state.authenticator.authenticate(req.headers()) {
        Ok(identity) => identity,
        Err(err) => {
            match &err {
                AuthError::TokenNotFound => {
                    tracing::warn!(path = %req.uri().path(), "access token missing");
                }
                AuthError::InvalidToken(cause) => {
                    tracing::warn!(path = %req.uri().path(), error = %cause, "access token verification failed");
                }
            }
            return Err(err.into());
        }
    };

    tracing::debug!(email = %identity.email, "access token verified");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{
        Json,
        http::{StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::services::auth::Identity;
    use crate::state::test_support::{TEST_SECRET, state, token_for};

    fn app(hits: Arc<AtomicUsize>) -> Router {
        let state = state();
        let protected = Router::new().route(
            "/whoami",
            get(move |AuthCtxExtractor(identity): AuthCtxExtractor| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(identity)
                }
            }),
        );

        apply(protected, state.clone()).with_state(state)
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(authorization: Option<&str>) -> (StatusCode, serde_json::Value, usize) {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = app(hits.clone())
            .oneshot(request(authorization))
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap();
        (status, json, hits.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn rejects_request_without_authorization_header() {
        let (status, json, hits) = send(None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["message"], "Token not found");
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn rejects_non_bearer_scheme_as_missing_token() {
        let (status, json, hits) = send(Some("Basic dXNlcjpwdw==")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["message"], "Token not found");
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let (status, json, hits) = send(Some("Bearer invalid-token")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
        assert_ne!(json["error"]["message"], "Token not found");
        assert!(!json.to_string().contains(TEST_SECRET));
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let issued = chrono::Utc::now().timestamp() - 7200;
        let expired = crate::services::auth::jwt::JwtIssuer::new(TEST_SECRET, 60)
            .sign(&Identity::new("u@example.com", issued, 60))
            .unwrap();

        let (status, _, hits) = send(Some(&format!("Bearer {expired}"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn valid_token_attaches_identity_and_continues() {
        let token = token_for("u@example.com");
        let expected = state().authenticator.verify(&token).unwrap();

        let (status, json, hits) = send(Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits, 1);
        let attached: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(attached, expected);
        assert_eq!(attached.email, "u@example.com");
    }
}
