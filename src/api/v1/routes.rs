/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開、/me と /notes は Bearer 必須 (access::apply で掛ける)
 * - /auth/token は app.rs 側で development のときだけ nest する
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::token,
    health::health,
    notes::{create_note, delete_note, find_by_tags, get_note, list_notes, update_note},
    users::me,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/tags", get(find_by_tags))
        .route(
            "/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        );

    Router::new()
        .route("/health", get(health))
        .merge(access::apply(protected, state))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/token", post(token))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::user_store::MemoryUserStore;
    use crate::state::test_support::{state, state_with_users, token_for};

    fn app(state: AppState) -> Router {
        Router::new()
            .nest("/api/v1", routes(state.clone()))
            .nest("/auth", auth_routes())
            .with_state(state)
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_req(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, json) = call(app(state()), get_req("/api/v1/health", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn every_note_route_requires_a_token() {
        let id = uuid::Uuid::new_v4();
        let cases = [
            (Method::GET, "/api/v1/notes".to_string()),
            (Method::POST, "/api/v1/notes".to_string()),
            (Method::GET, "/api/v1/notes/tags?tags=work".to_string()),
            (Method::GET, format!("/api/v1/notes/{id}")),
            (Method::PUT, format!("/api/v1/notes/{id}")),
            (Method::DELETE, format!("/api/v1/notes/{id}")),
            (Method::GET, "/api/v1/me".to_string()),
        ];

        for (method, uri) in cases {
            let req = Request::builder()
                .method(method.clone())
                .uri(&uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap();

            let (status, json) = call(app(state()), req).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(json["error"]["message"], "Token not found", "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn forged_token_is_rejected_before_any_handler() {
        let (status, json) = call(
            app(state()),
            get_req("/api/v1/notes?page=1&limit=10", Some("not.a.jwt")),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found_not_unauthorized() {
        let (status, _) = call(app(state()), get_req("/api/v1/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn token_endpoint_stores_user_and_issues_verifiable_token() {
        let users = Arc::new(MemoryUserStore::default());
        let state = state_with_users(users.clone());

        let (status, json) = call(
            app(state.clone()),
            json_req(
                Method::POST,
                "/auth/token",
                serde_json::json!({
                    "email": "Test@Example.com",
                    "firstName": "John",
                    "lastName": "Doe",
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 3600);
        assert_eq!(users.len(), 1);

        let token = json["token"].as_str().unwrap();
        let identity = state.authenticator.verify(token).unwrap();
        assert_eq!(identity.email, "test@example.com");
    }

    #[tokio::test]
    async fn token_endpoint_rejects_invalid_email() {
        let (status, json) = call(
            app(state()),
            json_req(
                Method::POST,
                "/auth/token",
                serde_json::json!({ "email": "not-an-email" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_PROFILE");
    }

    #[tokio::test]
    async fn me_returns_stored_user_for_identity() {
        let users = Arc::new(MemoryUserStore::with_user("u@example.com"));
        let token = token_for("u@example.com");

        let (status, json) = call(
            app(state_with_users(users)),
            get_req("/api/v1/me", Some(&token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["email"], "u@example.com");
        assert!(json.get("id").is_none());
    }

    #[tokio::test]
    async fn me_is_not_found_when_user_record_is_missing() {
        let token = token_for("ghost@example.com");

        let (status, json) = call(app(state()), get_req("/api/v1/me", Some(&token))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["message"], "User not found");
    }

    #[tokio::test]
    async fn blank_title_is_rejected_before_touching_storage() {
        let token = token_for("u@example.com");
        let mut req = json_req(
            Method::POST,
            "/api/v1/notes",
            serde_json::json!({ "title": "   " }),
        );
        req.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );

        let (status, json) = call(app(state()), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "Title should not be empty");
    }

    #[tokio::test]
    async fn malformed_paging_params_fall_back_instead_of_400() {
        let token = token_for("u@example.com");

        for uri in [
            "/api/v1/notes?page=&limit=abc",
            "/api/v1/notes?limit=2.5",
            "/api/v1/notes/tags?tags=work&page=abc",
        ] {
            let (status, json) = call(app(state()), get_req(uri, Some(&token))).await;

            // extraction succeeded; the unreachable test database is what fails
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(json["error"]["code"], "INTERNAL_SERVER_ERROR", "{uri}");
        }
    }

    #[tokio::test]
    async fn missing_tags_is_rejected_before_touching_storage() {
        let token = token_for("u@example.com");

        let (status, json) = call(
            app(state()),
            get_req("/api/v1/notes/tags?tags=%20,", Some(&token)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_TAGS");
    }
}
