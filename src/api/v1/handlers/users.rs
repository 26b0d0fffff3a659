/*
 * Responsibility
 * - GET /me: Identity の email から保存済み user を引く
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{dto::users::UserResponse, extractors::AuthCtxExtractor},
    error::AppError,
    state::AppState,
};

pub async fn me(
    State(state): State<AppState>,
    AuthCtxExtractor(identity): AuthCtxExtractor,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .auth
        .validate_user(&identity)
        .await?
        .ok_or(AppError::not_found("User"))?;

    Ok(Json(user.into()))
}
