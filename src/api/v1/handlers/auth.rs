/*
 * Responsibility
 * - POST /auth/token: IdP で検証済みの profile を受け取り、user を保存して JWT を返す
 * - IdP の redirect/callback 自体は扱わない (development 以外では mount しない)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::dto::auth::{TokenRequest, TokenResponse},
    error::AppError,
    state::AppState,
};

pub async fn token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_PROFILE", msg))?;

    let profile = req.into_profile();
    state.auth.store_user(&profile).await?;
    let token = state.auth.generate_token(&profile.email)?;

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.access_token_ttl_seconds(),
    }))
}
