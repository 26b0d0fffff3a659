/// Factories: build auth services from application `Config`.
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::auth::{
    AuthService, TokenAuthenticator, jwt::JwtIssuer, user_store::PgUserStore,
};

pub fn build_authenticator(config: &Config) -> Arc<TokenAuthenticator> {
    Arc::new(TokenAuthenticator::new(
        &config.jwt_secret,
        config.jwt_leeway_seconds,
    ))
}

pub fn build_auth_service(config: &Config, db: PgPool) -> Arc<AuthService> {
    let jwt = JwtIssuer::new(&config.jwt_secret, config.jwt_ttl_seconds);
    Arc::new(AuthService::new(jwt, Arc::new(PgUserStore::new(db))))
}
