pub mod access_jwt;
pub mod factory;
pub mod jwt;
pub mod token_issuer;
pub mod user_store;

pub use access_jwt::{AuthError, Identity, TokenAuthenticator};
pub use factory::{build_auth_service, build_authenticator};
pub use token_issuer::{AuthService, Profile};
