/*
 * Responsibility
 * - v1 の公開ポイント (routes() / auth_routes() の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{auth_routes, routes};
