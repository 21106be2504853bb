use axum::{middleware, routing::post, Router};

use crate::state::AppState;

mod claims;
pub mod dto;
pub mod extractors;
mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use extractors::{require_auth, AuthUser};
pub use jwt::JwtKeys;

pub fn router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/change-password", post(handlers::change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .merge(protected)
}
