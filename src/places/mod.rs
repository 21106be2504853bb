pub mod dto;
pub mod repo_types;

use axum::Router;

use crate::{resources::handlers, state::AppState};
use repo_types::{Place, PlaceCategory};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(handlers::routes::<Place>("/places", state))
        .merge(handlers::routes::<PlaceCategory>("/place-categories", state))
}
