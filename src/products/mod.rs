pub mod dto;
pub mod repo_types;

use axum::Router;

use crate::{resources::handlers, state::AppState};
use repo_types::Product;

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::routes::<Product>("/products", state)
}
