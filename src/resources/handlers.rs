use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use super::{Resource, ResourceService};
use crate::{
    auth::{require_auth, AuthUser},
    error::AppResult,
    extractors::{ApiJson, ResourceId},
    response,
    state::AppState,
};

#[derive(Serialize)]
struct Items<R> {
    items: Vec<R>,
}

/// `POST|GET <path>` and `GET|PATCH|DELETE <path>/:id`, all behind the auth gate.
pub fn routes<R>(path: &str, state: &AppState) -> Router<AppState>
where
    R: Resource,
    ResourceService<R>: FromRef<AppState>,
{
    Router::new()
        .route(path, get(list::<R>).post(create::<R>))
        .route(
            &format!("{path}/:id"),
            get(get_one::<R>).patch(update::<R>).delete(delete::<R>),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

#[instrument(skip(svc, payload), fields(resource = R::NOUN))]
pub async fn create<R: Resource>(
    State(svc): State<ResourceService<R>>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<R::Create>,
) -> AppResult<Response> {
    let id = svc.create(user_id, payload).await?;
    Ok(response::data(StatusCode::CREATED, json!({ "id": id })))
}

#[instrument(skip(svc), fields(resource = R::NOUN))]
pub async fn list<R: Resource>(
    State(svc): State<ResourceService<R>>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Response> {
    let items = svc.list(user_id).await?;
    Ok(response::data(StatusCode::OK, Items { items }))
}

#[instrument(skip(svc), fields(resource = R::NOUN))]
pub async fn get_one<R: Resource>(
    State(svc): State<ResourceService<R>>,
    AuthUser(user_id): AuthUser,
    ResourceId(id): ResourceId,
) -> AppResult<Response> {
    let item = svc.get(user_id, id).await?;
    Ok(response::data(StatusCode::OK, item))
}

#[instrument(skip(svc, payload), fields(resource = R::NOUN))]
pub async fn update<R: Resource>(
    State(svc): State<ResourceService<R>>,
    AuthUser(user_id): AuthUser,
    ResourceId(id): ResourceId,
    ApiJson(payload): ApiJson<R::Patch>,
) -> AppResult<Response> {
    svc.update(user_id, id, payload).await?;
    Ok(response::message(
        StatusCode::OK,
        format!("{} updated successfully", R::NOUN),
    ))
}

#[instrument(skip(svc), fields(resource = R::NOUN))]
pub async fn delete<R: Resource>(
    State(svc): State<ResourceService<R>>,
    AuthUser(user_id): AuthUser,
    ResourceId(id): ResourceId,
) -> AppResult<Response> {
    svc.delete(user_id, id).await?;
    Ok(response::message(
        StatusCode::OK,
        format!("{} deleted successfully", R::NOUN),
    ))
}
