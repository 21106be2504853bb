use axum::{extract::State, http::StatusCode, response::Response};
use tracing::instrument;

use super::{
    dto::{ChangePasswordRequest, LoginRequest, RegisterRequest},
    extractors::AuthUser,
    services::AuthService,
};
use crate::{error::AppResult, extractors::ApiJson, response};

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<Response> {
    let body = auth.register(payload).await?;
    Ok(response::data(StatusCode::CREATED, body))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let body = auth.login(payload).await?;
    Ok(response::data(StatusCode::OK, body))
}

#[instrument(skip(auth, payload))]
pub async fn change_password(
    State(auth): State<AuthService>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> AppResult<Response> {
    auth.change_password(user_id, payload).await?;
    Ok(response::message(
        StatusCode::OK,
        "password changed successfully",
    ))
}
