use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{CredentialsRequest, LoginResponse, RegisterResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", delete(delete_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(body) = payload?;
    let user_id = services::register(state.store.as_ref(), &body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(body) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let token = services::login(state.store.as_ref(), &keys, &body.email, &body.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<StatusCode> {
    services::delete_account(state.store.as_ref(), user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
