use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{dto::ExpenseInput, services};
use crate::{
    auth::extractors::{AuthUser, MaybeAuthUser},
    error::{AppError, AppResult},
    state::AppState,
    store::Expense,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

fn expense_id(path: Result<Path<i32>, PathRejection>) -> AppResult<i32> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::Validation("expense id must be an integer".into()))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    MaybeAuthUser(owner): MaybeAuthUser,
) -> AppResult<Json<Vec<Expense>>> {
    let items = services::list(state.store.as_ref(), owner).await?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    MaybeAuthUser(owner): MaybeAuthUser,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let Json(input) = payload?;
    let expense = services::create(state.store.as_ref(), owner, input.validate()?).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// Responds `200 null` when nothing owned by the caller matched.
#[instrument(skip(state, path, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> AppResult<Json<Option<Expense>>> {
    let id = expense_id(path)?;
    let Json(input) = payload?;
    let updated = services::update(state.store.as_ref(), user_id, id, input.validate()?).await?;
    Ok(Json(updated))
}

#[instrument(skip(state, path))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = expense_id(path)?;
    services::delete(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
