use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Extension;
use tracing::info;

use super::ensure_owner;
use crate::db::queries::expenses;
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::models::{CurrentUser, Expense, ExpenseInput, MessageResponse};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Expense>>> {
    let conn = state.db.get()?;
    Ok(Json(expenses::list_expenses(&conn, user.id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<ExpenseInput>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let new_expense = input.validate()?;
    let conn = state.db.get()?;

    let id = expenses::create_expense(&conn, user.id, &new_expense)?;
    let expense = expenses::get_expense(&conn, id)?
        .ok_or_else(|| AppError::Internal("Created expense vanished".into()))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<ExpenseInput>,
) -> AppResult<Json<Expense>> {
    let conn = state.db.get()?;
    let existing = expenses::get_expense(&conn, id)?;
    ensure_owner(existing.map(|e| e.user_id), &user, "Expense")?;

    let changes = input.validate()?;
    expenses::update_expense(&conn, id, &changes)?;
    info!(expense_id = id, user_id = user.id, "Updated expense");

    let expense = expenses::get_expense(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Expense not found".into()))?;
    Ok(Json(expense))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let conn = state.db.get()?;
    let existing = expenses::get_expense(&conn, id)?;
    ensure_owner(existing.map(|e| e.user_id), &user, "Expense")?;

    expenses::delete_expense(&conn, id)?;
    info!(expense_id = id, user_id = user.id, "Deleted expense");

    Ok(Json(MessageResponse {
        message: "Expense removed".into(),
    }))
}
