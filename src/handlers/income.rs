use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Extension;
use tracing::info;

use super::ensure_owner;
use crate::db::queries::incomes;
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::models::{CurrentUser, Income, IncomeInput, MessageResponse};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Income>>> {
    let conn = state.db.get()?;
    Ok(Json(incomes::list_incomes(&conn, user.id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<IncomeInput>,
) -> AppResult<(StatusCode, Json<Income>)> {
    let new_income = input.validate()?;
    let conn = state.db.get()?;

    let id = incomes::create_income(&conn, user.id, &new_income)?;
    let income = incomes::get_income(&conn, id)?
        .ok_or_else(|| AppError::Internal("Created income vanished".into()))?;

    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<IncomeInput>,
) -> AppResult<Json<Income>> {
    let conn = state.db.get()?;
    let existing = incomes::get_income(&conn, id)?;
    ensure_owner(existing.map(|e| e.user_id), &user, "Income")?;

    let changes = input.validate()?;
    incomes::update_income(&conn, id, &changes)?;
    info!(income_id = id, user_id = user.id, "Updated income");

    let income = incomes::get_income(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Income not found".into()))?;
    Ok(Json(income))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let conn = state.db.get()?;
    let existing = incomes::get_income(&conn, id)?;
    ensure_owner(existing.map(|e| e.user_id), &user, "Income")?;

    incomes::delete_income(&conn, id)?;
    info!(income_id = id, user_id = user.id, "Deleted income");

    Ok(Json(MessageResponse {
        message: "Income removed".into(),
    }))
}
