use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use tracing::info;

use crate::db::queries::budgets;
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::models::money::checked_add_cents;
use crate::models::{Budget, BudgetInput, BudgetSpendUpdate, CurrentUser};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Budget>>> {
    let conn = state.db.get()?;
    Ok(Json(budgets::list_budgets(&conn, user.id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<BudgetInput>,
) -> AppResult<(StatusCode, Json<Budget>)> {
    let new_budget = input.validate()?;
    let conn = state.db.get()?;

    let id = budgets::create_budget(&conn, user.id, &new_budget)?;
    let budget = budgets::get_budget(&conn, id)?
        .ok_or_else(|| AppError::Internal("Created budget vanished".into()))?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// Record spending against the caller's budget for a category.
pub async fn record_spending(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<BudgetSpendUpdate>,
) -> AppResult<Json<Budget>> {
    let (category, delta_cents) = update.validate()?;
    let conn = state.db.get()?;

    let budget = budgets::find_for_category(&conn, user.id, &category)?
        .ok_or_else(|| AppError::NotFound(format!("No budget found for {}", category)))?;
    let spent_cents = checked_add_cents(budget.spent_cents, delta_cents)?;
    budgets::set_spent(&conn, budget.id, spent_cents)?;

    info!(
        budget_id = budget.id,
        user_id = user.id,
        delta_cents,
        "Updated budget spending"
    );
    Ok(Json(Budget {
        spent_cents,
        ..budget
    }))
}
