use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use tracing::info;

use crate::db::queries::{shared_budgets, users};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::models::money::checked_add_cents;
use crate::models::{CurrentUser, SharedBudget, SharedBudgetInput, SharedBudgetSpendUpdate};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<SharedBudget>>> {
    let conn = state.db.get()?;
    Ok(Json(shared_budgets::list_for_user(&conn, user.id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<SharedBudgetInput>,
) -> AppResult<(StatusCode, Json<SharedBudget>)> {
    let new_budget = input.validate(user.id)?;
    let mut conn = state.db.get()?;

    let missing = users::missing_user_ids(&conn, &new_budget.users)?;
    if !missing.is_empty() {
        let ids: Vec<String> = missing.iter().map(i64::to_string).collect();
        return Err(AppError::Validation(format!(
            "Unknown user ids: {}",
            ids.join(", ")
        )));
    }

    let id = shared_budgets::create_shared_budget(&mut conn, user.id, &new_budget)?;
    let budget = shared_budgets::get_shared_budget(&conn, id)?
        .ok_or_else(|| AppError::Internal("Created shared budget vanished".into()))?;

    info!(
        shared_budget_id = id,
        user_id = user.id,
        members = budget.users.len(),
        "Created shared budget"
    );
    Ok((StatusCode::CREATED, Json(budget)))
}

/// Record spending against a shared budget the caller belongs to.
pub async fn record_spending(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<SharedBudgetSpendUpdate>,
) -> AppResult<Json<SharedBudget>> {
    let (budget_id, delta_cents) = update.validate()?;
    let conn = state.db.get()?;

    let current = shared_budgets::get_shared_budget(&conn, budget_id)?
        .ok_or_else(|| AppError::NotFound("Shared budget not found".into()))?;
    if !shared_budgets::is_member(&conn, budget_id, user.id)? {
        return Err(AppError::Unauthorized(
            "You are not a member of this shared budget".into(),
        ));
    }

    let spent_cents = checked_add_cents(current.spent_cents, delta_cents)?;
    shared_budgets::set_spent(&conn, budget_id, spent_cents)?;
    info!(
        shared_budget_id = budget_id,
        user_id = user.id,
        delta_cents,
        "Updated shared budget spending"
    );

    Ok(Json(SharedBudget {
        spent_cents,
        ..current
    }))
}
