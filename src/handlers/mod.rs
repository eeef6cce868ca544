pub mod ai;
pub mod budgets;
pub mod expenses;
pub mod income;
pub mod shared_budgets;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::models::CurrentUser;
use crate::state::AppState;

/// All routes. JSON endpoints are nested under `/api`; everything except
/// register, login and the health check requires a bearer token.
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/users/register", post(auth::register))
        .route("/users/login", post(auth::login));

    let protected = Router::new()
        // Users
        .route("/users", get(auth::list_users))
        .route("/users/logout", post(auth::logout))
        // Expenses
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/:id",
            put(expenses::update).delete(expenses::delete),
        )
        // Income
        .route("/income", get(income::list).post(income::create))
        .route("/income/:id", put(income::update).delete(income::delete))
        // Budgets
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/update", put(budgets::record_spending))
        .route(
            "/shared-budget",
            get(shared_budgets::list).post(shared_budgets::create),
        )
        .route(
            "/shared-budget/update",
            put(shared_budgets::record_spending),
        )
        // AI
        .route("/ai/insights", get(ai::financial_insights))
        .route("/ai/query", post(ai::query))
        .route("/ai/general", post(ai::general))
        .route("/ai/spending-heatmap", get(ai::spending_heatmap))
        .route(
            "/ai/debt-simulation-with-income-expenses",
            post(ai::debt_simulation),
        )
        .route("/ai/analyze", post(ai::analyze))
        .route_layer(middleware::from_fn_with_state(state, auth::require_user));

    Router::new()
        .nest("/api", public.merge(protected))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}

/// 404 when the record does not exist, 401 when it belongs to someone else.
pub(crate) fn ensure_owner(
    owner_id: Option<i64>,
    user: &CurrentUser,
    what: &str,
) -> AppResult<()> {
    match owner_id {
        None => Err(AppError::NotFound(format!("{} not found", what))),
        Some(owner) if owner != user.id => {
            tracing::warn!(user_id = user.id, "{} belongs to another user", what);
            Err(AppError::Unauthorized("User not authorized".into()))
        }
        Some(_) => Ok(()),
    }
}
