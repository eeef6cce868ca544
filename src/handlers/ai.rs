use axum::extract::{Query, State};
use axum::Extension;
use tracing::{debug, info};

use crate::db::queries::{expenses, incomes};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::models::{
    AnalysisResponse, CategorySpending, CurrentUser, DebtSimulation, DebtSimulationInput,
    DebtSimulationRequest, InsightParams, InsightResult, MessageResponse, ParsedReply,
    QueryAnswer, QueryRequest,
};
use crate::models::money::decimal_from_cents;
use crate::services::{aggregator, debt, insights};
use crate::state::AppState;

fn require_query(body: &QueryRequest) -> AppResult<&str> {
    let query = body.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query is required".into()));
    }
    Ok(query)
}

pub async fn financial_insights(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<InsightParams>,
) -> AppResult<Json<InsightResult>> {
    let summary = {
        let conn = state.db.get()?;
        aggregator::load_summary(&conn, user.id)?
    };
    let mode = params.mode.unwrap_or_default();
    debug!(user_id = user.id, ?mode, "Generating financial insights");

    let result = insights::financial_insights(&state.ai, &summary, mode)
        .await
        .map_err(|e| AppError::upstream("Failed to generate financial insights", e))?;
    Ok(Json(result))
}

pub async fn query(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<QueryRequest>,
) -> AppResult<Json<QueryAnswer>> {
    let question = require_query(&body)?;

    let reply = insights::classify_intent(&state.ai, question)
        .await
        .map_err(|e| AppError::upstream("Failed to process query", e))?;
    let intent = match reply {
        ParsedReply::Parsed(intent) => intent,
        ParsedReply::ExtractionFailed(reason) => {
            return Err(AppError::upstream("Failed to process query", reason));
        }
    };

    let conn = state.db.get()?;
    let income_list = incomes::list_incomes(&conn, user.id)?;
    let expense_list = expenses::list_expenses(&conn, user.id)?;

    Ok(Json(insights::answer_intent(
        &intent,
        &income_list,
        &expense_list,
    )?))
}

pub async fn general(
    State(state): State<AppState>,
    Json(body): Json<QueryRequest>,
) -> AppResult<Json<MessageResponse>> {
    let question = require_query(&body)?;

    let message = insights::answer_general(&state.ai, question)
        .await
        .map_err(|e| AppError::upstream("Failed to answer question", e))?;
    Ok(Json(MessageResponse { message }))
}

pub async fn spending_heatmap(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<CategorySpending>>> {
    let conn = state.db.get()?;
    let expense_list = expenses::list_expenses(&conn, user.id)?;
    Ok(Json(aggregator::spending_heatmap(&expense_list)?))
}

pub async fn debt_simulation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<DebtSimulationRequest>,
) -> AppResult<Json<DebtSimulation>> {
    let (Some(debt_amount), Some(interest_rate)) = (body.debt_amount, body.interest_rate) else {
        return Err(AppError::Validation(
            "debtAmount and interestRate are required".into(),
        ));
    };

    let summary = {
        let conn = state.db.get()?;
        aggregator::load_summary(&conn, user.id)?
    };

    let simulation = debt::simulate(&DebtSimulationInput {
        debt_amount,
        interest_rate,
        available_payment: decimal_from_cents(summary.available_payment_cents()),
    })?;

    info!(
        user_id = user.id,
        months = simulation.months,
        "Debt simulation complete"
    );
    Ok(Json(simulation))
}

pub async fn analyze(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AnalysisResponse>> {
    let expense_list = {
        let conn = state.db.get()?;
        expenses::list_expenses(&conn, user.id)?
    };

    let analysis = insights::analyze_expenses(&state.ai, &expense_list)
        .await
        .map_err(|e| AppError::upstream("Failed to analyze expenses", e))?;
    Ok(Json(AnalysisResponse { analysis }))
}
