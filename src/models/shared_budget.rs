use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::money::{delta_cents, positive_cents, serialize_cents};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedBudget {
    pub id: i64,
    pub name: String,
    #[serde(rename = "totalBudget", serialize_with = "serialize_cents")]
    pub total_budget_cents: i64,
    #[serde(rename = "spent", serialize_with = "serialize_cents")]
    pub spent_cents: i64,
    pub created_by: i64,
    pub users: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedBudgetInput {
    pub name: Option<String>,
    pub total_budget: Option<f64>,
    #[serde(default)]
    pub users: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct NewSharedBudget {
    pub name: String,
    pub total_budget_cents: i64,
    /// Always contains the creator.
    pub users: Vec<i64>,
}

impl SharedBudgetInput {
    pub fn validate(self, creator_id: i64) -> AppResult<NewSharedBudget> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("name is required".into()))?;
        let total = self
            .total_budget
            .ok_or_else(|| AppError::Validation("totalBudget is required".into()))?;

        let mut users = self.users;
        users.push(creator_id);
        users.sort_unstable();
        users.dedup();

        Ok(NewSharedBudget {
            name,
            total_budget_cents: positive_cents("totalBudget", total)?,
            users,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedBudgetSpendUpdate {
    pub budget_id: Option<i64>,
    pub spent_amount: Option<f64>,
}

impl SharedBudgetSpendUpdate {
    pub fn validate(self) -> AppResult<(i64, i64)> {
        let budget_id = self
            .budget_id
            .ok_or_else(|| AppError::Validation("budgetId is required".into()))?;
        let spent = self
            .spent_amount
            .ok_or_else(|| AppError::Validation("spentAmount must be a number".into()))?;
        Ok((budget_id, delta_cents("spentAmount", spent)?))
    }
}
