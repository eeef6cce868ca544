use serde::{Deserialize, Serialize};

use crate::date_utils;
use crate::error::{AppError, AppResult};
use crate::models::money::{delta_cents, positive_cents, serialize_cents};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    #[serde(rename = "amount", serialize_with = "serialize_cents")]
    pub amount_cents: i64,
    #[serde(rename = "spent", serialize_with = "serialize_cents")]
    pub spent_cents: i64,
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    pub category: Option<String>,
    /// Older clients send the budget limit as `limit`.
    #[serde(alias = "limit")]
    pub amount: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category: String,
    pub amount_cents: i64,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl BudgetInput {
    pub fn validate(self) -> AppResult<NewBudget> {
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("category is required".into()))?;
        let amount = self
            .amount
            .ok_or_else(|| AppError::Validation("amount is required".into()))?;
        let start_date = date_utils::parse_or_today("startDate", self.start_date.as_deref())?;
        let end_date = match self.end_date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(raw) => Some(date_utils::parse_date("endDate", raw)?),
            None => None,
        };
        if let Some(end) = &end_date {
            if *end < start_date {
                return Err(AppError::Validation(
                    "endDate must not be before startDate".into(),
                ));
            }
        }

        Ok(NewBudget {
            category,
            amount_cents: positive_cents("amount", amount)?,
            start_date,
            end_date,
        })
    }
}

/// Body of `PUT /api/budgets/update`: add `spent` to the budget for `category`.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetSpendUpdate {
    pub category: Option<String>,
    pub spent: Option<f64>,
}

impl BudgetSpendUpdate {
    pub fn validate(self) -> AppResult<(String, i64)> {
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("category is required".into()))?;
        let spent = self
            .spent
            .ok_or_else(|| AppError::Validation("spent must be a number".into()))?;
        Ok((category, delta_cents("spent", spent)?))
    }
}
