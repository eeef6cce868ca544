use serde::{Deserialize, Serialize};

use crate::date_utils;
use crate::error::{AppError, AppResult};
use crate::models::money::{positive_cents, serialize_cents};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    #[serde(rename = "amount", serialize_with = "serialize_cents")]
    pub amount_cents: i64,
    pub date: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /api/expenses` and `PUT /api/expenses/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseInput {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub amount_cents: i64,
    pub date: String,
    pub description: Option<String>,
}

impl ExpenseInput {
    pub fn validate(self) -> AppResult<NewExpense> {
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("category is required".into()))?;
        let amount = self
            .amount
            .ok_or_else(|| AppError::Validation("amount is required".into()))?;

        Ok(NewExpense {
            category,
            amount_cents: positive_cents("amount", amount)?,
            date: date_utils::parse_or_today("date", self.date.as_deref())?,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}
