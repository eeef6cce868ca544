use serde::{Deserialize, Serialize};

use crate::date_utils;
use crate::error::{AppError, AppResult};
use crate::models::money::{positive_cents, serialize_cents};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: i64,
    pub user_id: i64,
    pub source: String,
    #[serde(rename = "amount", serialize_with = "serialize_cents")]
    pub amount_cents: i64,
    pub date: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomeInput {
    pub amount: Option<f64>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub source: String,
    pub amount_cents: i64,
    pub date: String,
    pub description: Option<String>,
}

impl IncomeInput {
    pub fn validate(self) -> AppResult<NewIncome> {
        let source = self
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("source is required".into()))?;
        let amount = self
            .amount
            .ok_or_else(|| AppError::Validation("amount is required".into()))?;

        Ok(NewIncome {
            source,
            amount_cents: positive_cents("amount", amount)?,
            date: date_utils::parse_or_today("date", self.date.as_deref())?,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}
