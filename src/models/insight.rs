use serde::{Deserialize, Serialize};

use crate::models::money::{decimal_from_cents, serialize_cents};

/// Placeholder for an insight section the model did not produce.
pub const NO_INSIGHTS: &str = "No insights available";

/// Per-user totals, recomputed on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    #[serde(rename = "totalIncome", serialize_with = "serialize_cents")]
    pub total_income_cents: i64,
    #[serde(rename = "totalExpenses", serialize_with = "serialize_cents")]
    pub total_expenses_cents: i64,
}

impl FinancialSummary {
    pub fn total_income(&self) -> f64 {
        decimal_from_cents(self.total_income_cents)
    }

    pub fn total_expenses(&self) -> f64 {
        decimal_from_cents(self.total_expenses_cents)
    }

    /// What is left each month once expenses are paid.
    pub fn available_payment_cents(&self) -> i64 {
        self.total_income_cents
            .saturating_sub(self.total_expenses_cents)
    }
}

/// The three numbered sections requested from the model, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InsightSection {
    SmartSavingTips,
    AlternativeExpenses,
    InvestmentRecommendations,
}

impl InsightSection {
    pub const ALL: [InsightSection; 3] = [
        Self::SmartSavingTips,
        Self::AlternativeExpenses,
        Self::InvestmentRecommendations,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Self::SmartSavingTips => 1,
            Self::AlternativeExpenses => 2,
            Self::InvestmentRecommendations => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::SmartSavingTips => "Smart saving tips",
            Self::AlternativeExpenses => "Alternative expense suggestions",
            Self::InvestmentRecommendations => "Investment recommendations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub smart_saving_tips: String,
    pub alternative_expenses: String,
    pub investment_recommendations: String,
}

impl Default for InsightResult {
    fn default() -> Self {
        Self {
            smart_saving_tips: NO_INSIGHTS.to_string(),
            alternative_expenses: NO_INSIGHTS.to_string(),
            investment_recommendations: NO_INSIGHTS.to_string(),
        }
    }
}

/// Risk profile the insight prompt is tailored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightMode {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl InsightMode {
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Conservative => {
                "The user is risk-averse: favour capital preservation and emergency savings."
            }
            Self::Balanced => "The user prefers a balanced mix of safety and growth.",
            Self::Aggressive => {
                "The user accepts higher risk in exchange for long-term growth."
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightParams {
    pub mode: Option<InsightMode>,
}

/// Topic of a conversational question, as classified by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum IntentCategory {
    Expenses,
    Income,
    Budget,
    Savings,
    Unknown,
    Other,
}

impl From<String> for IntentCategory {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "expenses" => Self::Expenses,
            "income" => Self::Income,
            "budget" => Self::Budget,
            "savings" => Self::Savings,
            "unknown" => Self::Unknown,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResult {
    pub category: IntentCategory,
    pub specific_expense_category: Option<String>,
    pub time_period: Option<String>,
    pub action: Option<String>,
}

/// Outcome of turning free model text into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply<T> {
    Parsed(T),
    ExtractionFailed(String),
}

/// Body of the conversational and general question routes.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// Reply to `POST /api/ai/query`; which fields are present depends on the intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnswer {
    pub intent: IntentCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryAnswer {
    pub fn message(intent: IntentCategory, message: impl Into<String>) -> Self {
        Self {
            intent,
            category: None,
            total_spent: None,
            total_income: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

/// One row of the spending heat-map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category: String,
    #[serde(rename = "totalSpent", serialize_with = "serialize_cents")]
    pub total_spent_cents: i64,
}
