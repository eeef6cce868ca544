pub mod budget;
pub mod debt;
pub mod expense;
pub mod income;
pub mod insight;
pub mod money;
pub mod shared_budget;
pub mod user;

pub use budget::{Budget, BudgetInput, BudgetSpendUpdate, NewBudget};
pub use debt::{DebtSimulation, DebtSimulationInput, DebtSimulationRequest};
pub use expense::{Expense, ExpenseInput, NewExpense};
pub use income::{Income, IncomeInput, NewIncome};
pub use insight::{
    AnalysisResponse, CategorySpending, FinancialSummary, InsightMode, InsightParams,
    InsightResult, InsightSection, IntentCategory, IntentResult, MessageResponse, ParsedReply,
    QueryAnswer, QueryRequest, NO_INSIGHTS,
};
pub use shared_budget::{
    NewSharedBudget, SharedBudget, SharedBudgetInput, SharedBudgetSpendUpdate,
};
pub use user::{CurrentUser, LoginRequest, RegisterRequest, TokenResponse, User, UserSummary};
