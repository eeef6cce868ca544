pub mod budgets;
pub mod expenses;
pub mod incomes;
pub mod sessions;
pub mod shared_budgets;
pub mod users;
