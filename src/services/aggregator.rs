use rusqlite::Connection;
use std::collections::HashMap;

use crate::db::queries::{expenses, incomes};
use crate::error::AppResult;
use crate::models::money::{checked_add_cents, checked_total};
use crate::models::{CategorySpending, Expense, FinancialSummary, Income};

pub fn summarize(incomes: &[Income], expenses: &[Expense]) -> AppResult<FinancialSummary> {
    Ok(FinancialSummary {
        total_income_cents: checked_total(incomes.iter().map(|i| i.amount_cents))?,
        total_expenses_cents: checked_total(expenses.iter().map(|e| e.amount_cents))?,
    })
}

/// Fetch every income and expense record of the user and total them.
pub fn load_summary(conn: &Connection, user_id: i64) -> AppResult<FinancialSummary> {
    let income_list = incomes::list_incomes(conn, user_id)?;
    let expense_list = expenses::list_expenses(conn, user_id)?;
    summarize(&income_list, &expense_list)
}

/// Spend per category, largest first.
///
/// Categories that differ only in case are merged and shown with the spelling
/// of the first record seen.
pub fn spending_heatmap(expenses: &[Expense]) -> AppResult<Vec<CategorySpending>> {
    let mut totals: HashMap<String, CategorySpending> = HashMap::new();

    for expense in expenses {
        let key = expense.category.trim().to_lowercase();
        let entry = totals.entry(key).or_insert_with(|| CategorySpending {
            category: expense.category.trim().to_string(),
            total_spent_cents: 0,
        });
        entry.total_spent_cents =
            checked_add_cents(entry.total_spent_cents, expense.amount_cents)?;
    }

    let mut result: Vec<CategorySpending> = totals.into_values().collect();
    result.sort_by(|a, b| {
        b.total_spent_cents
            .cmp(&a.total_spent_cents)
            .then_with(|| a.category.cmp(&b.category))
    });
    Ok(result)
}

/// Total spend on categories whose name contains `query`, ignoring case.
/// `None` or a blank query matches every record.
pub fn category_total(expenses: &[Expense], query: Option<&str>) -> AppResult<i64> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();

    checked_total(
        expenses
            .iter()
            .filter(|e| needle.is_empty() || e.category.to_lowercase().contains(&needle))
            .map(|e| e.amount_cents),
    )
}
