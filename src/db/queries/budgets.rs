use crate::models::budget::{Budget, NewBudget};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const BUDGET_COLUMNS: &str =
    "id, user_id, category, amount_cents, spent_cents, start_date, end_date";

fn map_budget(row: &Row) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount_cents: row.get(3)?,
        spent_cents: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}

pub fn list_budgets(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Budget>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM budgets WHERE user_id = ? ORDER BY start_date DESC, id DESC",
        BUDGET_COLUMNS
    ))?;
    let budgets = stmt
        .query_map([user_id], map_budget)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(budgets)
}

pub fn get_budget(conn: &Connection, id: i64) -> rusqlite::Result<Option<Budget>> {
    conn.query_row(
        &format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS),
        [id],
        map_budget,
    )
    .optional()
}

pub fn create_budget(
    conn: &Connection,
    user_id: i64,
    budget: &NewBudget,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO budgets (user_id, category, amount_cents, start_date, end_date)
         VALUES (?, ?, ?, ?, ?)",
        params![
            user_id,
            budget.category,
            budget.amount_cents,
            budget.start_date,
            budget.end_date,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(budget_id = id, user_id, "Created budget");
    Ok(id)
}

/// The most recent budget the user holds for `category`, matched without
/// regard to case.
pub fn find_for_category(
    conn: &Connection,
    user_id: i64,
    category: &str,
) -> rusqlite::Result<Option<Budget>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM budgets
             WHERE user_id = ? AND category = ? COLLATE NOCASE
             ORDER BY start_date DESC, id DESC
             LIMIT 1",
            BUDGET_COLUMNS
        ),
        params![user_id, category],
        map_budget,
    )
    .optional()
}

pub fn set_spent(conn: &Connection, id: i64, spent_cents: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE budgets SET spent_cents = ? WHERE id = ?",
        params![spent_cents, id],
    )?;
    debug!(budget_id = id, spent_cents, "Recorded budget spending");
    Ok(())
}
