use crate::models::expense::{Expense, NewExpense};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

const EXPENSE_COLUMNS: &str =
    "id, user_id, category, amount_cents, date, description, created_at, updated_at";

fn map_expense(row: &Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount_cents: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub fn list_expenses(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Expense>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM expenses WHERE user_id = ? ORDER BY date DESC, id DESC",
        EXPENSE_COLUMNS
    ))?;
    let expenses = stmt
        .query_map([user_id], map_expense)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(user_id, count = expenses.len(), "Listed expenses");
    Ok(expenses)
}

pub fn get_expense(conn: &Connection, id: i64) -> rusqlite::Result<Option<Expense>> {
    trace!(expense_id = id, "Fetching expense");
    conn.query_row(
        &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
        [id],
        map_expense,
    )
    .optional()
}

pub fn create_expense(
    conn: &Connection,
    user_id: i64,
    expense: &NewExpense,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO expenses (user_id, category, amount_cents, date, description)
         VALUES (?, ?, ?, ?, ?)",
        params![
            user_id,
            expense.category,
            expense.amount_cents,
            expense.date,
            expense.description,
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(
        expense_id = id,
        user_id,
        amount_cents = expense.amount_cents,
        "Created expense"
    );
    Ok(id)
}

pub fn update_expense(conn: &Connection, id: i64, expense: &NewExpense) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE expenses SET category = ?, amount_cents = ?, date = ?, description = ?,
         updated_at = datetime('now')
         WHERE id = ?",
        params![
            expense.category,
            expense.amount_cents,
            expense.date,
            expense.description,
            id,
        ],
    )?;

    debug!(expense_id = id, "Updated expense");
    Ok(())
}

pub fn delete_expense(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM expenses WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(expense_id = id, "Deleted expense");
    }
    Ok(rows > 0)
}
