use crate::models::income::{Income, NewIncome};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

const INCOME_COLUMNS: &str =
    "id, user_id, source, amount_cents, date, description, created_at, updated_at";

fn map_income(row: &Row) -> rusqlite::Result<Income> {
    Ok(Income {
        id: row.get(0)?,
        user_id: row.get(1)?,
        source: row.get(2)?,
        amount_cents: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub fn list_incomes(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Income>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM incomes WHERE user_id = ? ORDER BY date DESC, id DESC",
        INCOME_COLUMNS
    ))?;
    let incomes = stmt
        .query_map([user_id], map_income)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(user_id, count = incomes.len(), "Listed income");
    Ok(incomes)
}

pub fn get_income(conn: &Connection, id: i64) -> rusqlite::Result<Option<Income>> {
    trace!(income_id = id, "Fetching income");
    conn.query_row(
        &format!("SELECT {} FROM incomes WHERE id = ?", INCOME_COLUMNS),
        [id],
        map_income,
    )
    .optional()
}

pub fn create_income(
    conn: &Connection,
    user_id: i64,
    income: &NewIncome,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO incomes (user_id, source, amount_cents, date, description)
         VALUES (?, ?, ?, ?, ?)",
        params![
            user_id,
            income.source,
            income.amount_cents,
            income.date,
            income.description,
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(
        income_id = id,
        user_id,
        amount_cents = income.amount_cents,
        "Created income"
    );
    Ok(id)
}

pub fn update_income(conn: &Connection, id: i64, income: &NewIncome) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE incomes SET source = ?, amount_cents = ?, date = ?, description = ?,
         updated_at = datetime('now')
         WHERE id = ?",
        params![
            income.source,
            income.amount_cents,
            income.date,
            income.description,
            id,
        ],
    )?;

    debug!(income_id = id, "Updated income");
    Ok(())
}

pub fn delete_income(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM incomes WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(income_id = id, "Deleted income");
    }
    Ok(rows > 0)
}
