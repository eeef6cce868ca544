use crate::models::shared_budget::{NewSharedBudget, SharedBudget};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use tracing::debug;

/// Insert the budget and its member rows in one transaction.
pub fn create_shared_budget(
    conn: &mut Connection,
    created_by: i64,
    budget: &NewSharedBudget,
) -> rusqlite::Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO shared_budgets (name, total_budget_cents, created_by) VALUES (?, ?, ?)",
        params![budget.name, budget.total_budget_cents, created_by],
    )?;
    let id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO shared_budget_members (shared_budget_id, user_id) VALUES (?, ?)",
        )?;
        for user_id in &budget.users {
            stmt.execute(params![id, user_id])?;
        }
    }
    tx.commit()?;

    debug!(
        shared_budget_id = id,
        members = budget.users.len(),
        "Created shared budget"
    );
    Ok(id)
}

pub fn get_shared_budget(conn: &Connection, id: i64) -> rusqlite::Result<Option<SharedBudget>> {
    let budget = conn
        .query_row(
            "SELECT id, name, total_budget_cents, spent_cents, created_by
             FROM shared_budgets WHERE id = ?",
            [id],
            |row| {
                Ok(SharedBudget {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    total_budget_cents: row.get(2)?,
                    spent_cents: row.get(3)?,
                    created_by: row.get(4)?,
                    users: Vec::new(),
                })
            },
        )
        .optional()?;

    match budget {
        Some(mut b) => {
            b.users = members_for(conn, &[id])?.remove(&id).unwrap_or_default();
            Ok(Some(b))
        }
        None => Ok(None),
    }
}

/// Shared budgets the user is a member of.
pub fn list_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<SharedBudget>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.name, b.total_budget_cents, b.spent_cents, b.created_by
         FROM shared_budgets b
         JOIN shared_budget_members m ON m.shared_budget_id = b.id
         WHERE m.user_id = ?
         ORDER BY b.id",
    )?;
    let mut budgets = stmt
        .query_map([user_id], |row| {
            Ok(SharedBudget {
                id: row.get(0)?,
                name: row.get(1)?,
                total_budget_cents: row.get(2)?,
                spent_cents: row.get(3)?,
                created_by: row.get(4)?,
                users: Vec::new(),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let ids: Vec<i64> = budgets.iter().map(|b| b.id).collect();
    let mut members = members_for(conn, &ids)?;
    for budget in &mut budgets {
        budget.users = members.remove(&budget.id).unwrap_or_default();
    }
    Ok(budgets)
}

pub fn is_member(conn: &Connection, shared_budget_id: i64, user_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM shared_budget_members WHERE shared_budget_id = ? AND user_id = ?)",
        params![shared_budget_id, user_id],
        |row| row.get(0),
    )
}

pub fn set_spent(conn: &Connection, id: i64, spent_cents: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE shared_budgets SET spent_cents = ? WHERE id = ?",
        params![spent_cents, id],
    )?;
    debug!(shared_budget_id = id, spent_cents, "Recorded shared budget spending");
    Ok(())
}

fn members_for(
    conn: &Connection,
    budget_ids: &[i64],
) -> rusqlite::Result<HashMap<i64, Vec<i64>>> {
    if budget_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: String = budget_ids
        .iter()
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "SELECT shared_budget_id, user_id FROM shared_budget_members
         WHERE shared_budget_id IN ({})
         ORDER BY user_id",
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = budget_ids
        .iter()
        .map(|id| id as &dyn rusqlite::ToSql)
        .collect();

    let mut members: HashMap<i64, Vec<i64>> = HashMap::new();
    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (budget_id, user_id) = row?;
        members.entry(budget_id).or_default().push(user_id);
    }
    Ok(members)
}
