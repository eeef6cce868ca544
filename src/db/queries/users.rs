use crate::models::user::{User, UserSummary};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)",
        params![name, email, password_hash],
    )?;
    let id = conn.last_insert_rowid();
    debug!(user_id = id, "Created user");
    Ok(id)
}

/// Emails are unique without regard to case.
pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ? COLLATE NOCASE",
        [email],
        map_user,
    )
    .optional()
}

pub fn list_users(conn: &Connection) -> rusqlite::Result<Vec<UserSummary>> {
    let mut stmt = conn.prepare("SELECT id, name, email FROM users ORDER BY name, id")?;
    let users = stmt
        .query_map([], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Return the ids from `ids` that do not belong to any user.
pub fn missing_user_ids(conn: &Connection, ids: &[i64]) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")?;
    let mut missing = Vec::new();
    for id in ids {
        let exists: bool = stmt.query_row([id], |row| row.get(0))?;
        if !exists {
            missing.push(*id);
        }
    }
    Ok(missing)
}
