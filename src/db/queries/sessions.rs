use crate::models::user::User;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

pub fn create_session(conn: &Connection, token: &str, user_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id) VALUES (?, ?)",
        params![token, user_id],
    )?;
    debug!(user_id, "Created session");
    Ok(())
}

/// Resolve a bearer token to its user, ignoring sessions older than `ttl_days`.
pub fn find_session_user(
    conn: &Connection,
    token: &str,
    ttl_days: i64,
) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT u.id, u.name, u.email, u.password_hash, u.created_at
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ?
           AND s.created_at > datetime('now', ?)",
        params![token, format!("-{} days", ttl_days)],
        |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
}

pub fn delete_session(conn: &Connection, token: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
    Ok(rows > 0)
}

pub fn purge_expired(conn: &Connection, ttl_days: i64) -> rusqlite::Result<usize> {
    let rows = conn.execute(
        "DELETE FROM sessions WHERE created_at <= datetime('now', ?)",
        [format!("-{} days", ttl_days)],
    )?;
    if rows > 0 {
        debug!(count = rows, "Purged expired sessions");
    }
    Ok(rows)
}
