use rusqlite::Connection;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("cannot read migrations from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("migration {name} failed: {source}")]
    Sql {
        name: String,
        source: rusqlite::Error,
    },

    #[error(transparent)]
    Bookkeeping(#[from] rusqlite::Error),
}

/// Apply every `*.sql` file in `migrations_dir` not yet recorded in
/// `_migrations`, in file-name order. Each file runs in its own transaction.
pub fn run_migrations(conn: &Connection, migrations_dir: &Path) -> Result<usize, MigrationError> {
    tracing::debug!(dir = %migrations_dir.display(), "Checking for database migrations");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let io_err = |source| MigrationError::Io {
        path: migrations_dir.display().to_string(),
        source,
    };

    let mut entries: Vec<_> = fs::read_dir(migrations_dir)
        .map_err(io_err)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "sql"))
        .collect();

    entries.sort_by_key(|e| e.file_name());
    tracing::debug!(count = entries.len(), "Found migration files");

    let mut applied_count = 0;
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();

        let already_applied: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = ?)",
            [&name],
            |row| row.get(0),
        )?;
        if already_applied {
            continue;
        }

        let sql = fs::read_to_string(entry.path()).map_err(io_err)?;

        tracing::info!(migration = %name, "Applying migration");
        let sql_err = |source| MigrationError::Sql {
            name: name.clone(),
            source,
        };
        conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", sql))
            .map_err(|e| {
                conn.execute_batch("ROLLBACK;").ok();
                sql_err(e)
            })?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [&name])?;
        applied_count += 1;
    }

    if applied_count > 0 {
        tracing::info!(count = applied_count, "Migrations applied successfully");
    } else {
        tracing::debug!("No new migrations to apply");
    }

    Ok(applied_count)
}
