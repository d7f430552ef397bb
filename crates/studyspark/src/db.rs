//! SQLite connection setup.
//!
//! Migrations are compiled into the binary and applied in version order.
//! Each applied version is recorded in `schema_migrations`, so opening the
//! same database twice is a no-op.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// (version, sql) pairs, sorted by version
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial_schema",
    include_str!("../db/migrations/001_initial_schema.sql"),
)];

/// Open the database at the given path, running any pending migrations
pub fn init_db(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    prepare(conn)
}

/// In-memory database with the full schema
pub fn init_memory_db() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
    prepare(conn)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let count = run_migrations(&conn)?;
    if count > 0 {
        info!(count = count, "Applied migrations");
    }

    Ok(conn)
}

/// Apply every migration not yet recorded. Returns how many ran.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    let mut applied = 0;

    for (version, sql) in MIGRATIONS {
        if is_applied(conn, version)? {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)
            .with_context(|| format!("Failed to apply migration: {}", version))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, datetime('now'))",
            [*version],
        )?;
        tx.commit()?;

        debug!(version = %version, "Applied migration");
        applied += 1;
    }

    Ok(applied)
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    // The table itself comes from the first migration
    let table_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_migrations'",
        [],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Ok(false);
    }

    let applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_init_db_creates_tables() {
        let temp_dir = TempDir::new().unwrap();
        let conn = init_db(&temp_dir.path().join("test.db")).unwrap();

        assert!(table_exists(&conn, "kv"));
        assert!(table_exists(&conn, "schema_migrations"));
    }

    #[test]
    fn test_init_db_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let conn1 = init_db(&db_path).unwrap();
        drop(conn1);
        let conn2 = init_db(&db_path).unwrap();

        // Nothing left to apply on the second open
        assert_eq!(run_migrations(&conn2).unwrap(), 0);

        let versions: i64 = conn2
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_init_db_bad_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no/such/dir/test.db");
        assert!(init_db(&missing).is_err());
    }

    #[test]
    fn test_memory_db() {
        let conn = init_memory_db().unwrap();
        assert!(table_exists(&conn, "kv"));
    }
}
