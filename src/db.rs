use anyhow::Context;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join(DB_FILE_NAME)
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("create workspace {}", workspace.display()))?;
    let path = db_path(workspace);
    let conn =
        Connection::open(&path).with_context(|| format!("open database {}", path.display()))?;
    tracing::debug!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Idempotent; safe to call on every startup.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            identifier TEXT PRIMARY KEY,
            last_names TEXT,
            first_name TEXT,
            score REAL,
            category TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_category ON students(category)",
        [],
    )?;
    Ok(())
}
