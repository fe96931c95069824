use std::path::Path;

use anyhow::Context;
use rusqlite::{params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use serde::Serialize;

use crate::db;
use crate::error::{GradebookError, Result};
use crate::grade::Category;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub identifier: String,
    pub last_names: String,
    pub first_name: String,
    pub score: f64,
    pub category: Category,
}

/// The `students` table. One connection, every write auto-committed.
pub struct RecordStore {
    conn: Connection,
}

const SELECT_COLUMNS: &str = "SELECT identifier, last_names, first_name, score, category FROM students";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    let code: String = row.get(4)?;
    let category = code.parse::<Category>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })?;
    Ok(StudentRecord {
        identifier: row.get(0)?,
        last_names: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        first_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        score: row.get(3)?,
        category,
    })
}

impl RecordStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the workspace database and makes sure the table exists.
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let store = Self::new(db::open_db(workspace)?);
        store.ensure_schema().context("create students table")?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<()> {
        db::ensure_schema(&self.conn)?;
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Result<Option<StudentRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE identifier = ?");
        let rec = self
            .conn
            .query_row(&sql, [identifier], record_from_row)
            .optional()?;
        Ok(rec)
    }

    pub fn exists(&self, identifier: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM students WHERE identifier = ?",
                [identifier],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn insert(&self, record: &StudentRecord) -> Result<()> {
        if self.exists(&record.identifier)? {
            return Err(GradebookError::DuplicateKey);
        }
        let res = self.conn.execute(
            "INSERT INTO students(identifier, last_names, first_name, score, category)
             VALUES(?, ?, ?, ?, ?)",
            (
                &record.identifier,
                &record.last_names,
                &record.first_name,
                record.score,
                record.category.as_code(),
            ),
        );
        match res {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(GradebookError::DuplicateKey)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns false when no row matched; that is not an error.
    pub fn delete(&self, identifier: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM students WHERE identifier = ?", [identifier])?;
        Ok(n > 0)
    }

    /// Score and category change in one statement. Returns false when no row
    /// matched.
    pub fn update_score(&self, identifier: &str, score: f64, category: Category) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE students SET score = ?, category = ? WHERE identifier = ?",
            (score, category.as_code(), identifier),
        )?;
        Ok(n > 0)
    }

    pub fn list_all(&self) -> Result<Vec<StudentRecord>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn list_by_category(&self, categories: &[Category]) -> Result<Vec<StudentRecord>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; categories.len()].join(", ");
        let sql = format!("{SELECT_COLUMNS} WHERE category IN ({placeholders}) ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params_from_iter(categories.iter().map(|c| c.as_code())),
                record_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| GradebookError::from(e))
    }
}
