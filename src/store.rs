// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! SQLite-backed task table.
//!
//! Rows are keyed by `name`. Columns and comparison operators are closed enums, so
//! only bound parameters ever carry caller data into SQL.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, ToSql};
use tracing::debug;

use crate::error::{Error, Result};
use crate::task::{Task, NO_DUE_DATE};

const SCHEMA_TASKS: &str = r#"CREATE TABLE IF NOT EXISTS tasks (
    name TEXT NOT NULL PRIMARY KEY,
    start TIMESTAMP NOT NULL,
    "end" TIMESTAMP NOT NULL,
    total INTEGER NOT NULL DEFAULT 0,
    due DATE
)"#;
const SELECT_TASKS: &str = r#"SELECT name, start, "end", total, due FROM tasks"#;
const INSERT_TASK: &str = r#"INSERT INTO tasks (name, start, "end", total, due) VALUES (?1, ?2, ?3, ?4, ?5)"#;

/// A column of the `tasks` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Name,
    Start,
    End,
    Total,
    Due,
}

impl Column {
    /// Quoted SQL identifier.
    fn ident(self) -> &'static str {
        match self {
            Column::Name => "\"name\"",
            Column::Start => "\"start\"",
            Column::End => "\"end\"",
            Column::Total => "\"total\"",
            Column::Due => "\"due\"",
        }
    }
}

/// Comparison used by [`TaskStore::select_many`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let due: Option<NaiveDate> = row.get(4)?;
    Ok(Task {
        name: row.get(0)?,
        start: row.get(1)?,
        end: row.get(2)?,
        total: row.get(3)?,
        due: due.unwrap_or(NO_DUE_DATE),
    })
}

/// Maps a unique-key violation on insert to [`Error::DuplicateKey`].
fn insert_error(err: rusqlite::Error, name: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::ConstraintViolation => {
            Error::DuplicateKey(name.to_string())
        }
        other => Error::Database(other),
    }
}

#[derive(Debug)]
pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    /// Opens (creating if needed) the database at `path` and ensures the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| Error::IoPath {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        debug!(path = %path.display(), "opening task store");
        Self::from_connection(Connection::open(path)?)
    }

    /// Private in-memory database; contents are lost on drop.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.create_table()?;
        Ok(store)
    }

    /// Creates the `tasks` table if it does not exist. Safe to call repeatedly.
    pub fn create_table(&self) -> Result<()> {
        self.conn.execute(SCHEMA_TASKS, [])?;
        Ok(())
    }

    /// First row (in storage order) where `column = value`.
    pub fn select_one(&self, column: Column, value: &dyn ToSql) -> Result<Option<Task>> {
        let sql = format!("{} WHERE {} = ?1 ORDER BY rowid LIMIT 1", SELECT_TASKS, column.ident());
        let task = self
            .conn
            .query_row(&sql, params![value], task_from_row)
            .optional()?;
        Ok(task)
    }

    /// All rows where `column <operator> value`, in storage order.
    pub fn select_many(&self, column: Column, value: &dyn ToSql, operator: Operator) -> Result<Vec<Task>> {
        let sql = format!(
            "{} WHERE {} {} ?1 ORDER BY rowid",
            SELECT_TASKS,
            column.ident(),
            operator.as_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![value], task_from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Sets `column = new_value` on the row where `key_column = key_value`.
    /// Returns the number of rows changed; no match is not an error.
    pub fn update_one(
        &self,
        column: Column,
        key_column: Column,
        (new_value, key_value): (&dyn ToSql, &dyn ToSql),
    ) -> Result<usize> {
        let sql = format!("UPDATE tasks SET {} = ?1 WHERE {} = ?2", column.ident(), key_column.ident());
        let changed = self.conn.execute(&sql, params![new_value, key_value])?;
        debug!(column = column.ident(), changed, "update_one");
        Ok(changed)
    }

    /// Inserts complete rows in one transaction. An existing name fails the whole
    /// batch with [`Error::DuplicateKey`].
    pub fn insert(&mut self, rows: &[Task]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_TASK)?;
            for task in rows {
                stmt.execute(params![task.name, task.start, task.end, task.total, task.due])
                    .map_err(|e| insert_error(e, &task.name))?;
            }
        }
        tx.commit()?;
        debug!(rows = rows.len(), "inserted tasks");
        Ok(())
    }
}
