// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a task is already running; stop it first")]
    AlreadyRunning,

    #[error("no task is running")]
    NotRunning,

    #[error("'{0}' does not exist")]
    NotFound(String),

    #[error("task '{0}' already exists")]
    DuplicateKey(String),

    #[error("task name must not be empty")]
    EmptyName,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error at {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
