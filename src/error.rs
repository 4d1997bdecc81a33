// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid local time {0}")]
    InvalidLocalTime(String),
    #[error("local time {0} does not exist in this timezone")]
    Unrepresentable(String),
    #[error("invalid date input '{0}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM")]
    BadInput(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupted value under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
    #[error("{kind} '{name}' cannot be deleted")]
    NotDeletable { kind: &'static str, name: String },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("no remote snapshot for user '{0}'")]
    NoSnapshot(String),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("bad url {0}")]
    BadUrl(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;
