// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The `Database` struct is the single writer: query modules accept
//! `&Database` and go through `connection().call()`.

use std::path::Path;
use std::str::FromStr;

use montandon_core::MontandonError;
use rusqlite::types::Type;
use tracing::debug;

use crate::migrations;

/// Handle to an open, migrated SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, MontandonError> {
        Self::open_with_options(path, true).await
    }

    /// Open the database, choosing the journal mode.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, MontandonError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| MontandonError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| MontandonError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), MontandonError> {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
                .map_err(storage_err)?;
            if wal_mode {
                let mode: String = conn
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                    .map_err(storage_err)?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => MontandonError::Storage {
                source: other.to_string().into(),
            },
        })?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, waiting for queued calls to finish.
    pub async fn close(self) -> Result<(), MontandonError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

fn storage_err(e: rusqlite::Error) -> MontandonError {
    MontandonError::Storage {
        source: Box::new(e),
    }
}

/// Convert a tokio-rusqlite error into a `MontandonError`.
///
/// Constraint violations (unique keys, foreign keys, checks) become
/// [`MontandonError::Conflict`]; everything else is a storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> MontandonError {
    match e {
        tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(err, msg))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            MontandonError::Conflict(msg.unwrap_or_else(|| err.to_string()))
        }
        other => MontandonError::Storage {
            source: Box::new(other),
        },
    }
}

/// Read a text column into a strum-backed status enum.
pub(crate) fn status_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
