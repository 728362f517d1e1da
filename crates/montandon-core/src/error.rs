// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Montandon.

use thiserror::Error;

/// The primary error type shared by every Montandon crate.
#[derive(Debug, Error)]
pub enum MontandonError {
    /// Configuration errors (invalid TOML, missing credentials, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upstream gateway errors (search provider or messaging provider).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A record looked up by id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The operation conflicts with the current state of a record
    /// (duplicate unique key, referenced row, campaign already dispatched).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed or semantically invalid input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MontandonError {
    /// Shorthand for a [`MontandonError::NotFound`].
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Returns true for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Conflict(_) | Self::Validation(_)
        )
    }
}
