// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`MontandonError`] to HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use montandon_core::MontandonError;
use serde::Serialize;
use tracing::error;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// A handler error rendered as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub MontandonError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MontandonError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MontandonError::NotFound { .. } => StatusCode::NOT_FOUND,
            MontandonError::Conflict(_) => StatusCode::CONFLICT,
            MontandonError::Gateway { .. }
            | MontandonError::Storage { .. }
            | MontandonError::Config(_)
            | MontandonError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MontandonError> for ApiError {
    fn from(err: MontandonError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(MontandonError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(MontandonError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(MontandonError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !self.0.is_client_error() {
            error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (MontandonError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (MontandonError::not_found("contact", 1), StatusCode::NOT_FOUND),
            (MontandonError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                MontandonError::Gateway {
                    message: "apify down".into(),
                    source: None,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (MontandonError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn error_response_serializes() {
        let resp = ErrorResponse {
            error: "something went wrong".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"something went wrong"}"#);
    }
}
