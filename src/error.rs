// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service error taxonomy.
//!
//! Every failure that crosses a component boundary is a [`ServiceError`]
//! carrying a stable code, a human-readable message and a parameter map.
//! The HTTP boundary turns it into a status code and a JSON body; internal
//! causes (signature failures, key parsing errors) are logged, never
//! returned to the caller.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error kinds exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Signature invalid, expired, not yet valid, or wrong audience.
    BadToken,
    /// Missing or malformed credential header where one is required.
    Unauthenticated,
    /// A request parameter was rejected.
    InvalidParameter,
    /// The referenced entity does not exist.
    EntityNotFound,
    /// The permission evaluator refused the operation.
    PermissionDenied,
    /// Lower-level failure (key material, hashing, store backend).
    UnexpectedBehavior,
    /// The surrounding call was cancelled before completion.
    Cancelled,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadToken => "bad_token",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::EntityNotFound => "entity_not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::UnexpectedBehavior => "unexpected_behavior",
            ErrorKind::Cancelled => "cancelled",
        }
    }

    /// HTTP status for this kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::BadToken | ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
            ErrorKind::EntityNotFound => StatusCode::NOT_FOUND,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::UnexpectedBehavior => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Cancelled => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Typed domain error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
    pub params: BTreeMap<String, String>,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            params: BTreeMap::new(),
        }
    }

    /// Attach a parameter to the error.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn bad_token() -> Self {
        Self::new(ErrorKind::BadToken, "Token is invalid or expired")
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Invalid value for the named parameter(s).
    pub fn invalid_parameter(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ErrorKind::InvalidParameter, format!("Invalid {name}")).with_param("name", name)
    }

    pub fn entity_not_found(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(ErrorKind::EntityNotFound, format!("{entity} not found"))
            .with_param("entity", entity)
    }

    pub fn permission_denied() -> Self {
        Self::new(
            ErrorKind::PermissionDenied,
            "Insufficient permissions for this operation",
        )
    }

    /// Wrap a lower-level failure. The detail is kept for logs only.
    pub fn unexpected(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "unexpected behavior");
        Self::new(ErrorKind::UnexpectedBehavior, "Unexpected internal error")
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "Request was cancelled")
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.kind.code(),
            params: self.params,
        });
        (status, body).into_response()
    }
}
