// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification failures.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

use super::claims::Audience;
use crate::error::ServiceError;

/// Why a token was rejected.
///
/// The variants exist for logging. Callers only ever see a generic
/// `BadToken`; see the `From<TokenError> for ServiceError` impl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not three base64url segments, bad JSON, or missing claims
    Malformed,
    /// Signature does not verify against the public key
    InvalidSignature,
    /// Header names an algorithm other than the one we sign with
    InvalidAlgorithm,
    /// `now >= exp`
    Expired,
    /// `now < nbf`
    NotYetValid,
    /// `aud` does not match the operation
    WrongAudience { expected: Audience },
    /// Signing failed
    Encoding(String),
}

impl TokenError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed_token",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidAlgorithm => "invalid_algorithm",
            TokenError::Expired => "token_expired",
            TokenError::NotYetValid => "token_not_yet_valid",
            TokenError::WrongAudience { .. } => "invalid_audience",
            TokenError::Encoding(_) => "encoding_error",
        }
    }
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Token is malformed"),
            TokenError::InvalidSignature => write!(f, "Token signature is invalid"),
            TokenError::InvalidAlgorithm => write!(f, "Token algorithm is not accepted"),
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::NotYetValid => write!(f, "Token is not yet valid"),
            TokenError::WrongAudience { expected } => {
                write!(f, "Token audience is invalid (expected '{expected}')")
            }
            TokenError::Encoding(msg) => write!(f, "Failed to sign token: {msg}"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
            JwtErrorKind::InvalidAlgorithm => TokenError::InvalidAlgorithm,
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            JwtErrorKind::ImmatureSignature => TokenError::NotYetValid,
            JwtErrorKind::InvalidAudience => TokenError::WrongAudience {
                expected: Audience::Access,
            },
            _ => TokenError::Malformed,
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Encoding(msg) => ServiceError::unexpected(msg),
            other => {
                tracing::debug!(reason = other.error_code(), "token rejected");
                ServiceError::bad_token()
            }
        }
    }
}
