// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the token pair handed to clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::TokenError;

/// Intended use of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Authorizes API calls
    Access,
    /// Can only be exchanged for a new pair
    Refresh,
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Audience::Access => write!(f, "access"),
            Audience::Refresh => write!(f, "refresh"),
        }
    }
}

/// Signed claim set.
///
/// `aud` is serialized as a one-element array to match the registered
/// claim's multi-valued form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Audience (exactly one entry)
    pub aud: Vec<Audience>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
    /// Not before timestamp
    pub nbf: i64,
    /// Unique token ID
    pub jti: String,
    /// Subject (identity ID)
    pub sub: String,
}

impl Claims {
    /// Claims for `subject` valid from `now` for `ttl_secs` seconds.
    ///
    /// Fails if `exp` would not fit in an `i64`.
    pub fn new(
        subject: impl Into<String>,
        audience: Audience,
        now: i64,
        ttl_secs: i64,
    ) -> Result<Self, TokenError> {
        let exp = now
            .checked_add(ttl_secs)
            .ok_or_else(|| TokenError::Encoding(format!("lifetime of {ttl_secs}s overflows exp")))?;
        Ok(Self {
            aud: vec![audience],
            exp,
            iat: now,
            nbf: now,
            jti: Uuid::new_v4().to_string(),
            sub: subject.into(),
        })
    }

    /// The single audience, if the claim set carries exactly one.
    pub fn audience(&self) -> Option<Audience> {
        match self.aud.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Whether `now` falls inside `[nbf, exp)`.
    pub fn is_active_at(&self, now: i64) -> bool {
        now >= self.nbf && now < self.exp
    }
}

/// Access and refresh token issued together for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// Bearer token for API calls
    pub access: String,
    /// Token for `POST /v1/auth/refresh`
    pub refresh: String,
}
