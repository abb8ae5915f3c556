// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the auth endpoints. All types derive
//! `ToSchema` for the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::TokenPair;
use crate::identity::Identity;

// =============================================================================
// Login
// =============================================================================

/// Email and password presented at login.
///
/// Never stored; `Debug` redacts the password.
#[derive(Clone, Deserialize, ToSchema)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Body of `POST /v1/auth/refresh`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    /// Refresh token from a previous pair
    pub refresh_token: String,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    /// Access token (`Authorization: Bearer <access_token>`)
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl TokenPairResponse {
    pub fn new(pair: TokenPair, expires_in: i64) -> Self {
        Self {
            access_token: pair.access,
            refresh_token: pair.refresh,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// Response for `GET /v1/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserMeResponse {
    /// Identity ID (token subject)
    pub id: Uuid,
    /// Login email
    pub email: String,
    /// Display name
    pub display_name: String,
}

impl From<Identity> for UserMeResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            display_name: identity.display_name,
        }
    }
}
