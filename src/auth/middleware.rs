// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller resolution middleware for Axum.
//!
//! Runs before every handler under the `/v1` router:
//!
//! | `authorization` header | Result |
//! |---|---|
//! | absent | `Principal::Guest`, request continues |
//! | not `Bearer <token>` | `401 unauthenticated` |
//! | token invalid, expired or a refresh token | `401 bad_token` |
//! | valid access token | `Principal::Authenticated`, request continues |
//!
//! The outcome is stored as a [`RequestContext`] in the request extensions
//! and read back with the extractors in [`super::extractor`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), resolve_caller))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::service::AuthService;
use crate::error::{ServiceError, ServiceResult};
use crate::identity::Principal;
use crate::state::AppState;

const BEARER_SCHEME: &str = "bearer";

/// Per-request view of who is calling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub principal: Principal,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn guest() -> Self {
        Self::default()
    }
}

/// Extract the token from an `authorization` header value.
///
/// `Ok(None)` when the header is absent. The scheme is matched
/// case-insensitively and must be separated from the token by one space.
/// The token itself may not be empty or contain whitespace.
pub fn parse_bearer(header: Option<&HeaderValue>) -> ServiceResult<Option<&str>> {
    let Some(header) = header else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ServiceError::unauthenticated("Authorization header is not valid text"))?;

    let (scheme, token) = value.split_once(' ').ok_or_else(malformed_header)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME)
        || token.is_empty()
        || token.contains(|c: char| c.is_ascii_whitespace())
    {
        return Err(malformed_header());
    }
    Ok(Some(token))
}

fn malformed_header() -> ServiceError {
    ServiceError::unauthenticated(
        "Invalid authorization header format (expected 'Bearer <token>')",
    )
}

/// Resolve the principal for a set of request headers.
pub async fn authenticate(auth: &AuthService, headers: &HeaderMap) -> ServiceResult<Principal> {
    match parse_bearer(headers.get(AUTHORIZATION))? {
        None => Ok(Principal::Guest),
        Some(token) => auth.auth(token).await.map(Principal::Authenticated),
    }
}

/// Authentication middleware function.
pub async fn resolve_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match authenticate(&state.auth, request.headers()).await {
        Ok(principal) => principal,
        Err(e) => {
            tracing::info!(
                error_code = e.code(),
                path = %request.uri().path(),
                "request authentication failed"
            );
            return e.into_response();
        }
    };

    if let Some(id) = principal.id() {
        tracing::Span::current().record("subject", tracing::field::display(id));
    }
    request.extensions_mut().insert(RequestContext::new(principal));
    next.run(request).await
}
