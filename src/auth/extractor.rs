// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the resolved caller.
//!
//! Both read the [`RequestContext`] that [`super::middleware::resolve_caller`]
//! stored on the request:
//!
//! ```rust,ignore
//! async fn list(Caller(ctx): Caller) -> impl IntoResponse {
//!     // ctx.principal may be Guest
//! }
//!
//! async fn me(Authenticated(identity): Authenticated) -> impl IntoResponse {
//!     // guests were rejected with 401
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::RequestContext;
use crate::error::ServiceError;
use crate::identity::{Identity, Principal};

/// The caller, guest or not.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| ServiceError::unexpected("caller resolution middleware is not installed"))
    }
}

/// An authenticated caller. Guests are rejected with `Unauthenticated`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Caller(context) = Caller::from_request_parts(parts, state).await?;
        match context.principal {
            Principal::Authenticated(identity) => Ok(Authenticated(identity)),
            Principal::Guest => Err(ServiceError::unauthenticated(
                "Authorization header is required",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            display_name: "A".to_string(),
            password_hash: String::new(),
        }
    }

    #[tokio::test]
    async fn caller_requires_middleware() {
        let mut parts = parts();
        let err = Caller::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedBehavior);
    }

    #[tokio::test]
    async fn caller_returns_guest() {
        let mut parts = parts();
        parts.extensions.insert(RequestContext::guest());
        let Caller(context) = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(context.principal.is_guest());
    }

    #[tokio::test]
    async fn authenticated_rejects_guest() {
        let mut parts = parts();
        parts.extensions.insert(RequestContext::guest());
        let err = Authenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn authenticated_returns_identity() {
        let mut parts = parts();
        let identity = identity();
        parts
            .extensions
            .insert(RequestContext::new(Principal::Authenticated(identity.clone())));
        let Authenticated(resolved) = Authenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(resolved, identity);
    }
}
