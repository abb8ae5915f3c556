// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless token authentication for the service API.
//!
//! ## Auth Flow
//!
//! 1. Client posts email and password to `/v1/auth/token`
//! 2. Server verifies the Argon2 hash and returns an access/refresh pair
//! 3. Client sends `Authorization: Bearer <access token>` on every call
//! 4. [`middleware::resolve_caller`]:
//!    - Verifies the RS512 signature, `nbf`/`exp` and `aud == access`
//!    - Loads the identity named by `sub`
//!    - Stores the caller (or Guest, with no header) in the request
//! 5. Before the access token expires the client exchanges the refresh token
//!    at `/v1/auth/refresh` for a new pair
//!
//! ## Security
//!
//! - No server-side session: identity is re-derived from the token per call
//! - Access and refresh tokens are separated by audience
//! - Verification failures are reported as a generic `bad_token`
//! - Refresh tokens are not single-use; one can be exchanged repeatedly
//!   until it expires

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod service;

pub use claims::{Audience, Claims, TokenPair};
pub use codec::{TokenCodec, TokenLifetimes};
pub use error::TokenError;
pub use extractor::{Authenticated, Caller};
pub use middleware::{resolve_caller, RequestContext};
pub use service::AuthService;
