// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authgate - Stateless Token Authentication Service
//!
//! Issues RS512-signed access/refresh token pairs and resolves the calling
//! identity for every inbound request.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, auth service and caller resolution middleware
//! - `identity` / `permission` - Collaborator traits for identity lookup and
//!   permission evaluation
//! - `store` - In-memory identity store
//! - `clock` - Injectable time source

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod permission;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;
