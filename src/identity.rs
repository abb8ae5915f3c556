// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identities and the store they are looked up from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ServiceResult;

/// A registered identity as returned by the [`IdentityStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Unique identity ID; becomes the token `sub` claim
    pub id: Uuid,
    /// Login email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// Argon2 PHC hash of the password (never serialized)
    #[serde(skip)]
    pub password_hash: String,
}

impl Identity {
    /// Token subject for this identity.
    pub fn subject(&self) -> String {
        self.id.to_string()
    }
}

/// Who is making the current call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Principal {
    /// No credential was presented.
    #[default]
    Guest,
    /// A verified bearer token resolved to this identity.
    Authenticated(Identity),
}

impl Principal {
    pub fn is_guest(&self) -> bool {
        matches!(self, Principal::Guest)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::Guest => None,
            Principal::Authenticated(identity) => Some(identity),
        }
    }

    /// Identity ID, or `None` for guests.
    pub fn id(&self) -> Option<Uuid> {
        self.identity().map(|identity| identity.id)
    }
}

impl From<Identity> for Principal {
    fn from(identity: Identity) -> Self {
        Principal::Authenticated(identity)
    }
}

/// Read access to identities.
///
/// `Ok(None)` means the identity does not exist; `Err` is reserved for
/// backend failures.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_by_email(&self, email: &str) -> ServiceResult<Option<Identity>>;

    async fn get(&self, id: Uuid) -> ServiceResult<Option<Identity>>;
}
