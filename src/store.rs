// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory identity store.
//!
//! Backs the binary when no external identity service is wired in, and the
//! test suites. Emails are matched case-insensitively.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::{ServiceError, ServiceResult};
use crate::identity::{Identity, IdentityStore};

#[derive(Default)]
pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<Uuid, Identity>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity with a freshly hashed password.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: impl Into<String>,
    ) -> ServiceResult<Identity> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::invalid_parameter("email"));
        }

        let password_hash = hash_password(password).map_err(ServiceError::unexpected)?;
        let mut identities = self.identities.write().await;
        if identities.values().any(|identity| identity.email == email) {
            return Err(ServiceError::invalid_parameter("email")
                .with_param("reason", "already registered"));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            email,
            display_name: display_name.into(),
            password_hash,
        };
        identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    /// Insert or replace an identity as-is.
    pub async fn insert(&self, identity: Identity) {
        self.identities.write().await.insert(identity.id, identity);
    }

    pub async fn remove(&self, id: Uuid) -> ServiceResult<()> {
        if self.identities.write().await.remove(&id).is_some() {
            Ok(())
        } else {
            Err(ServiceError::entity_not_found("Identity"))
        }
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get_by_email(&self, email: &str) -> ServiceResult<Option<Identity>> {
        let email = normalize_email(email);
        Ok(self
            .identities
            .read()
            .await
            .values()
            .find(|identity| identity.email == email)
            .cloned())
    }

    async fn get(&self, id: Uuid) -> ServiceResult<Option<Identity>> {
        Ok(self.identities.read().await.get(&id).cloned())
    }
}
