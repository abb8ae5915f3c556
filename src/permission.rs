// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission checks.
//!
//! Policy evaluation lives outside this service. Handlers ask through
//! [`crate::auth::AuthService`], which forwards to a [`PermissionEvaluator`].

use std::any::Any;
use std::borrow::Cow;

use async_trait::async_trait;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::Principal;

/// Opaque capability tag understood by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionId(Cow<'static, str>);

impl PermissionId {
    pub const fn from_static(tag: &'static str) -> Self {
        PermissionId(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        PermissionId(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Policy decision point.
///
/// Both methods return `Ok(())` when allowed and a
/// [`ServiceError::permission_denied`] otherwise.
#[async_trait]
pub trait PermissionEvaluator: Send + Sync {
    async fn has_permission(
        &self,
        permission: &PermissionId,
        principal: &Principal,
    ) -> ServiceResult<()>;

    /// `object` is interpreted by the evaluator alone (usually downcast).
    async fn has_object_permission(
        &self,
        permission: &PermissionId,
        principal: &Principal,
        object: &(dyn Any + Send + Sync),
    ) -> ServiceResult<()>;
}

/// Allows every permission to authenticated callers and nothing to guests.
///
/// Used when no external policy engine is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedOnly;

#[async_trait]
impl PermissionEvaluator for AuthenticatedOnly {
    async fn has_permission(
        &self,
        permission: &PermissionId,
        principal: &Principal,
    ) -> ServiceResult<()> {
        if principal.is_guest() {
            tracing::debug!(permission = %permission, "guest denied");
            return Err(ServiceError::permission_denied());
        }
        Ok(())
    }

    async fn has_object_permission(
        &self,
        permission: &PermissionId,
        principal: &Principal,
        _object: &(dyn Any + Send + Sync),
    ) -> ServiceResult<()> {
        self.has_permission(permission, principal).await
    }
}
