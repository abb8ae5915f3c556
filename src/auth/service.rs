// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential login, token refresh and identity resolution.
//!
//! [`AuthService`] is the only component that talks to the
//! [`IdentityStore`] and the [`PermissionEvaluator`].

use std::any::Any;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::claims::TokenPair;
use super::codec::TokenCodec;
use super::password::{verify_password, PasswordError};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::{Identity, IdentityStore, Principal};
use crate::models::Credentials;
use crate::permission::{PermissionEvaluator, PermissionId};

/// Parameter name reported for any failed login.
///
/// Unknown email and wrong password are indistinguishable to the caller
/// once past the store lookup.
const LOGIN_PARAMETER: &str = "email or password";

#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    identities: Arc<dyn IdentityStore>,
    permissions: Arc<dyn PermissionEvaluator>,
}

impl AuthService {
    pub fn new(
        codec: Arc<TokenCodec>,
        identities: Arc<dyn IdentityStore>,
        permissions: Arc<dyn PermissionEvaluator>,
    ) -> Self {
        Self {
            codec,
            identities,
            permissions,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Exchange email and password for a token pair.
    pub async fn create_token(&self, credentials: &Credentials) -> ServiceResult<TokenPair> {
        let identity = self
            .identities
            .get_by_email(&credentials.email)
            .await?
            .ok_or_else(|| ServiceError::entity_not_found("Identity"))?;

        match verify_password(&credentials.password, &identity.password_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                tracing::info!(subject = %identity.id, "login rejected");
                return Err(ServiceError::invalid_parameter(LOGIN_PARAMETER));
            }
            Err(e) => {
                tracing::warn!(subject = %identity.id, error = %e, "stored password hash unusable");
                return Err(ServiceError::invalid_parameter(LOGIN_PARAMETER));
            }
        }

        self.create_token_by_user(&identity)
    }

    /// Issue a pair for an identity that is already authenticated, e.g.
    /// straight after signup.
    pub fn create_token_by_user(&self, identity: &Identity) -> ServiceResult<TokenPair> {
        self.codec.create_pair(&identity.subject())
    }

    pub fn refresh_token(&self, token: &str) -> ServiceResult<TokenPair> {
        self.codec.refresh_token(token)
    }

    /// Yes/no check on an access token.
    pub fn validate_token(&self, token: &str) -> ServiceResult<()> {
        self.codec.validate_access(token).map(|_| ())
    }

    /// Resolve an access token to the identity it names.
    ///
    /// A correctly signed token whose subject has since been deleted yields
    /// `EntityNotFound`, not `BadToken`.
    pub async fn auth(&self, token: &str) -> ServiceResult<Identity> {
        let id = self.subject_id(token)?;
        self.identities
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::entity_not_found("Identity"))
    }

    /// [`AuthService::auth`], aborted with `Cancelled` once `cancel` fires.
    pub async fn auth_until(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> ServiceResult<Identity> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ServiceError::cancelled()),
            result = self.auth(token) => result,
        }
    }

    fn subject_id(&self, token: &str) -> ServiceResult<Uuid> {
        let subject = self.codec.access_subject(token)?;
        Uuid::parse_str(&subject).map_err(|_| {
            tracing::debug!(subject = %subject, "token subject is not an identity id");
            ServiceError::bad_token()
        })
    }

    pub async fn has_permission(
        &self,
        principal: &Principal,
        permission: &PermissionId,
    ) -> ServiceResult<()> {
        self.permissions.has_permission(permission, principal).await
    }

    pub async fn has_object_permission(
        &self,
        principal: &Principal,
        permission: &PermissionId,
        object: &(dyn Any + Send + Sync),
    ) -> ServiceResult<()> {
        self.permissions
            .has_object_permission(permission, principal, object)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::permission::AuthenticatedOnly;
    use crate::store::InMemoryIdentityStore;
    use crate::test_support::{codec_with, fixed_clock, SlowStore};
    use async_trait::async_trait;
    use chrono::Duration;

    const READ: PermissionId = PermissionId::from_static("entity.read");

    async fn service() -> (AuthService, Arc<InMemoryIdentityStore>, Identity) {
        let store = Arc::new(InMemoryIdentityStore::new());
        let identity = store.register("a@b.com", "secret", "A").await.unwrap();
        let service = AuthService::new(
            Arc::new(codec_with(fixed_clock())),
            store.clone(),
            Arc::new(AuthenticatedOnly),
        );
        (service, store, identity)
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn login_returns_pair_for_identity() {
        let (service, _store, identity) = service().await;
        let pair = service
            .create_token(&credentials("a@b.com", "secret"))
            .await
            .unwrap();
        assert!(service.validate_token(&pair.access).is_ok());
        assert_eq!(service.auth(&pair.access).await.unwrap().id, identity.id);
    }

    #[tokio::test]
    async fn login_unknown_email_is_not_found() {
        let (service, _store, _identity) = service().await;
        let err = service
            .create_token(&credentials("x@y.com", "secret"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EntityNotFound);
    }

    #[tokio::test]
    async fn login_wrong_password_is_generic() {
        let (service, _store, _identity) = service().await;
        let err = service
            .create_token(&credentials("a@b.com", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParameter);
        assert_eq!(err.message, "Invalid email or password");
    }

    #[tokio::test]
    async fn login_with_corrupt_hash_is_generic() {
        let (service, store, mut identity) = service().await;
        identity.password_hash = "not-a-phc-string".to_string();
        store.insert(identity).await;
        let err = service
            .create_token(&credentials("a@b.com", "secret"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParameter);
    }

    #[tokio::test]
    async fn login_then_refresh_scenario() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let identity = store.register("a@b.com", "secret", "A").await.unwrap();
        let clock = fixed_clock();
        let codec = Arc::new(codec_with(clock.clone()));
        let service = AuthService::new(codec.clone(), store, Arc::new(AuthenticatedOnly));

        let pair = service
            .create_token(&credentials("a@b.com", "secret"))
            .await
            .unwrap();

        clock.advance(Duration::seconds(codec.lifetimes().refresh_secs - 1));
        let rotated = service.refresh_token(&pair.refresh).unwrap();
        assert!(service.validate_token(&rotated.access).is_ok());
        assert_eq!(
            codec.extract_subject(&rotated.access).unwrap(),
            identity.id.to_string()
        );
        // The original access token has expired by now.
        assert!(service.validate_token(&pair.access).is_err());
    }

    #[tokio::test]
    async fn create_token_by_user_skips_password() {
        let (service, _store, identity) = service().await;
        let pair = service.create_token_by_user(&identity).unwrap();
        assert_eq!(service.auth(&pair.access).await.unwrap(), identity);
    }

    #[tokio::test]
    async fn auth_rejects_refresh_token() {
        let (service, _store, identity) = service().await;
        let pair = service.create_token_by_user(&identity).unwrap();
        let err = service.auth(&pair.refresh).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadToken);
    }

    #[tokio::test]
    async fn auth_for_deleted_subject_is_not_found() {
        let (service, store, identity) = service().await;
        let pair = service.create_token_by_user(&identity).unwrap();
        store.remove(identity.id).await.unwrap();

        let err = service.auth(&pair.access).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EntityNotFound);
    }

    #[tokio::test]
    async fn auth_rejects_non_uuid_subject() {
        let (service, _store, _identity) = service().await;
        let pair = service.codec().create_pair("42").unwrap();
        let err = service.auth(&pair.access).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadToken);
    }

    #[tokio::test]
    async fn auth_until_aborts_on_cancel() {
        let store = Arc::new(SlowStore::default());
        let identity = store.identity.clone();
        let service = AuthService::new(
            Arc::new(codec_with(fixed_clock())),
            store,
            Arc::new(AuthenticatedOnly),
        );
        let pair = service.create_token_by_user(&identity).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = service.auth_until(&pair.access, &cancel).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn auth_until_completes_without_cancel() {
        let (service, _store, identity) = service().await;
        let pair = service.create_token_by_user(&identity).unwrap();
        let resolved = service
            .auth_until(&pair.access, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(resolved.id, identity.id);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        struct Broken;

        #[async_trait]
        impl IdentityStore for Broken {
            async fn get_by_email(&self, _email: &str) -> ServiceResult<Option<Identity>> {
                Err(ServiceError::unexpected("backend down"))
            }
            async fn get(&self, _id: Uuid) -> ServiceResult<Option<Identity>> {
                Err(ServiceError::unexpected("backend down"))
            }
        }

        let service = AuthService::new(
            Arc::new(codec_with(fixed_clock())),
            Arc::new(Broken),
            Arc::new(AuthenticatedOnly),
        );
        let err = service
            .create_token(&credentials("a@b.com", "secret"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedBehavior);
    }

    #[tokio::test]
    async fn permissions_are_delegated() {
        let (service, _store, identity) = service().await;
        let user = Principal::Authenticated(identity);

        assert!(service.has_permission(&user, &READ).await.is_ok());
        let err = service
            .has_permission(&Principal::Guest, &READ)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);

        let object = String::from("row-1");
        assert!(service
            .has_object_permission(&user, &READ, &object)
            .await
            .is_ok());
        assert!(service
            .has_object_permission(&Principal::Guest, &READ, &object)
            .await
            .is_err());
    }
}
