// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixtures shared by unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::codec::{TokenCodec, TokenLifetimes};
use crate::auth::AuthService;
use crate::clock::FixedClock;
use crate::error::ServiceResult;
use crate::identity::{Identity, IdentityStore};
use crate::permission::AuthenticatedOnly;
use crate::state::AppState;
use crate::store::InMemoryIdentityStore;

pub const PUBLIC_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa_public.pem"));
pub const PRIVATE_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa_private.pem"));
/// Public half of an unrelated keypair.
pub const OTHER_PUBLIC_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa_other_public.pem"));

/// 2023-11-14T22:13:20Z
pub const T0: i64 = 1_700_000_000;

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::from_unix(T0))
}

pub fn codec_with(clock: Arc<FixedClock>) -> TokenCodec {
    TokenCodec::new(
        PUBLIC_PEM.as_bytes(),
        PRIVATE_PEM.as_bytes(),
        TokenLifetimes::default(),
        clock,
    )
    .expect("test keypair loads")
}

/// App state with one registered identity (`a@b.com` / `secret`).
pub async fn test_state() -> (AppState, Identity) {
    let store = Arc::new(InMemoryIdentityStore::new());
    let identity = store
        .register("a@b.com", "secret", "A")
        .await
        .expect("register test identity");
    let auth = AuthService::new(
        Arc::new(codec_with(fixed_clock())),
        store,
        Arc::new(AuthenticatedOnly),
    );
    (AppState::new(auth), identity)
}

/// Store whose `get` never completes.
pub struct SlowStore {
    pub identity: Identity,
}

impl Default for SlowStore {
    fn default() -> Self {
        Self {
            identity: Identity {
                id: Uuid::new_v4(),
                email: "slow@b.com".to_string(),
                display_name: String::new(),
                password_hash: String::new(),
            },
        }
    }
}

#[async_trait]
impl IdentityStore for SlowStore {
    async fn get_by_email(&self, _email: &str) -> ServiceResult<Option<Identity>> {
        std::future::pending().await
    }

    async fn get(&self, _id: Uuid) -> ServiceResult<Option<Identity>> {
        std::future::pending().await
    }
}
