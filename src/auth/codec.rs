// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RS512 token signing and verification.
//!
//! ## Security
//!
//! - Tokens are signed with the private key and verified with the public key
//!   only, so verifying nodes never need signing material
//! - Only `RS512` headers are accepted
//! - Expiry and not-before are checked against the injected [`Clock`], with
//!   no leeway; the library's wall-clock checks are disabled
//! - Audience separates access tokens from refresh tokens
//!
//! No revocation list exists. A refresh token stays exchangeable until its
//! own `exp`, even after it has been rotated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{Audience, Claims, TokenPair};
use super::error::TokenError;
use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult};

/// Default access token lifetime (24 hours).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 86_400;

/// Default refresh token lifetime (48 hours).
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 172_800;

/// Upper bound on either lifetime (10 years).
pub const MAX_TTL_SECS: i64 = 315_360_000;

const ALGORITHM: Algorithm = Algorithm::RS512;

/// Token lifetimes in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access_secs: i64,
    pub refresh_secs: i64,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

/// Signs and verifies tokens with a fixed RSA keypair.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetimes: TokenLifetimes,
    clock: Arc<dyn Clock>,
    keys_verified_at: DateTime<Utc>,
}

impl TokenCodec {
    /// Load the keypair from PEM.
    ///
    /// Fails with `UnexpectedBehavior` if either key does not parse or the
    /// public key does not verify what the private key signs.
    pub fn new(
        public_pem: &[u8],
        private_pem: &[u8],
        lifetimes: TokenLifetimes,
        clock: Arc<dyn Clock>,
    ) -> ServiceResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| ServiceError::unexpected(format!("invalid private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| ServiceError::unexpected(format!("invalid public key: {e}")))?;

        let in_range = |secs: i64| (1..=MAX_TTL_SECS).contains(&secs);
        if !in_range(lifetimes.access_secs) || !in_range(lifetimes.refresh_secs) {
            return Err(ServiceError::unexpected(format!(
                "token lifetimes must be between 1 and {MAX_TTL_SECS} seconds"
            )));
        }

        let mut validation = Validation::new(ALGORITHM);
        // Window and audience are checked in `verify` against our clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "aud"]);

        let keys_verified_at = clock.now();
        let codec = Self {
            encoding_key,
            decoding_key,
            validation,
            lifetimes,
            clock,
            keys_verified_at,
        };
        codec.self_check()?;
        Ok(codec)
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// When the keypair passed its sign/verify check at construction.
    pub fn keys_verified_at(&self) -> DateTime<Utc> {
        self.keys_verified_at
    }

    /// Sign and verify a throwaway token to catch mismatched keys at startup.
    fn self_check(&self) -> ServiceResult<()> {
        let token = Claims::new("keypair-check", Audience::Access, self.clock.unix_seconds(), 60)
            .and_then(|probe| self.sign(&probe))
            .map_err(|e| ServiceError::unexpected(format!("keypair check failed: {e}")))?;
        decode::<Claims>(&token, &self.decoding_key, &self.validation)
            .map(|_| ())
            .map_err(|e| {
                ServiceError::unexpected(format!(
                    "public key does not match private key: {e}"
                ))
            })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature and validity window. Audience is not checked.
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        let now = self.clock.unix_seconds();
        if claims.is_active_at(now) {
            Ok(claims)
        } else if now < claims.nbf {
            Err(TokenError::NotYetValid)
        } else {
            Err(TokenError::Expired)
        }
    }

    fn verify_audience(&self, token: &str, expected: Audience) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.audience() != Some(expected) {
            return Err(TokenError::WrongAudience { expected });
        }
        Ok(claims)
    }

    /// Issue an access token and a refresh token for `subject`.
    pub fn create_pair(&self, subject: &str) -> ServiceResult<TokenPair> {
        let now = self.clock.unix_seconds();
        let access = Claims::new(subject, Audience::Access, now, self.lifetimes.access_secs)?;
        let refresh = Claims::new(subject, Audience::Refresh, now, self.lifetimes.refresh_secs)?;

        let pair = TokenPair {
            access: self.sign(&access)?,
            refresh: self.sign(&refresh)?,
        };
        tracing::debug!(subject, access_exp = access.exp, refresh_exp = refresh.exp, "issued token pair");
        Ok(pair)
    }

    /// Verify an access token.
    pub fn validate_access(&self, token: &str) -> ServiceResult<Claims> {
        Ok(self.verify_audience(token, Audience::Access)?)
    }

    /// Exchange a refresh token for a new pair with the same subject.
    ///
    /// The presented token is not invalidated and can be exchanged again
    /// until it expires.
    pub fn refresh_token(&self, token: &str) -> ServiceResult<TokenPair> {
        let claims = self.verify_audience(token, Audience::Refresh)?;
        self.create_pair(&claims.sub)
    }

    /// Subject of a correctly signed, unexpired token of **either** audience.
    ///
    /// A refresh token is accepted here as readily as an access token. Use
    /// [`TokenCodec::access_subject`] wherever the token is being used as a
    /// credential for an API call.
    pub fn extract_subject(&self, token: &str) -> ServiceResult<String> {
        Ok(self.verify(token)?.sub)
    }

    /// Subject of a valid access token.
    pub fn access_subject(&self, token: &str) -> ServiceResult<String> {
        Ok(self.validate_access(token)?.sub)
    }
}
