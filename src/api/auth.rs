// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance endpoints.

use axum::{extract::State, Json};

use crate::{
    error::ServiceResult,
    models::{Credentials, RefreshTokenRequest, TokenPairResponse},
    state::AppState,
};

/// Exchange email and password for a token pair.
#[utoipa::path(
    post,
    path = "/v1/auth/token",
    tag = "Auth",
    request_body = Credentials,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPairResponse),
        (status = 400, description = "Wrong email or password"),
        (status = 404, description = "No identity with this email"),
    )
)]
pub async fn create_token(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ServiceResult<Json<TokenPairResponse>> {
    let pair = state.auth.create_token(&credentials).await?;
    tracing::info!(email = %credentials.email, "token pair issued");
    Ok(Json(TokenPairResponse::new(
        pair,
        state.auth.codec().lifetimes().access_secs,
    )))
}

/// Exchange a refresh token for a new token pair.
///
/// The presented refresh token stays valid until its own expiry.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPairResponse),
        (status = 401, description = "Refresh token invalid, expired or not a refresh token"),
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> ServiceResult<Json<TokenPairResponse>> {
    let pair = state.auth.refresh_token(&request.refresh_token)?;
    Ok(Json(TokenPairResponse::new(
        pair,
        state.auth.codec().lifetimes().access_secs,
    )))
}
