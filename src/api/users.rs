// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;

use crate::auth::Authenticated;
use crate::models::UserMeResponse;

/// Get the identity behind the presented access token.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Missing, malformed or invalid token"),
        (status = 404, description = "Token subject no longer exists"),
    )
)]
pub async fn get_current_user(Authenticated(identity): Authenticated) -> Json<UserMeResponse> {
    Json(identity.into())
}
