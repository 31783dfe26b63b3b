// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie routes.
//!
//! Sign-in happens elsewhere; these endpoints only rotate and clear the
//! `accessToken` / `refreshToken` cookie pair.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_access_token, create_refresh_token, decode_refresh_token, ACCESS_COOKIE,
    REFRESH_COOKIE,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RefreshResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogoutResponse {
    pub message: String,
}

/// httpOnly, SameSite=Lax session cookie on `/`.
fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    config: &Config,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Exchange a valid refresh token for a new cookie pair.
///
/// Each refresh token works once: the profile's token version is bumped
/// and the new refresh token carries the new version.
async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RefreshResponse>)> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let claims = decode_refresh_token(&token, &state.config.jwt_refresh_key)?;
    let profile = state
        .profiles
        .rotate_token_version(&claims.sub, claims.token_version)
        .await?;

    let config = &state.config;
    let access_token = create_access_token(
        &profile.user_id,
        profile.email.as_deref(),
        &config.jwt_signing_key,
        config.access_token_ttl_secs,
    )?;
    let refresh_token = create_refresh_token(
        &profile.user_id,
        profile.token_version,
        &config.jwt_refresh_key,
        config.refresh_token_ttl_secs,
    )?;

    tracing::info!(
        user_id = %profile.user_id,
        token_version = profile.token_version,
        "Session refreshed"
    );

    let jar = jar
        .add(session_cookie(
            ACCESS_COOKIE,
            access_token,
            config.access_token_ttl_secs as i64,
            config,
        ))
        .add(session_cookie(
            REFRESH_COOKIE,
            refresh_token,
            config.refresh_token_ttl_secs as i64,
            config,
        ));

    Ok((
        jar,
        Json(RefreshResponse {
            message: "Session refreshed".to_string(),
            user_id: profile.user_id,
        }),
    ))
}

/// Clear both session cookies. Removal cookies carry the same attributes as
/// the originals so browsers match them.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar
        .add(session_cookie(ACCESS_COOKIE, String::new(), 0, &state.config))
        .add(session_cookie(REFRESH_COOKIE, String::new(), 0, &state.config));

    (
        jar,
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}
