// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.
//!
//! Sessions are a pair of HS256 tokens in httpOnly cookies: a short-lived
//! `accessToken` checked on every API request and a long-lived
//! `refreshToken` exchanged at `/auth/refresh` for a new pair.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Access token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Refresh token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    /// Must match the profile's current version; bumped on every refresh
    #[serde(rename = "tokenVersion")]
    pub token_version: u32,
    pub exp: usize,
    pub iat: usize,
}

/// Authenticated user extracted from the request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
}

/// Works out who is making a request.
pub trait IdentityResolver: Send + Sync {
    /// The caller's identity, or `Unauthorized`/`InvalidToken`.
    fn resolve(&self, headers: &HeaderMap, jar: &CookieJar) -> Result<AuthUser, AppError>;
}

/// Reads the access token from the `accessToken` cookie, falling back to an
/// `Authorization: Bearer` header.
pub struct JwtCookieResolver {
    key: DecodingKey,
}

impl JwtCookieResolver {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(signing_key),
        }
    }
}

impl IdentityResolver for JwtCookieResolver {
    fn resolve(&self, headers: &HeaderMap, jar: &CookieJar) -> Result<AuthUser, AppError> {
        let token = match jar.get(ACCESS_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => bearer_token(headers).ok_or(AppError::Unauthorized)?,
        };

        let claims = decode::<Claims>(&token, &self.key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AppError::InvalidToken
            })?
            .claims;

        if claims.sub.is_empty() {
            return Err(AppError::InvalidToken);
        }

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a resolvable identity.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = state.identity.resolve(request.headers(), &jar)?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

fn unix_now() -> anyhow::Result<usize> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize)
}

/// Create a short-lived access token.
pub fn create_access_token(
    user_id: &str,
    email: Option<&str>,
    signing_key: &[u8],
    ttl_secs: u64,
) -> anyhow::Result<String> {
    let now = unix_now()?;
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        iat: now,
        exp: now + ttl_secs as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Create a refresh token bound to `token_version`.
pub fn create_refresh_token(
    user_id: &str,
    token_version: u32,
    refresh_key: &[u8],
    ttl_secs: u64,
) -> anyhow::Result<String> {
    let now = unix_now()?;
    let claims = RefreshClaims {
        sub: user_id.to_string(),
        token_version,
        iat: now,
        exp: now + ttl_secs as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(refresh_key),
    )?)
}

/// Verify a refresh token's signature and expiry.
pub fn decode_refresh_token(token: &str, refresh_key: &[u8]) -> Result<RefreshClaims, AppError> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(refresh_key),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    const KEY: &[u8] = b"unit_test_signing_key_32_bytes!!";

    #[test]
    fn test_cookie_takes_precedence_over_header() {
        let resolver = JwtCookieResolver::new(KEY);
        let cookie_token = create_access_token("from-cookie", None, KEY, 60).unwrap();
        let header_token = create_access_token("from-header", None, KEY, 60).unwrap();

        let jar = CookieJar::new().add(Cookie::new(ACCESS_COOKIE, cookie_token));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", header_token)).unwrap(),
        );

        let user = resolver.resolve(&headers, &jar).unwrap();
        assert_eq!(user.user_id, "from-cookie");
    }

    #[test]
    fn test_bearer_fallback_and_email() {
        let resolver = JwtCookieResolver::new(KEY);
        let token = create_access_token("u1", Some("u1@example.com"), KEY, 60).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let user = resolver.resolve(&headers, &CookieJar::new()).unwrap();
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.email.as_deref(), Some("u1@example.com"));
    }

    #[test]
    fn test_missing_and_forged_tokens() {
        let resolver = JwtCookieResolver::new(KEY);
        assert!(matches!(
            resolver.resolve(&HeaderMap::new(), &CookieJar::new()),
            Err(AppError::Unauthorized)
        ));

        let forged = create_access_token("u1", None, b"some_other_key_entirely_32bytes!", 60)
            .unwrap();
        let jar = CookieJar::new().add(Cookie::new(ACCESS_COOKIE, forged));
        assert!(matches!(
            resolver.resolve(&HeaderMap::new(), &jar),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let refresh_key = b"unit_test_refresh_key_32_bytes!!";
        let token = create_refresh_token("u1", 3, refresh_key, 60).unwrap();

        let claims = decode_refresh_token(&token, refresh_key).unwrap();
        assert_eq!(claims.token_version, 3);

        let jar = CookieJar::new().add(Cookie::new(ACCESS_COOKIE, token));
        assert!(JwtCookieResolver::new(KEY)
            .resolve(&HeaderMap::new(), &jar)
            .is_err());
    }
}
