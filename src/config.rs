// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment
//! (Cloud Run secret bindings) and read once at startup.

use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::str::FromStr;

/// Which document store backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (production, or the emulator)
    Firestore,
    /// In-process store; data is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Document store backend
    pub store_backend: StoreBackend,
    /// Offset used to find local midnight for daily aggregates
    pub local_offset: FixedOffset,
    /// How many days back the streak scan may look
    pub streak_lookback_days: u32,
    /// Number of days in the stats trend series
    pub trend_days: u32,
    /// Mark session cookies `Secure`
    pub cookie_secure: bool,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: u64,

    // --- Secrets ---
    /// HS256 key for access tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HS256 key for refresh tokens (raw bytes)
    pub jwt_refresh_key: Vec<u8>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            local_offset: utc_offset(),
            streak_lookback_days: 365,
            trend_days: 7,
            cookie_secure: false,
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            jwt_refresh_key: b"test_refresh_key_32_bytes_min!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = env::var("STORE_BACKEND")
            .map(|v| v.parse())
            .unwrap_or(Ok(StoreBackend::Firestore))?;

        let gcp_project_id = match store_backend {
            StoreBackend::Firestore => {
                env::var("GCP_PROJECT_ID").map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?
            }
            StoreBackend::Memory => {
                env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string())
            }
        };

        let local_offset = match env::var("LOCAL_UTC_OFFSET") {
            Ok(raw) => parse_utc_offset(&raw)
                .ok_or_else(|| ConfigError::Invalid("LOCAL_UTC_OFFSET", raw.clone()))?,
            Err(_) => utc_offset(),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            local_offset,
            streak_lookback_days: day_window("STREAK_LOOKBACK_DAYS", 365)?,
            trend_days: day_window("TREND_DAYS", 7)?,
            cookie_secure: parse_or("COOKIE_SECURE", false)?,
            access_token_ttl_secs: parse_or("JWT_ACCESS_TTL_SECS", 15 * 60)?,
            refresh_token_ttl_secs: parse_or("JWT_REFRESH_TTL_SECS", 7 * 24 * 60 * 60)?,

            jwt_signing_key: env::var("JWT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            jwt_refresh_key: env::var("JWT_REFRESH_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_REFRESH_SECRET"))?
                .into_bytes(),
        })
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Longest day window (streak lookback, trend series) accepted from the environment.
pub const MAX_DAY_WINDOW: u32 = 3650;

fn day_window(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    check_day_window(name, parse_or(name, default)?)
}

/// A day window must be between 1 and `MAX_DAY_WINDOW` days.
fn check_day_window(name: &'static str, days: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_DAY_WINDOW).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Invalid(name, days.to_string()))
    }
}

/// Parse `+HH:MM` / `-HH:MM` (or `Z`) into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(utc_offset());
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
