// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wellness Tracker: log workouts, meals, mindfulness, sleep and hydration,
//! earn points and follow daily progress.
//!
//! This crate provides the backend JSON API: activity CRUD with scoring,
//! per-day aggregates, streaks and the user profile.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use clock::Clock;
use config::Config;
use db::Db;
use middleware::{IdentityResolver, JwtCookieResolver};
use services::{ActivityService, ProfileService, StatsReporter, UserLocks};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub clock: Arc<dyn Clock>,
    pub identity: Arc<dyn IdentityResolver>,
    pub activities: ActivityService,
    pub profiles: ProfileService,
    pub stats: StatsReporter,
}

impl AppState {
    /// Wire up services over `db`, authenticating with the configured JWT key.
    pub fn new(config: Config, db: Db, clock: Arc<dyn Clock>) -> Self {
        let identity = Arc::new(JwtCookieResolver::new(&config.jwt_signing_key));
        Self::with_identity(config, db, clock, identity)
    }

    pub fn with_identity(
        config: Config,
        db: Db,
        clock: Arc<dyn Clock>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        let locks = UserLocks::new();
        let activities =
            ActivityService::new(db.clone(), clock.clone(), locks.clone(), config.local_offset);
        let profiles = ProfileService::new(db.clone(), clock.clone(), locks.clone());
        let stats = StatsReporter::new(
            db.clone(),
            clock.clone(),
            locks,
            config.local_offset,
            config.streak_lookback_days,
            config.trend_days,
        );

        Self {
            config,
            db,
            clock,
            identity,
            activities,
            profiles,
            stats,
        }
    }
}
