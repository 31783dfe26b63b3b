// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile reads and edits.

use crate::clock::Clock;
use crate::db::{Db, WriteSet};
use crate::error::{AppError, Result};
use crate::models::{ProfileUpdate, UserProfile};
use crate::services::UserLocks;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProfileService {
    db: Db,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
}

impl ProfileService {
    pub fn new(db: Db, clock: Arc<dyn Clock>, locks: UserLocks) -> Self {
        Self { db, clock, locks }
    }

    /// Fetch the profile, creating and storing an empty one on first access.
    pub async fn get_or_create(&self, user_id: &str, email: Option<&str>) -> Result<UserProfile> {
        if let Some(profile) = self.db.get_profile(user_id).await? {
            return Ok(profile);
        }

        let _guard = self.locks.acquire(user_id).await;
        if let Some(profile) = self.db.get_profile(user_id).await? {
            return Ok(profile);
        }

        let mut profile = UserProfile::new(user_id, self.clock.now());
        profile.email = email.map(str::to_string);
        self.db
            .commit(&WriteSet::profile_only(profile.clone()))
            .await?;

        tracing::info!(user_id, "Created user profile");
        Ok(profile)
    }

    /// Apply client-editable fields. Gamification totals are untouched.
    pub async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let _guard = self.locks.acquire(user_id).await;
        let now = self.clock.now();

        let mut profile = load_profile(&self.db, user_id, now).await?;
        profile.apply_update(update, now);
        self.db
            .commit(&WriteSet::profile_only(profile.clone()))
            .await?;

        tracing::debug!(user_id, "Updated user profile");
        Ok(profile)
    }

    /// Accept a refresh token issued at `presented_version` and bump the
    /// stored version so that token cannot be replayed.
    pub async fn rotate_token_version(
        &self,
        user_id: &str,
        presented_version: u32,
    ) -> Result<UserProfile> {
        let _guard = self.locks.acquire(user_id).await;
        let now = self.clock.now();

        let mut profile = load_profile(&self.db, user_id, now).await?;
        if profile.token_version != presented_version {
            tracing::warn!(
                user_id,
                presented_version,
                current_version = profile.token_version,
                "Stale refresh token"
            );
            return Err(AppError::InvalidToken);
        }

        profile.token_version += 1;
        profile.updated_at = now;
        self.db
            .commit(&WriteSet::profile_only(profile.clone()))
            .await?;
        Ok(profile)
    }
}

/// Stored profile, or a fresh unsaved one. Callers hold the user's lock and
/// persist it as part of their own write set.
pub(crate) async fn load_profile(
    db: &Db,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<UserProfile> {
    Ok(db
        .get_profile(user_id)
        .await?
        .unwrap_or_else(|| UserProfile::new(user_id, now)))
}
