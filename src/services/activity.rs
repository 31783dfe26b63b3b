// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity logging service.
//!
//! Handles the core workflow for every mutation:
//! 1. Score the activity
//! 2. Work out the daily-aggregate deltas it causes
//! 3. Adjust the profile's points and level
//! 4. Commit activity, profile and daily rows as one write set

use crate::clock::Clock;
use crate::db::{ActivityMutation, Db, WriteSet};
use crate::error::{AppError, Result};
use crate::models::{
    Activity, ActivityPatch, ActivityType, ActivityTypeStats, DailyAggregate, GoalThresholds,
    NewActivity, UserProfile,
};
use crate::services::aggregation::{self, DayDelta};
use crate::services::profile::load_profile;
use crate::services::scoring::score;
use crate::services::UserLocks;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Create, edit, delete and query a user's activities.
#[derive(Clone)]
pub struct ActivityService {
    db: Db,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
    offset: FixedOffset,
}

impl ActivityService {
    pub fn new(db: Db, clock: Arc<dyn Clock>, locks: UserLocks, offset: FixedOffset) -> Self {
        Self {
            db,
            clock,
            locks,
            offset,
        }
    }

    pub async fn list(
        &self,
        user_id: &str,
        activity_type: Option<ActivityType>,
        limit: u32,
    ) -> Result<Vec<Activity>> {
        self.db.list_activities(user_id, activity_type, limit).await
    }

    /// Log a new activity for `user_id`.
    pub async fn create(&self, user_id: &str, input: NewActivity) -> Result<Activity> {
        let _guard = self.locks.acquire(user_id).await;
        let now = self.clock.now();

        let mut activity =
            Activity::from_submission(uuid::Uuid::new_v4().to_string(), user_id, input, now);
        activity.points_earned = score(activity.activity_type, activity.duration);

        let mut profile = load_profile(&self.db, user_id, now).await?;
        profile.add_points(activity.points_earned, now);

        let deltas = aggregation::plan_create(&activity, self.offset);
        let days = self.updated_days(user_id, &deltas, now).await?;

        self.db
            .commit(&WriteSet {
                activity: Some(ActivityMutation::Put(activity.clone())),
                profile: Some(profile),
                days,
            })
            .await?;

        tracing::info!(
            user_id,
            activity_id = %activity.id,
            activity_type = %activity.activity_type,
            points = activity.points_earned,
            "Activity created"
        );

        Ok(activity)
    }

    /// Apply a partial edit, re-scoring and moving the daily contribution as needed.
    pub async fn update(
        &self,
        user_id: &str,
        activity_id: &str,
        patch: ActivityPatch,
    ) -> Result<Activity> {
        let _guard = self.locks.acquire(user_id).await;
        let now = self.clock.now();

        let old = self.owned_activity(user_id, activity_id).await?;
        let mut updated = old.clone();
        updated.apply_patch(patch, now);
        updated.points_earned = score(updated.activity_type, updated.duration);

        let points_delta = updated.points_earned - old.points_earned;
        let profile = if points_delta != 0 {
            let mut profile = load_profile(&self.db, user_id, now).await?;
            profile.add_points(points_delta, now);
            Some(profile)
        } else {
            None
        };

        let deltas = aggregation::plan_update(&old, &updated, self.offset);
        let days = self.updated_days(user_id, &deltas, now).await?;

        self.db
            .commit(&WriteSet {
                activity: Some(ActivityMutation::Put(updated.clone())),
                profile,
                days,
            })
            .await?;

        tracing::info!(
            user_id,
            activity_id,
            old_points = old.points_earned,
            new_points = updated.points_earned,
            days_touched = deltas.len(),
            "Activity updated"
        );

        Ok(updated)
    }

    /// Remove an activity and everything it contributed.
    pub async fn delete(&self, user_id: &str, activity_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(user_id).await;
        let now = self.clock.now();

        let activity = self.owned_activity(user_id, activity_id).await?;

        let mut profile = load_profile(&self.db, user_id, now).await?;
        profile.add_points(-activity.points_earned, now);

        let deltas = aggregation::plan_delete(&activity, self.offset);
        let days = self.updated_days(user_id, &deltas, now).await?;

        self.db
            .commit(&WriteSet {
                activity: Some(ActivityMutation::Delete(activity.id.clone())),
                profile: Some(profile),
                days,
            })
            .await?;

        tracing::info!(
            user_id,
            activity_id,
            points = activity.points_earned,
            "Activity deleted"
        );

        Ok(())
    }

    /// Count, latest date and points per activity type, in `ActivityType::ALL` order.
    pub async fn type_stats(&self, user_id: &str) -> Result<Vec<ActivityTypeStats>> {
        let activities = self.db.list_all_activities(user_id).await?;

        let mut by_type: HashMap<ActivityType, ActivityTypeStats> = ActivityType::ALL
            .iter()
            .map(|&t| {
                (
                    t,
                    ActivityTypeStats {
                        activity_type: t,
                        count: 0,
                        last_activity: None,
                        total_points: 0,
                    },
                )
            })
            .collect();

        for activity in &activities {
            if let Some(stats) = by_type.get_mut(&activity.activity_type) {
                stats.count += 1;
                stats.total_points += activity.points_earned;
                stats.last_activity = stats.last_activity.max(Some(activity.date));
            }
        }

        Ok(ActivityType::ALL
            .iter()
            .filter_map(|t| by_type.remove(t))
            .collect())
    }

    /// Recompute every daily row and the point total from stored activities.
    ///
    /// Only rows whose values changed are written. Returns the rebuilt
    /// profile and how many daily rows were written.
    pub async fn rebuild(&self, user_id: &str) -> Result<(UserProfile, usize)> {
        let _guard = self.locks.acquire(user_id).await;
        let now = self.clock.now();

        let activities = self.db.list_all_activities(user_id).await?;
        let stored: HashMap<NaiveDate, DailyAggregate> = self
            .db
            .list_all_daily(user_id)
            .await?
            .into_iter()
            .map(|d| (d.date, d))
            .collect();
        let thresholds = self.thresholds(user_id).await?;

        let rebuilt = aggregation::rebuild(
            user_id,
            &activities,
            stored.keys().copied(),
            &thresholds,
            self.offset,
            now,
        );
        let changed: Vec<DailyAggregate> = rebuilt
            .days
            .into_iter()
            .filter(|row| {
                stored
                    .get(&row.date)
                    .is_none_or(|old| !old.same_totals(row))
            })
            .collect();

        let mut profile = load_profile(&self.db, user_id, now).await?;
        let drift = rebuilt.total_points - profile.total_points;
        profile.add_points(drift, now);

        let days_rebuilt = changed.len();
        // Rebuilding is idempotent, so a partial failure is fixed by running it again
        let batches = self
            .db
            .commit_in_batches(WriteSet {
                activity: None,
                profile: Some(profile.clone()),
                days: changed,
            })
            .await?;

        tracing::info!(
            user_id,
            activities = activities.len(),
            days_rebuilt,
            batches,
            drift,
            "Rebuilt daily aggregates"
        );

        Ok((profile, days_rebuilt))
    }

    /// The activity, if it exists and belongs to `user_id`. Someone else's
    /// activity is reported as missing.
    async fn owned_activity(&self, user_id: &str, activity_id: &str) -> Result<Activity> {
        self.db
            .get_activity(activity_id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))
    }

    async fn thresholds(&self, user_id: &str) -> Result<GoalThresholds> {
        let goals = self.db.list_goals(user_id).await?;
        Ok(GoalThresholds::from_goals(&goals))
    }

    /// Stored rows for the days in `deltas`, with the deltas applied.
    async fn updated_days(
        &self,
        user_id: &str,
        deltas: &[DayDelta],
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyAggregate>> {
        if deltas.is_empty() {
            return Ok(Vec::new());
        }

        let reads = deltas.iter().map(|d| self.db.get_daily(user_id, d.date));
        let (existing, thresholds) =
            futures_util::try_join!(try_join_all(reads), self.thresholds(user_id))?;

        Ok(aggregation::apply_deltas(
            user_id,
            existing.into_iter().flatten().collect(),
            deltas,
            &thresholds,
            now,
        ))
    }
}
