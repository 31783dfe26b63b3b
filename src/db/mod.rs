// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! `Db` dispatches to Firestore in production and to an in-process map
//! store for local development and tests. Every mutation that touches more
//! than one document goes through [`Db::commit`], which writes the whole
//! [`WriteSet`] or nothing. Sets too large for one transaction go through
//! [`Db::commit_in_batches`] instead.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Activity, ActivityType, DailyAggregate, UserProfile, WellnessGoal};
use chrono::NaiveDate;

/// Firestore rejects transactions with more writes than this.
pub const MAX_WRITES_PER_COMMIT: usize = 500;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
    /// Keyed by user_id
    pub const USER_PROFILES: &str = "user_profiles";
    /// Keyed by `{user_id}_{YYYY-MM-DD}`
    pub const DAILY_AGGREGATES: &str = "daily_aggregates";
    pub const WELLNESS_GOALS: &str = "wellness_goals";
}

/// Change to the activity document in a [`WriteSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityMutation {
    Put(Activity),
    Delete(String),
}

/// Documents to write atomically.
///
/// Rows in `days` replace the stored row for their (user, date) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSet {
    pub activity: Option<ActivityMutation>,
    pub profile: Option<UserProfile>,
    pub days: Vec<DailyAggregate>,
}

impl WriteSet {
    pub fn profile_only(profile: UserProfile) -> Self {
        Self {
            activity: None,
            profile: Some(profile),
            days: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_none() && self.profile.is_none() && self.days.is_empty()
    }

    pub fn write_count(&self) -> usize {
        usize::from(self.activity.is_some())
            + usize::from(self.profile.is_some())
            + self.days.len()
    }

    /// Split into sets of at most [`MAX_WRITES_PER_COMMIT`] writes, in order.
    ///
    /// The activity goes in the first set and the profile in the last, so a
    /// failure part way through never leaves a point total without the rows
    /// that back it.
    pub fn into_batches(self) -> Vec<WriteSet> {
        let WriteSet {
            mut activity,
            profile,
            days,
        } = self;

        let mut batches = Vec::new();
        let mut days = days.into_iter().peekable();
        loop {
            let room = MAX_WRITES_PER_COMMIT - usize::from(activity.is_some());
            let chunk: Vec<DailyAggregate> = days.by_ref().take(room).collect();
            batches.push(WriteSet {
                activity: activity.take(),
                profile: None,
                days: chunk,
            });
            if days.peek().is_none() {
                break;
            }
        }

        if let Some(profile) = profile {
            match batches.last_mut() {
                Some(last) if last.write_count() < MAX_WRITES_PER_COMMIT => {
                    last.profile = Some(profile);
                }
                _ => batches.push(WriteSet::profile_only(profile)),
            }
        }
        batches.retain(|b| !b.is_empty());
        batches
    }
}

/// Storage backend.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Db {
    pub async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>, AppError> {
        match self {
            Db::Firestore(db) => db.get_activity(activity_id).await,
            Db::Memory(db) => Ok(db.get_activity(activity_id)),
        }
    }

    /// Most recent activities for a user (by `date`, descending).
    pub async fn list_activities(
        &self,
        user_id: &str,
        activity_type: Option<ActivityType>,
        limit: u32,
    ) -> Result<Vec<Activity>, AppError> {
        match self {
            Db::Firestore(db) => db.list_activities(user_id, activity_type, limit).await,
            Db::Memory(db) => Ok(db.list_activities(user_id, activity_type, Some(limit))),
        }
    }

    /// Every activity a user owns, unordered.
    pub async fn list_all_activities(&self, user_id: &str) -> Result<Vec<Activity>, AppError> {
        match self {
            Db::Firestore(db) => db.list_all_activities(user_id).await,
            Db::Memory(db) => Ok(db.list_activities(user_id, None, None)),
        }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        match self {
            Db::Firestore(db) => db.get_profile(user_id).await,
            Db::Memory(db) => Ok(db.get_profile(user_id)),
        }
    }

    pub async fn get_daily(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyAggregate>, AppError> {
        match self {
            Db::Firestore(db) => db.get_daily(user_id, date).await,
            Db::Memory(db) => Ok(db.get_daily(user_id, date)),
        }
    }

    /// Stored daily rows with `from <= date <= to`, oldest first.
    pub async fn list_daily(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAggregate>, AppError> {
        match self {
            Db::Firestore(db) => db.list_daily(user_id, from, to).await,
            Db::Memory(db) => Ok(db.list_daily(user_id, Some(from), to)),
        }
    }

    /// Every stored daily row for a user, oldest first.
    pub async fn list_all_daily(&self, user_id: &str) -> Result<Vec<DailyAggregate>, AppError> {
        match self {
            Db::Firestore(db) => db.list_all_daily(user_id).await,
            Db::Memory(db) => Ok(db.list_daily(user_id, None, NaiveDate::MAX)),
        }
    }

    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<WellnessGoal>, AppError> {
        match self {
            Db::Firestore(db) => db.list_goals(user_id).await,
            Db::Memory(db) => Ok(db.list_goals(user_id)),
        }
    }

    pub async fn upsert_goal(&self, goal: &WellnessGoal) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.upsert_goal(goal).await,
            Db::Memory(db) => {
                db.upsert_goal(goal);
                Ok(())
            }
        }
    }

    /// Write every document in `writes` atomically.
    pub async fn commit(&self, writes: &WriteSet) -> Result<(), AppError> {
        if writes.is_empty() {
            return Ok(());
        }
        match self {
            Db::Firestore(db) => db.commit(writes).await,
            Db::Memory(db) => {
                db.commit(writes).await;
                Ok(())
            }
        }
    }

    /// Write `writes` as one or more transactions of bounded size.
    ///
    /// Each batch is atomic but the set as a whole is not. Only for writes
    /// that are safe to repeat after a partial failure.
    pub async fn commit_in_batches(&self, writes: WriteSet) -> Result<usize, AppError> {
        let batches = writes.into_batches();
        for batch in &batches {
            self.commit(batch).await?;
        }
        Ok(batches.len())
    }
}
