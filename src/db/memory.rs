// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.
//!
//! Same document layout as Firestore (one map per collection, keyed by the
//! Firestore document ID). `commit` holds a lock while it applies a write
//! set, which only orders commits against each other. Readers do not take
//! the lock and can see a write set part way through being applied.

use crate::db::{ActivityMutation, WriteSet};
use crate::models::{Activity, ActivityType, DailyAggregate, UserProfile, WellnessGoal};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MemoryDb {
    activities: Arc<DashMap<String, Activity>>,
    profiles: Arc<DashMap<String, UserProfile>>,
    daily: Arc<DashMap<String, DailyAggregate>>,
    goals: Arc<DashMap<String, WellnessGoal>>,
    commit_lock: Arc<Mutex<()>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_activity(&self, activity_id: &str) -> Option<Activity> {
        self.activities.get(activity_id).map(|a| a.clone())
    }

    /// Newest first; `limit` of `None` returns everything.
    pub fn list_activities(
        &self,
        user_id: &str,
        activity_type: Option<ActivityType>,
        limit: Option<u32>,
    ) -> Vec<Activity> {
        let mut found: Vec<Activity> = self
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter(|a| activity_type.is_none_or(|t| a.activity_type == t))
            .map(|a| a.clone())
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            found.truncate(limit as usize);
        }
        found
    }

    pub fn get_profile(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.get(user_id).map(|p| p.clone())
    }

    pub fn get_daily(&self, user_id: &str, date: NaiveDate) -> Option<DailyAggregate> {
        self.daily
            .get(&DailyAggregate::doc_id(user_id, date))
            .map(|d| d.clone())
    }

    /// Oldest first; `from` of `None` is unbounded.
    pub fn list_daily(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> Vec<DailyAggregate> {
        let mut rows: Vec<DailyAggregate> = self
            .daily
            .iter()
            .filter(|d| d.user_id == user_id)
            .filter(|d| from.is_none_or(|from| d.date >= from) && d.date <= to)
            .map(|d| d.clone())
            .collect();
        rows.sort_by_key(|d| d.date);
        rows
    }

    pub fn list_goals(&self, user_id: &str) -> Vec<WellnessGoal> {
        self.goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .map(|g| g.clone())
            .collect()
    }

    pub fn upsert_goal(&self, goal: &WellnessGoal) {
        self.goals.insert(goal.id.clone(), goal.clone());
    }

    pub async fn commit(&self, writes: &WriteSet) {
        let _guard = self.commit_lock.lock().await;

        match &writes.activity {
            Some(ActivityMutation::Put(activity)) => {
                self.activities.insert(activity.id.clone(), activity.clone());
            }
            Some(ActivityMutation::Delete(activity_id)) => {
                self.activities.remove(activity_id);
            }
            None => {}
        }

        if let Some(profile) = &writes.profile {
            self.profiles
                .insert(profile.user_id.clone(), profile.clone());
        }

        for day in &writes.days {
            self.daily
                .insert(DailyAggregate::doc_id(&day.user_id, day.date), day.clone());
        }
    }
}
