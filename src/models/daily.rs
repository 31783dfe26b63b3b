// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-user, per-day activity rollups.
//!
//! One document per (user, local calendar day), incremented by every activity
//! write that touches the day. Reading today's progress or a streak is then
//! O(days) instead of O(activities).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::goal::GoalThresholds;

/// Fixed precision for stored nutrition sums, so adding and later removing
/// the same values lands back on exactly zero.
const SUM_SCALE: f64 = 1_000_000.0;

fn round_sum(value: f64) -> f64 {
    // Adding 0.0 turns -0.0 into 0.0
    (value * SUM_SCALE).round() / SUM_SCALE + 0.0
}

/// Rollup of one user's activities on one local calendar day.
///
/// Stored at: `daily_aggregates/{user_id}_{YYYY-MM-DD}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyAggregate {
    pub user_id: String,
    pub date: NaiveDate,

    // ─── Activity Counters ───────────────────────────────────────
    #[serde(default)]
    pub workouts_completed: i64,
    #[serde(default)]
    pub meals_logged: i64,
    #[serde(default)]
    pub mindfulness_minutes: i64,
    /// Sum of the `duration` field of sleep activities, as logged
    #[serde(default)]
    pub sleep_hours: i64,
    #[serde(default)]
    pub water_glasses: i64,

    // ─── Nutrition Totals ────────────────────────────────────────
    #[serde(default)]
    pub total_calories: f64,
    #[serde(default)]
    pub total_protein: f64,
    #[serde(default)]
    pub total_carbs: f64,
    #[serde(default)]
    pub total_fat: f64,

    // ─── Goals & Points ──────────────────────────────────────────
    #[serde(default)]
    pub goals_completed: u32,
    #[serde(default)]
    pub total_goals: u32,
    #[serde(default)]
    pub points_earned: i64,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyAggregate {
    /// Empty row for a day with no activity yet.
    pub fn new(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            workouts_completed: 0,
            meals_logged: 0,
            mindfulness_minutes: 0,
            sleep_hours: 0,
            water_glasses: 0,
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            goals_completed: 0,
            total_goals: 0,
            points_earned: 0,
            updated_at: None,
        }
    }

    /// Document ID for a (user, day) pair.
    pub fn doc_id(user_id: &str, date: NaiveDate) -> String {
        format!("{}_{}", user_id, date.format("%Y-%m-%d"))
    }

    /// Apply a signed delta and refresh the goal counts.
    pub fn apply(
        &mut self,
        delta: &AggregateDelta,
        thresholds: &GoalThresholds,
        now: DateTime<Utc>,
    ) {
        self.workouts_completed += delta.workouts_completed;
        self.meals_logged += delta.meals_logged;
        self.mindfulness_minutes += delta.mindfulness_minutes;
        self.sleep_hours += delta.sleep_hours;
        self.water_glasses += delta.water_glasses;
        self.total_calories = round_sum(self.total_calories + delta.total_calories);
        self.total_protein = round_sum(self.total_protein + delta.total_protein);
        self.total_carbs = round_sum(self.total_carbs + delta.total_carbs);
        self.total_fat = round_sum(self.total_fat + delta.total_fat);
        self.points_earned += delta.points_earned;
        self.refresh_goals(thresholds);
        self.updated_at = Some(now);
    }

    /// Same counters, sums and goal counts, ignoring when the row was written.
    pub fn same_totals(&self, other: &DailyAggregate) -> bool {
        DailyAggregate {
            updated_at: other.updated_at,
            ..self.clone()
        } == *other
    }

    /// Recount how many goal thresholds this day meets.
    pub fn refresh_goals(&mut self, thresholds: &GoalThresholds) {
        self.goals_completed = thresholds.completed(self);
        self.total_goals = thresholds.count();
    }
}

/// Signed change to a `DailyAggregate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateDelta {
    pub workouts_completed: i64,
    pub meals_logged: i64,
    pub mindfulness_minutes: i64,
    pub sleep_hours: i64,
    pub water_glasses: i64,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub points_earned: i64,
}

impl AggregateDelta {
    /// True when applying the delta would change nothing.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Component-wise sum.
    pub fn merge(mut self, other: &AggregateDelta) -> Self {
        self.workouts_completed += other.workouts_completed;
        self.meals_logged += other.meals_logged;
        self.mindfulness_minutes += other.mindfulness_minutes;
        self.sleep_hours += other.sleep_hours;
        self.water_glasses += other.water_glasses;
        self.total_calories += other.total_calories;
        self.total_protein += other.total_protein;
        self.total_carbs += other.total_carbs;
        self.total_fat += other.total_fat;
        self.points_earned += other.points_earned;
        self
    }

    /// Same delta with every component negated.
    pub fn negate(self) -> Self {
        Self {
            workouts_completed: -self.workouts_completed,
            meals_logged: -self.meals_logged,
            mindfulness_minutes: -self.mindfulness_minutes,
            sleep_hours: -self.sleep_hours,
            water_glasses: -self.water_glasses,
            total_calories: -self.total_calories,
            total_protein: -self.total_protein,
            total_carbs: -self.total_carbs,
            total_fat: -self.total_fat,
            points_earned: -self.points_earned,
        }
    }
}
