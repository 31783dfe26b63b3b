// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily aggregate bookkeeping.
//!
//! Every activity contributes a fixed set of counter increments to the row
//! for its local calendar day. Creating an activity adds its contribution,
//! deleting subtracts it, and editing subtracts the old one from the old day
//! and adds the new one to the new day.

use crate::models::{Activity, ActivityType, AggregateDelta, DailyAggregate, GoalThresholds};
use crate::time_utils::local_day;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Signed change to one day's row.
#[derive(Debug, Clone, PartialEq)]
pub struct DayDelta {
    pub date: NaiveDate,
    pub delta: AggregateDelta,
}

/// What `activity` adds to its day when it is created.
pub fn contribution(activity: &Activity) -> AggregateDelta {
    let mut delta = AggregateDelta {
        points_earned: activity.points_earned,
        ..Default::default()
    };
    let minutes = i64::from(activity.duration.unwrap_or(0));

    match activity.activity_type {
        ActivityType::Workout => delta.workouts_completed = 1,
        ActivityType::Meal => {
            delta.meals_logged = 1;
            delta.total_calories = activity.calories.unwrap_or(0.0);
            if let Some(nutrition) = &activity.nutrition {
                delta.total_protein = nutrition.protein.unwrap_or(0.0);
                delta.total_carbs = nutrition.carbs.unwrap_or(0.0);
                delta.total_fat = nutrition.fat.unwrap_or(0.0);
            }
        }
        ActivityType::Mindfulness => delta.mindfulness_minutes = minutes,
        ActivityType::Sleep => delta.sleep_hours = minutes,
        ActivityType::Hydration => delta.water_glasses = 1,
        ActivityType::WeightLog => {}
    }

    delta
}

pub fn plan_create(activity: &Activity, offset: FixedOffset) -> Vec<DayDelta> {
    vec![DayDelta {
        date: local_day(activity.date, offset),
        delta: contribution(activity),
    }]
}

pub fn plan_delete(activity: &Activity, offset: FixedOffset) -> Vec<DayDelta> {
    vec![DayDelta {
        date: local_day(activity.date, offset),
        delta: contribution(activity).negate(),
    }]
}

/// Deltas that turn `old`'s contribution into `new`'s. Days whose net change
/// is zero are left out.
pub fn plan_update(old: &Activity, new: &Activity, offset: FixedOffset) -> Vec<DayDelta> {
    let old_day = local_day(old.date, offset);
    let new_day = local_day(new.date, offset);
    let removed = contribution(old).negate();
    let added = contribution(new);

    let deltas = if old_day == new_day {
        vec![DayDelta {
            date: new_day,
            delta: removed.merge(&added),
        }]
    } else {
        vec![
            DayDelta {
                date: old_day,
                delta: removed,
            },
            DayDelta {
                date: new_day,
                delta: added,
            },
        ]
    };

    deltas.into_iter().filter(|d| !d.delta.is_zero()).collect()
}

/// Apply `deltas` to the stored rows (or fresh rows where none exist).
pub fn apply_deltas(
    user_id: &str,
    existing: Vec<DailyAggregate>,
    deltas: &[DayDelta],
    thresholds: &GoalThresholds,
    now: DateTime<Utc>,
) -> Vec<DailyAggregate> {
    let mut rows: BTreeMap<NaiveDate, DailyAggregate> =
        existing.into_iter().map(|row| (row.date, row)).collect();

    for day in deltas {
        rows.entry(day.date)
            .or_insert_with(|| DailyAggregate::new(user_id, day.date))
            .apply(&day.delta, thresholds, now);
    }

    deltas
        .iter()
        .filter_map(|d| rows.remove(&d.date))
        .collect()
}

/// Result of recomputing a user's aggregates from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebuild {
    /// Every row to write, including stale rows reset to zero.
    pub days: Vec<DailyAggregate>,
    pub total_points: i64,
}

/// Fold all of a user's activities into fresh daily rows. Any day in
/// `stale_days` that no longer has activities gets an all-zero row.
pub fn rebuild(
    user_id: &str,
    activities: &[Activity],
    stale_days: impl IntoIterator<Item = NaiveDate>,
    thresholds: &GoalThresholds,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Rebuild {
    let mut rows: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();
    let mut total_points = 0;

    for activity in activities {
        let date = local_day(activity.date, offset);
        total_points += activity.points_earned;
        rows.entry(date)
            .or_insert_with(|| DailyAggregate::new(user_id, date))
            .apply(&contribution(activity), thresholds, now);
    }

    for date in stale_days {
        rows.entry(date).or_insert_with(|| {
            let mut row = DailyAggregate::new(user_id, date);
            row.refresh_goals(thresholds);
            row.updated_at = Some(now);
            row
        });
    }

    Rebuild {
        days: rows.into_values().collect(),
        total_points,
    }
}
