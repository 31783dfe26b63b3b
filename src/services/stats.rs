// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard statistics read from the daily aggregates.

use crate::clock::Clock;
use crate::db::{Db, WriteSet};
use crate::error::{AppError, Result};
use crate::models::goal::{GoalCategory, GoalMetric, GoalStatus};
use crate::models::{DailyAggregate, GoalThresholds, UserProfile, WellnessGoal};
use crate::services::UserLocks;
use crate::time_utils::{local_day, trailing_days};
use chrono::{Days, FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Response for `GET /api/stats`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsReport {
    pub user: UserSummary,
    pub today: TodaySummary,
    pub trends: Vec<TrendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<GoalProgress>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSummary {
    pub total_points: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub level: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodaySummary {
    pub goals_completed: u32,
    pub total_goals: u32,
    pub workouts_completed: i64,
    pub meals_logged: i64,
    pub mindfulness_minutes: i64,
    pub water_glasses: i64,
    pub points_earned: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub points_earned: i64,
    pub goals_completed: u32,
    pub total_goals: u32,
}

/// How far today's aggregate is toward one active goal.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GoalProgress {
    pub id: String,
    pub title: String,
    pub category: GoalCategory,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub completed: bool,
}

impl From<&UserProfile> for UserSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            total_points: profile.total_points,
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            level: profile.level,
        }
    }
}

impl From<&DailyAggregate> for TodaySummary {
    fn from(day: &DailyAggregate) -> Self {
        Self {
            goals_completed: day.goals_completed,
            total_goals: day.total_goals,
            workouts_completed: day.workouts_completed,
            meals_logged: day.meals_logged,
            mindfulness_minutes: day.mindfulness_minutes,
            water_glasses: day.water_glasses,
            points_earned: day.points_earned,
        }
    }
}

/// Builds the stats dashboard and keeps the stored streak up to date.
#[derive(Clone)]
pub struct StatsReporter {
    db: Db,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
    offset: FixedOffset,
    streak_lookback_days: u32,
    trend_days: u32,
}

impl StatsReporter {
    pub fn new(
        db: Db,
        clock: Arc<dyn Clock>,
        locks: UserLocks,
        offset: FixedOffset,
        streak_lookback_days: u32,
        trend_days: u32,
    ) -> Self {
        Self {
            db,
            clock,
            locks,
            offset,
            streak_lookback_days,
            trend_days,
        }
    }

    /// Today's progress, streak, trend series and goal progress.
    ///
    /// Persists the streak when it beats the stored one; never lowers it.
    pub async fn report(&self, user_id: &str) -> Result<StatsReport> {
        let now = self.clock.now();
        let today = local_day(now, self.offset);

        let window = self.streak_lookback_days.max(self.trend_days).max(1);
        let from = today
            .checked_sub_days(Days::new(u64::from(window) - 1))
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "Stats window of {} days before {} is out of range",
                    window,
                    today
                ))
            })?;
        let (stored_rows, goals) = futures_util::try_join!(
            self.db.list_daily(user_id, from, today),
            self.db.list_goals(user_id),
        )?;
        let mut rows: HashMap<NaiveDate, DailyAggregate> = stored_rows
            .into_iter()
            .map(|row| (row.date, row))
            .collect();
        let thresholds = GoalThresholds::from_goals(&goals);

        // Today is always scored against the current goals
        let today_stored = rows.contains_key(&today);
        let today_row = rows
            .entry(today)
            .or_insert_with(|| DailyAggregate::new(user_id, today));
        today_row.refresh_goals(&thresholds);
        let today_summary = TodaySummary::from(&*today_row);
        let goal_progress = goal_progress(&goals, today_row);
        if !today_stored {
            // The streak scan must still see today as missing
            rows.remove(&today);
        }

        let streak = streak_ending(today, &rows, self.streak_lookback_days);
        let profile = self.record_streak(user_id, streak).await?;

        let trends = trailing_days(today, self.trend_days)
            .into_iter()
            .map(|date| match rows.get(&date) {
                _ if date == today => TrendPoint {
                    date,
                    points_earned: today_summary.points_earned,
                    goals_completed: today_summary.goals_completed,
                    total_goals: today_summary.total_goals,
                },
                Some(row) => TrendPoint {
                    date,
                    points_earned: row.points_earned,
                    goals_completed: row.goals_completed,
                    total_goals: row.total_goals,
                },
                // Nothing logged that day
                None => TrendPoint {
                    date,
                    points_earned: 0,
                    goals_completed: 0,
                    total_goals: thresholds.count(),
                },
            })
            .collect();

        tracing::debug!(user_id, %today, streak, "Computed stats");

        Ok(StatsReport {
            user: UserSummary::from(&profile),
            today: today_summary,
            trends,
            goals: goal_progress,
        })
    }

    /// Store `streak` if it is higher than the saved one. Creates the profile
    /// if this is the user's first request.
    async fn record_streak(&self, user_id: &str, streak: u32) -> Result<UserProfile> {
        let _guard = self.locks.acquire(user_id).await;
        let now = self.clock.now();

        let stored = self.db.get_profile(user_id).await?;
        let existed = stored.is_some();
        let mut profile = stored.unwrap_or_else(|| UserProfile::new(user_id, now));
        let raised = profile.record_streak(streak, now);

        if raised || !existed {
            self.db
                .commit(&WriteSet::profile_only(profile.clone()))
                .await?;
            if raised {
                tracing::info!(user_id, streak, "Streak updated");
            }
        }

        Ok(profile)
    }
}

/// Consecutive days ending at `today` whose row exists and met at least one goal.
pub fn streak_ending(
    today: NaiveDate,
    rows: &HashMap<NaiveDate, DailyAggregate>,
    lookback_days: u32,
) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while streak < lookback_days {
        match rows.get(&day) {
            Some(row) if row.goals_completed > 0 => streak += 1,
            _ => break,
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// `None` when the user has no active goals.
fn goal_progress(goals: &[WellnessGoal], today: &DailyAggregate) -> Option<Vec<GoalProgress>> {
    let progress: Vec<GoalProgress> = goals
        .iter()
        .filter(|g| g.status == GoalStatus::Active)
        .map(|g| {
            let metric = GoalMetric::for_category(g.category);
            let current_value = metric.map_or(g.current_value, |m| m.value(today));
            GoalProgress {
                id: g.id.clone(),
                title: g.title.clone(),
                category: g.category,
                target_value: g.target_value,
                current_value,
                unit: g.unit.clone(),
                completed: metric.is_some() && current_value >= g.target_value,
            }
        })
        .collect();

    if progress.is_empty() {
        None
    } else {
        Some(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::MemoryDb;
    use chrono::{TimeZone, Utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    fn reporter(streak_lookback_days: u32, trend_days: u32) -> StatsReporter {
        StatsReporter::new(
            Db::Memory(MemoryDb::new()),
            Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 9, 7, 12, 0, 0).unwrap(),
            )),
            UserLocks::new(),
            FixedOffset::east_opt(0).unwrap(),
            streak_lookback_days,
            trend_days,
        )
    }

    #[tokio::test]
    async fn test_window_past_calendar_range_is_an_error() {
        let err = reporter(u32::MAX, 7).report("u1").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_empty_trend_days_report_goal_count() {
        let report = reporter(365, 3).report("u1").await.unwrap();
        assert_eq!(report.trends.len(), 3);
        assert!(report
            .trends
            .iter()
            .all(|p| p.total_goals == 3 && p.goals_completed == 0 && p.points_earned == 0));
        assert_eq!(report.trends[2].date, date(7));
        assert_eq!(report.trends[2].total_goals, report.today.total_goals);
    }

    fn rows(days: &[(u32, u32)]) -> HashMap<NaiveDate, DailyAggregate> {
        days.iter()
            .map(|&(day, goals)| {
                let mut row = DailyAggregate::new("u1", date(day));
                row.goals_completed = goals;
                (row.date, row)
            })
            .collect()
    }

    #[test]
    fn test_streak_stops_at_gap() {
        let stored = rows(&[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (7, 1)]);
        assert_eq!(streak_ending(date(7), &stored, 365), 1);
        assert_eq!(streak_ending(date(5), &stored, 365), 5);
    }

    #[test]
    fn test_streak_stops_at_zero_goal_day() {
        let stored = rows(&[(5, 2), (6, 0), (7, 3)]);
        assert_eq!(streak_ending(date(7), &stored, 365), 1);
    }

    #[test]
    fn test_streak_zero_without_today() {
        let stored = rows(&[(5, 1), (6, 1)]);
        assert_eq!(streak_ending(date(7), &stored, 365), 0);
    }

    #[test]
    fn test_streak_capped_by_lookback() {
        let stored = rows(&[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1)]);
        assert_eq!(streak_ending(date(5), &stored, 3), 3);
    }
}
