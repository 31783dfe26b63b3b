// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wellness goals and the daily thresholds derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::DailyAggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GoalCategory {
    Fitness,
    Nutrition,
    Mindfulness,
    Sleep,
    Hydration,
    Weight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Paused,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// User-defined target. Managed outside this service; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WellnessGoal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: GoalCategory,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    /// e.g. "minutes", "glasses", "hours"
    pub unit: String,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default)]
    pub is_daily: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Daily aggregate field a goal is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalMetric {
    Workouts,
    Meals,
    MindfulnessMinutes,
    WaterGlasses,
    SleepHours,
}

impl GoalMetric {
    /// `weight` goals have no daily counter.
    pub fn for_category(category: GoalCategory) -> Option<Self> {
        match category {
            GoalCategory::Fitness => Some(GoalMetric::Workouts),
            GoalCategory::Nutrition => Some(GoalMetric::Meals),
            GoalCategory::Mindfulness => Some(GoalMetric::MindfulnessMinutes),
            GoalCategory::Hydration => Some(GoalMetric::WaterGlasses),
            GoalCategory::Sleep => Some(GoalMetric::SleepHours),
            GoalCategory::Weight => None,
        }
    }

    pub fn value(&self, day: &DailyAggregate) -> f64 {
        match self {
            GoalMetric::Workouts => day.workouts_completed as f64,
            GoalMetric::Meals => day.meals_logged as f64,
            GoalMetric::MindfulnessMinutes => day.mindfulness_minutes as f64,
            GoalMetric::WaterGlasses => day.water_glasses as f64,
            GoalMetric::SleepHours => day.sleep_hours as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub metric: GoalMetric,
    pub target: f64,
}

impl Threshold {
    pub fn is_met(&self, day: &DailyAggregate) -> bool {
        self.metric.value(day) >= self.target
    }
}

/// The set of daily targets a day is scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalThresholds {
    thresholds: Vec<Threshold>,
}

impl GoalThresholds {
    /// One workout, three meals, ten mindful minutes.
    pub fn defaults() -> Self {
        let threshold = |metric, target| Threshold { metric, target };
        Self {
            thresholds: vec![
                threshold(GoalMetric::Workouts, 1.0),
                threshold(GoalMetric::Meals, 3.0),
                threshold(GoalMetric::MindfulnessMinutes, 10.0),
            ],
        }
    }

    /// Thresholds from the user's active goals, or the defaults if none map to a daily counter.
    pub fn from_goals(goals: &[WellnessGoal]) -> Self {
        let thresholds: Vec<Threshold> = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Active)
            .filter_map(|g| {
                GoalMetric::for_category(g.category).map(|metric| Threshold {
                    metric,
                    target: g.target_value,
                })
            })
            .collect();

        if thresholds.is_empty() {
            Self::defaults()
        } else {
            Self { thresholds }
        }
    }

    /// Number of thresholds `day` meets.
    pub fn completed(&self, day: &DailyAggregate) -> u32 {
        self.thresholds.iter().filter(|t| t.is_met(day)).count() as u32
    }

    /// Number of goals a day is scored against.
    pub fn count(&self) -> u32 {
        self.thresholds.len() as u32
    }
}
