// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User profile model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const POINTS_PER_LEVEL: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

/// User profile and gamification totals.
///
/// Stored at: `user_profiles/{user_id}`. Created lazily on first read or write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,

    // ─── Gamification ────────────────────────────────────────────
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default = "default_level")]
    pub level: i64,

    // ─── Wellness Profile ────────────────────────────────────────
    #[serde(default)]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub target_weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub activity_level: ActivityLevel,

    // ─── Preferences ─────────────────────────────────────────────
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub preferred_workout_time: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,

    /// Version embedded in the current refresh token
    #[serde(default)]
    pub token_version: u32,

    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_level() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

/// `floor(points / 100) + 1`, never below 1.
pub fn level_for_points(total_points: i64) -> i64 {
    (total_points.div_euclid(POINTS_PER_LEVEL) + 1).max(1)
}

impl UserProfile {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            total_points: 0,
            current_streak: 0,
            longest_streak: 0,
            level: 1,
            current_weight: None,
            target_weight: None,
            height: None,
            date_of_birth: None,
            activity_level: ActivityLevel::default(),
            notifications_enabled: true,
            preferred_workout_time: None,
            timezone: None,
            token_version: 0,
            joined_at: now,
            updated_at: now,
        }
    }

    /// Add (or with a negative delta, remove) points and re-derive the level.
    pub fn add_points(&mut self, delta: i64, now: DateTime<Utc>) {
        self.total_points += delta;
        self.level = level_for_points(self.total_points);
        self.updated_at = now;
    }

    /// Raise the stored streak if `streak` beats it. Returns true if anything changed.
    pub fn record_streak(&mut self, streak: u32, now: DateTime<Utc>) -> bool {
        if streak <= self.current_streak {
            return false;
        }
        self.current_streak = streak;
        self.longest_streak = self.longest_streak.max(streak);
        self.updated_at = now;
        true
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Copy the client-editable fields from `update`.
    pub fn apply_update(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name.trim().to_string();
        }
        if let Some(email) = update.email {
            self.email = Some(email.trim().to_lowercase());
        }
        if update.current_weight.is_some() {
            self.current_weight = update.current_weight;
        }
        if update.target_weight.is_some() {
            self.target_weight = update.target_weight;
        }
        if update.height.is_some() {
            self.height = update.height;
        }
        if update.date_of_birth.is_some() {
            self.date_of_birth = update.date_of_birth;
        }
        if let Some(level) = update.activity_level {
            self.activity_level = level;
        }
        if let Some(enabled) = update.notifications_enabled {
            self.notifications_enabled = enabled;
        }
        if update.preferred_workout_time.is_some() {
            self.preferred_workout_time = update.preferred_workout_time;
        }
        if update.timezone.is_some() {
            self.timezone = update.timezone;
        }
        self.updated_at = now;
    }
}

/// Body of `PUT /api/user`. Points, streaks and level are not client-writable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub current_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub target_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 300.0))]
    pub height: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub activity_level: Option<ActivityLevel>,
    pub notifications_enabled: Option<bool>,
    #[validate(length(max = 50))]
    pub preferred_workout_time: Option<String>,
    #[validate(length(max = 64))]
    pub timezone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_level_for_points() {
        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(99), 1);
        assert_eq!(level_for_points(100), 2);
        assert_eq!(level_for_points(250), 3);
        assert_eq!(level_for_points(-40), 1);
    }

    #[test]
    fn test_add_points_updates_level() {
        let mut profile = UserProfile::new("u1", now());
        profile.add_points(120, now());
        assert_eq!(profile.total_points, 120);
        assert_eq!(profile.level, 2);

        profile.add_points(-120, now());
        assert_eq!(profile.total_points, 0);
        assert_eq!(profile.level, 1);
    }

    #[test]
    fn test_record_streak_only_raises() {
        let mut profile = UserProfile::new("u1", now());
        assert!(profile.record_streak(3, now()));
        assert_eq!((profile.current_streak, profile.longest_streak), (3, 3));

        assert!(!profile.record_streak(2, now()));
        assert_eq!(profile.current_streak, 3);

        profile.current_streak = 1;
        assert!(profile.record_streak(2, now()));
        assert_eq!((profile.current_streak, profile.longest_streak), (2, 3));
    }

    #[test]
    fn test_update_ignores_gamification_fields() {
        let mut profile = UserProfile::new("u1", now());
        profile.add_points(50, now());

        let update: ProfileUpdate = serde_json::from_str(
            r#"{"firstName":" Ada ","lastName":"Lovelace","totalPoints":100000,"level":99}"#,
        )
        .unwrap();
        profile.apply_update(update, now());

        assert_eq!(profile.full_name(), "Ada Lovelace");
        assert_eq!(profile.total_points, 50);
        assert_eq!(profile.level, 1);
    }

    #[test]
    fn test_profile_deserializes_with_missing_fields() {
        let raw = r#"{"userId":"u1","joinedAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.level, 1);
        assert!(profile.notifications_enabled);
        assert_eq!(profile.activity_level, ActivityLevel::Moderate);
    }
}
