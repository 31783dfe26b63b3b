// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Logged activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Kind of logged activity. Drives scoring and the daily counters it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityType {
    Workout,
    Meal,
    Mindfulness,
    Sleep,
    Hydration,
    WeightLog,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        ActivityType::Workout,
        ActivityType::Meal,
        ActivityType::Mindfulness,
        ActivityType::Sleep,
        ActivityType::Hydration,
        ActivityType::WeightLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Workout => "workout",
            ActivityType::Meal => "meal",
            ActivityType::Mindfulness => "mindfulness",
            ActivityType::Sleep => "sleep",
            ActivityType::Hydration => "hydration",
            ActivityType::WeightLog => "weight-log",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown activity type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum WorkoutType {
    Cardio,
    Strength,
    Yoga,
    Sports,
    Walking,
    Running,
    Cycling,
    Swimming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Intensity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MeditationType {
    Breathing,
    Guided,
    BodyScan,
    LovingKindness,
    Movement,
}

/// Macronutrients for a meal, in grams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Nutrition {
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}

/// Stored activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    /// Opaque ID (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// When the activity happened (not when it was logged)
    pub date: DateTime<Utc>,
    /// Whole minutes
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub workout_type: Option<WorkoutType>,
    #[serde(default)]
    pub intensity: Option<Intensity>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub meditation_type: Option<MeditationType>,
    #[serde(default)]
    pub sleep_quality: Option<u8>,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Cached score; see `services::scoring::score`
    pub points_earned: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/activities`.
///
/// `pointsEarned` and `userId` are not accepted from clients; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<u32>,
    #[validate(range(min = 0.0))]
    pub calories: Option<f64>,
    pub nutrition: Option<Nutrition>,
    pub workout_type: Option<WorkoutType>,
    pub intensity: Option<Intensity>,
    pub meal_type: Option<MealType>,
    pub meditation_type: Option<MeditationType>,
    #[validate(range(min = 1, max = 5))]
    pub sleep_quality: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub mood: Option<u8>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PUT /api/activities`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPatch {
    /// Legacy clients send the ID in the body instead of the query string.
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<ActivityType>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<u32>,
    #[validate(range(min = 0.0))]
    pub calories: Option<f64>,
    pub nutrition: Option<Nutrition>,
    pub workout_type: Option<WorkoutType>,
    pub intensity: Option<Intensity>,
    pub meal_type: Option<MealType>,
    pub meditation_type: Option<MeditationType>,
    #[validate(range(min = 1, max = 5))]
    pub sleep_quality: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub mood: Option<u8>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Activity {
    /// Build a record from a validated submission. Points are filled in by the caller.
    pub fn from_submission(
        id: String,
        user_id: &str,
        input: NewActivity,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            activity_type: input.activity_type,
            title: input.title,
            description: input.description,
            date: input.date.unwrap_or(now),
            duration: input.duration,
            calories: input.calories,
            nutrition: input.nutrition,
            workout_type: input.workout_type,
            intensity: input.intensity,
            meal_type: input.meal_type,
            meditation_type: input.meditation_type,
            sleep_quality: input.sleep_quality,
            mood: input.mood,
            notes: input.notes,
            tags: input.tags,
            points_earned: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place. Does not touch `points_earned`.
    pub fn apply_patch(&mut self, patch: ActivityPatch, now: DateTime<Utc>) {
        if let Some(t) = patch.activity_type {
            self.activity_type = t;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if patch.duration.is_some() {
            self.duration = patch.duration;
        }
        if patch.calories.is_some() {
            self.calories = patch.calories;
        }
        if patch.nutrition.is_some() {
            self.nutrition = patch.nutrition;
        }
        if patch.workout_type.is_some() {
            self.workout_type = patch.workout_type;
        }
        if patch.intensity.is_some() {
            self.intensity = patch.intensity;
        }
        if patch.meal_type.is_some() {
            self.meal_type = patch.meal_type;
        }
        if patch.meditation_type.is_some() {
            self.meditation_type = patch.meditation_type;
        }
        if patch.sleep_quality.is_some() {
            self.sleep_quality = patch.sleep_quality;
        }
        if patch.mood.is_some() {
            self.mood = patch.mood;
        }
        if patch.notes.is_some() {
            self.notes = patch.notes;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        self.updated_at = now;
    }
}

/// Accept any JSON for a duration: numbers become whole non-negative minutes,
/// anything else (strings, bools, objects) is treated as absent.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).map(normalize_minutes))
}

/// Negative → 0, fractional → truncated, huge → saturated.
pub fn normalize_minutes(raw: f64) -> u32 {
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        raw.trunc().min(u32::MAX as f64) as u32
    }
}

/// Activity count and points for one activity type.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityTypeStats {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub count: u32,
    pub last_activity: Option<DateTime<Utc>>,
    pub total_points: i64,
}
