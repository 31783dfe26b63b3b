// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Point scoring for logged activities.

use crate::models::ActivityType;

/// Workouts stop earning after an hour.
const WORKOUT_MINUTES_CAP: u32 = 60;
const WORKOUT_POINTS_PER_MINUTE: i64 = 2;
const MINDFULNESS_POINTS_PER_MINUTE: i64 = 3;
const MEAL_POINTS: i64 = 10;
const SLEEP_POINTS: i64 = 20;
const HYDRATION_POINTS: i64 = 5;
const OTHER_POINTS: i64 = 5;

/// Points earned by an activity. A missing duration counts as zero minutes.
pub fn score(activity_type: ActivityType, duration: Option<u32>) -> i64 {
    let minutes = duration.unwrap_or(0);
    match activity_type {
        ActivityType::Workout => {
            i64::from(minutes.min(WORKOUT_MINUTES_CAP)) * WORKOUT_POINTS_PER_MINUTE
        }
        ActivityType::Meal => MEAL_POINTS,
        ActivityType::Mindfulness => i64::from(minutes) * MINDFULNESS_POINTS_PER_MINUTE,
        ActivityType::Sleep => SLEEP_POINTS,
        ActivityType::Hydration => HYDRATION_POINTS,
        ActivityType::WeightLog => OTHER_POINTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_table() {
        let cases = [
            (ActivityType::Workout, Some(30), 60),
            (ActivityType::Workout, Some(60), 120),
            (ActivityType::Workout, Some(90), 120),
            (ActivityType::Workout, None, 0),
            (ActivityType::Meal, None, 10),
            (ActivityType::Meal, Some(45), 10),
            (ActivityType::Mindfulness, Some(15), 45),
            (ActivityType::Mindfulness, Some(0), 0),
            (ActivityType::Sleep, Some(480), 20),
            (ActivityType::Hydration, None, 5),
            (ActivityType::WeightLog, None, 5),
        ];

        for (activity_type, duration, expected) in cases {
            assert_eq!(
                score(activity_type, duration),
                expected,
                "{} with {:?} minutes",
                activity_type,
                duration
            );
        }
    }

    #[test]
    fn test_long_mindfulness_is_uncapped() {
        assert_eq!(score(ActivityType::Mindfulness, Some(200)), 600);
    }
}
