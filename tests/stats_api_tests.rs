// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard stats, streaks and aggregate rebuilds.

use axum::http::{Method, StatusCode};
use chrono::{Duration, NaiveDate};
use serde_json::json;
use wellness_tracker::config::Config;
use wellness_tracker::db::WriteSet;
use wellness_tracker::models::goal::{GoalCategory, GoalPriority, GoalStatus};
use wellness_tracker::models::{DailyAggregate, UserProfile, WellnessGoal};

mod common;
use common::{
    create_activity, create_test_app, create_test_app_with_config, get_stats, send, test_now,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

/// A stored row that met one goal.
fn good_day(user_id: &str, date: NaiveDate) -> DailyAggregate {
    let mut row = DailyAggregate::new(user_id, date);
    row.workouts_completed = 1;
    row.points_earned = 60;
    row.goals_completed = 1;
    row.total_goals = 3;
    row
}

fn goal(id: &str, user_id: &str, category: GoalCategory, target: f64) -> WellnessGoal {
    WellnessGoal {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: format!("{category:?} goal"),
        description: None,
        category,
        target_value: target,
        current_value: 0.0,
        unit: "count".to_string(),
        target_date: None,
        status: GoalStatus::Active,
        priority: GoalPriority::Medium,
        is_daily: true,
        created_at: test_now(),
        updated_at: test_now(),
    }
}

async fn seed_days(app: &common::TestApp, rows: Vec<DailyAggregate>) {
    app.state
        .db
        .commit(&WriteSet {
            activity: None,
            profile: None,
            days: rows,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_new_user_stats() {
    let app = create_test_app();
    let stats = get_stats(&app, "fresh").await;

    assert_eq!(stats["user"]["totalPoints"], 0);
    assert_eq!(stats["user"]["currentStreak"], 0);
    assert_eq!(stats["user"]["level"], 1);
    assert_eq!(stats["today"]["goalsCompleted"], 0);
    assert_eq!(stats["today"]["totalGoals"], 3);
    assert!(stats.get("goals").is_none());

    // First stats request creates the profile but no daily row
    assert!(app.state.db.get_profile("fresh").await.unwrap().is_some());
    assert!(app.state.db.get_daily("fresh", day(15)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_default_goals_met() {
    let app = create_test_app();
    create_activity(&app, "u1", json!({"type": "workout", "title": "Run", "duration": 30})).await;
    for meal in ["Breakfast", "Lunch", "Dinner"] {
        create_activity(&app, "u1", json!({"type": "meal", "title": meal})).await;
    }
    create_activity(&app, "u1", json!({"type": "mindfulness", "title": "Sit", "duration": 10})).await;

    let stats = get_stats(&app, "u1").await;
    assert_eq!(stats["today"]["goalsCompleted"], 3);
    assert_eq!(stats["today"]["totalGoals"], 3);
    assert_eq!(stats["today"]["workoutsCompleted"], 1);
    assert_eq!(stats["today"]["mealsLogged"], 3);
    assert_eq!(stats["today"]["mindfulnessMinutes"], 10);
    assert_eq!(stats["today"]["pointsEarned"], 60 + 30 + 30);
    assert_eq!(stats["user"]["totalPoints"], 120);
    assert_eq!(stats["user"]["level"], 2);
}

#[tokio::test]
async fn test_streak_breaks_at_gap() {
    let app = create_test_app();
    seed_days(&app, (9..=13).map(|d| good_day("u1", day(d))).collect()).await;
    create_activity(&app, "u1", json!({"type": "workout", "title": "Run", "duration": 30})).await;

    let stats = get_stats(&app, "u1").await;
    assert_eq!(stats["user"]["currentStreak"], 1);
    assert_eq!(stats["user"]["longestStreak"], 1);

    let profile = app.state.db.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.current_streak, 1);

    let again = get_stats(&app, "u1").await;
    assert_eq!(again, stats);
}

#[tokio::test]
async fn test_streak_counts_consecutive_days() {
    let app = create_test_app();
    seed_days(&app, (10..=14).map(|d| good_day("u1", day(d))).collect()).await;

    // Today has nothing yet
    let stats = get_stats(&app, "u1").await;
    assert_eq!(stats["user"]["currentStreak"], 0);

    create_activity(&app, "u1", json!({"type": "workout", "title": "Run", "duration": 30})).await;
    let stats = get_stats(&app, "u1").await;
    assert_eq!(stats["user"]["currentStreak"], 6);
    assert_eq!(stats["user"]["longestStreak"], 6);
}

#[tokio::test]
async fn test_stored_streak_never_lowered() {
    let app = create_test_app();
    let mut profile = UserProfile::new("u1", test_now());
    profile.current_streak = 9;
    profile.longest_streak = 12;
    app.state
        .db
        .commit(&WriteSet::profile_only(profile))
        .await
        .unwrap();

    create_activity(&app, "u1", json!({"type": "workout", "title": "Run", "duration": 30})).await;
    let stats = get_stats(&app, "u1").await;
    assert_eq!(stats["user"]["currentStreak"], 9);
    assert_eq!(stats["user"]["longestStreak"], 12);
}

#[tokio::test]
async fn test_trends_cover_last_seven_days() {
    let app = create_test_app();
    seed_days(&app, vec![good_day("u1", day(10)), good_day("u1", day(3))]).await;
    create_activity(&app, "u1", json!({"type": "hydration", "title": "Water"})).await;

    let stats = get_stats(&app, "u1").await;
    let trends = stats["trends"].as_array().unwrap();
    assert_eq!(trends.len(), 7);
    assert_eq!(trends[0]["date"], "2024-06-09");
    assert_eq!(trends[6]["date"], "2024-06-15");
    assert_eq!(trends[1]["pointsEarned"], 60);
    assert_eq!(trends[6]["pointsEarned"], 5);
    assert_eq!(trends[2]["pointsEarned"], 0);
    assert_eq!(trends[2]["totalGoals"], 3);
}

#[tokio::test]
async fn test_today_trend_matches_today_without_stored_row() {
    let app = create_test_app();
    let stats = get_stats(&app, "u1").await;

    let trends = stats["trends"].as_array().unwrap();
    assert_eq!(trends[6]["date"], "2024-06-15");
    assert_eq!(trends[6]["totalGoals"], stats["today"]["totalGoals"]);
    assert_eq!(trends[6]["totalGoals"], 3);
    assert_eq!(trends[6]["goalsCompleted"], 0);
}

#[tokio::test]
async fn test_out_of_range_window_fails_without_panicking() {
    let mut config = Config::test_default();
    config.streak_lookback_days = u32::MAX;
    let app = create_test_app_with_config(config);

    let (status, body) = send(&app, Method::GET, "/api/stats", Some("u1"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn test_user_goals_replace_defaults() {
    let app = create_test_app();
    app.state
        .db
        .upsert_goal(&goal("g-water", "u1", GoalCategory::Hydration, 2.0))
        .await
        .unwrap();
    app.state
        .db
        .upsert_goal(&goal("g-weight", "u1", GoalCategory::Weight, 70.0))
        .await
        .unwrap();
    let mut paused = goal("g-paused", "u1", GoalCategory::Fitness, 1.0);
    paused.status = GoalStatus::Paused;
    app.state.db.upsert_goal(&paused).await.unwrap();

    create_activity(&app, "u1", json!({"type": "hydration", "title": "Glass"})).await;
    create_activity(&app, "u1", json!({"type": "hydration", "title": "Glass"})).await;

    let stats = get_stats(&app, "u1").await;
    assert_eq!(stats["today"]["totalGoals"], 1);
    assert_eq!(stats["today"]["goalsCompleted"], 1);
    assert_eq!(stats["user"]["currentStreak"], 1);

    let goals = stats["goals"].as_array().unwrap();
    assert_eq!(goals.len(), 2);
    let water = goals.iter().find(|g| g["id"] == "g-water").unwrap();
    assert_eq!(water["currentValue"], 2.0);
    assert_eq!(water["completed"], true);
    let weight = goals.iter().find(|g| g["id"] == "g-weight").unwrap();
    assert_eq!(weight["completed"], false);
}

#[tokio::test]
async fn test_streak_follows_local_day_rollover() {
    let app = create_test_app();
    create_activity(&app, "u1", json!({"type": "workout", "title": "Run", "duration": 30})).await;
    assert_eq!(get_stats(&app, "u1").await["user"]["currentStreak"], 1);

    app.clock.advance(Duration::days(1));
    create_activity(&app, "u1", json!({"type": "workout", "title": "Run", "duration": 30})).await;
    let stats = get_stats(&app, "u1").await;
    assert_eq!(stats["user"]["currentStreak"], 2);
    assert_eq!(stats["trends"][6]["date"], "2024-06-16");
}

#[tokio::test]
async fn test_rebuild_repairs_drift() {
    let app = create_test_app();
    create_activity(&app, "u1", json!({"type": "workout", "title": "Run", "duration": 30})).await;

    // Corrupt a day and the point total behind the service's back
    let mut bogus = good_day("u1", day(10));
    bogus.points_earned = 500;
    let mut profile = app.state.db.get_profile("u1").await.unwrap().unwrap();
    profile.total_points = 999;
    app.state
        .db
        .commit(&WriteSet {
            activity: None,
            profile: Some(profile),
            days: vec![bogus],
        })
        .await
        .unwrap();

    let (status, body) =
        send(&app, Method::POST, "/api/stats/rebuild", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    // Today's row already matched
    assert_eq!(body["daysRebuilt"], 1);
    assert_eq!(body["profile"]["totalPoints"], 60);

    let stale = app.state.db.get_daily("u1", day(10)).await.unwrap().unwrap();
    assert_eq!(stale.points_earned, 0);
    assert_eq!(stale.workouts_completed, 0);
    let today = app.state.db.get_daily("u1", day(15)).await.unwrap().unwrap();
    assert_eq!(today.points_earned, 60);
    assert_eq!(today.goals_completed, 1);
}
