// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::Method;
use serde_json::json;
use std::sync::Arc;

mod common;

const NUM_CONCURRENT_ACTIVITIES: i64 = 20;
const WORKOUT_MINUTES: i64 = 15;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_do_not_lose_updates() {
    // Every create reads the profile and today's row, adds to them and writes
    // them back. Without per-user serialization some increments would be lost.
    let app = Arc::new(common::create_test_app());

    let mut handles = vec![];
    for i in 0..NUM_CONCURRENT_ACTIVITIES {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            common::create_activity(
                &app,
                "racer",
                json!({"type": "workout", "title": format!("Sprint {i}"), "duration": WORKOUT_MINUTES}),
            )
            .await
        }));
    }
    for handle in handles {
        handle.await.expect("create task panicked");
    }

    let expected_points = NUM_CONCURRENT_ACTIVITIES * WORKOUT_MINUTES * 2;
    let profile = app.state.db.get_profile("racer").await.unwrap().unwrap();
    assert_eq!(profile.total_points, expected_points);

    let today = app
        .state
        .db
        .get_daily("racer", common::test_now().date_naive())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(today.workouts_completed, NUM_CONCURRENT_ACTIVITIES);
    assert_eq!(today.points_earned, expected_points);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_and_delete_balance_out() {
    let app = Arc::new(common::create_test_app());

    let mut ids = vec![];
    for i in 0..10 {
        let activity = common::create_activity(
            &app,
            "u1",
            json!({"type": "mindfulness", "title": format!("Sit {i}"), "duration": 10}),
        )
        .await;
        ids.push(activity["id"].as_str().unwrap().to_string());
    }

    let mut handles = vec![];
    for id in ids {
        let deleter = app.clone();
        handles.push(tokio::spawn(async move {
            common::send(
                &deleter,
                Method::DELETE,
                &format!("/api/activities?id={id}"),
                Some("u1"),
                None,
            )
            .await
        }));
        let creator = app.clone();
        handles.push(tokio::spawn(async move {
            common::send(
                &creator,
                Method::POST,
                "/api/activities",
                Some("u1"),
                Some(json!({"type": "hydration", "title": "Water"})),
            )
            .await
        }));
    }
    for handle in handles {
        let (status, body) = handle.await.expect("task panicked");
        assert!(status.is_success(), "{status}: {body}");
    }

    let profile = app.state.db.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.total_points, 10 * 5);

    let today = app
        .state
        .db
        .get_daily("u1", common::test_now().date_naive())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(today.mindfulness_minutes, 0);
    assert_eq!(today.water_glasses, 10);
}
