use chrono::{Duration, FixedOffset, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wellness_tracker::models::{Activity, ActivityType, GoalThresholds, NewActivity};
use wellness_tracker::services::aggregation;
use wellness_tracker::services::scoring::score;

/// A year of mixed activities, a handful per day.
fn year_of_activities() -> Vec<Activity> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
    (0..365 * 6)
        .map(|i| {
            let activity_type = ActivityType::ALL[i % ActivityType::ALL.len()];
            let input: NewActivity = serde_json::from_value(serde_json::json!({
                "type": activity_type.as_str(),
                "title": format!("Activity {i}"),
                "duration": (i % 90) as u32,
                "calories": 250.0,
            }))
            .expect("Failed to build activity");
            let when = start + Duration::hours((i / 6) as i64 * 24 + (i % 6) as i64 * 2);
            let mut activity = Activity::from_submission(format!("a{i}"), "bench-user", input, when);
            activity.date = when;
            activity.points_earned = score(activity.activity_type, activity.duration);
            activity
        })
        .collect()
}

fn benchmark_scoring(c: &mut Criterion) {
    let activities = year_of_activities();

    c.bench_function("score_year_of_activities", |b| {
        b.iter(|| {
            activities
                .iter()
                .map(|a| score(black_box(a.activity_type), black_box(a.duration)))
                .sum::<i64>()
        })
    });
}

fn benchmark_rebuild(c: &mut Criterion) {
    let activities = year_of_activities();
    let thresholds = GoalThresholds::defaults();
    let offset = FixedOffset::west_opt(8 * 3600).expect("valid offset");
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let mut group = c.benchmark_group("daily_aggregates");

    group.bench_function("rebuild_one_year", |b| {
        b.iter(|| {
            aggregation::rebuild(
                "bench-user",
                black_box(&activities),
                std::iter::empty(),
                &thresholds,
                offset,
                now,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_scoring, benchmark_rebuild);
criterion_main!(benches);
