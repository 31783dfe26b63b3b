// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::user::ActivityLevel;
use crate::models::{
    Activity, ActivityPatch, ActivityType, ActivityTypeStats, NewActivity, ProfileUpdate,
    UserProfile,
};
use crate::services::StatsReport;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/activities",
            get(list_activities)
                .post(create_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
        .route("/api/activities/stats", get(activity_type_stats))
        .route("/api/stats", get(get_stats))
        .route("/api/stats/rebuild", post(rebuild_stats))
        .route("/api/user", get(get_user).put(update_user))
}

/// Generic `{message}` body.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ListQuery {
    #[serde(rename = "type")]
    activity_type: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
struct IdQuery {
    id: Option<String>,
}

fn parse_type(raw: Option<&str>) -> Result<Option<ActivityType>> {
    raw.filter(|t| !t.is_empty())
        .map(|t| t.parse::<ActivityType>().map_err(AppError::BadRequest))
        .transpose()
}

/// `limit` defaults to 10 and is capped at 100; zero or garbage is rejected.
fn parse_limit(raw: Option<&str>) -> Result<u32> {
    match raw {
        None | Some("") => Ok(DEFAULT_LIMIT),
        Some(raw) => match raw.parse::<u32>() {
            Ok(0) | Err(_) => Err(AppError::BadRequest(
                "Invalid 'limit' parameter: must be a positive integer".to_string(),
            )),
            Ok(limit) => Ok(limit.min(MAX_LIMIT)),
        },
    }
}

/// Most recent activities, newest first.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Activity>>> {
    let activity_type = parse_type(params.activity_type.as_deref())?;
    let limit = parse_limit(params.limit.as_deref())?;

    tracing::debug!(
        user_id = %user.user_id,
        activity_type = ?activity_type,
        limit,
        "Fetching activities"
    );

    let activities = state
        .activities
        .list(&user.user_id, activity_type, limit)
        .await?;
    Ok(Json(activities))
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<NewActivity>, JsonRejection>,
) -> Result<(StatusCode, Json<Activity>)> {
    let Json(input) = payload?;
    input.validate()?;

    let activity = state.activities.create(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// The ID comes from `?id=`, or from `_id`/`id` in the body.
async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<IdQuery>,
    payload: std::result::Result<Json<ActivityPatch>, JsonRejection>,
) -> Result<Json<Activity>> {
    let Json(patch) = payload?;
    patch.validate()?;

    let activity_id = query
        .id
        .or_else(|| patch.id.clone())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Activity ID is required".to_string()))?;

    let activity = state
        .activities
        .update(&user.user_id, &activity_id, patch)
        .await?;
    Ok(Json(activity))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<IdQuery>,
) -> Result<Json<MessageResponse>> {
    let activity_id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Activity ID is required".to_string()))?;

    state
        .activities
        .delete(&user.user_id, &activity_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Activity deleted successfully".to_string(),
    }))
}

async fn activity_type_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ActivityTypeStats>>> {
    Ok(Json(state.activities.type_stats(&user.user_id).await?))
}

// ─── Stats ───────────────────────────────────────────────────

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsReport>> {
    Ok(Json(state.stats.report(&user.user_id).await?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RebuildResponse {
    pub profile: ProfileResponse,
    pub days_rebuilt: usize,
}

/// Recompute daily aggregates and total points from the stored activities.
async fn rebuild_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RebuildResponse>> {
    let (profile, days_rebuilt) = state.activities.rebuild(&user.user_id).await?;
    Ok(Json(RebuildResponse {
        profile: ProfileResponse::from(profile),
        days_rebuilt,
    }))
}

// ─── User Profile ────────────────────────────────────────────

/// Profile as returned to the client.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub total_points: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub level: i64,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub height: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub activity_level: ActivityLevel,
    pub notifications_enabled: bool,
    pub preferred_workout_time: Option<String>,
    pub timezone: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            full_name: profile.full_name(),
            user_id: profile.user_id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            total_points: profile.total_points,
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            level: profile.level,
            current_weight: profile.current_weight,
            target_weight: profile.target_weight,
            height: profile.height,
            date_of_birth: profile.date_of_birth,
            activity_level: profile.activity_level,
            notifications_enabled: profile.notifications_enabled,
            preferred_workout_time: profile.preferred_workout_time,
            timezone: profile.timezone,
            joined_at: profile.joined_at,
            updated_at: profile.updated_at,
        }
    }
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .get_or_create(&user.user_id, user.email.as_deref())
        .await?;
    Ok(Json(ProfileResponse::from(profile)))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(update) = payload?;
    update.validate()?;

    let profile = state.profiles.update(&user.user_id, update).await?;
    Ok(Json(ProfileResponse::from(profile)))
}
