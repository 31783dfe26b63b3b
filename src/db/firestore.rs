// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Activities (logged by users)
//! - User profiles (points, level, streaks)
//! - Daily aggregates (per-user, per-day rollups)
//! - Wellness goals (read for daily thresholds)

use crate::db::{collections, ActivityMutation, WriteSet, MAX_WRITES_PER_COMMIT};
use crate::error::AppError;
use crate::models::{Activity, ActivityType, DailyAggregate, UserProfile, WellnessGoal};
use chrono::NaiveDate;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Emulator connection with a placeholder bearer token.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ3ZWxsbmVzcyJ9."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let client = firestore::FirestoreDb::with_options_token_source(
            firestore::FirestoreDbOptions::new(project_id.to_string()),
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore Emulator");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Client with no connection. Every operation fails with a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Activity Operations ─────────────────────────────────────

    pub async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(activity_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Newest-first page of a user's activities, optionally of one type.
    pub async fn list_activities(
        &self,
        user_id: &str,
        activity_type: Option<ActivityType>,
        limit: u32,
    ) -> Result<Vec<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(|q| {
                q.for_all([
                    q.field("userId").eq(user_id),
                    activity_type.and_then(|t| q.field("type").eq(t.as_str())),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_all_activities(&self, user_id: &str) -> Result<Vec<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(|q| q.for_all([q.field("userId").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Daily Aggregate Operations ──────────────────────────────

    pub async fn get_daily(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyAggregate>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_AGGREGATES)
            .obj()
            .one(&DailyAggregate::doc_id(user_id, date))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Rows in `[from, to]`. Dates are stored as `YYYY-MM-DD`, so string order is date order.
    pub async fn list_daily(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAggregate>, AppError> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::DAILY_AGGREGATES)
            .filter(|q| {
                q.for_all([
                    q.field("userId").eq(user_id),
                    q.field("date").greater_than_or_equal(from.as_str()),
                    q.field("date").less_than_or_equal(to.as_str()),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_all_daily(&self, user_id: &str) -> Result<Vec<DailyAggregate>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DAILY_AGGREGATES)
            .filter(|q| q.for_all([q.field("userId").eq(user_id)]))
            .order_by([("date", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Goal Operations ─────────────────────────────────────────

    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<WellnessGoal>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WELLNESS_GOALS)
            .filter(|q| q.for_all([q.field("userId").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_goal(&self, goal: &WellnessGoal) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WELLNESS_GOALS)
            .document_id(&goal.id)
            .object(goal)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Atomic Writes ───────────────────────────────────────────

    /// Write the activity, profile and daily rows in one transaction.
    ///
    /// Callers serialize read-modify-write cycles per user, so the values in
    /// `writes` are already the final documents.
    pub async fn commit(&self, writes: &WriteSet) -> Result<(), AppError> {
        let write_count = writes.write_count();
        if write_count > MAX_WRITES_PER_COMMIT {
            return Err(AppError::Database(format!(
                "Transaction too large: {} writes",
                write_count
            )));
        }

        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        match &writes.activity {
            Some(ActivityMutation::Put(activity)) => {
                client
                    .fluent()
                    .update()
                    .in_col(collections::ACTIVITIES)
                    .document_id(&activity.id)
                    .object(activity)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add activity to transaction: {}", e))
                    })?;
            }
            Some(ActivityMutation::Delete(activity_id)) => {
                client
                    .fluent()
                    .delete()
                    .from(collections::ACTIVITIES)
                    .document_id(activity_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add activity deletion to transaction: {}",
                            e
                        ))
                    })?;
            }
            None => {}
        }

        if let Some(profile) = &writes.profile {
            client
                .fluent()
                .update()
                .in_col(collections::USER_PROFILES)
                .document_id(&profile.user_id)
                .object(profile)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add profile to transaction: {}", e))
                })?;
        }

        for day in &writes.days {
            client
                .fluent()
                .update()
                .in_col(collections::DAILY_AGGREGATES)
                .document_id(DailyAggregate::doc_id(&day.user_id, day.date))
                .object(day)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add daily aggregate to transaction: {}",
                        e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(write_count, "Committed write set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_client_reports_database_error() {
        let db = FirestoreDb::new_mock();
        let err = db.get_profile("user-1").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_oversized_write_set_rejected() {
        let db = FirestoreDb::new_mock();
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let writes = WriteSet {
            activity: None,
            profile: None,
            days: start
                .iter_days()
                .take(MAX_WRITES_PER_COMMIT + 1)
                .map(|d| DailyAggregate::new("user-1", d))
                .collect(),
        };
        match db.commit(&writes).await {
            Err(AppError::Database(msg)) => assert!(msg.starts_with("Transaction too large")),
            other => panic!("Expected oversized commit to fail, got {:?}", other),
        }
    }
}
