// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod daily;
pub mod goal;
pub mod user;

pub use activity::{Activity, ActivityPatch, ActivityType, ActivityTypeStats, NewActivity};
pub use daily::{AggregateDelta, DailyAggregate};
pub use goal::{GoalThresholds, WellnessGoal};
pub use user::{ProfileUpdate, UserProfile};
