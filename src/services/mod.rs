// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod aggregation;
pub mod profile;
pub mod scoring;
pub mod stats;
pub mod user_locks;

pub use activity::ActivityService;
pub use profile::ProfileService;
pub use stats::{StatsReport, StatsReporter};
pub use user_locks::UserLocks;
