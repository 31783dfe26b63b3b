// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local calendar-day helpers.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Calendar day of `instant` at the given offset (i.e. truncated to local midnight).
pub fn local_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// The `count` days ending at `last` (inclusive), oldest first.
pub fn trailing_days(last: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count as i64)
        .rev()
        .filter_map(|back| last.checked_sub_signed(Duration::days(back)))
        .collect()
}
