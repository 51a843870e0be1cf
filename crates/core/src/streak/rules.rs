//! Streak progression.
//!
//! A claim continues the streak when the previous claim is at most
//! [`STREAK_RESET_GAP_HOURS`] old. Day [`MAX_STREAK`] is the last day of a
//! cycle: the claim after it starts over at day 1.

use chrono::{DateTime, Duration, Utc};

/// Last day of a streak cycle.
pub const MAX_STREAK: u32 = 7;

/// Coins paid per streak day.
pub const UNIT_REWARD: i64 = 10;

/// Gap after which the streak resets.
pub const STREAK_RESET_GAP_HOURS: i64 = 48;

/// Returns the streak day a claim at `now` produces.
#[must_use]
pub fn next_streak(current: u32, last_check_in: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    match last_check_in {
        None => 1,
        Some(last) if now - last > Duration::hours(STREAK_RESET_GAP_HOURS) => 1,
        Some(_) if current >= MAX_STREAK => 1,
        Some(_) => current + 1,
    }
}

/// Returns the coins paid for a streak day.
#[must_use]
pub fn reward_for(streak: u32) -> i64 {
    i64::from(streak) * UNIT_REWARD
}
