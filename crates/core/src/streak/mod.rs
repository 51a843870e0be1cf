//! Daily check-in streaks.
//!
//! This module implements:
//! - Business-timezone day boundaries, DST aware
//! - The streak progression rule and its reward table

mod clock;
mod rules;

#[cfg(test)]
mod clock_props;

pub use clock::{DayWindow, StreakClock};
pub use rules::{MAX_STREAK, STREAK_RESET_GAP_HOURS, UNIT_REWARD, next_streak, reward_for};
