//! Property-based tests for StreakClock.
//!
//! - Every instant lies inside its own business day
//! - Consecutive business days tile the timeline without gaps
//! - Days are 23, 24 or 25 hours long

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;

use super::StreakClock;

/// Strategy to generate instants between 2000 and 2100.
fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..4_102_444_800i64)
        .prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap_or_default())
}

/// Strategy to pick a timezone with and without DST.
fn timezone() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::Europe::London),
        Just(chrono_tz::Australia::Sydney),
        Just(chrono_tz::Asia::Tokyo),
        Just(chrono_tz::UTC),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The business day of an instant contains that instant.
    #[test]
    fn prop_instant_inside_its_day(tz in timezone(), at in instant()) {
        let clock = StreakClock::new(tz);
        let window = clock.day_boundaries(at);
        prop_assert!(window.contains(at));
        prop_assert_eq!(window.date, clock.business_date(at));
    }

    /// The end of a day is the start of the next one.
    #[test]
    fn prop_days_tile(tz in timezone(), at in instant()) {
        let clock = StreakClock::new(tz);
        let today = clock.day_boundaries(at);
        let tomorrow = clock.day_boundaries(today.end);
        prop_assert_eq!(tomorrow.start, today.end);
        prop_assert!(tomorrow.date > today.date);
    }

    /// DST shifts a day by at most one hour.
    #[test]
    fn prop_day_length_bounded(tz in timezone(), at in instant()) {
        let window = StreakClock::new(tz).day_boundaries(at);
        let length = window.length();
        prop_assert!(length >= Duration::hours(23));
        prop_assert!(length <= Duration::hours(25));
    }

    /// Two instants share a business day exactly when their windows match.
    #[test]
    fn prop_same_day_matches_windows(tz in timezone(), a in instant(), b in instant()) {
        let clock = StreakClock::new(tz);
        prop_assert_eq!(
            clock.is_same_business_day(a, b),
            clock.day_boundaries(a) == clock.day_boundaries(b)
        );
    }
}
