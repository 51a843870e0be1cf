//! Property-based tests for BalanceEngine.
//!
//! - Balance never goes negative under any operation sequence
//! - Balance always equals the sum of the user's ledger amounts
//! - Check-in rewards always equal streak x 10 with streaks in 1..=7

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use inkwell_shared::types::{ContentId, ExternalEventId, UserId};
use proptest::prelude::*;

use super::{Actor, BalanceEngine, CheckInOutcome, RetryPolicy};
use crate::catalog::ContentItem;
use crate::ledger::LedgerError;
use crate::store::InMemoryLedgerStore;
use crate::streak::{MAX_STREAK, StreakClock, UNIT_REWARD};
use crate::time::{Clock, ManualClock};

#[derive(Debug, Clone)]
enum Op {
    Credit { order: u8, amount: i64 },
    Unlock { content: u8 },
    Adjust { delta: i64 },
    CheckIn { after_hours: i64 },
}

/// Strategy to generate one engine operation.
fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 1i64..500).prop_map(|(order, amount)| Op::Credit { order, amount }),
        (0u8..8).prop_map(|content| Op::Unlock { content }),
        (-300i64..300).prop_map(|delta| Op::Adjust { delta }),
        (0i64..80).prop_map(|after_hours| Op::CheckIn { after_hours }),
    ]
}

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-05T15:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn engine() -> (InMemoryLedgerStore, ManualClock, BalanceEngine) {
    let store = InMemoryLedgerStore::new();
    for i in 0..8u8 {
        store.put_content(ContentItem::new(format!("c-{i}"), i64::from(i) * 40));
    }
    let clock = ManualClock::new(start());
    let engine = BalanceEngine::new(
        Arc::new(store.clone()),
        StreakClock::new(chrono_tz::America::New_York),
    )
    .with_time_source(Arc::new(clock.clone()))
    .with_retry_policy(RetryPolicy::new(3, StdDuration::ZERO));
    (store, clock, engine)
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any sequence of operations keeps the wallet non-negative and
    /// reconciled with its ledger.
    #[test]
    fn prop_balance_matches_ledger(ops in prop::collection::vec(op(), 1..40)) {
        let (_store, clock, engine) = engine();
        let user_id = UserId::new();
        let admin = Actor::admin(UserId::new());

        block_on(async {
            engine.open_account(user_id).await.unwrap();
            for op in ops {
                let result = match op {
                    Op::Credit { order, amount } => engine
                        .credit_from_payment(user_id, &ExternalEventId::new(format!("o-{order}")), amount)
                        .await
                        .map(|_| ()),
                    Op::Unlock { content } => engine
                        .unlock_content(user_id, &ContentId::new(format!("c-{content}")))
                        .await
                        .map(|_| ()),
                    Op::Adjust { delta } => engine
                        .admin_adjust_balance(admin, user_id, delta, "correction")
                        .await
                        .map(|_| ()),
                    Op::CheckIn { after_hours } => {
                        clock.advance(Duration::hours(after_hours));
                        engine.daily_check_in(user_id).await.map(|_| ())
                    }
                };
                if let Err(err) = result {
                    prop_assert!(
                        matches!(err, LedgerError::InsufficientFunds { .. } | LedgerError::InvalidInput(_)),
                        "unexpected error: {err}"
                    );
                }

                let report = engine.reconcile(user_id).await.unwrap();
                prop_assert!(report.balance >= 0);
                prop_assert!(report.consistent);
            }
            Ok(())
        })?;
    }

    /// Rewards follow the streak table whatever the gaps between claims.
    #[test]
    fn prop_check_in_rewards_follow_streak(gaps in prop::collection::vec(1i64..100, 1..20)) {
        let (_store, clock, engine) = engine();
        let user_id = UserId::new();

        block_on(async {
            engine.open_account(user_id).await.unwrap();
            for gap in gaps {
                clock.advance(Duration::hours(gap));
                match engine.daily_check_in(user_id).await.unwrap() {
                    CheckInOutcome::Claimed { reward, streak, .. } => {
                        prop_assert!((1..=MAX_STREAK).contains(&streak));
                        prop_assert_eq!(reward, i64::from(streak) * UNIT_REWARD);
                        if gap > 48 {
                            prop_assert_eq!(streak, 1);
                        }
                    }
                    CheckInOutcome::AlreadyClaimed { next_window_start, .. } => {
                        prop_assert!(next_window_start > clock.now());
                    }
                }
            }
            Ok(())
        })?;
    }
}

