//! Balance engine service.
//!
//! Each public operation is split in three layers:
//! - the public method validates arguments and runs the retry loop
//! - a `try_*` method opens one transaction and commits or rolls it back
//! - an `*_in` method holds the business rules, reading and writing
//!   through the transaction only

use std::sync::Arc;

use inkwell_shared::config::LedgerConfig;
use inkwell_shared::types::{ContentId, ExternalEventId, PageRequest, PageResponse, UserId};
use tracing::{debug, error, info, warn};

use super::actor::Actor;
use super::outcome::{
    AdjustmentOutcome, CheckInOutcome, CheckInStatus, CreditOutcome, DownloadOutcome,
    Reconciliation, RevocationOutcome, UnlockOutcome,
};
use super::retry::{AttemptError, RetryPolicy};
use crate::account::{AccountRecord, AccountStatus};
use crate::idempotency::IdempotencyLock;
use crate::ledger::{LedgerEntry, LedgerError};
use crate::payment::{MAX_ORDER_ID_CHARS, PaymentGateway, PriceTable, is_plain_order_id};
use crate::store::{LedgerStore, LedgerTransaction};
use crate::streak::{StreakClock, next_streak, reward_for};
use crate::time::{Clock, SystemClock};

/// Longest accepted reason for an operator change.
pub const MAX_REASON_CHARS: usize = 500;

/// Executes balance operations as serializable store transactions.
///
/// The engine holds no locks of its own; correctness comes from the
/// store's isolation and from re-running transactions that lost a race.
#[derive(Clone)]
pub struct BalanceEngine {
    store: Arc<dyn LedgerStore>,
    clock: StreakClock,
    time: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl BalanceEngine {
    /// Creates an engine on the system clock with the default retry policy.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, clock: StreakClock) -> Self {
        Self {
            store,
            clock,
            time: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates an engine from the ledger configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown business timezone.
    pub fn from_config(
        store: Arc<dyn LedgerStore>,
        config: &LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let clock = StreakClock::from_name(&config.business_timezone)?;
        Ok(Self::new(store, clock).with_retry_policy(RetryPolicy::from_config(config)))
    }

    /// Replaces the source of "now".
    #[must_use]
    pub fn with_time_source(mut self, time: Arc<dyn Clock>) -> Self {
        self.time = time;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the business-day clock.
    #[must_use]
    pub const fn streak_clock(&self) -> &StreakClock {
        &self.clock
    }

    // ========== Account ==========

    /// Opens a wallet, or returns the existing one.
    pub async fn open_account(&self, user_id: UserId) -> Result<AccountRecord, LedgerError> {
        let (account, created) = self
            .run("open_account", move || self.try_open_account(user_id))
            .await?;
        if created {
            info!(user_id = %user_id, "Wallet opened");
        }
        Ok(account)
    }

    /// Returns a wallet.
    pub async fn account_summary(&self, user_id: UserId) -> Result<AccountRecord, LedgerError> {
        self.run("account_summary", move || self.try_account_summary(user_id))
            .await
    }

    // ========== Unlock ==========

    /// Spends coins on a permanent content entitlement.
    ///
    /// Unlocking owned content succeeds with `already_unlocked` and changes
    /// nothing.
    pub async fn unlock_content(
        &self,
        user_id: UserId,
        content_id: &ContentId,
    ) -> Result<UnlockOutcome, LedgerError> {
        Self::require_key(content_id.is_blank(), "Content id must not be empty")?;

        let outcome = self
            .run("unlock_content", move || self.try_unlock(user_id, content_id))
            .await?;

        if outcome.already_unlocked {
            debug!(user_id = %user_id, content_id = %content_id, "Content already unlocked");
        } else {
            info!(
                user_id = %user_id,
                content_id = %content_id,
                new_balance = outcome.new_balance,
                "Content unlocked"
            );
        }
        Ok(outcome)
    }

    // ========== Payments ==========

    /// Credits a verified payment exactly once per external order.
    ///
    /// A replay of an applied order succeeds with `duplicate` and credits
    /// nothing.
    pub async fn credit_from_payment(
        &self,
        user_id: UserId,
        order_id: &ExternalEventId,
        amount: i64,
    ) -> Result<CreditOutcome, LedgerError> {
        Self::require_key(order_id.is_blank(), "Order id must not be empty")?;
        if amount <= 0 {
            return Err(LedgerError::InvalidInput(format!(
                "Credit amount must be positive, got {amount}"
            )));
        }

        let outcome = self
            .run("credit_from_payment", move || {
                self.try_credit(user_id, order_id, amount)
            })
            .await?;

        if outcome.duplicate {
            info!(user_id = %user_id, order_id = %order_id, "Duplicate payment ignored");
        } else {
            info!(
                user_id = %user_id,
                order_id = %order_id,
                amount,
                new_balance = outcome.new_balance,
                "Payment credited"
            );
        }
        Ok(outcome)
    }

    /// Captures an order at the gateway, verifies it against the price
    /// table and credits the matching coins.
    pub async fn purchase(
        &self,
        gateway: &dyn PaymentGateway,
        prices: &PriceTable,
        user_id: UserId,
        order_id: &ExternalEventId,
    ) -> Result<CreditOutcome, LedgerError> {
        if !is_plain_order_id(order_id) {
            return Err(LedgerError::InvalidInput(format!(
                "Order id must be 1 to {MAX_ORDER_ID_CHARS} letters, digits, '-' or '_'"
            )));
        }

        // 1. Refuse before money moves
        let account = self.account_summary(user_id).await?;
        Self::ensure_active(&account)?;

        // 2. Capture (or look up the earlier capture)
        let capture = gateway.capture(order_id).await.inspect_err(|e| {
            warn!(user_id = %user_id, order_id = %order_id, error = %e, "Payment capture failed");
        })?;
        if capture.order_id != *order_id {
            return Err(LedgerError::External(format!(
                "Gateway returned order {} for {order_id}",
                capture.order_id
            )));
        }

        // 3. Price the capture, then credit idempotently
        let credits = prices.verify(&capture)?;
        self.credit_from_payment(user_id, order_id, credits).await
    }

    // ========== Check-in ==========

    /// Claims today's check-in reward.
    ///
    /// A second claim on the same business day succeeds with
    /// `AlreadyClaimed` and changes nothing.
    pub async fn daily_check_in(&self, user_id: UserId) -> Result<CheckInOutcome, LedgerError> {
        let outcome = self
            .run("daily_check_in", move || self.try_check_in(user_id))
            .await?;

        match &outcome {
            CheckInOutcome::Claimed {
                reward,
                streak,
                business_date,
                ..
            } => info!(
                user_id = %user_id,
                reward,
                streak,
                business_date = %business_date,
                "Check-in claimed"
            ),
            CheckInOutcome::AlreadyClaimed { .. } => {
                debug!(user_id = %user_id, "Check-in already claimed today");
            }
        }
        Ok(outcome)
    }

    /// Reports whether a check-in is available and what it would pay.
    pub async fn check_in_status(&self, user_id: UserId) -> Result<CheckInStatus, LedgerError> {
        let account = self.account_summary(user_id).await?;
        let now = self.time.now();
        let window = self.clock.day_boundaries(now);

        let can_claim = account
            .last_check_in_at
            .is_none_or(|last| last < window.start);
        let claim_at = if can_claim { now } else { window.end };
        let next = next_streak(account.streak_count, account.last_check_in_at, claim_at);

        Ok(CheckInStatus {
            can_claim,
            current_streak: account.streak_count,
            next_streak: next,
            next_reward: reward_for(next),
            next_window_start: window.end,
            business_date: window.date,
        })
    }

    // ========== Downloads ==========

    /// Records a zero-amount audit note for a download of owned or free
    /// content.
    pub async fn record_download(
        &self,
        user_id: UserId,
        content_id: &ContentId,
    ) -> Result<DownloadOutcome, LedgerError> {
        Self::require_key(content_id.is_blank(), "Content id must not be empty")?;

        let outcome = self
            .run("record_download", move || {
                self.try_download(user_id, content_id)
            })
            .await?;
        debug!(user_id = %user_id, content_id = %content_id, "Download recorded");
        Ok(outcome)
    }

    // ========== Administration ==========

    /// Applies an operator balance correction.
    pub async fn admin_adjust_balance(
        &self,
        actor: Actor,
        user_id: UserId,
        delta: i64,
        reason: &str,
    ) -> Result<AdjustmentOutcome, LedgerError> {
        actor.require_admin()?;
        if delta == 0 {
            return Err(LedgerError::InvalidInput(
                "Adjustment must not be zero".to_string(),
            ));
        }
        let reason = Self::validate_reason(reason)?;

        let outcome = self
            .run("admin_adjust_balance", move || {
                self.try_adjust(actor, user_id, delta, reason)
            })
            .await?;

        info!(
            operator = %actor.user_id,
            user_id = %user_id,
            delta,
            new_balance = outcome.new_balance,
            reason,
            "Balance adjusted by operator"
        );
        Ok(outcome)
    }

    /// Removes an entitlement and records an audit note.
    pub async fn revoke_entitlement(
        &self,
        actor: Actor,
        user_id: UserId,
        content_id: &ContentId,
        reason: &str,
    ) -> Result<RevocationOutcome, LedgerError> {
        actor.require_admin()?;
        Self::require_key(content_id.is_blank(), "Content id must not be empty")?;
        let reason = Self::validate_reason(reason)?;

        let outcome = self
            .run("revoke_entitlement", move || {
                self.try_revoke(user_id, content_id, reason)
            })
            .await?;

        info!(
            operator = %actor.user_id,
            user_id = %user_id,
            content_id = %content_id,
            reason,
            "Entitlement revoked"
        );
        Ok(outcome)
    }

    /// Changes the mutation gate of a wallet. Writes no ledger entry.
    pub async fn set_account_status(
        &self,
        actor: Actor,
        user_id: UserId,
        status: AccountStatus,
    ) -> Result<AccountRecord, LedgerError> {
        actor.require_admin()?;

        let account = self
            .run("set_account_status", move || {
                self.try_set_status(user_id, status)
            })
            .await?;

        info!(operator = %actor.user_id, user_id = %user_id, status = %status, "Account status changed");
        Ok(account)
    }

    // ========== Audit ==========

    /// Compares the stored balance with the ledger sum in one read.
    pub async fn reconcile(&self, user_id: UserId) -> Result<Reconciliation, LedgerError> {
        let report = self
            .run("reconcile", move || self.try_reconcile(user_id))
            .await?;

        if !report.consistent {
            error!(
                user_id = %user_id,
                balance = report.balance,
                ledger_total = report.ledger_total,
                "Balance does not match ledger"
            );
        }
        Ok(report)
    }

    /// Lists a user's ledger entries, newest first.
    pub async fn history(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<PageResponse<LedgerEntry>, LedgerError> {
        let page = page.normalized();
        let (entries, total) = self.store.list_entries(user_id, page).await?;
        Ok(PageResponse::new(entries, page, total))
    }

    // ========== Retry loop ==========

    /// Runs one attempt at a time until it commits, fails for good, or
    /// the retry budget is spent.
    async fn run<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let mut attempts = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Conflict(reason)) if attempts >= self.retry.max_attempts() => {
                    warn!(operation, attempts, reason = %reason, "Transaction contention exhausted retries");
                    return Err(LedgerError::TransientConflict { attempts });
                }
                Err(AttemptError::Conflict(reason)) => {
                    debug!(operation, attempt = attempts, reason = %reason, "Transaction conflict, retrying");
                    tokio::time::sleep(self.retry.delay_after(attempts)).await;
                    attempts += 1;
                }
            }
        }
    }

    async fn finish<T>(
        tx: Box<dyn LedgerTransaction>,
        result: Result<T, AttemptError>,
    ) -> Result<T, AttemptError> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Failed to roll back transaction");
                }
                Err(err)
            }
        }
    }

    // ========== Attempts ==========

    async fn try_open_account(
        &self,
        user_id: UserId,
    ) -> Result<(AccountRecord, bool), AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self.open_account_in(tx.as_mut(), user_id).await;
        Self::finish(tx, result).await
    }

    async fn try_account_summary(&self, user_id: UserId) -> Result<AccountRecord, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = Self::require_account(tx.as_mut(), user_id).await;
        Self::finish(tx, result).await
    }

    async fn try_unlock(
        &self,
        user_id: UserId,
        content_id: &ContentId,
    ) -> Result<UnlockOutcome, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self.unlock_in(tx.as_mut(), user_id, content_id).await;
        Self::finish(tx, result).await
    }

    async fn try_credit(
        &self,
        user_id: UserId,
        order_id: &ExternalEventId,
        amount: i64,
    ) -> Result<CreditOutcome, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self.credit_in(tx.as_mut(), user_id, order_id, amount).await;
        Self::finish(tx, result).await
    }

    async fn try_check_in(&self, user_id: UserId) -> Result<CheckInOutcome, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self.check_in_in(tx.as_mut(), user_id).await;
        Self::finish(tx, result).await
    }

    async fn try_download(
        &self,
        user_id: UserId,
        content_id: &ContentId,
    ) -> Result<DownloadOutcome, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self.download_in(tx.as_mut(), user_id, content_id).await;
        Self::finish(tx, result).await
    }

    async fn try_adjust(
        &self,
        actor: Actor,
        user_id: UserId,
        delta: i64,
        reason: &str,
    ) -> Result<AdjustmentOutcome, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self
            .adjust_in(tx.as_mut(), actor, user_id, delta, reason)
            .await;
        Self::finish(tx, result).await
    }

    async fn try_revoke(
        &self,
        user_id: UserId,
        content_id: &ContentId,
        reason: &str,
    ) -> Result<RevocationOutcome, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self
            .revoke_in(tx.as_mut(), user_id, content_id, reason)
            .await;
        Self::finish(tx, result).await
    }

    async fn try_set_status(
        &self,
        user_id: UserId,
        status: AccountStatus,
    ) -> Result<AccountRecord, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = self.set_status_in(tx.as_mut(), user_id, status).await;
        Self::finish(tx, result).await
    }

    async fn try_reconcile(&self, user_id: UserId) -> Result<Reconciliation, AttemptError> {
        let mut tx = self.store.begin().await?;
        let result = Self::reconcile_in(tx.as_mut(), user_id).await;
        Self::finish(tx, result).await
    }

    // ========== Business rules ==========

    async fn open_account_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
    ) -> Result<(AccountRecord, bool), AttemptError> {
        if let Some(account) = tx.load_account(user_id).await? {
            return Ok((account, false));
        }
        let account = AccountRecord::open(user_id, self.time.now());
        tx.insert_account(&account).await?;
        Ok((account, true))
    }

    async fn unlock_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
        content_id: &ContentId,
    ) -> Result<UnlockOutcome, AttemptError> {
        // 1. Content and account preconditions
        let content = tx
            .load_content(content_id)
            .await?
            .ok_or_else(|| LedgerError::ContentNotFound(content_id.clone()))?;
        let cost = content.checked_cost()?;
        let mut account = Self::require_account(tx, user_id).await?;
        Self::ensure_active(&account)?;

        // 2. Owned content is a no-op
        if account.is_entitled(content_id) {
            return Ok(UnlockOutcome {
                new_balance: account.balance,
                already_unlocked: true,
                entry_id: None,
            });
        }

        // 3. Funds
        if !account.can_afford(cost) {
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: account.balance,
            }
            .into());
        }

        // 4. Debit, grant, count, record
        let now = self.time.now();
        account.balance -= cost;
        account.entitlements.insert(content_id.clone());
        account.updated_at = now;
        let entry = LedgerEntry::unlock(user_id, cost, content_id, now);

        tx.save_account(&account).await?;
        tx.append_entry(&entry).await?;
        tx.record_unlock(content_id, &entry).await?;

        Ok(UnlockOutcome {
            new_balance: account.balance,
            already_unlocked: false,
            entry_id: Some(entry.id),
        })
    }

    async fn credit_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
        order_id: &ExternalEventId,
        amount: i64,
    ) -> Result<CreditOutcome, AttemptError> {
        let mut account = Self::require_account(tx, user_id).await?;
        Self::ensure_active(&account)?;

        // 1. Consult the idempotency guard inside this transaction
        if let Some(lock) = tx.find_idempotency_lock(order_id).await? {
            if lock.user_id != user_id {
                warn!(
                    order_id = %order_id,
                    credited_user = %lock.user_id,
                    user_id = %user_id,
                    "Order was already credited to another wallet"
                );
            }
            return Ok(CreditOutcome {
                new_balance: account.balance,
                duplicate: true,
                credited: 0,
                entry_id: None,
            });
        }

        // 2. Credit, record, lock
        let now = self.time.now();
        account.balance = account.balance.checked_add(amount).ok_or_else(|| {
            LedgerError::InvalidInput(format!("Crediting {amount} would overflow the balance"))
        })?;
        account.updated_at = now;
        let entry = LedgerEntry::purchase(user_id, amount, order_id, now);
        let lock = IdempotencyLock::new(order_id.clone(), user_id, amount, now);

        tx.save_account(&account).await?;
        tx.append_entry(&entry).await?;
        tx.insert_idempotency_lock(&lock).await?;

        Ok(CreditOutcome {
            new_balance: account.balance,
            duplicate: false,
            credited: amount,
            entry_id: Some(entry.id),
        })
    }

    async fn check_in_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
    ) -> Result<CheckInOutcome, AttemptError> {
        let mut account = Self::require_account(tx, user_id).await?;
        Self::ensure_active(&account)?;

        // 1. One claim per business day
        let now = self.time.now();
        let window = self.clock.day_boundaries(now);
        if account
            .last_check_in_at
            .is_some_and(|last| last >= window.start)
        {
            return Ok(CheckInOutcome::AlreadyClaimed {
                streak: account.streak_count,
                next_window_start: window.end,
            });
        }

        // 2. Streak and reward
        let streak = next_streak(account.streak_count, account.last_check_in_at, now);
        let reward = reward_for(streak);

        // 3. Credit and record
        account.balance = account.balance.checked_add(reward).ok_or_else(|| {
            LedgerError::InvalidInput("Check-in reward would overflow the balance".to_string())
        })?;
        account.last_check_in_at = Some(now);
        account.streak_count = streak;
        account.updated_at = now;
        let entry = LedgerEntry::check_in_reward(user_id, reward, streak, window.date, now);

        tx.save_account(&account).await?;
        tx.append_entry(&entry).await?;

        Ok(CheckInOutcome::Claimed {
            reward,
            streak,
            new_balance: account.balance,
            business_date: window.date,
            entry_id: entry.id,
        })
    }

    async fn download_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
        content_id: &ContentId,
    ) -> Result<DownloadOutcome, AttemptError> {
        let content = tx
            .load_content(content_id)
            .await?
            .ok_or_else(|| LedgerError::ContentNotFound(content_id.clone()))?;
        let account = Self::require_account(tx, user_id).await?;
        Self::ensure_active(&account)?;

        if !content.is_free() && !account.is_entitled(content_id) {
            return Err(LedgerError::EntitlementNotFound {
                user_id,
                content_id: content_id.clone(),
            }
            .into());
        }

        let entry = LedgerEntry::download(user_id, content_id, self.time.now());
        tx.append_entry(&entry).await?;
        Ok(DownloadOutcome { entry_id: entry.id })
    }

    async fn adjust_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        actor: Actor,
        user_id: UserId,
        delta: i64,
        reason: &str,
    ) -> Result<AdjustmentOutcome, AttemptError> {
        let mut account = Self::require_account(tx, user_id).await?;
        Self::ensure_active(&account)?;

        let new_balance = account
            .balance
            .checked_add(delta)
            .filter(|balance| *balance >= 0)
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!(
                    "Adjustment of {delta} on a balance of {} would leave it negative",
                    account.balance
                ))
            })?;

        let now = self.time.now();
        account.balance = new_balance;
        account.updated_at = now;
        let entry = LedgerEntry::admin_adjustment(user_id, delta, reason, actor.user_id, now);

        tx.save_account(&account).await?;
        tx.append_entry(&entry).await?;

        Ok(AdjustmentOutcome {
            new_balance,
            entry_id: entry.id,
        })
    }

    async fn revoke_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
        content_id: &ContentId,
        reason: &str,
    ) -> Result<RevocationOutcome, AttemptError> {
        let mut account = Self::require_account(tx, user_id).await?;
        if !account.entitlements.remove(content_id) {
            return Err(LedgerError::EntitlementNotFound {
                user_id,
                content_id: content_id.clone(),
            }
            .into());
        }

        let now = self.time.now();
        account.updated_at = now;
        let entry = LedgerEntry::revocation(user_id, content_id, reason, now);

        tx.save_account(&account).await?;
        tx.append_entry(&entry).await?;

        Ok(RevocationOutcome {
            remaining_entitlements: account.entitlements.len(),
            entry_id: entry.id,
        })
    }

    async fn set_status_in(
        &self,
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
        status: AccountStatus,
    ) -> Result<AccountRecord, AttemptError> {
        let mut account = Self::require_account(tx, user_id).await?;
        if account.status != status {
            account.status = status;
            account.updated_at = self.time.now();
            tx.save_account(&account).await?;
        }
        Ok(account)
    }

    async fn reconcile_in(
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
    ) -> Result<Reconciliation, AttemptError> {
        let account = Self::require_account(tx, user_id).await?;
        let ledger_total = tx.sum_entries(user_id).await?;
        Ok(Reconciliation {
            user_id,
            balance: account.balance,
            ledger_total,
            consistent: account.balance == ledger_total,
        })
    }

    // ========== Helpers ==========

    async fn require_account(
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
    ) -> Result<AccountRecord, AttemptError> {
        tx.load_account(user_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(user_id).into())
    }

    fn ensure_active(account: &AccountRecord) -> Result<(), LedgerError> {
        if account.status.is_active() {
            Ok(())
        } else {
            Err(LedgerError::AccountInactive {
                user_id: account.user_id,
                status: account.status,
            })
        }
    }

    fn require_key(blank: bool, message: &str) -> Result<(), LedgerError> {
        if blank {
            Err(LedgerError::InvalidInput(message.to_string()))
        } else {
            Ok(())
        }
    }

    fn validate_reason(reason: &str) -> Result<&str, LedgerError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::InvalidInput(
                "Reason must not be empty".to_string(),
            ));
        }
        if reason.chars().count() > MAX_REASON_CHARS {
            return Err(LedgerError::InvalidInput(format!(
                "Reason must be at most {MAX_REASON_CHARS} characters"
            )));
        }
        Ok(reason)
    }
}
