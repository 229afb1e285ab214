//! Turns accepted events into store mutations.
//!
//! Planning is pure: every function here returns the list of [`Mutation`]s
//! to apply and never touches the store itself.

use super::resolver::{ExpiredPending, ResolvedTransfer};
use super::store::{AccountDelta, BalanceChange, LedgerStore, Mutation, StoreError};
use super::types::{Account, AccountFlags, PendingStatus, Transfer, TransferFlags, TransferKind};

/// Plans ledger mutations.
pub struct LedgerMutator;

impl LedgerMutator {
    /// Plans the insert of a new account stamped with `timestamp`.
    #[must_use]
    pub fn create_account(account: &Account, timestamp: u64) -> Vec<Mutation> {
        let mut stored = account.clone();
        stored.timestamp = timestamp;
        vec![Mutation::AccountInsert(stored)]
    }

    /// Plans an accepted transfer: balance deltas, closing, the transfer
    /// record, the pending status change and balance snapshots.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invariant` if a delta leaves the `u128` range,
    /// which resolution rules out.
    pub fn apply_transfer(
        resolved: &ResolvedTransfer,
        history_enabled: bool,
    ) -> Result<Vec<Mutation>, StoreError> {
        let transfer = &resolved.transfer;
        let amount = transfer.amount;
        let mut debit = AccountDelta::new(transfer.debit_account_id);
        let mut credit = AccountDelta::new(transfer.credit_account_id);
        let mut status = None;

        match transfer.kind() {
            TransferKind::Single => {
                debit.debits_posted = BalanceChange::Add(amount);
                credit.credits_posted = BalanceChange::Add(amount);
            }
            TransferKind::Pending => {
                debit.debits_pending = BalanceChange::Add(amount);
                credit.credits_pending = BalanceChange::Add(amount);
                if transfer.flags.contains(TransferFlags::CLOSING_DEBIT) {
                    debit.flags_set = AccountFlags::CLOSED;
                }
                if transfer.flags.contains(TransferFlags::CLOSING_CREDIT) {
                    credit.flags_set = AccountFlags::CLOSED;
                }
                status = Some(Mutation::PendingStatusTransition {
                    id: transfer.id,
                    from: None,
                    to: PendingStatus::Pending,
                });
            }
            TransferKind::PostPending => {
                // Any remainder of a partial post stays reserved.
                debit.debits_pending = BalanceChange::Sub(amount);
                debit.debits_posted = BalanceChange::Add(amount);
                credit.credits_pending = BalanceChange::Sub(amount);
                credit.credits_posted = BalanceChange::Add(amount);
                status = Some(Mutation::PendingStatusTransition {
                    id: transfer.pending_id,
                    from: Some(PendingStatus::Pending),
                    to: PendingStatus::Posted,
                });
            }
            TransferKind::VoidPending => {
                debit.debits_pending = BalanceChange::Sub(amount);
                credit.credits_pending = BalanceChange::Sub(amount);
                if let Some(pending) = &resolved.pending {
                    reopen(pending, &mut debit, &mut credit);
                }
                status = Some(Mutation::PendingStatusTransition {
                    id: transfer.pending_id,
                    from: Some(PendingStatus::Pending),
                    to: PendingStatus::Voided,
                });
            }
        }

        let mut snapshots = Vec::new();
        if history_enabled {
            for (account, delta) in [(&resolved.debit_account, &debit), (&resolved.credit_account, &credit)] {
                if account.keeps_history() {
                    let mut after = account.clone();
                    delta.apply_to(&mut after)?;
                    snapshots.push(Mutation::BalanceSnapshot(after.balance_at(transfer.timestamp)));
                }
            }
        }

        let mut mutations = vec![
            Mutation::AccountDelta(debit),
            Mutation::AccountDelta(credit),
            Mutation::TransferInsert(transfer.clone()),
        ];
        mutations.extend(status);
        mutations.extend(snapshots);
        Ok(mutations)
    }

    /// Plans the release of an expired pending transfer.
    #[must_use]
    pub fn expire_pending(expired: &ExpiredPending) -> Vec<Mutation> {
        let pending = &expired.pending;
        let mut debit = AccountDelta::new(pending.debit_account_id);
        let mut credit = AccountDelta::new(pending.credit_account_id);
        debit.debits_pending = BalanceChange::Sub(pending.amount);
        credit.credits_pending = BalanceChange::Sub(pending.amount);
        reopen(pending, &mut debit, &mut credit);

        vec![
            Mutation::AccountDelta(debit),
            Mutation::AccountDelta(credit),
            Mutation::PendingStatusTransition {
                id: pending.id,
                from: Some(PendingStatus::Pending),
                to: PendingStatus::Expired,
            },
        ]
    }

    /// Applies planned mutations in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the store.
    pub fn commit<S: LedgerStore + ?Sized>(
        store: &mut S,
        mutations: Vec<Mutation>,
    ) -> Result<(), StoreError> {
        for mutation in mutations {
            store.apply(mutation)?;
        }
        Ok(())
    }
}

/// Undoes the closing effect of a pending transfer that will not post.
fn reopen(pending: &Transfer, debit: &mut AccountDelta, credit: &mut AccountDelta) {
    if pending.flags.contains(TransferFlags::CLOSING_DEBIT) {
        debit.flags_clear = AccountFlags::CLOSED;
    }
    if pending.flags.contains(TransferFlags::CLOSING_CREDIT) {
        credit.flags_clear = AccountFlags::CLOSED;
    }
}
