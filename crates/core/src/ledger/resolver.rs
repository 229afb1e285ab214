//! Transfer resolution against stored state.
//!
//! Field validation has already passed when a transfer reaches the
//! resolver. It loads the two accounts and, for post/void, the pending
//! transfer, then decides whether the transfer is accepted, rejected,
//! skipped or whether it found its pending transfer expired.
//! Relational errors come before arithmetic overflow errors so that amounts
//! are known to be meaningful before they are added up.

use super::error::CreateTransferError;
use super::store::{LedgerStore, StoreError};
use super::types::{Account, AccountFlags, PendingStatus, Transfer, TransferFlags, TransferKind};

/// A transfer that passed every check, with its final amount and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTransfer {
    /// The transfer as it will be stored.
    pub transfer: Transfer,
    /// Debit account before the transfer.
    pub debit_account: Account,
    /// Credit account before the transfer.
    pub credit_account: Account,
    /// Pending transfer settled by a post or void.
    pub pending: Option<Transfer>,
}

/// A pending transfer found past its timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredPending {
    /// The pending transfer to expire.
    pub pending: Transfer,
    /// Its debit account.
    pub debit_account: Account,
    /// Its credit account.
    pub credit_account: Account,
}

/// Outcome of resolving one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Apply the transfer.
    Accepted(ResolvedTransfer),
    /// The referenced pending transfer timed out: release it and report
    /// `pending_transfer_expired`.
    Expired(ExpiredPending),
    /// Balancing left nothing to move; no error, no mutation.
    Skipped,
    /// The transfer is rejected without mutation.
    Rejected(CreateTransferError),
}

impl From<CreateTransferError> for Resolution {
    fn from(error: CreateTransferError) -> Self {
        Self::Rejected(error)
    }
}

/// Resolves transfers against a [`LedgerStore`].
pub struct TransferResolver;

impl TransferResolver {
    /// Resolves `transfer` as if accepted at `timestamp`.
    ///
    /// `timestamp` is the transfer's own timestamp when imported, otherwise
    /// the one the ledger would assign.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` only if a lookup fails; rule violations are
    /// reported as [`Resolution::Rejected`].
    pub fn resolve<S: LedgerStore + ?Sized>(
        store: &S,
        transfer: &Transfer,
        timestamp: u64,
    ) -> Result<Resolution, StoreError> {
        let Some(debit_account) = store.get_account(transfer.debit_account_id)? else {
            return Ok(CreateTransferError::DebitAccountNotFound.into());
        };
        let Some(credit_account) = store.get_account(transfer.credit_account_id)? else {
            return Ok(CreateTransferError::CreditAccountNotFound.into());
        };

        if debit_account.ledger != credit_account.ledger {
            return Ok(CreateTransferError::AccountsMustHaveTheSameLedger.into());
        }
        if transfer.ledger != debit_account.ledger {
            return Ok(CreateTransferError::TransferMustHaveTheSameLedgerAsAccounts.into());
        }

        let kind = transfer.kind();
        let settles_pending = matches!(kind, TransferKind::PostPending | TransferKind::VoidPending);

        // Post and void settle funds reserved before the account closed.
        if !settles_pending {
            if debit_account.is_closed() {
                return Ok(CreateTransferError::DebitAccountAlreadyClosed.into());
            }
            if credit_account.is_closed() {
                return Ok(CreateTransferError::CreditAccountAlreadyClosed.into());
            }
        }

        let mut resolved = transfer.clone();
        resolved.timestamp = timestamp;

        let pending = if settles_pending {
            match Self::check_pending(store, transfer, timestamp, &debit_account, &credit_account)? {
                Ok(pending) => Some(pending),
                Err(resolution) => return Ok(resolution),
            }
        } else {
            None
        };

        if transfer.is_balancing() {
            resolved.amount = transfer.amount.min(balancing_capacity(
                transfer.flags,
                &debit_account,
                &credit_account,
            ));
            if resolved.amount == 0 {
                return Ok(Resolution::Skipped);
            }
        }

        if !settles_pending
            && let Err(error) = check_limits(resolved.amount, &debit_account, &credit_account)
        {
            return Ok(error.into());
        }

        if let Err(error) = check_overflow(&resolved, kind, &debit_account, &credit_account) {
            return Ok(error.into());
        }

        if transfer.is_imported() {
            if timestamp <= debit_account.timestamp {
                return Ok(CreateTransferError::ImportedEventTimestampMustPostdateDebitAccount.into());
            }
            if timestamp <= credit_account.timestamp {
                return Ok(CreateTransferError::ImportedEventTimestampMustPostdateCreditAccount.into());
            }
            if let Some(pending) = &pending
                && timestamp <= pending.timestamp
            {
                return Ok(CreateTransferError::ImportedEventTimestampMustPostdatePendingTransfer.into());
            }
        }

        Ok(Resolution::Accepted(ResolvedTransfer {
            transfer: resolved,
            debit_account,
            credit_account,
            pending,
        }))
    }

    /// Loads and checks the pending transfer referenced by a post or void.
    fn check_pending<S: LedgerStore + ?Sized>(
        store: &S,
        transfer: &Transfer,
        timestamp: u64,
        debit_account: &Account,
        credit_account: &Account,
    ) -> Result<Result<Transfer, Resolution>, StoreError> {
        let Some(pending) = store.get_transfer(transfer.pending_id)? else {
            return Ok(Err(CreateTransferError::PendingTransferNotFound.into()));
        };
        if !pending.flags.contains(TransferFlags::PENDING) {
            return Ok(Err(CreateTransferError::PendingTransferNotPending.into()));
        }

        match store.get_pending_status(pending.id)? {
            Some(PendingStatus::Pending) => {}
            Some(PendingStatus::Posted) => {
                return Ok(Err(CreateTransferError::PendingTransferAlreadyPosted.into()));
            }
            Some(PendingStatus::Voided) => {
                return Ok(Err(CreateTransferError::PendingTransferAlreadyVoided.into()));
            }
            Some(PendingStatus::Expired) => {
                return Ok(Err(CreateTransferError::PendingTransferExpired.into()));
            }
            None => {
                return Err(StoreError::NotFound(format!(
                    "pending status of transfer {}",
                    pending.id
                )));
            }
        }

        if pending.expires_at().is_some_and(|expires_at| expires_at <= timestamp) {
            // The pending transfer's accounts are the ones loaded only if
            // the ids match; otherwise load its own.
            let (pending_debit, pending_credit) = if pending.debit_account_id == debit_account.id
                && pending.credit_account_id == credit_account.id
            {
                (debit_account.clone(), credit_account.clone())
            } else {
                let debit = store.get_account(pending.debit_account_id)?.ok_or_else(|| {
                    StoreError::NotFound(format!("account {}", pending.debit_account_id))
                })?;
                let credit = store.get_account(pending.credit_account_id)?.ok_or_else(|| {
                    StoreError::NotFound(format!("account {}", pending.credit_account_id))
                })?;
                (debit, credit)
            };
            return Ok(Err(Resolution::Expired(ExpiredPending {
                pending,
                debit_account: pending_debit,
                credit_account: pending_credit,
            })));
        }

        let mismatch = if pending.debit_account_id != transfer.debit_account_id {
            Some(CreateTransferError::PendingTransferHasDifferentDebitAccountId)
        } else if pending.credit_account_id != transfer.credit_account_id {
            Some(CreateTransferError::PendingTransferHasDifferentCreditAccountId)
        } else if pending.ledger != transfer.ledger {
            Some(CreateTransferError::PendingTransferHasDifferentLedger)
        } else if pending.code != transfer.code {
            Some(CreateTransferError::PendingTransferHasDifferentCode)
        } else if transfer.kind() == TransferKind::PostPending && transfer.amount > pending.amount {
            Some(CreateTransferError::ExceedsPendingTransferAmount)
        } else if transfer.kind() == TransferKind::VoidPending && transfer.amount != pending.amount {
            Some(CreateTransferError::PendingTransferHasDifferentAmount)
        } else {
            None
        };

        Ok(match mismatch {
            Some(error) => Err(error.into()),
            None => Ok(pending),
        })
    }
}

/// Returns how much a balancing transfer may move.
///
/// A debit-constrained account can be debited up to
/// `credits_posted - (debits_posted + debits_pending)`, floored at zero;
/// credit-constrained accounts mirror that. Unconstrained accounts are
/// unbounded.
#[must_use]
pub fn balancing_capacity(flags: TransferFlags, debit: &Account, credit: &Account) -> u128 {
    if flags.contains(TransferFlags::BALANCING_DEBIT) {
        if debit.flags.contains(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS) {
            return headroom(debit.credits_posted, debit.debits_posted, debit.debits_pending);
        }
    } else if flags.contains(TransferFlags::BALANCING_CREDIT)
        && credit.flags.contains(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS)
    {
        return headroom(credit.debits_posted, credit.credits_posted, credit.credits_pending);
    }
    u128::MAX
}

fn headroom(limit: u128, posted: u128, pending: u128) -> u128 {
    posted
        .checked_add(pending)
        .map_or(0, |used| limit.saturating_sub(used))
}

/// Enforces the accounts' balance constraints for a new debit or credit.
fn check_limits(amount: u128, debit: &Account, credit: &Account) -> Result<(), CreateTransferError> {
    if debit.flags.contains(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS) {
        let debits = debit
            .debits_pending
            .checked_add(debit.debits_posted)
            .and_then(|total| total.checked_add(amount));
        if debits.is_none_or(|total| total > debit.credits_posted) {
            return Err(CreateTransferError::ExceedsCredits);
        }
    }
    if credit.flags.contains(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS) {
        let credits = credit
            .credits_pending
            .checked_add(credit.credits_posted)
            .and_then(|total| total.checked_add(amount));
        if credits.is_none_or(|total| total > credit.debits_posted) {
            return Err(CreateTransferError::ExceedsDebits);
        }
    }
    Ok(())
}

/// Checks that applying the transfer keeps every total within `u128` and
/// its expiry within `u64`.
fn check_overflow(
    transfer: &Transfer,
    kind: TransferKind,
    debit: &Account,
    credit: &Account,
) -> Result<(), CreateTransferError> {
    let amount = transfer.amount;

    match kind {
        TransferKind::Pending => {
            if debit.debits_pending.checked_add(amount).is_none() {
                return Err(CreateTransferError::OverflowsDebitsPending);
            }
            if credit.credits_pending.checked_add(amount).is_none() {
                return Err(CreateTransferError::OverflowsCreditsPending);
            }
        }
        TransferKind::Single | TransferKind::PostPending => {
            if debit.debits_posted.checked_add(amount).is_none() {
                return Err(CreateTransferError::OverflowsDebitsPosted);
            }
            if credit.credits_posted.checked_add(amount).is_none() {
                return Err(CreateTransferError::OverflowsCreditsPosted);
            }
        }
        TransferKind::VoidPending => return Ok(()),
    }

    if kind != TransferKind::PostPending {
        let debits = debit
            .debits_pending
            .checked_add(debit.debits_posted)
            .and_then(|total| total.checked_add(amount));
        if debits.is_none() {
            return Err(CreateTransferError::OverflowsDebits);
        }
        let credits = credit
            .credits_pending
            .checked_add(credit.credits_posted)
            .and_then(|total| total.checked_add(amount));
        if credits.is_none() {
            return Err(CreateTransferError::OverflowsCredits);
        }
    }

    if kind == TransferKind::Pending && transfer.timeout != 0 && transfer.expires_at().is_none() {
        return Err(CreateTransferError::OverflowsTimeout);
    }

    Ok(())
}
