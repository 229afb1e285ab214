//! Field validation for create requests.
//!
//! These checks look at a single event in isolation. They run before any
//! store lookup and report the first violated rule in a fixed order, so the
//! same malformed event always yields the same error.

use super::error::{CreateAccountError, CreateTransferError};
use super::types::{Account, AccountFlags, Transfer, TransferFlags, TransferKind};

/// Validates a create-account request.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_account(account: &Account) -> Result<(), CreateAccountError> {
    if account.id.is_zero() {
        return Err(CreateAccountError::IdMustNotBeZero);
    }
    if account.id.is_max() {
        return Err(CreateAccountError::IdMustNotBeIntMax);
    }

    if account.is_imported() {
        if account.timestamp == 0 {
            return Err(CreateAccountError::ImportedEventTimestampOutOfRange);
        }
    } else if account.timestamp != 0 {
        return Err(CreateAccountError::TimestampMustBeZero);
    }

    if account.reserved != 0 {
        return Err(CreateAccountError::ReservedField);
    }
    if account.ledger == 0 {
        return Err(CreateAccountError::LedgerMustNotBeZero);
    }
    if account.code == 0 {
        return Err(CreateAccountError::CodeMustNotBeZero);
    }

    if account.debits_pending != 0 {
        return Err(CreateAccountError::DebitsPendingMustBeZero);
    }
    if account.debits_posted != 0 {
        return Err(CreateAccountError::DebitsPostedMustBeZero);
    }
    if account.credits_pending != 0 {
        return Err(CreateAccountError::CreditsPendingMustBeZero);
    }
    if account.credits_posted != 0 {
        return Err(CreateAccountError::CreditsPostedMustBeZero);
    }

    if account.flags.has_reserved_bits() {
        return Err(CreateAccountError::ReservedFlag);
    }
    if account.flags.contains(
        AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS | AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS,
    ) {
        return Err(CreateAccountError::FlagsAreMutuallyExclusive);
    }

    Ok(())
}

/// Validates a create-transfer request.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_transfer(transfer: &Transfer) -> Result<(), CreateTransferError> {
    if transfer.id.is_zero() {
        return Err(CreateTransferError::IdMustNotBeZero);
    }
    if transfer.id.is_max() {
        return Err(CreateTransferError::IdMustNotBeIntMax);
    }

    if transfer.is_imported() {
        if transfer.timestamp == 0 {
            return Err(CreateTransferError::ImportedEventTimestampOutOfRange);
        }
    } else if transfer.timestamp != 0 {
        return Err(CreateTransferError::TimestampMustBeZero);
    }

    if transfer.ledger == 0 {
        return Err(CreateTransferError::LedgerMustNotBeZero);
    }
    if transfer.code == 0 {
        return Err(CreateTransferError::CodeMustNotBeZero);
    }

    if transfer.flags.has_reserved_bits() {
        return Err(CreateTransferError::ReservedFlag);
    }
    if flags_conflict(transfer.flags) {
        return Err(CreateTransferError::FlagsAreMutuallyExclusive);
    }

    if transfer.debit_account_id.is_zero() {
        return Err(CreateTransferError::DebitAccountIdMustNotBeZero);
    }
    if transfer.debit_account_id.is_max() {
        return Err(CreateTransferError::DebitAccountIdMustNotBeIntMax);
    }
    if transfer.credit_account_id.is_zero() {
        return Err(CreateTransferError::CreditAccountIdMustNotBeZero);
    }
    if transfer.credit_account_id.is_max() {
        return Err(CreateTransferError::CreditAccountIdMustNotBeIntMax);
    }
    if transfer.debit_account_id == transfer.credit_account_id {
        return Err(CreateTransferError::AccountsMustBeDifferent);
    }

    let kind = transfer.kind();
    match kind {
        TransferKind::PostPending | TransferKind::VoidPending => {
            if transfer.pending_id.is_zero() {
                return Err(CreateTransferError::PendingIdMustNotBeZero);
            }
            if transfer.pending_id.is_max() {
                return Err(CreateTransferError::PendingIdMustNotBeIntMax);
            }
            if transfer.pending_id.as_u128() == transfer.id.as_u128() {
                return Err(CreateTransferError::PendingIdMustBeDifferent);
            }
        }
        TransferKind::Single | TransferKind::Pending => {
            if !transfer.pending_id.is_zero() {
                return Err(CreateTransferError::PendingIdMustBeZero);
            }
        }
    }

    if transfer.timeout != 0 {
        if kind != TransferKind::Pending {
            return Err(CreateTransferError::TimeoutReservedForPendingTransfer);
        }
        if transfer.is_imported() {
            return Err(CreateTransferError::ImportedEventTimeoutMustBeZero);
        }
    }

    if kind != TransferKind::Pending {
        if transfer.flags.contains(TransferFlags::CLOSING_DEBIT) {
            return Err(CreateTransferError::ClosingDebitRequiresPending);
        }
        if transfer.flags.contains(TransferFlags::CLOSING_CREDIT) {
            return Err(CreateTransferError::ClosingCreditRequiresPending);
        }
    }

    if transfer.amount == 0 {
        return Err(CreateTransferError::AmountMustNotBeZero);
    }

    Ok(())
}

/// Returns true if flags that exclude each other are set together.
fn flags_conflict(flags: TransferFlags) -> bool {
    let two_phase = flags.bits() & TransferFlags::TWO_PHASE.bits();
    if two_phase.count_ones() > 1 {
        return true;
    }
    if flags.contains(TransferFlags::BALANCING) || flags.contains(TransferFlags::CLOSING) {
        return true;
    }
    flags.intersects(TransferFlags::BALANCING)
        && flags.intersects(TransferFlags::POST_PENDING_TRANSFER | TransferFlags::VOID_PENDING_TRANSFER)
}
