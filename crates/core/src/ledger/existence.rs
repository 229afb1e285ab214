//! Reconciliation of a create request against an already stored record.
//!
//! Creating an id that already exists is never an update. An identical
//! request is reported as the benign `exists`; otherwise the first differing
//! field is named.

use super::error::{CreateAccountError, CreateTransferError};
use super::types::{Account, AccountFlags, Transfer};

/// Classifies a create-account request whose id is already taken.
///
/// `closed` is account state rather than a creation attribute, so it is
/// ignored when comparing flags.
#[must_use]
pub fn reconcile_account(request: &Account, existing: &Account) -> CreateAccountError {
    let request_flags = request.flags.without(AccountFlags::CLOSED);
    let existing_flags = existing.flags.without(AccountFlags::CLOSED);

    if request_flags != existing_flags {
        CreateAccountError::ExistsWithDifferentFlags
    } else if request.user_data_128 != existing.user_data_128 {
        CreateAccountError::ExistsWithDifferentUserData128
    } else if request.user_data_64 != existing.user_data_64 {
        CreateAccountError::ExistsWithDifferentUserData64
    } else if request.user_data_32 != existing.user_data_32 {
        CreateAccountError::ExistsWithDifferentUserData32
    } else if request.ledger != existing.ledger {
        CreateAccountError::ExistsWithDifferentLedger
    } else if request.code != existing.code {
        CreateAccountError::ExistsWithDifferentCode
    } else {
        CreateAccountError::Exists
    }
}

/// Classifies a create-transfer request whose id is already taken.
///
/// A balancing transfer is stored with the amount actually applied, which
/// may be less than requested; only a stored amount above the request is a
/// mismatch.
#[must_use]
pub fn reconcile_transfer(request: &Transfer, existing: &Transfer) -> CreateTransferError {
    if request.flags != existing.flags {
        return CreateTransferError::ExistsWithDifferentFlags;
    }
    if request.user_data_128 != existing.user_data_128 {
        return CreateTransferError::ExistsWithDifferentUserData128;
    }
    if request.user_data_64 != existing.user_data_64 {
        return CreateTransferError::ExistsWithDifferentUserData64;
    }
    if request.user_data_32 != existing.user_data_32 {
        return CreateTransferError::ExistsWithDifferentUserData32;
    }
    if request.ledger != existing.ledger {
        return CreateTransferError::ExistsWithDifferentLedger;
    }
    if request.code != existing.code {
        return CreateTransferError::ExistsWithDifferentCode;
    }
    if request.debit_account_id != existing.debit_account_id {
        return CreateTransferError::ExistsWithDifferentDebitAccountId;
    }
    if request.credit_account_id != existing.credit_account_id {
        return CreateTransferError::ExistsWithDifferentCreditAccountId;
    }

    let amount_differs = if request.is_balancing() {
        existing.amount > request.amount
    } else {
        existing.amount != request.amount
    };
    if amount_differs {
        return CreateTransferError::ExistsWithDifferentAmount;
    }

    if request.pending_id != existing.pending_id {
        return CreateTransferError::ExistsWithDifferentPendingId;
    }
    if request.timeout != existing.timeout {
        return CreateTransferError::ExistsWithDifferentTimeout;
    }

    CreateTransferError::Exists
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::TransferFlags;
    use rstest::rstest;
    use tally_shared::types::{AccountId, TransferId};

    fn account() -> Account {
        Account {
            id: AccountId(1),
            ledger: 1,
            code: 1,
            user_data_64: 7,
            ..Account::default()
        }
    }

    fn transfer() -> Transfer {
        Transfer {
            id: TransferId(1),
            debit_account_id: AccountId(1),
            credit_account_id: AccountId(2),
            amount: 100,
            ledger: 1,
            code: 1,
            ..Transfer::default()
        }
    }

    #[test]
    fn test_identical_account_exists() {
        let stored = Account {
            timestamp: 99,
            credits_posted: 500,
            ..account()
        };
        assert_eq!(reconcile_account(&account(), &stored), CreateAccountError::Exists);
    }

    #[test]
    fn test_closed_account_still_exists() {
        let stored = Account {
            flags: AccountFlags::CLOSED,
            ..account()
        };
        assert_eq!(reconcile_account(&account(), &stored), CreateAccountError::Exists);
    }

    #[test]
    fn test_flags_checked_before_user_data() {
        let request = Account {
            flags: AccountFlags::HISTORY,
            user_data_128: 5,
            ..account()
        };
        assert_eq!(
            reconcile_account(&request, &account()),
            CreateAccountError::ExistsWithDifferentFlags
        );
    }

    #[rstest]
    #[case(Account { user_data_128: 1, ..account() }, CreateAccountError::ExistsWithDifferentUserData128)]
    #[case(Account { user_data_64: 1, ..account() }, CreateAccountError::ExistsWithDifferentUserData64)]
    #[case(Account { user_data_32: 1, ..account() }, CreateAccountError::ExistsWithDifferentUserData32)]
    #[case(Account { ledger: 2, ..account() }, CreateAccountError::ExistsWithDifferentLedger)]
    #[case(Account { code: 2, ..account() }, CreateAccountError::ExistsWithDifferentCode)]
    fn test_account_mismatch(#[case] request: Account, #[case] expected: CreateAccountError) {
        assert_eq!(reconcile_account(&request, &account()), expected);
    }

    #[rstest]
    #[case(Transfer { flags: TransferFlags::LINKED, ..transfer() }, CreateTransferError::ExistsWithDifferentFlags)]
    #[case(Transfer { user_data_32: 3, ..transfer() }, CreateTransferError::ExistsWithDifferentUserData32)]
    #[case(Transfer { debit_account_id: AccountId(9), ..transfer() }, CreateTransferError::ExistsWithDifferentDebitAccountId)]
    #[case(Transfer { credit_account_id: AccountId(9), ..transfer() }, CreateTransferError::ExistsWithDifferentCreditAccountId)]
    #[case(Transfer { amount: 99, ..transfer() }, CreateTransferError::ExistsWithDifferentAmount)]
    #[case(Transfer { pending_id: TransferId(4), ..transfer() }, CreateTransferError::ExistsWithDifferentPendingId)]
    #[case(Transfer { timeout: 4, ..transfer() }, CreateTransferError::ExistsWithDifferentTimeout)]
    #[case(transfer(), CreateTransferError::Exists)]
    fn test_transfer_mismatch(#[case] request: Transfer, #[case] expected: CreateTransferError) {
        assert_eq!(reconcile_transfer(&request, &transfer()), expected);
    }

    #[test]
    fn test_balancing_amount_may_have_been_capped() {
        let stored = Transfer {
            flags: TransferFlags::BALANCING_DEBIT,
            amount: 1_000,
            ..transfer()
        };
        let request = Transfer {
            amount: 2_000,
            ..stored.clone()
        };
        assert_eq!(reconcile_transfer(&request, &stored), CreateTransferError::Exists);

        let smaller = Transfer {
            amount: 500,
            ..stored.clone()
        };
        assert_eq!(
            reconcile_transfer(&smaller, &stored),
            CreateTransferError::ExistsWithDifferentAmount
        );
    }
}
