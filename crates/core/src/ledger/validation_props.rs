//! Property-based tests for field validation.
//!
//! - Property 1: Id checks take priority over every other field
//! - Property 2: Well-formed events always pass
//! - Property 3: Validation is deterministic

use proptest::prelude::*;
use tally_shared::types::{AccountId, TransferId};

use super::error::{CreateAccountError, CreateTransferError};
use super::types::{Account, AccountFlags, Transfer, TransferFlags};
use super::validation::{validate_account, validate_transfer};

/// Strategy for an account with arbitrary (mostly invalid) fields.
fn any_account() -> impl Strategy<Value = Account> {
    (
        any::<u128>(),
        any::<u32>(),
        any::<u16>(),
        any::<u16>(),
        any::<u32>(),
        any::<u64>(),
        any::<u128>(),
    )
        .prop_map(|(id, ledger, code, flags, reserved, timestamp, debits_posted)| Account {
            id: AccountId(id),
            ledger,
            code,
            flags: AccountFlags(flags),
            reserved,
            timestamp,
            debits_posted,
            ..Account::default()
        })
}

/// Strategy for a transfer with arbitrary (mostly invalid) fields.
fn any_transfer() -> impl Strategy<Value = Transfer> {
    (
        any::<u128>(),
        0u128..4,
        0u128..4,
        any::<u128>(),
        any::<u16>(),
        any::<u32>(),
        any::<u32>(),
        any::<u16>(),
    )
        .prop_map(|(id, debit, credit, amount, flags, timeout, ledger, code)| Transfer {
            id: TransferId(id),
            debit_account_id: AccountId(debit),
            credit_account_id: AccountId(credit),
            amount,
            flags: TransferFlags(flags),
            timeout,
            ledger,
            code,
            ..Transfer::default()
        })
}

/// Strategy for a valid non-zero id.
fn valid_id() -> impl Strategy<Value = u128> {
    1u128..u128::MAX
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Id Priority
    // =========================================================================

    /// *For any* account whose id is zero, the error is `id_must_not_be_zero`
    /// whatever else is wrong with it.
    #[test]
    fn prop_account_zero_id_wins(account in any_account()) {
        let account = Account { id: AccountId::ZERO, ..account };
        prop_assert_eq!(validate_account(&account), Err(CreateAccountError::IdMustNotBeZero));
    }

    /// *For any* transfer whose id is the reserved maximum, the error is
    /// `id_must_not_be_int_max`.
    #[test]
    fn prop_transfer_max_id_wins(transfer in any_transfer()) {
        let transfer = Transfer { id: TransferId::MAX, ..transfer };
        prop_assert_eq!(validate_transfer(&transfer), Err(CreateTransferError::IdMustNotBeIntMax));
    }

    // =========================================================================
    // Property 2: Well-Formed Events Pass
    // =========================================================================

    /// *For any* account with a valid id, non-zero ledger and code, zero
    /// balances and a single constraint flag, validation succeeds.
    #[test]
    fn prop_well_formed_account_passes(
        id in valid_id(),
        ledger in 1u32..,
        code in 1u16..,
        constraint in prop_oneof![
            Just(AccountFlags::NONE),
            Just(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS),
            Just(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS),
        ],
        history in any::<bool>(),
    ) {
        let mut flags = constraint;
        if history {
            flags |= AccountFlags::HISTORY;
        }
        let account = Account { id: AccountId(id), ledger, code, flags, ..Account::default() };
        prop_assert_eq!(validate_account(&account), Ok(()));
    }

    /// *For any* single-phase transfer between distinct valid accounts with a
    /// non-zero amount, validation succeeds.
    #[test]
    fn prop_well_formed_transfer_passes(
        id in valid_id(),
        debit in valid_id(),
        credit in valid_id(),
        amount in 1u128..,
        ledger in 1u32..,
        code in 1u16..,
    ) {
        prop_assume!(debit != credit);
        let transfer = Transfer {
            id: TransferId(id),
            debit_account_id: AccountId(debit),
            credit_account_id: AccountId(credit),
            amount,
            ledger,
            code,
            ..Transfer::default()
        };
        prop_assert_eq!(validate_transfer(&transfer), Ok(()));
    }

    // =========================================================================
    // Property 3: Determinism
    // =========================================================================

    /// *For any* transfer, validating twice yields the same outcome.
    #[test]
    fn prop_transfer_validation_is_deterministic(transfer in any_transfer()) {
        prop_assert_eq!(validate_transfer(&transfer), validate_transfer(&transfer));
    }

    /// *For any* transfer with reserved flag bits and otherwise valid
    /// identity fields, the error is `reserved_flag`.
    #[test]
    fn prop_reserved_flag_bits_rejected(
        transfer in any_transfer(),
        id in valid_id(),
        extra in 9u16..16,
    ) {
        let transfer = Transfer {
            id: TransferId(id),
            timestamp: 0,
            ledger: 1,
            code: 1,
            flags: TransferFlags((transfer.flags.bits() & !TransferFlags::IMPORTED.bits()) | (1 << extra)),
            ..transfer
        };
        prop_assert_eq!(validate_transfer(&transfer), Err(CreateTransferError::ReservedFlag));
    }
}
