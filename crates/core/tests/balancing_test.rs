//! Integration tests for balancing transfers and balance constraints.

mod common;

use common::*;
use tally_core::ledger::{AccountFlags, Applied, Transfer, TransferFlags};

fn balancing_debit(id: u128, debit: u128, credit: u128, amount: u128) -> Transfer {
    Transfer {
        flags: TransferFlags::BALANCING_DEBIT,
        ..transfer(id, debit, credit, amount)
    }
}

#[test]
fn test_balancing_debit_caps_to_available_credits() {
    let mut ledger = TestLedger::new();
    ledger.open(&[
        account_with(1, AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS),
        account(2),
        account(3),
    ]);
    // Seed X (account 1) with 1000 credits.
    assert_eq!(codes(&ledger.transfers(&[transfer(10, 3, 1, 1_000)])), vec![None]);

    let results = ledger.transfers(&[balancing_debit(11, 1, 2, 2_000)]);
    assert_eq!(codes(&results), vec![None]);
    assert_eq!(ledger.transfer(11).map(|t| t.amount), Some(1_000));

    let x = ledger.account(1);
    assert_eq!(x.debits_posted, 1_000);
    assert_eq!(x.credits_posted, 1_000);
}

#[test]
fn test_balancing_with_nothing_available_is_skipped() {
    let mut ledger = TestLedger::new();
    ledger.open(&[
        account_with(1, AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS),
        account(2),
    ]);

    let results = ledger.transfers(&[balancing_debit(11, 1, 2, 2_000)]);
    assert_eq!(results[0].result, Ok(Applied::Skipped));
    assert!(ledger.transfer(11).is_none());
    assert_eq!(ledger.account(1).debits_posted, 0);
}

#[test]
fn test_balancing_accounts_for_pending_debits() {
    let mut ledger = TestLedger::new();
    ledger.open(&[
        account_with(1, AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS),
        account(2),
    ]);
    ledger.transfers(&[transfer(10, 2, 1, 1_000), pending(11, 1, 2, 700)]);

    ledger.transfers(&[balancing_debit(12, 1, 2, 1_000)]);
    assert_eq!(ledger.transfer(12).map(|t| t.amount), Some(300));
}

#[test]
fn test_balancing_credit_caps_to_available_debits() {
    let mut ledger = TestLedger::new();
    ledger.open(&[
        account(1),
        account_with(2, AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS),
    ]);
    ledger.transfers(&[transfer(10, 2, 1, 250)]);

    let results = ledger.transfers(&[Transfer {
        flags: TransferFlags::BALANCING_CREDIT,
        ..transfer(11, 1, 2, 400)
    }]);
    assert_eq!(codes(&results), vec![None]);
    assert_eq!(ledger.transfer(11).map(|t| t.amount), Some(250));
}

#[test]
fn test_balancing_unconstrained_account_moves_full_amount() {
    let mut ledger = TestLedger::new();
    ledger.open(&[account(1), account(2)]);
    ledger.transfers(&[balancing_debit(11, 1, 2, 2_000)]);
    assert_eq!(ledger.transfer(11).map(|t| t.amount), Some(2_000));
}

#[test]
fn test_constraints_reject_overdraw() {
    let mut ledger = TestLedger::new();
    ledger.open(&[
        account_with(1, AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS),
        account_with(2, AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS),
        account(3),
    ]);
    ledger.transfers(&[transfer(10, 3, 1, 100)]);

    let results = ledger.transfers(&[
        transfer(11, 1, 3, 101),
        transfer(12, 3, 2, 1),
        pending(13, 1, 3, 60),
        transfer(14, 1, 3, 41),
        transfer(15, 1, 3, 40),
    ]);
    assert_eq!(
        codes(&results),
        vec![
            Some("exceeds_credits".into()),
            Some("exceeds_debits".into()),
            None,
            Some("exceeds_credits".into()),
            None,
        ]
    );
}

#[test]
fn test_replayed_balancing_transfer_exists() {
    let mut ledger = TestLedger::new();
    ledger.open(&[
        account_with(1, AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS),
        account(2),
    ]);
    ledger.transfers(&[transfer(10, 2, 1, 1_000)]);
    ledger.transfers(&[balancing_debit(11, 1, 2, 2_000)]);

    let replay = ledger.transfers(&[balancing_debit(11, 1, 2, 2_000)]);
    assert_eq!(codes(&replay), vec![Some("exists".into())]);
}
