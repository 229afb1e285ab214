//! Property-based tests for LedgerService.
//!
//! - Property 1: Debits equal credits across all accounts
//! - Property 2: Balance constraints are never violated
//! - Property 3: Replaying created transfers is idempotent
//! - Property 4: A failing linked chain leaves no trace

use proptest::prelude::*;
use tally_shared::LedgerConfig;
use tally_shared::types::{AccountId, TransferId};

use super::error::CreateTransferError;
use super::service::LedgerService;
use super::store::InMemoryStore;
use super::types::{Account, AccountFlags, Transfer, TransferFlags};
use crate::id::ManualClock;

const ACCOUNTS: u128 = 4;

/// A transfer request before ids are assigned.
#[derive(Debug, Clone)]
struct Op {
    debit: u128,
    credit: u128,
    amount: u128,
    flags: TransferFlags,
    settle: Option<usize>,
}

/// Strategy for transfer requests between the fixture accounts.
fn op_strategy() -> impl Strategy<Value = Op> {
    (
        1..=ACCOUNTS,
        1..=ACCOUNTS,
        1u128..1_000,
        prop_oneof![
            Just(TransferFlags::NONE),
            Just(TransferFlags::PENDING),
            Just(TransferFlags::BALANCING_DEBIT),
            Just(TransferFlags::BALANCING_CREDIT),
            Just(TransferFlags::POST_PENDING_TRANSFER),
            Just(TransferFlags::VOID_PENDING_TRANSFER),
        ],
        any::<prop::sample::Index>(),
    )
        .prop_map(|(debit, credit, amount, flags, index)| Op {
            debit,
            credit,
            amount,
            flags,
            settle: Some(index.index(usize::MAX)),
        })
}

/// Accounts 1-2 may not overdraw, 3 may not over-credit, 4 is free.
fn fixture() -> (LedgerService<ManualClock>, InMemoryStore) {
    let mut ledger = LedgerService::with_clock(LedgerConfig::default(), ManualClock::new(1_000));
    let mut store = InMemoryStore::new();
    let flags = [
        AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS,
        AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS | AccountFlags::HISTORY,
        AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS,
        AccountFlags::NONE,
    ];
    let accounts: Vec<Account> = (1..=ACCOUNTS)
        .zip(flags)
        .map(|(id, flags)| Account {
            id: AccountId(id),
            ledger: 1,
            code: 1,
            flags,
            ..Account::default()
        })
        .collect();
    let results = ledger.create_accounts(&mut store, &accounts).unwrap();
    assert!(results.iter().all(|r| r.is_created()));
    (ledger, store)
}

/// Turns ops into transfers; post/void reference an earlier op's id.
fn build(ops: &[Op], first_id: u128) -> Vec<Transfer> {
    ops.iter()
        .enumerate()
        .map(|(i, op)| {
            let id = first_id + i as u128;
            let settles = op
                .flags
                .intersects(TransferFlags::POST_PENDING_TRANSFER | TransferFlags::VOID_PENDING_TRANSFER);
            let pending_id = match op.settle {
                Some(target) if settles && i > 0 => TransferId(first_id + (target % i) as u128),
                _ if settles => TransferId(first_id + 10_000),
                _ => TransferId::ZERO,
            };
            Transfer {
                id: TransferId(id),
                debit_account_id: AccountId(op.debit),
                credit_account_id: AccountId(op.credit),
                amount: op.amount,
                pending_id,
                ledger: 1,
                code: 1,
                flags: op.flags,
                ..Transfer::default()
            }
        })
        .collect()
}

fn totals(store: &InMemoryStore) -> (u128, u128, u128, u128) {
    store.accounts().fold((0, 0, 0, 0), |acc, a| {
        (
            acc.0 + a.debits_pending,
            acc.1 + a.debits_posted,
            acc.2 + a.credits_pending,
            acc.3 + a.credits_posted,
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: Double-Entry Conservation
    ///
    /// *For any* sequence of transfers, total debits equal total credits,
    /// both pending and posted.
    #[test]
    fn prop_debits_equal_credits(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut ledger, mut store) = fixture();
        let transfers = build(&ops, 100);
        ledger.create_transfers(&mut store, &transfers).unwrap();

        let (debits_pending, debits_posted, credits_pending, credits_posted) = totals(&store);
        prop_assert_eq!(debits_pending, credits_pending);
        prop_assert_eq!(debits_posted, credits_posted);
    }

    /// Property 2: Balance Constraints Hold
    ///
    /// *For any* sequence of transfers, a debit-constrained account never
    /// has more debits than posted credits, and symmetrically.
    #[test]
    fn prop_constraints_never_violated(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut ledger, mut store) = fixture();
        let transfers = build(&ops, 100);
        ledger.create_transfers(&mut store, &transfers).unwrap();

        for account in store.accounts() {
            if account.flags.contains(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS) {
                prop_assert!(account.debits_pending + account.debits_posted <= account.credits_posted);
            }
            if account.flags.contains(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS) {
                prop_assert!(account.credits_pending + account.credits_posted <= account.debits_posted);
            }
        }
    }

    /// Property 3: Idempotent Replay
    ///
    /// *For any* batch, resubmitting the transfers that were created changes
    /// no balance and every one of them reports `exists`.
    #[test]
    fn prop_replay_is_idempotent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (mut ledger, mut store) = fixture();
        let transfers = build(&ops, 100);
        let first = ledger.create_transfers(&mut store, &transfers).unwrap();
        let created: Vec<Transfer> = transfers
            .iter()
            .zip(&first)
            .filter(|(_, result)| result.is_created())
            .map(|(transfer, _)| transfer.clone())
            .collect();
        let accounts_before: Vec<Account> = store.accounts().cloned().collect();
        let transfer_count = store.transfers().count();

        let second = ledger.create_transfers(&mut store, &created).unwrap();
        let accounts_after: Vec<Account> = store.accounts().cloned().collect();

        prop_assert_eq!(accounts_before, accounts_after);
        prop_assert_eq!(transfer_count, store.transfers().count());
        for result in &second {
            prop_assert_eq!(result.error(), Some(&CreateTransferError::Exists));
        }
    }

    /// Property 4: Chain Atomicity
    ///
    /// *For any* linked chain whose last member fails, no member is
    /// applied and every other member reports `linked_event_failed`.
    #[test]
    fn prop_failed_chain_leaves_no_trace(amounts in prop::collection::vec(1u128..1_000, 1..10)) {
        let (mut ledger, mut store) = fixture();
        let mut chain: Vec<Transfer> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| Transfer {
                id: TransferId(500 + i as u128),
                debit_account_id: AccountId(4),
                credit_account_id: AccountId(1),
                amount: *amount,
                ledger: 1,
                code: 1,
                flags: TransferFlags::LINKED,
                ..Transfer::default()
            })
            .collect();
        // Account 1 has no credits beyond the chain, which never lands.
        chain.push(Transfer {
            id: TransferId(999),
            debit_account_id: AccountId(1),
            credit_account_id: AccountId(4),
            amount: u128::from(u64::MAX),
            ledger: 1,
            code: 1,
            ..Transfer::default()
        });

        let results = ledger.create_transfers(&mut store, &chain).unwrap();
        let last = results.len() - 1;
        prop_assert_eq!(results[last].error(), Some(&CreateTransferError::ExceedsCredits));
        for result in &results[..last] {
            prop_assert_eq!(result.error(), Some(&CreateTransferError::LinkedEventFailed));
        }
        prop_assert_eq!(store.transfers().count(), 0);
        prop_assert_eq!(totals(&store), (0, 0, 0, 0));
    }
}
