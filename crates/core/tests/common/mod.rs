//! Shared fixtures for ledger integration tests.

#![allow(dead_code)]

use tally_core::id::ManualClock;
use tally_core::ledger::{
    Account, AccountFlags, Applied, IndexedResult, InMemoryStore, LedgerService, Transfer,
    TransferFlags,
};
use tally_shared::LedgerConfig;
use tally_shared::types::{AccountId, TransferId};

/// Clock reading at the start of every test, in nanoseconds.
pub const START_NS: u64 = 1_700_000_000_000_000_000;

/// A ledger over an empty in-memory store.
pub struct TestLedger {
    pub service: LedgerService<ManualClock>,
    pub store: InMemoryStore,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            service: LedgerService::with_clock(config, ManualClock::new(START_NS)),
            store: InMemoryStore::new(),
        }
    }

    /// Creates accounts and asserts they were all created.
    pub fn open(&mut self, accounts: &[Account]) {
        let results = self.service.create_accounts(&mut self.store, accounts).unwrap();
        assert!(results.iter().all(IndexedResult::is_created), "{results:?}");
    }

    pub fn accounts(
        &mut self,
        accounts: &[Account],
    ) -> Vec<IndexedResult<tally_core::ledger::CreateAccountError>> {
        self.service.create_accounts(&mut self.store, accounts).unwrap()
    }

    pub fn transfers(
        &mut self,
        transfers: &[Transfer],
    ) -> Vec<IndexedResult<tally_core::ledger::CreateTransferError>> {
        self.service.create_transfers(&mut self.store, transfers).unwrap()
    }

    pub fn account(&self, id: u128) -> Account {
        self.service
            .lookup_accounts(&self.store, &[AccountId(id)])
            .unwrap()
            .pop()
            .expect("account exists")
    }

    pub fn transfer(&self, id: u128) -> Option<Transfer> {
        self.service
            .lookup_transfers(&self.store, &[TransferId(id)])
            .unwrap()
            .pop()
    }
}

pub fn account(id: u128) -> Account {
    Account {
        id: AccountId(id),
        ledger: 1,
        code: 10,
        ..Account::default()
    }
}

pub fn account_with(id: u128, flags: AccountFlags) -> Account {
    Account { flags, ..account(id) }
}

pub fn transfer(id: u128, debit: u128, credit: u128, amount: u128) -> Transfer {
    Transfer {
        id: TransferId(id),
        debit_account_id: AccountId(debit),
        credit_account_id: AccountId(credit),
        amount,
        ledger: 1,
        code: 1,
        ..Transfer::default()
    }
}

pub fn pending(id: u128, debit: u128, credit: u128, amount: u128) -> Transfer {
    Transfer {
        flags: TransferFlags::PENDING,
        ..transfer(id, debit, credit, amount)
    }
}

pub fn post(id: u128, pending_id: u128, debit: u128, credit: u128, amount: u128) -> Transfer {
    Transfer {
        flags: TransferFlags::POST_PENDING_TRANSFER,
        pending_id: TransferId(pending_id),
        ..transfer(id, debit, credit, amount)
    }
}

pub fn void(id: u128, pending_id: u128, debit: u128, credit: u128, amount: u128) -> Transfer {
    Transfer {
        flags: TransferFlags::VOID_PENDING_TRANSFER,
        pending_id: TransferId(pending_id),
        ..transfer(id, debit, credit, amount)
    }
}

pub fn linked(mut transfer: Transfer) -> Transfer {
    transfer.flags |= TransferFlags::LINKED;
    transfer
}

/// Maps results to their error codes, `None` for success.
pub fn codes<E: serde::Serialize>(results: &[IndexedResult<E>]) -> Vec<Option<String>> {
    results
        .iter()
        .map(|r| {
            r.result
                .as_ref()
                .err()
                .map(|e| serde_json::to_value(e).unwrap().as_str().unwrap().to_string())
        })
        .collect()
}

/// Returns the timestamp of a created result.
pub fn created_at<E: std::fmt::Debug>(result: &IndexedResult<E>) -> u64 {
    match result.result {
        Ok(Applied::Created { timestamp }) => timestamp,
        ref other => panic!("expected creation, got {other:?}"),
    }
}
