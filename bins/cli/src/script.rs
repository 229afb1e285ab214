//! JSON replay scripts.
//!
//! A script is a list of steps, each an externally tagged object:
//!
//! ```json
//! {"steps": [
//!   {"create_accounts": [{"id": 1, "ledger": 1, "code": 10}]},
//!   {"create_transfers": [{"id": 7, "debit_account_id": 1, "credit_account_id": 2, "amount": 5, "ledger": 1, "code": 1}]},
//!   {"lookup_accounts": [1, 2]}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use tally_core::id::Clock;
use tally_core::ledger::{
    Account, AccountBalance, CreateAccountError, CreateTransferError, IndexedResult,
    InMemoryStore, LedgerError, LedgerService, Transfer,
};
use tally_shared::{AccountId, TransferId};
use tracing::debug;

/// An ordered list of steps run against one in-memory ledger.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Steps, run in order.
    pub steps: Vec<Step>,
}

/// One ledger operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Create a batch of accounts.
    CreateAccounts(Vec<Account>),
    /// Create a batch of transfers.
    CreateTransfers(Vec<Transfer>),
    /// Look up accounts by id.
    LookupAccounts(Vec<AccountId>),
    /// Look up transfers by id.
    LookupTransfers(Vec<TransferId>),
    /// List the balance snapshots recorded for one account.
    AccountBalances(AccountId),
}

impl Step {
    /// Returns the step's operation name.
    pub const fn op(&self) -> &'static str {
        match self {
            Self::CreateAccounts(_) => "create_accounts",
            Self::CreateTransfers(_) => "create_transfers",
            Self::LookupAccounts(_) => "lookup_accounts",
            Self::LookupTransfers(_) => "lookup_transfers",
            Self::AccountBalances(_) => "account_balances",
        }
    }
}

/// Records produced by a successful step.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StepResults {
    /// Per-event account results.
    Accounts(Vec<IndexedResult<CreateAccountError>>),
    /// Per-event transfer results.
    Transfers(Vec<IndexedResult<CreateTransferError>>),
    /// Accounts found by a lookup.
    AccountRecords(Vec<Account>),
    /// Transfers found by a lookup.
    TransferRecords(Vec<Transfer>),
    /// Balance snapshots.
    Balances(Vec<AccountBalance>),
}

/// One output line.
#[derive(Debug, Serialize)]
pub struct StepOutput {
    /// Zero-based step position in the script.
    pub step: usize,
    /// Operation name.
    pub op: &'static str,
    /// Results, absent when the whole batch was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<StepResults>,
    /// Batch-level error code, present when the whole batch was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// A ledger held in memory for the length of one script.
#[derive(Debug)]
pub struct Replay<C: Clock> {
    service: LedgerService<C>,
    store: InMemoryStore,
}

impl<C: Clock> Replay<C> {
    /// Creates a replay over an empty store.
    pub fn new(service: LedgerService<C>) -> Self {
        Self::resume(service, InMemoryStore::new())
    }

    /// Creates a replay over `store`, assigning timestamps after the
    /// newest record already in it.
    pub fn resume(service: LedgerService<C>, store: InMemoryStore) -> Self {
        let service = service.with_last_timestamp(store.last_timestamp());
        Self { service, store }
    }

    /// Returns the backing store.
    pub const fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Runs one step.
    ///
    /// An oversized batch is reported in the output line and the script
    /// continues.
    ///
    /// # Errors
    ///
    /// Returns the store error if the store fails.
    pub fn run_step(&mut self, index: usize, step: &Step) -> Result<StepOutput, LedgerError> {
        debug!(step = index, op = step.op(), "Running step");
        let outcome = match step {
            Step::CreateAccounts(events) => self
                .service
                .create_accounts(&mut self.store, events)
                .map(StepResults::Accounts),
            Step::CreateTransfers(events) => self
                .service
                .create_transfers(&mut self.store, events)
                .map(StepResults::Transfers),
            Step::LookupAccounts(ids) => self
                .service
                .lookup_accounts(&self.store, ids)
                .map(StepResults::AccountRecords),
            Step::LookupTransfers(ids) => self
                .service
                .lookup_transfers(&self.store, ids)
                .map(StepResults::TransferRecords),
            Step::AccountBalances(id) => Ok(StepResults::Balances(
                self.store.account_balances(*id, ..),
            )),
        };

        let (results, error) = match outcome {
            Ok(results) => (Some(results), None),
            Err(e @ LedgerError::BatchTooLarge { .. }) => (None, Some(e.error_code())),
            Err(e) => return Err(e),
        };

        Ok(StepOutput {
            step: index,
            op: step.op(),
            results,
            error,
        })
    }
}
