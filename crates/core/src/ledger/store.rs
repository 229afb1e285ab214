//! Storage collaborator for the ledger.
//!
//! The core never talks to a database directly. It reads records through
//! [`LedgerStore`] and describes every write as a [`Mutation`]. Callers wrap
//! a batch in a serializable transaction of their backend; within the batch,
//! [`Scratch`] overlays give events and linked chains all-or-nothing
//! semantics.

use std::collections::BTreeMap;
use std::ops::RangeBounds;

use tally_shared::types::{AccountId, TransferId};
use thiserror::Error;

use super::types::{Account, AccountBalance, AccountFlags, PendingStatus, Transfer};

/// Errors raised by a [`LedgerStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A mutation referenced a record that does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// An insert collided with an existing record.
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// The stored state changed underneath the caller.
    #[error("Conflicting update: {0}")]
    Conflict(String),

    /// Applying a mutation would break a balance invariant.
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// The backend failed.
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Change to one balance field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BalanceChange {
    /// Field is untouched.
    #[default]
    None,
    /// Field grows by the amount.
    Add(u128),
    /// Field shrinks by the amount.
    Sub(u128),
}

impl BalanceChange {
    fn apply(self, field: &'static str, value: u128) -> Result<u128, StoreError> {
        match self {
            Self::None => Ok(value),
            Self::Add(amount) => value
                .checked_add(amount)
                .ok_or_else(|| StoreError::Invariant(format!("{field} overflows"))),
            Self::Sub(amount) => value
                .checked_sub(amount)
                .ok_or_else(|| StoreError::Invariant(format!("{field} underflows"))),
        }
    }
}

/// In-place update of an account's balances and state flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDelta {
    /// Account to update.
    pub id: AccountId,
    /// Change to `debits_pending`.
    pub debits_pending: BalanceChange,
    /// Change to `debits_posted`.
    pub debits_posted: BalanceChange,
    /// Change to `credits_pending`.
    pub credits_pending: BalanceChange,
    /// Change to `credits_posted`.
    pub credits_posted: BalanceChange,
    /// Flags to set.
    pub flags_set: AccountFlags,
    /// Flags to clear.
    pub flags_clear: AccountFlags,
}

impl AccountDelta {
    /// Creates an empty delta for `id`.
    #[must_use]
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Applies the delta to `account`, leaving it untouched on error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invariant` if a balance would leave the `u128`
    /// range.
    pub fn apply_to(&self, account: &mut Account) -> Result<(), StoreError> {
        let debits_pending = self.debits_pending.apply("debits_pending", account.debits_pending)?;
        let debits_posted = self.debits_posted.apply("debits_posted", account.debits_posted)?;
        let credits_pending = self.credits_pending.apply("credits_pending", account.credits_pending)?;
        let credits_posted = self.credits_posted.apply("credits_posted", account.credits_posted)?;

        account.debits_pending = debits_pending;
        account.debits_posted = debits_posted;
        account.credits_pending = credits_pending;
        account.credits_posted = credits_posted;
        account.flags = account.flags.with(self.flags_set).without(self.flags_clear);
        Ok(())
    }
}

/// A single write against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Insert a new account.
    AccountInsert(Account),
    /// Update an existing account.
    AccountDelta(AccountDelta),
    /// Insert a new transfer.
    TransferInsert(Transfer),
    /// Move a pending transfer's status. `from: None` creates the status.
    PendingStatusTransition {
        /// The pending transfer.
        id: TransferId,
        /// Expected current status.
        from: Option<PendingStatus>,
        /// New status.
        to: PendingStatus,
    },
    /// Record a balance snapshot.
    BalanceSnapshot(AccountBalance),
}

/// Transactional key-value collaborator holding ledger state.
pub trait LedgerStore {
    /// Loads an account.
    fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Loads a transfer.
    fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, StoreError>;

    /// Loads the status of a pending transfer.
    fn get_pending_status(&self, id: TransferId) -> Result<Option<PendingStatus>, StoreError>;

    /// Applies a mutation atomically.
    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError>;
}

fn check_transition(
    id: TransferId,
    current: Option<PendingStatus>,
    from: Option<PendingStatus>,
    to: PendingStatus,
) -> Result<(), StoreError> {
    if current != from {
        return Err(StoreError::Conflict(format!(
            "pending status of transfer {id} is {current:?}, expected {from:?}"
        )));
    }
    let allowed = match from {
        None => to == PendingStatus::Pending,
        Some(from) => from.can_transition_to(to),
    };
    if allowed {
        Ok(())
    } else {
        Err(StoreError::Invariant(format!(
            "pending status of transfer {id} cannot move from {from:?} to {to}"
        )))
    }
}

/// `BTreeMap`-backed reference store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    accounts: BTreeMap<AccountId, Account>,
    transfers: BTreeMap<TransferId, Transfer>,
    pending_statuses: BTreeMap<TransferId, PendingStatus>,
    balances: BTreeMap<(AccountId, u64), AccountBalance>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all accounts in id order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Returns all transfers in id order.
    pub fn transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.values()
    }

    /// Returns the balance snapshots of `account_id` whose timestamp falls
    /// in `range`, oldest first.
    pub fn account_balances<R>(&self, account_id: AccountId, range: R) -> Vec<AccountBalance>
    where
        R: RangeBounds<u64>,
    {
        self.balances
            .range((account_id, 0)..=(account_id, u64::MAX))
            .filter(|((_, timestamp), _)| range.contains(timestamp))
            .map(|(_, balance)| *balance)
            .collect()
    }

    /// Returns the largest timestamp of any stored account or transfer.
    #[must_use]
    pub fn last_timestamp(&self) -> u64 {
        let accounts = self.accounts.values().map(|a| a.timestamp);
        let transfers = self.transfers.values().map(|t| t.timestamp);
        accounts.chain(transfers).max().unwrap_or(0)
    }
}

impl LedgerStore for InMemoryStore {
    fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&id).cloned())
    }

    fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, StoreError> {
        Ok(self.transfers.get(&id).cloned())
    }

    fn get_pending_status(&self, id: TransferId) -> Result<Option<PendingStatus>, StoreError> {
        Ok(self.pending_statuses.get(&id).copied())
    }

    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::AccountInsert(account) => {
                if self.accounts.contains_key(&account.id) {
                    return Err(StoreError::AlreadyExists(format!("account {}", account.id)));
                }
                self.accounts.insert(account.id, account);
            }
            Mutation::AccountDelta(delta) => {
                let account = self
                    .accounts
                    .get_mut(&delta.id)
                    .ok_or_else(|| StoreError::NotFound(format!("account {}", delta.id)))?;
                delta.apply_to(account)?;
            }
            Mutation::TransferInsert(transfer) => {
                if self.transfers.contains_key(&transfer.id) {
                    return Err(StoreError::AlreadyExists(format!("transfer {}", transfer.id)));
                }
                self.transfers.insert(transfer.id, transfer);
            }
            Mutation::PendingStatusTransition { id, from, to } => {
                check_transition(id, self.pending_statuses.get(&id).copied(), from, to)?;
                self.pending_statuses.insert(id, to);
            }
            Mutation::BalanceSnapshot(balance) => {
                self.balances.insert((balance.account_id, balance.timestamp), balance);
            }
        }
        Ok(())
    }
}

/// Write overlay over another store.
///
/// Reads see the overlay first, then the parent. Writes are validated
/// against the combined view and logged; [`Scratch::commit`] replays the log
/// onto the parent, dropping the scratch discards it.
#[derive(Debug)]
pub struct Scratch<'a, S: LedgerStore + ?Sized> {
    parent: &'a mut S,
    accounts: BTreeMap<AccountId, Account>,
    transfers: BTreeMap<TransferId, Transfer>,
    pending_statuses: BTreeMap<TransferId, PendingStatus>,
    log: Vec<Mutation>,
}

impl<'a, S: LedgerStore + ?Sized> Scratch<'a, S> {
    /// Opens an empty overlay on `parent`.
    pub fn new(parent: &'a mut S) -> Self {
        Self {
            parent,
            accounts: BTreeMap::new(),
            transfers: BTreeMap::new(),
            pending_statuses: BTreeMap::new(),
            log: Vec::new(),
        }
    }

    /// Replays every logged mutation onto the parent.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the parent.
    pub fn commit(self) -> Result<(), StoreError> {
        for mutation in self.log {
            self.parent.apply(mutation)?;
        }
        Ok(())
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for Scratch<'_, S> {
    fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        match self.accounts.get(&id) {
            Some(account) => Ok(Some(account.clone())),
            None => self.parent.get_account(id),
        }
    }

    fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, StoreError> {
        match self.transfers.get(&id) {
            Some(transfer) => Ok(Some(transfer.clone())),
            None => self.parent.get_transfer(id),
        }
    }

    fn get_pending_status(&self, id: TransferId) -> Result<Option<PendingStatus>, StoreError> {
        match self.pending_statuses.get(&id) {
            Some(status) => Ok(Some(*status)),
            None => self.parent.get_pending_status(id),
        }
    }

    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        match &mutation {
            Mutation::AccountInsert(account) => {
                if self.get_account(account.id)?.is_some() {
                    return Err(StoreError::AlreadyExists(format!("account {}", account.id)));
                }
                self.accounts.insert(account.id, account.clone());
            }
            Mutation::AccountDelta(delta) => {
                let mut account = self
                    .get_account(delta.id)?
                    .ok_or_else(|| StoreError::NotFound(format!("account {}", delta.id)))?;
                delta.apply_to(&mut account)?;
                self.accounts.insert(delta.id, account);
            }
            Mutation::TransferInsert(transfer) => {
                if self.get_transfer(transfer.id)?.is_some() {
                    return Err(StoreError::AlreadyExists(format!("transfer {}", transfer.id)));
                }
                self.transfers.insert(transfer.id, transfer.clone());
            }
            Mutation::PendingStatusTransition { id, from, to } => {
                check_transition(*id, self.get_pending_status(*id)?, *from, *to)?;
                self.pending_statuses.insert(*id, *to);
            }
            Mutation::BalanceSnapshot(_) => {}
        }
        self.log.push(mutation);
        Ok(())
    }
}
