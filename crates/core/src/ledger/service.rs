//! Ledger service: batch processing of create requests.
//!
//! Each batch runs element by element in input order. Every element gets
//! exactly one [`IndexedResult`]. Linked chains are applied through a
//! [`Scratch`] overlay and committed only if every member succeeds.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tally_shared::{BATCH_MAX_CEILING, LedgerConfig};
use tally_shared::types::{AccountId, TransferId};
use tracing::{debug, instrument, warn};

use super::error::{CreateAccountError, CreateTransferError, ErrorCategory, LedgerError};
use super::existence::{reconcile_account, reconcile_transfer};
use super::mutator::LedgerMutator;
use super::resolver::{Resolution, TransferResolver};
use super::store::{LedgerStore, Scratch, StoreError};
use super::types::{Account, Transfer};
use super::validation::{validate_account, validate_transfer};
use crate::id::{Clock, SystemClock, Timestamper};

/// What happened to an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The record was created with this timestamp.
    Created {
        /// Timestamp assigned to the record.
        timestamp: u64,
    },
    /// A balancing transfer had nothing to move.
    Skipped,
}

/// Result for one element of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedResult<E> {
    /// Position of the element in the batch.
    pub index: usize,
    /// Outcome of the element.
    pub result: Result<Applied, E>,
}

impl<E> IndexedResult<E> {
    /// Returns true if the element was created.
    pub fn is_created(&self) -> bool {
        matches!(self.result, Ok(Applied::Created { .. }))
    }

    /// Returns the error, if any.
    pub fn error(&self) -> Option<&E> {
        self.result.as_ref().err()
    }
}

impl<E: Serialize> Serialize for IndexedResult<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("index", &self.index)?;
        match &self.result {
            Ok(Applied::Created { timestamp }) => {
                map.serialize_entry("status", "created")?;
                map.serialize_entry("timestamp", timestamp)?;
            }
            Ok(Applied::Skipped) => map.serialize_entry("status", "skipped")?,
            Err(error) => {
                map.serialize_entry("status", "error")?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

/// An event that can take part in a linked chain.
trait BatchEvent {
    type Error: Copy;

    const LINKED_EVENT_FAILED: Self::Error;
    const LINKED_EVENT_CHAIN_OPEN: Self::Error;

    fn is_linked(&self) -> bool;
    fn is_benign(error: &Self::Error) -> bool;
    fn category(error: &Self::Error) -> ErrorCategory;
}

impl BatchEvent for Account {
    type Error = CreateAccountError;

    const LINKED_EVENT_FAILED: Self::Error = CreateAccountError::LinkedEventFailed;
    const LINKED_EVENT_CHAIN_OPEN: Self::Error = CreateAccountError::LinkedEventChainOpen;

    fn is_linked(&self) -> bool {
        Account::is_linked(self)
    }

    fn is_benign(error: &Self::Error) -> bool {
        error.is_benign()
    }

    fn category(error: &Self::Error) -> ErrorCategory {
        error.category()
    }
}

impl BatchEvent for Transfer {
    type Error = CreateTransferError;

    const LINKED_EVENT_FAILED: Self::Error = CreateTransferError::LinkedEventFailed;
    const LINKED_EVENT_CHAIN_OPEN: Self::Error = CreateTransferError::LinkedEventChainOpen;

    fn is_linked(&self) -> bool {
        Transfer::is_linked(self)
    }

    fn is_benign(error: &Self::Error) -> bool {
        error.is_benign()
    }

    fn category(error: &Self::Error) -> ErrorCategory {
        error.category()
    }
}

/// Ledger service.
///
/// Owns the clock and the timestamper; the store is passed per call so the
/// caller controls the enclosing transaction.
#[derive(Debug)]
pub struct LedgerService<C: Clock = SystemClock> {
    config: LedgerConfig,
    clock: C,
    timestamper: Timestamper,
}

impl LedgerService<SystemClock> {
    /// Creates a service on the system clock.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> LedgerService<C> {
    /// Creates a service on `clock`.
    pub fn with_clock(config: LedgerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            timestamper: Timestamper::default(),
        }
    }

    /// Resumes timestamp assignment after `last`, e.g. the largest
    /// timestamp already in the store.
    #[must_use]
    pub fn with_last_timestamp(mut self, last: u64) -> Self {
        self.timestamper = Timestamper::new(last);
        self
    }

    /// Returns the service configuration.
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Returns the service clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the last timestamp assigned to an accepted event.
    pub const fn last_timestamp(&self) -> u64 {
        self.timestamper.last()
    }

    /// Creates a batch of accounts.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BatchTooLarge` before touching the store if the
    /// batch exceeds `batch_max`, or `LedgerError::Store` if the store
    /// fails; the caller must then roll back its transaction.
    #[instrument(skip_all, fields(batch_len = accounts.len()), err)]
    pub fn create_accounts<S: LedgerStore + ?Sized>(
        &mut self,
        store: &mut S,
        accounts: &[Account],
    ) -> Result<Vec<IndexedResult<CreateAccountError>>, LedgerError> {
        self.check_batch(accounts.len())?;

        let now = self.clock.now_ns();
        let batch_imported = accounts.first().is_some_and(Account::is_imported);

        let results = run_chains(store, accounts, &mut self.timestamper, |scratch, account, stamper| {
            create_account(scratch, account, stamper, now, batch_imported)
        })
        .inspect_err(|e| warn!(error = %e, "create_accounts aborted by store"))?;

        log_summary::<Account>("create_accounts", &results);
        Ok(results)
    }

    /// Creates a batch of transfers.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BatchTooLarge` before touching the store if the
    /// batch exceeds `batch_max`, or `LedgerError::Store` if the store
    /// fails; the caller must then roll back its transaction.
    #[instrument(skip_all, fields(batch_len = transfers.len()), err)]
    pub fn create_transfers<S: LedgerStore + ?Sized>(
        &mut self,
        store: &mut S,
        transfers: &[Transfer],
    ) -> Result<Vec<IndexedResult<CreateTransferError>>, LedgerError> {
        self.check_batch(transfers.len())?;

        let now = self.clock.now_ns();
        let batch_imported = transfers.first().is_some_and(Transfer::is_imported);
        let history_enabled = self.config.history_enabled;

        let results = run_chains(store, transfers, &mut self.timestamper, |scratch, transfer, stamper| {
            create_transfer(scratch, transfer, stamper, now, batch_imported, history_enabled)
        })
        .inspect_err(|e| warn!(error = %e, "create_transfers aborted by store"))?;

        log_summary::<Transfer>("create_transfers", &results);
        Ok(results)
    }

    /// Returns the accounts that exist among `ids`, in request order.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BatchTooLarge` or `LedgerError::Store`.
    pub fn lookup_accounts<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, LedgerError> {
        self.check_batch(ids.len())?;
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            found.extend(store.get_account(*id)?);
        }
        Ok(found)
    }

    /// Returns the transfers that exist among `ids`, in request order.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BatchTooLarge` or `LedgerError::Store`.
    pub fn lookup_transfers<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        ids: &[TransferId],
    ) -> Result<Vec<Transfer>, LedgerError> {
        self.check_batch(ids.len())?;
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            found.extend(store.get_transfer(*id)?);
        }
        Ok(found)
    }

    /// Returns the largest batch accepted, never above
    /// [`BATCH_MAX_CEILING`] whatever the configuration says.
    pub fn batch_max(&self) -> usize {
        self.config.batch_max.min(BATCH_MAX_CEILING)
    }

    fn check_batch(&self, len: usize) -> Result<(), LedgerError> {
        let max = self.batch_max();
        if len > max {
            return Err(LedgerError::BatchTooLarge { len, max });
        }
        Ok(())
    }
}

/// Returns the index of the last member of the chain starting at `start`
/// and whether the batch ended before the chain was closed.
fn chain_end<E: BatchEvent>(events: &[E], start: usize) -> (usize, bool) {
    match events[start..].iter().position(|event| !event.is_linked()) {
        Some(offset) => (start + offset, false),
        None => (events.len() - 1, true),
    }
}

/// Runs `process` over every event, chain by chain.
///
/// A failing member of a chain keeps its own error and every other member
/// reports `linked_event_failed`, except the last member of a chain left
/// open at the end of the batch, which reports `linked_event_chain_open`.
/// The writes of a failing lone event are kept: the only writes such an
/// event leaves behind release an expired pending transfer.
fn run_chains<S, E, F>(
    store: &mut S,
    events: &[E],
    timestamper: &mut Timestamper,
    mut process: F,
) -> Result<Vec<IndexedResult<E::Error>>, StoreError>
where
    S: LedgerStore + ?Sized,
    E: BatchEvent,
    F: FnMut(&mut Scratch<'_, S>, &E, &mut Timestamper) -> Result<Result<Applied, E::Error>, StoreError>,
{
    let mut results = Vec::with_capacity(events.len());
    let mut start = 0;

    while start < events.len() {
        let (end, open) = chain_end(events, start);
        let mut chain = Scratch::new(&mut *store);
        let mut stamper = *timestamper;
        let mut outcomes = Vec::with_capacity(end - start + 1);
        let mut failed = false;

        for (index, event) in events.iter().enumerate().take(end + 1).skip(start) {
            if open && index == end {
                outcomes.push(Err(E::LINKED_EVENT_CHAIN_OPEN));
                failed = true;
                break;
            }
            let outcome = process(&mut chain, event, &mut stamper)?;
            let fatal = matches!(&outcome, Err(error) if !E::is_benign(error));
            outcomes.push(outcome);
            if fatal {
                failed = true;
                break;
            }
        }

        if failed {
            let failed_at = start + outcomes.len() - 1;
            if start == end && !open {
                chain.commit()?;
            } else {
                debug!(start, end, failed_at, "linked chain rolled back");
            }
            let mut own = outcomes.pop();
            for index in start..=end {
                let result = if index == failed_at {
                    own.take().unwrap_or(Err(E::LINKED_EVENT_FAILED))
                } else if open && index == end {
                    Err(E::LINKED_EVENT_CHAIN_OPEN)
                } else {
                    Err(E::LINKED_EVENT_FAILED)
                };
                results.push(IndexedResult { index, result });
            }
        } else {
            chain.commit()?;
            *timestamper = stamper;
            results.extend(
                outcomes
                    .into_iter()
                    .enumerate()
                    .map(|(offset, result)| IndexedResult {
                        index: start + offset,
                        result,
                    }),
            );
        }

        start = end + 1;
    }

    Ok(results)
}

/// Checks batch homogeneity, fields and the imported timestamp ceiling.
fn precheck_account(account: &Account, now: u64, batch_imported: bool) -> Result<(), CreateAccountError> {
    match (account.is_imported(), batch_imported) {
        (false, true) => return Err(CreateAccountError::ImportedEventExpected),
        (true, false) => return Err(CreateAccountError::ImportedEventNotExpected),
        _ => {}
    }
    validate_account(account)?;
    if account.is_imported() && account.timestamp > now {
        return Err(CreateAccountError::ImportedEventTimestampMustNotAdvance);
    }
    Ok(())
}

/// Checks batch homogeneity, fields and the imported timestamp ceiling.
fn precheck_transfer(transfer: &Transfer, now: u64, batch_imported: bool) -> Result<(), CreateTransferError> {
    match (transfer.is_imported(), batch_imported) {
        (false, true) => return Err(CreateTransferError::ImportedEventExpected),
        (true, false) => return Err(CreateTransferError::ImportedEventNotExpected),
        _ => {}
    }
    validate_transfer(transfer)?;
    if transfer.is_imported() && transfer.timestamp > now {
        return Err(CreateTransferError::ImportedEventTimestampMustNotAdvance);
    }
    Ok(())
}

fn create_account<S: LedgerStore + ?Sized>(
    store: &mut S,
    account: &Account,
    stamper: &mut Timestamper,
    now: u64,
    batch_imported: bool,
) -> Result<Result<Applied, CreateAccountError>, StoreError> {
    if let Err(error) = precheck_account(account, now, batch_imported) {
        return Ok(Err(error));
    }

    if let Some(existing) = store.get_account(account.id)? {
        return Ok(Err(reconcile_account(account, &existing)));
    }

    let timestamp = if account.is_imported() {
        if account.timestamp <= stamper.last() {
            return Ok(Err(CreateAccountError::ImportedEventTimestampMustNotRegress));
        }
        account.timestamp
    } else {
        stamper.candidate(now)
    };

    let mut scratch = Scratch::new(store);
    LedgerMutator::commit(&mut scratch, LedgerMutator::create_account(account, timestamp))?;
    scratch.commit()?;
    stamper.advance(timestamp);
    Ok(Ok(Applied::Created { timestamp }))
}

fn create_transfer<S: LedgerStore + ?Sized>(
    store: &mut S,
    transfer: &Transfer,
    stamper: &mut Timestamper,
    now: u64,
    batch_imported: bool,
    history_enabled: bool,
) -> Result<Result<Applied, CreateTransferError>, StoreError> {
    if let Err(error) = precheck_transfer(transfer, now, batch_imported) {
        return Ok(Err(error));
    }

    if let Some(existing) = store.get_transfer(transfer.id)? {
        return Ok(Err(reconcile_transfer(transfer, &existing)));
    }

    let timestamp = if transfer.is_imported() {
        if transfer.timestamp <= stamper.last() {
            return Ok(Err(CreateTransferError::ImportedEventTimestampMustNotRegress));
        }
        transfer.timestamp
    } else {
        stamper.candidate(now)
    };

    match TransferResolver::resolve(&*store, transfer, timestamp)? {
        Resolution::Accepted(resolved) => {
            let mutations = LedgerMutator::apply_transfer(&resolved, history_enabled)?;
            let mut scratch = Scratch::new(store);
            LedgerMutator::commit(&mut scratch, mutations)?;
            scratch.commit()?;
            stamper.advance(timestamp);
            Ok(Ok(Applied::Created { timestamp }))
        }
        Resolution::Expired(expired) => {
            debug!(pending_id = %expired.pending.id, "pending transfer expired");
            LedgerMutator::commit(store, LedgerMutator::expire_pending(&expired))?;
            Ok(Err(CreateTransferError::PendingTransferExpired))
        }
        Resolution::Skipped => Ok(Ok(Applied::Skipped)),
        Resolution::Rejected(error) => Ok(Err(error)),
    }
}

fn log_summary<E: BatchEvent>(operation: &'static str, results: &[IndexedResult<E::Error>]) {
    let created = results.iter().filter(|r| r.is_created()).count();
    let failed_in = |category: ErrorCategory| {
        results
            .iter()
            .filter_map(IndexedResult::error)
            .filter(|error| E::category(error) == category)
            .count()
    };
    debug!(
        operation,
        created,
        malformed = failed_in(ErrorCategory::Malformed),
        exists = failed_in(ErrorCategory::Exists),
        relational = failed_in(ErrorCategory::Relational),
        overflow = failed_in(ErrorCategory::Overflow),
        chain = failed_in(ErrorCategory::Chain),
        total = results.len(),
        "batch processed"
    );
}
