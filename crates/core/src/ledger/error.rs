//! Ledger error types.
//!
//! Per-event outcomes are reported with [`CreateAccountError`] and
//! [`CreateTransferError`]; each variant has a stable snake_case code used
//! on the wire. Failures that abort a whole batch use [`LedgerError`].

use serde::{Serialize, Serializer};
use thiserror::Error;

use super::store::StoreError;

/// Broad cause of a per-event error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The event itself is malformed; detected without any lookup.
    Malformed,
    /// The id is already taken; compared against the stored record.
    Exists,
    /// Detected once related records were loaded.
    Relational,
    /// Applying the amount would leave the 128-bit domain.
    Overflow,
    /// Failed because a sibling in a linked chain failed.
    Chain,
}

/// Errors for a single account in a `create_accounts` batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CreateAccountError {
    // ========== Chain Errors ==========
    /// Another member of the linked chain failed.
    #[error("linked event failed")]
    LinkedEventFailed,

    /// The batch ended while the linked chain was still open.
    #[error("linked event chain open")]
    LinkedEventChainOpen,

    // ========== Imported Events ==========
    /// The batch is imported but this event is not.
    #[error("imported event expected")]
    ImportedEventExpected,

    /// The batch is not imported but this event is.
    #[error("imported event not expected")]
    ImportedEventNotExpected,

    /// Imported timestamp is zero.
    #[error("imported event timestamp out of range")]
    ImportedEventTimestampOutOfRange,

    /// Imported timestamp lies in the future.
    #[error("imported event timestamp must not advance")]
    ImportedEventTimestampMustNotAdvance,

    /// Imported timestamp is not after the last assigned timestamp.
    #[error("imported event timestamp must not regress")]
    ImportedEventTimestampMustNotRegress,

    // ========== Validation Errors ==========
    /// Id is zero.
    #[error("id must not be zero")]
    IdMustNotBeZero,

    /// Id is the reserved maximum value.
    #[error("id must not be int max")]
    IdMustNotBeIntMax,

    /// Timestamp is assigned by the ledger.
    #[error("timestamp must be zero")]
    TimestampMustBeZero,

    /// A reserved field is non-zero.
    #[error("reserved field")]
    ReservedField,

    /// Ledger is zero.
    #[error("ledger must not be zero")]
    LedgerMustNotBeZero,

    /// Code is zero.
    #[error("code must not be zero")]
    CodeMustNotBeZero,

    /// Balances start at zero.
    #[error("debits pending must be zero")]
    DebitsPendingMustBeZero,

    /// Balances start at zero.
    #[error("debits posted must be zero")]
    DebitsPostedMustBeZero,

    /// Balances start at zero.
    #[error("credits pending must be zero")]
    CreditsPendingMustBeZero,

    /// Balances start at zero.
    #[error("credits posted must be zero")]
    CreditsPostedMustBeZero,

    /// A flag bit without meaning is set.
    #[error("reserved flag")]
    ReservedFlag,

    /// Both balance-constraint flags are set.
    #[error("flags are mutually exclusive")]
    FlagsAreMutuallyExclusive,

    // ========== Existence ==========
    /// Stored account has different flags.
    #[error("exists with different flags")]
    ExistsWithDifferentFlags,

    /// Stored account has a different `user_data_128`.
    #[error("exists with different user_data_128")]
    ExistsWithDifferentUserData128,

    /// Stored account has a different `user_data_64`.
    #[error("exists with different user_data_64")]
    ExistsWithDifferentUserData64,

    /// Stored account has a different `user_data_32`.
    #[error("exists with different user_data_32")]
    ExistsWithDifferentUserData32,

    /// Stored account has a different ledger.
    #[error("exists with different ledger")]
    ExistsWithDifferentLedger,

    /// Stored account has a different code.
    #[error("exists with different code")]
    ExistsWithDifferentCode,

    /// Identical account already exists.
    #[error("exists")]
    Exists,
}

impl CreateAccountError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::LinkedEventFailed => "linked_event_failed",
            Self::LinkedEventChainOpen => "linked_event_chain_open",
            Self::ImportedEventExpected => "imported_event_expected",
            Self::ImportedEventNotExpected => "imported_event_not_expected",
            Self::ImportedEventTimestampOutOfRange => "imported_event_timestamp_out_of_range",
            Self::ImportedEventTimestampMustNotAdvance => "imported_event_timestamp_must_not_advance",
            Self::ImportedEventTimestampMustNotRegress => "imported_event_timestamp_must_not_regress",
            Self::IdMustNotBeZero => "id_must_not_be_zero",
            Self::IdMustNotBeIntMax => "id_must_not_be_int_max",
            Self::TimestampMustBeZero => "timestamp_must_be_zero",
            Self::ReservedField => "reserved_field",
            Self::LedgerMustNotBeZero => "ledger_must_not_be_zero",
            Self::CodeMustNotBeZero => "code_must_not_be_zero",
            Self::DebitsPendingMustBeZero => "debits_pending_must_be_zero",
            Self::DebitsPostedMustBeZero => "debits_posted_must_be_zero",
            Self::CreditsPendingMustBeZero => "credits_pending_must_be_zero",
            Self::CreditsPostedMustBeZero => "credits_posted_must_be_zero",
            Self::ReservedFlag => "reserved_flag",
            Self::FlagsAreMutuallyExclusive => "flags_are_mutually_exclusive",
            Self::ExistsWithDifferentFlags => "exists_with_different_flags",
            Self::ExistsWithDifferentUserData128 => "exists_with_different_user_data_128",
            Self::ExistsWithDifferentUserData64 => "exists_with_different_user_data_64",
            Self::ExistsWithDifferentUserData32 => "exists_with_different_user_data_32",
            Self::ExistsWithDifferentLedger => "exists_with_different_ledger",
            Self::ExistsWithDifferentCode => "exists_with_different_code",
            Self::Exists => "exists",
        }
    }

    /// Returns the broad cause of the error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::LinkedEventFailed | Self::LinkedEventChainOpen => ErrorCategory::Chain,
            Self::ExistsWithDifferentFlags
            | Self::ExistsWithDifferentUserData128
            | Self::ExistsWithDifferentUserData64
            | Self::ExistsWithDifferentUserData32
            | Self::ExistsWithDifferentLedger
            | Self::ExistsWithDifferentCode
            | Self::Exists => ErrorCategory::Exists,
            Self::ImportedEventExpected
            | Self::ImportedEventNotExpected
            | Self::ImportedEventTimestampMustNotAdvance
            | Self::ImportedEventTimestampMustNotRegress => ErrorCategory::Relational,
            _ => ErrorCategory::Malformed,
        }
    }

    /// Returns true if the event is a harmless duplicate.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::Exists)
    }
}

impl Serialize for CreateAccountError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.error_code())
    }
}

/// Errors for a single transfer in a `create_transfers` batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CreateTransferError {
    // ========== Chain Errors ==========
    /// Another member of the linked chain failed.
    #[error("linked event failed")]
    LinkedEventFailed,

    /// The batch ended while the linked chain was still open.
    #[error("linked event chain open")]
    LinkedEventChainOpen,

    // ========== Imported Events ==========
    /// The batch is imported but this event is not.
    #[error("imported event expected")]
    ImportedEventExpected,

    /// The batch is not imported but this event is.
    #[error("imported event not expected")]
    ImportedEventNotExpected,

    /// Imported timestamp is zero.
    #[error("imported event timestamp out of range")]
    ImportedEventTimestampOutOfRange,

    /// Imported timestamp lies in the future.
    #[error("imported event timestamp must not advance")]
    ImportedEventTimestampMustNotAdvance,

    /// Imported timestamp is not after the last assigned timestamp.
    #[error("imported event timestamp must not regress")]
    ImportedEventTimestampMustNotRegress,

    /// Imported transfer predates its debit account.
    #[error("imported event timestamp must postdate debit account")]
    ImportedEventTimestampMustPostdateDebitAccount,

    /// Imported transfer predates its credit account.
    #[error("imported event timestamp must postdate credit account")]
    ImportedEventTimestampMustPostdateCreditAccount,

    /// Imported post/void predates the pending transfer it settles.
    #[error("imported event timestamp must postdate pending transfer")]
    ImportedEventTimestampMustPostdatePendingTransfer,

    /// Imported pending transfers cannot expire.
    #[error("imported event timeout must be zero")]
    ImportedEventTimeoutMustBeZero,

    // ========== Validation Errors ==========
    /// Id is zero.
    #[error("id must not be zero")]
    IdMustNotBeZero,

    /// Id is the reserved maximum value.
    #[error("id must not be int max")]
    IdMustNotBeIntMax,

    /// Timestamp is assigned by the ledger.
    #[error("timestamp must be zero")]
    TimestampMustBeZero,

    /// Ledger is zero.
    #[error("ledger must not be zero")]
    LedgerMustNotBeZero,

    /// Code is zero.
    #[error("code must not be zero")]
    CodeMustNotBeZero,

    /// A flag bit without meaning is set.
    #[error("reserved flag")]
    ReservedFlag,

    /// Conflicting flags are set together.
    #[error("flags are mutually exclusive")]
    FlagsAreMutuallyExclusive,

    /// Debit account id is zero.
    #[error("debit account id must not be zero")]
    DebitAccountIdMustNotBeZero,

    /// Debit account id is the reserved maximum value.
    #[error("debit account id must not be int max")]
    DebitAccountIdMustNotBeIntMax,

    /// Credit account id is zero.
    #[error("credit account id must not be zero")]
    CreditAccountIdMustNotBeZero,

    /// Credit account id is the reserved maximum value.
    #[error("credit account id must not be int max")]
    CreditAccountIdMustNotBeIntMax,

    /// Debit and credit account are the same.
    #[error("accounts must be different")]
    AccountsMustBeDifferent,

    /// Only post/void transfers reference a pending transfer.
    #[error("pending id must be zero")]
    PendingIdMustBeZero,

    /// Post/void transfers must reference a pending transfer.
    #[error("pending id must not be zero")]
    PendingIdMustNotBeZero,

    /// Pending id is the reserved maximum value.
    #[error("pending id must not be int max")]
    PendingIdMustNotBeIntMax,

    /// A transfer cannot settle itself.
    #[error("pending id must be different")]
    PendingIdMustBeDifferent,

    /// Only pending transfers may carry a timeout.
    #[error("timeout reserved for pending transfer")]
    TimeoutReservedForPendingTransfer,

    /// `closing_debit` is only valid on a pending transfer.
    #[error("closing debit requires pending")]
    ClosingDebitRequiresPending,

    /// `closing_credit` is only valid on a pending transfer.
    #[error("closing credit requires pending")]
    ClosingCreditRequiresPending,

    /// Amount is zero.
    #[error("amount must not be zero")]
    AmountMustNotBeZero,

    // ========== Existence ==========
    /// Stored transfer has different flags.
    #[error("exists with different flags")]
    ExistsWithDifferentFlags,

    /// Stored transfer has a different `user_data_128`.
    #[error("exists with different user_data_128")]
    ExistsWithDifferentUserData128,

    /// Stored transfer has a different `user_data_64`.
    #[error("exists with different user_data_64")]
    ExistsWithDifferentUserData64,

    /// Stored transfer has a different `user_data_32`.
    #[error("exists with different user_data_32")]
    ExistsWithDifferentUserData32,

    /// Stored transfer has a different ledger.
    #[error("exists with different ledger")]
    ExistsWithDifferentLedger,

    /// Stored transfer has a different code.
    #[error("exists with different code")]
    ExistsWithDifferentCode,

    /// Stored transfer debits a different account.
    #[error("exists with different debit account id")]
    ExistsWithDifferentDebitAccountId,

    /// Stored transfer credits a different account.
    #[error("exists with different credit account id")]
    ExistsWithDifferentCreditAccountId,

    /// Stored transfer has a different amount.
    #[error("exists with different amount")]
    ExistsWithDifferentAmount,

    /// Stored transfer references a different pending transfer.
    #[error("exists with different pending id")]
    ExistsWithDifferentPendingId,

    /// Stored transfer has a different timeout.
    #[error("exists with different timeout")]
    ExistsWithDifferentTimeout,

    /// Identical transfer already exists.
    #[error("exists")]
    Exists,

    // ========== Relational Errors ==========
    /// Debit account does not exist.
    #[error("debit account not found")]
    DebitAccountNotFound,

    /// Credit account does not exist.
    #[error("credit account not found")]
    CreditAccountNotFound,

    /// Debit and credit account belong to different ledgers.
    #[error("accounts must have the same ledger")]
    AccountsMustHaveTheSameLedger,

    /// Transfer ledger differs from the accounts' ledger.
    #[error("transfer must have the same ledger as accounts")]
    TransferMustHaveTheSameLedgerAsAccounts,

    /// Debit account is closed.
    #[error("debit account already closed")]
    DebitAccountAlreadyClosed,

    /// Credit account is closed.
    #[error("credit account already closed")]
    CreditAccountAlreadyClosed,

    /// Referenced pending transfer does not exist.
    #[error("pending transfer not found")]
    PendingTransferNotFound,

    /// Referenced transfer was not created as pending.
    #[error("pending transfer not pending")]
    PendingTransferNotPending,

    /// Referenced pending transfer debits another account.
    #[error("pending transfer has different debit account id")]
    PendingTransferHasDifferentDebitAccountId,

    /// Referenced pending transfer credits another account.
    #[error("pending transfer has different credit account id")]
    PendingTransferHasDifferentCreditAccountId,

    /// Referenced pending transfer belongs to another ledger.
    #[error("pending transfer has different ledger")]
    PendingTransferHasDifferentLedger,

    /// Referenced pending transfer has another code.
    #[error("pending transfer has different code")]
    PendingTransferHasDifferentCode,

    /// Post amount is larger than the pending amount.
    #[error("exceeds pending transfer amount")]
    ExceedsPendingTransferAmount,

    /// Void amount differs from the pending amount.
    #[error("pending transfer has different amount")]
    PendingTransferHasDifferentAmount,

    /// Referenced pending transfer was already posted.
    #[error("pending transfer already posted")]
    PendingTransferAlreadyPosted,

    /// Referenced pending transfer was already voided.
    #[error("pending transfer already voided")]
    PendingTransferAlreadyVoided,

    /// Referenced pending transfer timed out.
    #[error("pending transfer expired")]
    PendingTransferExpired,

    /// Debits would exceed posted credits.
    #[error("exceeds credits")]
    ExceedsCredits,

    /// Credits would exceed posted debits.
    #[error("exceeds debits")]
    ExceedsDebits,

    // ========== Overflow Errors ==========
    /// `debits_pending + amount` overflows.
    #[error("overflows debits pending")]
    OverflowsDebitsPending,

    /// `credits_pending + amount` overflows.
    #[error("overflows credits pending")]
    OverflowsCreditsPending,

    /// `debits_posted + amount` overflows.
    #[error("overflows debits posted")]
    OverflowsDebitsPosted,

    /// `credits_posted + amount` overflows.
    #[error("overflows credits posted")]
    OverflowsCreditsPosted,

    /// `debits_pending + debits_posted + amount` overflows.
    #[error("overflows debits")]
    OverflowsDebits,

    /// `credits_pending + credits_posted + amount` overflows.
    #[error("overflows credits")]
    OverflowsCredits,

    /// `timestamp + timeout` overflows.
    #[error("overflows timeout")]
    OverflowsTimeout,
}

impl CreateTransferError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::LinkedEventFailed => "linked_event_failed",
            Self::LinkedEventChainOpen => "linked_event_chain_open",
            Self::ImportedEventExpected => "imported_event_expected",
            Self::ImportedEventNotExpected => "imported_event_not_expected",
            Self::ImportedEventTimestampOutOfRange => "imported_event_timestamp_out_of_range",
            Self::ImportedEventTimestampMustNotAdvance => "imported_event_timestamp_must_not_advance",
            Self::ImportedEventTimestampMustNotRegress => "imported_event_timestamp_must_not_regress",
            Self::ImportedEventTimestampMustPostdateDebitAccount => {
                "imported_event_timestamp_must_postdate_debit_account"
            }
            Self::ImportedEventTimestampMustPostdateCreditAccount => {
                "imported_event_timestamp_must_postdate_credit_account"
            }
            Self::ImportedEventTimestampMustPostdatePendingTransfer => {
                "imported_event_timestamp_must_postdate_pending_transfer"
            }
            Self::ImportedEventTimeoutMustBeZero => "imported_event_timeout_must_be_zero",
            Self::IdMustNotBeZero => "id_must_not_be_zero",
            Self::IdMustNotBeIntMax => "id_must_not_be_int_max",
            Self::TimestampMustBeZero => "timestamp_must_be_zero",
            Self::LedgerMustNotBeZero => "ledger_must_not_be_zero",
            Self::CodeMustNotBeZero => "code_must_not_be_zero",
            Self::ReservedFlag => "reserved_flag",
            Self::FlagsAreMutuallyExclusive => "flags_are_mutually_exclusive",
            Self::DebitAccountIdMustNotBeZero => "debit_account_id_must_not_be_zero",
            Self::DebitAccountIdMustNotBeIntMax => "debit_account_id_must_not_be_int_max",
            Self::CreditAccountIdMustNotBeZero => "credit_account_id_must_not_be_zero",
            Self::CreditAccountIdMustNotBeIntMax => "credit_account_id_must_not_be_int_max",
            Self::AccountsMustBeDifferent => "accounts_must_be_different",
            Self::PendingIdMustBeZero => "pending_id_must_be_zero",
            Self::PendingIdMustNotBeZero => "pending_id_must_not_be_zero",
            Self::PendingIdMustNotBeIntMax => "pending_id_must_not_be_int_max",
            Self::PendingIdMustBeDifferent => "pending_id_must_be_different",
            Self::TimeoutReservedForPendingTransfer => "timeout_reserved_for_pending_transfer",
            Self::ClosingDebitRequiresPending => "closing_debit_requires_pending",
            Self::ClosingCreditRequiresPending => "closing_credit_requires_pending",
            Self::AmountMustNotBeZero => "amount_must_not_be_zero",
            Self::ExistsWithDifferentFlags => "exists_with_different_flags",
            Self::ExistsWithDifferentUserData128 => "exists_with_different_user_data_128",
            Self::ExistsWithDifferentUserData64 => "exists_with_different_user_data_64",
            Self::ExistsWithDifferentUserData32 => "exists_with_different_user_data_32",
            Self::ExistsWithDifferentLedger => "exists_with_different_ledger",
            Self::ExistsWithDifferentCode => "exists_with_different_code",
            Self::ExistsWithDifferentDebitAccountId => "exists_with_different_debit_account_id",
            Self::ExistsWithDifferentCreditAccountId => "exists_with_different_credit_account_id",
            Self::ExistsWithDifferentAmount => "exists_with_different_amount",
            Self::ExistsWithDifferentPendingId => "exists_with_different_pending_id",
            Self::ExistsWithDifferentTimeout => "exists_with_different_timeout",
            Self::Exists => "exists",
            Self::DebitAccountNotFound => "debit_account_not_found",
            Self::CreditAccountNotFound => "credit_account_not_found",
            Self::AccountsMustHaveTheSameLedger => "accounts_must_have_the_same_ledger",
            Self::TransferMustHaveTheSameLedgerAsAccounts => {
                "transfer_must_have_the_same_ledger_as_accounts"
            }
            Self::DebitAccountAlreadyClosed => "debit_account_already_closed",
            Self::CreditAccountAlreadyClosed => "credit_account_already_closed",
            Self::PendingTransferNotFound => "pending_transfer_not_found",
            Self::PendingTransferNotPending => "pending_transfer_not_pending",
            Self::PendingTransferHasDifferentDebitAccountId => {
                "pending_transfer_has_different_debit_account_id"
            }
            Self::PendingTransferHasDifferentCreditAccountId => {
                "pending_transfer_has_different_credit_account_id"
            }
            Self::PendingTransferHasDifferentLedger => "pending_transfer_has_different_ledger",
            Self::PendingTransferHasDifferentCode => "pending_transfer_has_different_code",
            Self::ExceedsPendingTransferAmount => "exceeds_pending_transfer_amount",
            Self::PendingTransferHasDifferentAmount => "pending_transfer_has_different_amount",
            Self::PendingTransferAlreadyPosted => "pending_transfer_already_posted",
            Self::PendingTransferAlreadyVoided => "pending_transfer_already_voided",
            Self::PendingTransferExpired => "pending_transfer_expired",
            Self::ExceedsCredits => "exceeds_credits",
            Self::ExceedsDebits => "exceeds_debits",
            Self::OverflowsDebitsPending => "overflows_debits_pending",
            Self::OverflowsCreditsPending => "overflows_credits_pending",
            Self::OverflowsDebitsPosted => "overflows_debits_posted",
            Self::OverflowsCreditsPosted => "overflows_credits_posted",
            Self::OverflowsDebits => "overflows_debits",
            Self::OverflowsCredits => "overflows_credits",
            Self::OverflowsTimeout => "overflows_timeout",
        }
    }

    /// Returns the broad cause of the error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::LinkedEventFailed | Self::LinkedEventChainOpen => ErrorCategory::Chain,
            Self::ExistsWithDifferentFlags
            | Self::ExistsWithDifferentUserData128
            | Self::ExistsWithDifferentUserData64
            | Self::ExistsWithDifferentUserData32
            | Self::ExistsWithDifferentLedger
            | Self::ExistsWithDifferentCode
            | Self::ExistsWithDifferentDebitAccountId
            | Self::ExistsWithDifferentCreditAccountId
            | Self::ExistsWithDifferentAmount
            | Self::ExistsWithDifferentPendingId
            | Self::ExistsWithDifferentTimeout
            | Self::Exists => ErrorCategory::Exists,
            Self::OverflowsDebitsPending
            | Self::OverflowsCreditsPending
            | Self::OverflowsDebitsPosted
            | Self::OverflowsCreditsPosted
            | Self::OverflowsDebits
            | Self::OverflowsCredits
            | Self::OverflowsTimeout => ErrorCategory::Overflow,
            Self::ImportedEventExpected
            | Self::ImportedEventNotExpected
            | Self::ImportedEventTimestampMustNotAdvance
            | Self::ImportedEventTimestampMustNotRegress
            | Self::ImportedEventTimestampMustPostdateDebitAccount
            | Self::ImportedEventTimestampMustPostdateCreditAccount
            | Self::ImportedEventTimestampMustPostdatePendingTransfer
            | Self::DebitAccountNotFound
            | Self::CreditAccountNotFound
            | Self::AccountsMustHaveTheSameLedger
            | Self::TransferMustHaveTheSameLedgerAsAccounts
            | Self::DebitAccountAlreadyClosed
            | Self::CreditAccountAlreadyClosed
            | Self::PendingTransferNotFound
            | Self::PendingTransferNotPending
            | Self::PendingTransferHasDifferentDebitAccountId
            | Self::PendingTransferHasDifferentCreditAccountId
            | Self::PendingTransferHasDifferentLedger
            | Self::PendingTransferHasDifferentCode
            | Self::ExceedsPendingTransferAmount
            | Self::PendingTransferHasDifferentAmount
            | Self::PendingTransferAlreadyPosted
            | Self::PendingTransferAlreadyVoided
            | Self::PendingTransferExpired
            | Self::ExceedsCredits
            | Self::ExceedsDebits => ErrorCategory::Relational,
            _ => ErrorCategory::Malformed,
        }
    }

    /// Returns true if the event is a harmless duplicate.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::Exists)
    }
}

impl Serialize for CreateTransferError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.error_code())
    }
}

/// Errors that abort a whole batch.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The batch holds more events than allowed.
    #[error("Batch of {len} events exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Number of events submitted.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The storage collaborator failed; the batch must be rolled back.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }
}
