//! Ledger record types: accounts, transfers, their flag sets and the
//! derived pending-transfer status.
//!
//! All balances and amounts are `u128` in the ledger's smallest unit.
//! Timestamps are nanoseconds since the Unix epoch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use tally_shared::types::{AccountId, TransferId};

/// Nanoseconds per second, used to turn a pending timeout into an expiry.
pub const NS_PER_SECOND: u64 = 1_000_000_000;

/// Macro to generate a `u16` flag set with a single source-of-truth mask.
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$flag_meta:meta])* $flag:ident = $bit:expr; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u16);

        impl $name {
            $( $(#[$flag_meta])* pub const $flag: Self = Self(1 << $bit); )*

            /// No flags set.
            pub const NONE: Self = Self(0);

            /// Every bit with a defined meaning.
            pub const MASK: Self = Self(0 $( | (1 << $bit) )*);

            /// Returns the raw bits.
            #[must_use]
            pub const fn bits(self) -> u16 {
                self.0
            }

            /// Returns true if every bit of `other` is set.
            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns true if any bit of `other` is set.
            #[must_use]
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Returns true if a bit outside [`Self::MASK`] is set.
            #[must_use]
            pub const fn has_reserved_bits(self) -> bool {
                self.0 & !Self::MASK.0 != 0
            }

            /// Returns the flags with every bit of `other` set.
            #[must_use]
            pub const fn with(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Returns the flags with every bit of `other` cleared.
            #[must_use]
            pub const fn without(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.with(rhs)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                *self = self.with(rhs);
            }
        }
    };
}

flag_set! {
    /// Flags carried by an [`Account`].
    AccountFlags {
        /// Links this event with the next one in the batch.
        LINKED = 0;
        /// Debits (pending + posted) may never exceed posted credits.
        DEBITS_MUST_NOT_EXCEED_CREDITS = 1;
        /// Credits (pending + posted) may never exceed posted debits.
        CREDITS_MUST_NOT_EXCEED_DEBITS = 2;
        /// Record a balance snapshot for every transfer touching the account.
        HISTORY = 3;
        /// The account carries its own historical timestamp.
        IMPORTED = 4;
        /// The account rejects new transfers.
        CLOSED = 5;
    }
}

flag_set! {
    /// Flags carried by a [`Transfer`].
    TransferFlags {
        /// Links this event with the next one in the batch.
        LINKED = 0;
        /// Reserve the amount in the pending totals.
        PENDING = 1;
        /// Post (part of) a pending transfer.
        POST_PENDING_TRANSFER = 2;
        /// Void a pending transfer.
        VOID_PENDING_TRANSFER = 3;
        /// Cap the amount to the debit account's capacity.
        BALANCING_DEBIT = 4;
        /// Cap the amount to the credit account's capacity.
        BALANCING_CREDIT = 5;
        /// Close the debit account (requires `PENDING`).
        CLOSING_DEBIT = 6;
        /// Close the credit account (requires `PENDING`).
        CLOSING_CREDIT = 7;
        /// The transfer carries its own historical timestamp.
        IMPORTED = 8;
    }
}

impl TransferFlags {
    /// The two-phase flags; at most one may be set.
    pub const TWO_PHASE: Self = Self(
        Self::PENDING.0 | Self::POST_PENDING_TRANSFER.0 | Self::VOID_PENDING_TRANSFER.0,
    );

    /// Both balancing flags.
    pub const BALANCING: Self = Self(Self::BALANCING_DEBIT.0 | Self::BALANCING_CREDIT.0);

    /// Both closing flags.
    pub const CLOSING: Self = Self(Self::CLOSING_DEBIT.0 | Self::CLOSING_CREDIT.0);
}

/// A ledger account.
///
/// Accounts are created once; balances change only through transfers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Account identity.
    pub id: AccountId,
    /// Debits reserved by pending transfers.
    pub debits_pending: u128,
    /// Debits posted.
    pub debits_posted: u128,
    /// Credits reserved by pending transfers.
    pub credits_pending: u128,
    /// Credits posted.
    pub credits_posted: u128,
    /// Opaque application data.
    pub user_data_128: u128,
    /// Opaque application data.
    pub user_data_64: u64,
    /// Opaque application data.
    pub user_data_32: u32,
    /// Must be zero.
    pub reserved: u32,
    /// Ledger (asset domain) the account belongs to.
    pub ledger: u32,
    /// Application-defined classification.
    pub code: u16,
    /// Account flags.
    pub flags: AccountFlags,
    /// Creation timestamp, assigned by the ledger.
    pub timestamp: u64,
}

impl Account {
    /// Returns true if the account is part of a linked chain.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.flags.contains(AccountFlags::LINKED)
    }

    /// Returns true if the account carries its own timestamp.
    #[must_use]
    pub const fn is_imported(&self) -> bool {
        self.flags.contains(AccountFlags::IMPORTED)
    }

    /// Returns true if the account has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.flags.contains(AccountFlags::CLOSED)
    }

    /// Returns true if balance snapshots are kept for this account.
    #[must_use]
    pub const fn keeps_history(&self) -> bool {
        self.flags.contains(AccountFlags::HISTORY)
    }

    /// Returns the current balances as a snapshot taken at `timestamp`.
    #[must_use]
    pub const fn balance_at(&self, timestamp: u64) -> AccountBalance {
        AccountBalance {
            account_id: self.id,
            timestamp,
            debits_pending: self.debits_pending,
            debits_posted: self.debits_posted,
            credits_pending: self.credits_pending,
            credits_posted: self.credits_posted,
        }
    }
}

/// The mode a transfer operates in, derived from its two-phase flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Posts immediately.
    Single,
    /// Reserves the amount.
    Pending,
    /// Posts a pending transfer.
    PostPending,
    /// Voids a pending transfer.
    VoidPending,
}

/// A transfer of value between two accounts of the same ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transfer {
    /// Transfer identity.
    pub id: TransferId,
    /// Account debited.
    pub debit_account_id: AccountId,
    /// Account credited.
    pub credit_account_id: AccountId,
    /// Amount moved. For balancing transfers the stored amount is the
    /// amount actually applied.
    pub amount: u128,
    /// Pending transfer posted or voided by this transfer; zero otherwise.
    pub pending_id: TransferId,
    /// Opaque application data.
    pub user_data_128: u128,
    /// Opaque application data.
    pub user_data_64: u64,
    /// Opaque application data.
    pub user_data_32: u32,
    /// Seconds until a pending transfer expires; zero never expires.
    pub timeout: u32,
    /// Ledger both accounts must belong to.
    pub ledger: u32,
    /// Application-defined classification.
    pub code: u16,
    /// Transfer flags.
    pub flags: TransferFlags,
    /// Acceptance timestamp, assigned by the ledger.
    pub timestamp: u64,
}

impl Transfer {
    /// Returns the transfer's two-phase mode.
    ///
    /// Assumes at most one two-phase flag is set, which validation enforces.
    #[must_use]
    pub const fn kind(&self) -> TransferKind {
        if self.flags.contains(TransferFlags::PENDING) {
            TransferKind::Pending
        } else if self.flags.contains(TransferFlags::POST_PENDING_TRANSFER) {
            TransferKind::PostPending
        } else if self.flags.contains(TransferFlags::VOID_PENDING_TRANSFER) {
            TransferKind::VoidPending
        } else {
            TransferKind::Single
        }
    }

    /// Returns true if the transfer is part of a linked chain.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.flags.contains(TransferFlags::LINKED)
    }

    /// Returns true if the transfer carries its own timestamp.
    #[must_use]
    pub const fn is_imported(&self) -> bool {
        self.flags.contains(TransferFlags::IMPORTED)
    }

    /// Returns true if the amount is capped to an account's capacity.
    #[must_use]
    pub const fn is_balancing(&self) -> bool {
        self.flags.intersects(TransferFlags::BALANCING)
    }

    /// Returns the timestamp at which this pending transfer expires, if it
    /// has a timeout. `None` also when the expiry does not fit in `u64`.
    #[must_use]
    pub fn expires_at(&self) -> Option<u64> {
        if self.timeout == 0 {
            return None;
        }
        u64::from(self.timeout)
            .checked_mul(NS_PER_SECOND)
            .and_then(|ns| self.timestamp.checked_add(ns))
    }
}

/// Status of a pending transfer.
///
/// The valid transitions are:
/// - Pending → Posted (post)
/// - Pending → Voided (void)
/// - Pending → Expired (timeout elapsed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    /// Amount is reserved and awaiting post or void.
    Pending,
    /// Posted (possibly partially).
    Posted,
    /// Voided; the reservation was released.
    Voided,
    /// Timed out; the reservation was released.
    Expired,
}

impl PendingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
            Self::Voided => "voided",
            Self::Expired => "expired",
        }
    }

    /// Returns true if moving from `self` to `to` is allowed.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Posted | Self::Voided | Self::Expired)
        )
    }
}

impl fmt::Display for PendingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable balance snapshot of a `history` account, keyed by
/// `(account_id, timestamp)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account the snapshot belongs to.
    pub account_id: AccountId,
    /// Timestamp of the transfer that produced the snapshot.
    pub timestamp: u64,
    /// Debits reserved after the transfer.
    pub debits_pending: u128,
    /// Debits posted after the transfer.
    pub debits_posted: u128,
    /// Credits reserved after the transfer.
    pub credits_pending: u128,
    /// Credits posted after the transfer.
    pub credits_posted: u128,
}
