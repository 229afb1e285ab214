//! Typed 128-bit IDs for type-safe record references.
//!
//! Using typed IDs prevents accidentally passing a `TransferId` where an
//! `AccountId` is expected. Zero and `u128::MAX` are reserved: zero means
//! "no reference" and the maximum value is never a valid identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returns true if `raw` may be used as the identity of a record.
#[must_use]
pub const fn is_valid_id(raw: u128) -> bool {
    raw != 0 && raw != u128::MAX
}

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u128);

        impl $name {
            /// The zero ID, meaning "unset".
            pub const ZERO: Self = Self(0);

            /// The reserved maximum ID, never a valid identity.
            pub const MAX: Self = Self(u128::MAX);

            /// Creates an ID from its raw value.
            #[must_use]
            pub const fn from_u128(raw: u128) -> Self {
                Self(raw)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn as_u128(self) -> u128 {
                self.0
            }

            /// Returns true if this ID is zero.
            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }

            /// Returns true if this ID is the reserved maximum.
            #[must_use]
            pub const fn is_max(self) -> bool {
                self.0 == u128::MAX
            }

            /// Returns true if this ID may identify a record.
            #[must_use]
            pub const fn is_valid(self) -> bool {
                is_valid_id(self.0)
            }

            /// Returns the ID as a UUID (same 128 bits, big-endian).
            #[must_use]
            pub const fn to_uuid(self) -> Uuid {
                Uuid::from_u128(self.0)
            }
        }

        impl From<u128> for $name {
            fn from(raw: u128) -> Self {
                Self(raw)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid.as_u128())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.to_uuid())
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            /// Accepts either a UUID string or a plain decimal number.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Ok(raw) = s.parse::<u128>() {
                    return Ok(Self(raw));
                }
                Ok(Self(Uuid::parse_str(s)?.as_u128()))
            }
        }
    };
}

typed_id!(AccountId, "Unique identifier for a ledger account.");
typed_id!(TransferId, "Unique identifier for a transfer.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
