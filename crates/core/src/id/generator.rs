//! Time-sortable 128-bit identifiers.
//!
//! Layout, most significant bit first:
//!
//! ```text
//! | 48 bits: milliseconds since epoch | 80 bits: random |
//! ```
//!
//! Ids from one generator are strictly increasing. Within a millisecond the
//! random part is reused and incremented; a new millisecond draws fresh
//! randomness.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tally_shared::types::{AccountId, TransferId, is_valid_id};

use super::clock::{Clock, SystemClock};

/// Bits holding the millisecond timestamp.
pub const TIMESTAMP_BITS: u32 = 48;

/// Bits holding the random part.
pub const RANDOM_BITS: u32 = 80;

const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;
const RANDOM_MASK: u128 = (1 << RANDOM_BITS) - 1;

/// Builds an id from a millisecond timestamp and a random part.
///
/// Bits beyond 48 and 80 respectively are discarded.
#[must_use]
pub const fn from_parts(timestamp_ms: u64, random: u128) -> u128 {
    (((timestamp_ms & TIMESTAMP_MASK) as u128) << RANDOM_BITS) | (random & RANDOM_MASK)
}

/// Splits an id into its millisecond timestamp and random part.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn parse(id: u128) -> (u64, u128) {
    ((id >> RANDOM_BITS) as u64, id & RANDOM_MASK)
}

/// Returns true if `id` may be used as a record identity.
#[must_use]
pub const fn is_valid(id: u128) -> bool {
    is_valid_id(id)
}

/// Generates monotonic, time-sortable ids.
///
/// # Example
///
/// ```
/// use tally_core::id::IdGenerator;
///
/// let mut ids = IdGenerator::new();
/// let a = ids.next_id();
/// let b = ids.next_id();
/// assert!(a < b);
/// ```
#[derive(Debug)]
pub struct IdGenerator<C: Clock = SystemClock> {
    clock: C,
    rng: StdRng,
    last_ms: u64,
    last_random: u128,
    started: bool,
}

impl IdGenerator<SystemClock> {
    /// Creates a generator on the system clock with OS-seeded randomness.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for IdGenerator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> IdGenerator<C> {
    /// Creates a generator on `clock` with OS-seeded randomness.
    pub fn with_clock(clock: C) -> Self {
        Self::from_rng(clock, StdRng::from_entropy())
    }

    /// Creates a generator with reproducible randomness.
    pub fn with_seed(clock: C, seed: u64) -> Self {
        Self::from_rng(clock, StdRng::seed_from_u64(seed))
    }

    fn from_rng(clock: C, rng: StdRng) -> Self {
        Self {
            clock,
            rng,
            last_ms: 0,
            last_random: 0,
            started: false,
        }
    }

    /// Returns the generator's clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the next id.
    ///
    /// If the clock reads the same or an earlier millisecond than the
    /// previous call, the previous millisecond is kept and the random part
    /// is incremented.
    ///
    /// # Panics
    ///
    /// Panics if more than 2^80 ids are requested within one millisecond.
    pub fn next_id(&mut self) -> u128 {
        let now_ms = self.clock.now_ms() & TIMESTAMP_MASK;

        if !self.started || now_ms > self.last_ms {
            self.started = true;
            self.last_ms = now_ms;
            self.last_random = self.rng.r#gen::<u128>() & RANDOM_MASK;
        } else {
            self.last_random += 1;
            assert!(
                self.last_random <= RANDOM_MASK,
                "random part overflowed within millisecond {}",
                self.last_ms
            );
        }

        from_parts(self.last_ms, self.last_random)
    }

    /// Returns the next id as an [`AccountId`].
    pub fn next_account_id(&mut self) -> AccountId {
        AccountId(self.next_id())
    }

    /// Returns the next id as a [`TransferId`].
    pub fn next_transfer_id(&mut self) -> TransferId {
        TransferId(self.next_id())
    }
}
