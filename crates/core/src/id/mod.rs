//! Identifiers and time.
//!
//! - [`IdGenerator`] mints 128-bit ids that sort by creation time
//! - [`Clock`] abstracts the wall clock so tests stay deterministic
//! - [`Timestamper`] hands out strictly increasing event timestamps

pub mod clock;
pub mod generator;

#[cfg(test)]
mod generator_props;

pub use clock::{Clock, ManualClock, SystemClock, Timestamper};
pub use generator::{IdGenerator, RANDOM_BITS, TIMESTAMP_BITS, from_parts, is_valid, parse};
