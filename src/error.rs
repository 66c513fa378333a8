//! Error types for the radix-conversion boundary.
//!
//! Everything else in the core treats bad input as a precondition
//! violation and panics; radix conversion is fed data derived from user
//! strings, so its failures are ordinary errors.

use thiserror::Error;

/// Errors that can occur converting between binary and packed-radix form
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RadixError {
    /// Base outside the supported human range
    #[error("unsupported base {0}: expected 2..=36")]
    UnsupportedBase(u64),

    /// A packed digit word holds a value >= base^digits_per_word
    #[error("packed digit word {value} at index {index} out of range for base {base}")]
    DigitOutOfRange {
        index: usize,
        value: u64,
        base: u64,
    },

    /// Caller-provided output buffer cannot hold the converted value
    #[error("output buffer too short: need {needed} words, have {have}")]
    BufferTooShort { needed: usize, have: usize },
}

/// Type alias for Result with RadixError
pub type RadixResult<T> = std::result::Result<T, RadixError>;
