//! Domain-level errors.
//!
//! These describe requests that cannot be mapped onto the 32-bit flash
//! address space, not device failures (which come through the port error
//! types).

use core::fmt;

/// A byte request that has no valid word/sector decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum RangeError {
    /// `address + length`, padded out to a whole word, does not fit in `u32`.
    Overflow {
        /// Start of the requested range.
        address: u32,
        /// Length of the requested range.
        length: u32,
    },

    /// A caller buffer is longer than the 32-bit address space.
    TooLong {
        /// Length of the offending buffer.
        length: usize,
    },

    /// A word address that is not a multiple of the word size.
    Unaligned {
        /// The offending address.
        address: u32,
    },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { address, length } => write!(
                f,
                "Range of {} bytes at {:#010x} overflows the 32-bit address space",
                length, address
            ),
            Self::TooLong { length } => {
                write!(f, "Buffer of {} bytes exceeds the 32-bit address space", length)
            }
            Self::Unaligned { address } => {
                write!(f, "Address {:#010x} is not word aligned", address)
            }
        }
    }
}

impl core::error::Error for RangeError {}
