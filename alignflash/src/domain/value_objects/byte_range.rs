//! Byte request window.

use core::fmt;

use super::{WordAddress, WordWindow};
use crate::domain::RangeError;

/// A validated `[address, address + length)` window in byte space.
///
/// Construction guarantees that the range, padded out to whole words, fits in
/// the 32-bit address space, so every derived word and sector address is
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ByteRange {
    address: u32,
    length: u32,
}

impl ByteRange {
    /// Create a byte range.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::Overflow`] if the end of the range, rounded up to
    /// a word boundary, does not fit in `u32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignflash::domain::ByteRange;
    ///
    /// let range = ByteRange::new(2, 4).unwrap();
    /// assert_eq!(range.end(), 6);
    /// assert!(ByteRange::new(u32::MAX, 1).is_err());
    /// ```
    pub const fn new(address: u32, length: u32) -> Result<Self, RangeError> {
        let Some(end) = address.checked_add(length) else {
            return Err(RangeError::Overflow { address, length });
        };
        if WordAddress::align_up(end).is_none() {
            return Err(RangeError::Overflow { address, length });
        }
        Ok(Self { address, length })
    }

    /// Create a byte range covering a caller buffer of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::TooLong`] if `len` does not fit in `u32`, or
    /// [`RangeError::Overflow`] as for [`ByteRange::new`].
    pub fn from_slice_len(address: u32, len: usize) -> Result<Self, RangeError> {
        let length = u32::try_from(len).map_err(|_| RangeError::TooLong { length: len })?;
        Self::new(address, length)
    }

    /// First byte of the range.
    #[inline]
    pub const fn address(&self) -> u32 {
        self.address
    }

    /// Number of bytes in the range.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.length
    }

    /// Whether the range covers no bytes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// One past the last byte of the range.
    #[inline]
    pub const fn end(&self) -> u32 {
        // Checked in `new`.
        self.address + self.length
    }

    /// Split this range into edge words and an aligned interior.
    #[inline]
    pub const fn word_window(&self) -> WordWindow {
        WordWindow::new(*self)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.address, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_range_creation() {
        let range = ByteRange::new(10, 20).unwrap();
        assert_eq!(range.address(), 10);
        assert_eq!(range.len(), 20);
        assert_eq!(range.end(), 30);
        assert!(!range.is_empty());
    }

    #[test]
    fn test_empty_range_is_valid() {
        let range = ByteRange::new(7, 0).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.end(), 7);
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            ByteRange::new(u32::MAX - 1, 4),
            Err(RangeError::Overflow {
                address: u32::MAX - 1,
                length: 4
            })
        );
    }

    #[test]
    fn test_last_word_padding_must_fit() {
        // Ends exactly on the last representable word boundary
        assert!(ByteRange::new(0xFFFF_FFF0, 0xC).is_ok());
        // Ends mid-way through a word whose end is 2^32
        assert!(ByteRange::new(0xFFFF_FFFC, 1).is_err());
    }

    #[test]
    fn test_from_slice_len() {
        let range = ByteRange::from_slice_len(4, 16).unwrap();
        assert_eq!(range.len(), 16);

        let too_long = ByteRange::from_slice_len(0, u32::MAX as usize + 1);
        assert_eq!(
            too_long,
            Err(RangeError::TooLong {
                length: u32::MAX as usize + 1
            })
        );
    }

    #[test]
    fn test_byte_range_display() {
        let range = ByteRange::new(0x10, 0x8).unwrap();
        assert_eq!(format!("{}", range), "[0x10, 0x18)");
    }
}
