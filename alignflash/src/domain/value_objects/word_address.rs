//! Type-safe word address value object.

use core::fmt;

use super::WORD_SIZE;
use crate::domain::RangeError;

const WORD_MASK: u32 = !(WORD_SIZE as u32 - 1);

/// A byte address that is a multiple of [`WORD_SIZE`].
///
/// This is the only address type the device port accepts, so an unaligned
/// address can never reach a device read or program call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WordAddress(u32);

impl WordAddress {
    /// Create a word address, rejecting unaligned values.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignflash::domain::WordAddress;
    ///
    /// assert_eq!(WordAddress::new(8).unwrap().value(), 8);
    /// assert!(WordAddress::new(6).is_err());
    /// ```
    #[inline]
    pub const fn new(value: u32) -> Result<Self, RangeError> {
        if value & !WORD_MASK != 0 {
            Err(RangeError::Unaligned { address: value })
        } else {
            Ok(Self(value))
        }
    }

    /// The word containing byte `value`.
    #[inline]
    pub const fn align_down(value: u32) -> Self {
        Self(value & WORD_MASK)
    }

    /// The first word boundary at or after byte `value`, if it fits in `u32`.
    #[inline]
    pub const fn align_up(value: u32) -> Option<Self> {
        match value.checked_add(WORD_SIZE as u32 - 1) {
            Some(padded) => Some(Self(padded & WORD_MASK)),
            None => None,
        }
    }

    /// Get the underlying u32 value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Advance by `words` whole words.
    #[inline]
    pub const fn add_words(self, words: u32) -> Self {
        Self(self.0.saturating_add(words.saturating_mul(WORD_SIZE as u32)) & WORD_MASK)
    }

    /// Distance in bytes from `other` to this address.
    #[inline]
    pub const fn offset_from(self, other: Self) -> u32 {
        self.0.saturating_sub(other.0)
    }
}

impl fmt::Display for WordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#010x})", self.0)
    }
}

impl TryFrom<u32> for WordAddress {
    type Error = RangeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WordAddress> for u32 {
    fn from(addr: WordAddress) -> Self {
        addr.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_address_creation() {
        assert_eq!(WordAddress::new(0).unwrap().value(), 0);
        assert_eq!(WordAddress::new(4096).unwrap().value(), 4096);
        assert_eq!(
            WordAddress::new(4097),
            Err(RangeError::Unaligned { address: 4097 })
        );
    }

    #[test]
    fn test_align_down() {
        assert_eq!(WordAddress::align_down(0).value(), 0);
        assert_eq!(WordAddress::align_down(3).value(), 0);
        assert_eq!(WordAddress::align_down(4).value(), 4);
        assert_eq!(WordAddress::align_down(u32::MAX).value(), 0xFFFF_FFFC);
    }

    #[test]
    fn test_align_up() {
        assert_eq!(WordAddress::align_up(0).unwrap().value(), 0);
        assert_eq!(WordAddress::align_up(1).unwrap().value(), 4);
        assert_eq!(WordAddress::align_up(4).unwrap().value(), 4);
        assert_eq!(WordAddress::align_up(0xFFFF_FFFC).unwrap().value(), 0xFFFF_FFFC);
        assert_eq!(WordAddress::align_up(0xFFFF_FFFD), None);
    }

    #[test]
    fn test_add_words() {
        let addr = WordAddress::new(8).unwrap();
        assert_eq!(addr.add_words(2).value(), 16);

        let top = WordAddress::new(0xFFFF_FFFC).unwrap();
        assert_eq!(top.add_words(1).value(), 0xFFFF_FFFC); // saturating
    }

    #[test]
    fn test_offset_from() {
        let a = WordAddress::new(100).unwrap();
        let b = WordAddress::new(60).unwrap();
        assert_eq!(a.offset_from(b), 40);
        assert_eq!(b.offset_from(a), 0); // saturating
    }

    #[test]
    fn test_word_address_display() {
        let addr = WordAddress::new(0x1000).unwrap();
        assert_eq!(format!("{}", addr), "Word(0x00001000)");
    }
}
