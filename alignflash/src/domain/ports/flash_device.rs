//! FlashDevice port - Secondary (driven) port for raw flash primitives.
//!
//! This port defines what the alignment adapter needs from a flash driver.
//! Every address and length crossing it is word or sector granular.

use core::fmt;
use core::num::NonZeroU32;

use crate::domain::value_objects::{WordAddress, Word};

/// Port for word-programmed, sector-erased flash.
///
/// This is a **secondary (driven) port** in hexagonal architecture terms.
/// `AlignedFlash` depends on this abstraction and device adapters provide
/// concrete implementations.
///
/// ```text
/// ┌─────────────────────┐
/// │   Adapter Layer     │
/// │   (AlignedFlash)    │
/// └──────────┬──────────┘
///            │ depends on
///            ▼
/// ┌─────────────────────┐
/// │  FlashDevice Port   │  ◄── This trait
/// └──────────┬──────────┘
///            │ implemented by
///            ▼
/// ┌─────────────────────┐
/// │  NorFlashDevice,    │
/// │  RamFlash, ...      │
/// └─────────────────────┘
/// ```
///
/// # Program semantics
///
/// `write_words` programs: each stored bit becomes `old & new`. Bits can only
/// go from 1 to 0; getting a 1 back requires `erase_sector`.
pub trait FlashDevice {
    /// The error type for device operations.
    type Error: fmt::Debug + fmt::Display;

    /// Size of one erase sector in bytes. A multiple of the word size.
    fn sector_size(&self) -> NonZeroU32;

    /// Addressable size of the device in bytes.
    fn capacity(&self) -> u32;

    /// Read `dest.len()` bytes starting at `address`.
    ///
    /// `dest.len()` must be a multiple of the word size. `dest` itself may
    /// sit anywhere in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the device read fails or the range is out of bounds.
    fn read_words(&mut self, address: WordAddress, dest: &mut [u8]) -> Result<(), Self::Error>;

    /// Program `src` starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device program fails or the range is out of
    /// bounds. The device may have programmed a prefix of `src` by then.
    fn write_words(&mut self, address: WordAddress, src: &[Word]) -> Result<(), Self::Error>;

    /// Erase sector number `sector` to all-ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the erase fails or the sector does not exist.
    fn erase_sector(&mut self, sector: u32) -> Result<(), Self::Error>;
}

impl<T: FlashDevice + ?Sized> FlashDevice for &mut T {
    type Error = T::Error;

    #[inline]
    fn sector_size(&self) -> NonZeroU32 {
        T::sector_size(self)
    }

    #[inline]
    fn capacity(&self) -> u32 {
        T::capacity(self)
    }

    #[inline]
    fn read_words(&mut self, address: WordAddress, dest: &mut [u8]) -> Result<(), Self::Error> {
        T::read_words(self, address, dest)
    }

    #[inline]
    fn write_words(&mut self, address: WordAddress, src: &[Word]) -> Result<(), Self::Error> {
        T::write_words(self, address, src)
    }

    #[inline]
    fn erase_sector(&mut self, sector: u32) -> Result<(), Self::Error> {
        T::erase_sector(self, sector)
    }
}
