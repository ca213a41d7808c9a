//! NOR flash device for `embedded-storage` traits.
//!
//! This module wraps a type implementing `embedded-storage` NOR flash traits
//! and exposes a region of it as a [`FlashDevice`].
//!
//! # Example
//!
//! ```ignore
//! use esp_storage::FlashStorage as EspFlash;
//! use alignflash::{AlignedFlash, NorFlashDevice, NorFlashRegion};
//!
//! let device = NorFlashDevice::new(EspFlash::new(), NorFlashRegion::default_4mb());
//! let mut flash = AlignedFlash::new(device);
//!
//! flash.write(3, b"config")?;
//! ```

use core::fmt;
use core::num::NonZeroU32;

use embedded_storage::nor_flash::{NorFlash, NorFlashErrorKind};

use crate::domain::{FlashDevice, WORD_SIZE, Word, WordAddress, value_objects::words_as_bytes};

/// Sector size of common SPI NOR parts (4KB).
pub const NOR_FLASH_SECTOR_SIZE: u32 = 4096;

/// The slice of a flash chip handed to the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NorFlashRegion {
    /// Start offset in flash (must be sector aligned)
    pub start_offset: u32,
    /// Region size in bytes (must be a whole number of sectors)
    pub size: u32,
}

impl NorFlashRegion {
    /// Create a new region.
    ///
    /// # Panics
    /// Panics if `start_offset` or `size` is not 4KB aligned, or if the region
    /// runs past the 32-bit address space.
    pub fn new(start_offset: u32, size: u32) -> Self {
        assert!(
            start_offset % NOR_FLASH_SECTOR_SIZE == 0,
            "start_offset must be 4KB aligned"
        );
        assert!(size % NOR_FLASH_SECTOR_SIZE == 0, "size must be 4KB aligned");
        assert!(
            start_offset.checked_add(size).is_some(),
            "region must fit in the 32-bit address space"
        );
        Self { start_offset, size }
    }

    /// Last 256KB of a 4MB flash, at offset 0x3C0000.
    pub fn default_4mb() -> Self {
        Self::new(0x3C_0000, 64 * NOR_FLASH_SECTOR_SIZE)
    }

    /// Last 1MB of a 16MB flash, at offset 0xF00000.
    pub fn default_16mb() -> Self {
        Self::new(0xF0_0000, 256 * NOR_FLASH_SECTOR_SIZE)
    }

    /// Number of 4KB sectors in the region.
    #[inline]
    pub fn sector_count(&self) -> u32 {
        self.size / NOR_FLASH_SECTOR_SIZE
    }
}

impl Default for NorFlashRegion {
    fn default() -> Self {
        Self::default_4mb()
    }
}

/// Errors from [`NorFlashDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NorFlashError {
    /// Access leaves the configured region.
    OutOfRegion {
        /// Region-relative start of the access.
        address: u32,
        /// Length of the access.
        len: u32,
    },
    /// The flash driver failed.
    Flash(NorFlashErrorKind),
}

impl fmt::Display for NorFlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRegion { address, len } => {
                write!(f, "Access of {} bytes at {:#x} leaves the flash region", len, address)
            }
            Self::Flash(kind) => write!(f, "NOR flash error: {:?}", kind),
        }
    }
}

impl core::error::Error for NorFlashError {}

/// [`FlashDevice`] over an `embedded-storage` [`NorFlash`].
///
/// Addresses are relative to the region start. Sectors are the chip's
/// `ERASE_SIZE`.
pub struct NorFlashDevice<F> {
    flash: F,
    region: NorFlashRegion,
    sector_size: NonZeroU32,
}

impl<F: NorFlash> NorFlashDevice<F> {
    /// Expose `region` of `flash` as a device.
    ///
    /// # Panics
    /// Panics if the chip's erase size does not divide the region, or if its
    /// read or write granularity does not divide the word size.
    pub fn new(flash: F, region: NorFlashRegion) -> Self {
        let erase_size = F::ERASE_SIZE as u32;
        assert!(
            erase_size != 0
                && region.start_offset % erase_size == 0
                && region.size % erase_size == 0,
            "region must be aligned to the flash erase size"
        );
        assert!(
            WORD_SIZE % F::WRITE_SIZE == 0 && WORD_SIZE % F::READ_SIZE == 0,
            "flash read/write granularity must divide the word size"
        );

        debug!(
            "NOR flash region at {:#x}, {} sectors of {} bytes",
            region.start_offset,
            region.size / erase_size,
            erase_size
        );

        Self {
            flash,
            region,
            sector_size: NonZeroU32::new(erase_size).unwrap_or(NonZeroU32::MIN),
        }
    }

    /// The configured region.
    pub fn region(&self) -> NorFlashRegion {
        self.region
    }

    /// Get a reference to the underlying flash.
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Get a mutable reference to the underlying flash.
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Consume the device and return the underlying flash.
    pub fn into_inner(self) -> F {
        self.flash
    }

    /// Absolute flash offset of a region-relative access.
    fn offset(&self, address: u32, len: usize) -> Result<u32, NorFlashError> {
        let out_of_region = NorFlashError::OutOfRegion {
            address,
            len: len as u32,
        };
        let len = u32::try_from(len).map_err(|_| out_of_region)?;
        match address.checked_add(len) {
            Some(end) if end <= self.region.size => Ok(self.region.start_offset + address),
            _ => Err(out_of_region),
        }
    }
}

fn flash_error<E: embedded_storage::nor_flash::NorFlashError>(e: E) -> NorFlashError {
    NorFlashError::Flash(e.kind())
}

impl<F: NorFlash> FlashDevice for NorFlashDevice<F> {
    type Error = NorFlashError;

    fn sector_size(&self) -> NonZeroU32 {
        self.sector_size
    }

    fn capacity(&self) -> u32 {
        self.region.size
    }

    fn read_words(&mut self, address: WordAddress, dest: &mut [u8]) -> Result<(), Self::Error> {
        let offset = self.offset(address.value(), dest.len())?;
        self.flash.read(offset, dest).map_err(flash_error)
    }

    fn write_words(&mut self, address: WordAddress, src: &[Word]) -> Result<(), Self::Error> {
        let bytes = words_as_bytes(src);
        let offset = self.offset(address.value(), bytes.len())?;
        self.flash.write(offset, bytes).map_err(flash_error)
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), Self::Error> {
        let size = self.sector_size.get();
        let address = sector.checked_mul(size).ok_or(NorFlashError::OutOfRegion {
            address: u32::MAX,
            len: size,
        })?;
        let from = self.offset(address, size as usize)?;
        self.flash.erase(from, from + size).map_err(flash_error)
    }
}
