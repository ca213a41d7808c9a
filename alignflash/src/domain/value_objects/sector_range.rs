//! Sector span of an erase request.

use core::num::NonZeroU32;
use core::ops::Range;

use super::ByteRange;

/// The sectors an erase request maps to.
///
/// Derived with truncating division, so a request that is not sector aligned
/// still maps to the sectors its rounded-down start and length name. Whether
/// the request was aligned is reported separately by [`SectorAlignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SectorRange {
    first_sector: u32,
    sector_count: u32,
}

/// Which parts of an erase request fell on sector boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SectorAlignment {
    /// Request address was a multiple of the sector size.
    pub address_aligned: bool,
    /// Request length was a multiple of the sector size.
    pub length_aligned: bool,
}

impl SectorAlignment {
    /// Both address and length were sector multiples.
    #[inline]
    pub const fn is_aligned(&self) -> bool {
        self.address_aligned && self.length_aligned
    }
}

impl SectorRange {
    /// Create a sector range directly.
    #[inline]
    pub const fn new(first_sector: u32, sector_count: u32) -> Self {
        Self {
            first_sector,
            sector_count,
        }
    }

    /// Map a byte range onto sectors of `sector_size` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::num::NonZeroU32;
    /// use alignflash::domain::{ByteRange, SectorRange};
    ///
    /// let sector_size = NonZeroU32::new(4096).unwrap();
    /// let range = ByteRange::new(4096, 8192).unwrap();
    /// let (sectors, alignment) = SectorRange::from_byte_range(range, sector_size);
    ///
    /// assert_eq!(sectors.first_sector(), 1);
    /// assert_eq!(sectors.sector_count(), 2);
    /// assert!(alignment.is_aligned());
    /// ```
    pub const fn from_byte_range(
        range: ByteRange,
        sector_size: NonZeroU32,
    ) -> (Self, SectorAlignment) {
        Self::from_request(range.address(), range.len(), sector_size)
    }

    /// Map a raw `address`/`length` erase request onto sectors.
    ///
    /// Erase has no word-level concern, so unlike [`ByteRange`] nothing is
    /// padded; the caller only has to keep `address + length` within `u32`.
    pub const fn from_request(
        address: u32,
        length: u32,
        sector_size: NonZeroU32,
    ) -> (Self, SectorAlignment) {
        let size = sector_size.get();
        let sectors = Self {
            first_sector: address / size,
            sector_count: length / size,
        };
        let alignment = SectorAlignment {
            address_aligned: address % size == 0,
            length_aligned: length % size == 0,
        };
        (sectors, alignment)
    }

    /// Index of the first sector.
    #[inline]
    pub const fn first_sector(&self) -> u32 {
        self.first_sector
    }

    /// Number of sectors.
    #[inline]
    pub const fn sector_count(&self) -> u32 {
        self.sector_count
    }

    /// Whether no sector is covered.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.sector_count == 0
    }

    /// Sector indices in ascending order.
    #[inline]
    pub fn sectors(&self) -> Range<u32> {
        self.first_sector..self.first_sector.saturating_add(self.sector_count)
    }
}
