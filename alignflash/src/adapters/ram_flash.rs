//! Heap-allocated flash simulator (requires `alloc`).

use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroU32;

use crate::adapters::error::Operation;
use crate::domain::{FlashDevice, WORD_SIZE, Word, WordAddress, value_objects::words_as_bytes};

/// Per-kind counts of device calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStats {
    /// `read_words` calls.
    pub reads: u32,
    /// `write_words` calls.
    pub writes: u32,
    /// `erase_sector` calls.
    pub erases: u32,
}

impl DeviceStats {
    /// All device calls.
    pub const fn total(&self) -> u32 {
        self.reads + self.writes + self.erases
    }
}

/// One successful `write_words` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    /// Word address programmed.
    pub address: u32,
    /// Bytes programmed.
    pub len: u32,
}

/// Errors from [`RamFlash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamFlashError {
    /// Access past the end of the simulated device.
    OutOfBounds {
        /// Start of the access.
        address: u32,
        /// Length of the access.
        len: usize,
    },
    /// Read length is not a whole number of words.
    NotAligned,
    /// Failure injected with [`RamFlash::fail_after`].
    Injected(Operation),
}

impl fmt::Display for RamFlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { address, len } => {
                write!(f, "Access of {} bytes at {:#x} is out of bounds", len, address)
            }
            Self::NotAligned => write!(f, "Access length is not word aligned"),
            Self::Injected(op) => write!(f, "Injected {} failure", op),
        }
    }
}

impl core::error::Error for RamFlashError {}

#[derive(Debug, Clone, Copy)]
struct Fault {
    operation: Operation,
    remaining: u32,
}

/// In-memory flash with real program semantics.
///
/// Storage starts erased (`0xFF`). A program ANDs the new bytes into the
/// stored ones, so writing over programmed data without an erase produces the
/// same result as real NOR flash would. Every call is counted, writes and
/// erases are logged, and failures can be injected per operation kind.
///
/// # Examples
///
/// ```
/// use alignflash::{FlashDevice, RamFlash, WordAddress};
///
/// let mut flash = RamFlash::new(8192, 4096);
/// let addr = WordAddress::new(0).unwrap();
///
/// flash.write_words(addr, &[aligned::Aligned([0x0F; 4])]).unwrap();
/// flash.write_words(addr, &[aligned::Aligned([0xF5; 4])]).unwrap();
/// assert_eq!(&flash.as_bytes()[..4], &[0x05; 4]);
/// ```
pub struct RamFlash {
    data: Vec<u8>,
    sector_size: NonZeroU32,
    stats: DeviceStats,
    write_log: Vec<WriteRecord>,
    erased_sectors: Vec<u32>,
    fault: Option<Fault>,
}

impl RamFlash {
    /// Create an erased device of `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `sector_size` is zero or not a multiple of the word size, or
    /// if `capacity` is not a whole number of sectors.
    pub fn new(capacity: u32, sector_size: u32) -> Self {
        assert!(
            sector_size != 0 && sector_size % WORD_SIZE as u32 == 0,
            "sector_size must be a non-zero multiple of the word size"
        );
        assert!(
            capacity % sector_size == 0,
            "capacity must be a whole number of sectors"
        );

        Self {
            data: alloc::vec![0xFF; capacity as usize],
            sector_size: NonZeroU32::new(sector_size).unwrap_or(NonZeroU32::MIN),
            stats: DeviceStats::default(),
            write_log: Vec::new(),
            erased_sectors: Vec::new(),
            fault: None,
        }
    }

    /// Overwrite raw contents, bypassing program semantics and statistics.
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit in the device.
    pub fn preload(&mut self, address: u32, bytes: &[u8]) {
        let start = address as usize;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Raw contents of the whole device.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Call counts since creation or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// Successful writes, oldest first.
    pub fn write_log(&self) -> &[WriteRecord] {
        &self.write_log
    }

    /// Successfully erased sectors, oldest first.
    pub fn erased_sectors(&self) -> &[u32] {
        &self.erased_sectors
    }

    /// Clear call counts and logs.
    pub fn reset_stats(&mut self) {
        self.stats = DeviceStats::default();
        self.write_log.clear();
        self.erased_sectors.clear();
    }

    /// Let `successes` more calls of kind `operation` succeed, then fail
    /// every following one with [`RamFlashError::Injected`].
    pub fn fail_after(&mut self, operation: Operation, successes: u32) {
        self.fault = Some(Fault {
            operation,
            remaining: successes,
        });
    }

    /// Remove any injected fault.
    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    fn check_fault(&mut self, operation: Operation) -> Result<(), RamFlashError> {
        match &mut self.fault {
            Some(fault) if fault.operation == operation => {
                if fault.remaining == 0 {
                    return Err(RamFlashError::Injected(operation));
                }
                fault.remaining -= 1;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn span(&self, address: u32, len: usize) -> Result<core::ops::Range<usize>, RamFlashError> {
        let start = address as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(start..end),
            _ => Err(RamFlashError::OutOfBounds { address, len }),
        }
    }
}

impl FlashDevice for RamFlash {
    type Error = RamFlashError;

    fn sector_size(&self) -> NonZeroU32 {
        self.sector_size
    }

    fn capacity(&self) -> u32 {
        self.data.len() as u32
    }

    fn read_words(&mut self, address: WordAddress, dest: &mut [u8]) -> Result<(), Self::Error> {
        self.stats.reads += 1;
        self.check_fault(Operation::Read)?;
        if dest.len() % WORD_SIZE != 0 {
            return Err(RamFlashError::NotAligned);
        }

        let span = self.span(address.value(), dest.len())?;
        dest.copy_from_slice(&self.data[span]);
        Ok(())
    }

    fn write_words(&mut self, address: WordAddress, src: &[Word]) -> Result<(), Self::Error> {
        self.stats.writes += 1;
        self.check_fault(Operation::Write)?;

        let bytes = words_as_bytes(src);
        let span = self.span(address.value(), bytes.len())?;
        for (cell, byte) in self.data[span].iter_mut().zip(bytes) {
            *cell &= *byte;
        }

        self.write_log.push(WriteRecord {
            address: address.value(),
            len: bytes.len() as u32,
        });
        Ok(())
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), Self::Error> {
        self.stats.erases += 1;
        self.check_fault(Operation::Erase)?;

        let size = self.sector_size.get();
        let address = sector.saturating_mul(size);
        let span = self.span(address, size as usize)?;
        self.data[span].fill(0xFF);

        self.erased_sectors.push(sector);
        Ok(())
    }
}
