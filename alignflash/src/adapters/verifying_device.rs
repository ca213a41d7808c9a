//! Program-semantics checking wrapper.
//!
//! NOR flash programs by clearing bits. Writing a byte that needs a 0→1
//! transition silently stores `old & new` instead, which usually shows up
//! much later as filesystem corruption. `VerifyingDevice` reads the target
//! words before every program and refuses the write instead.
//!
//! This doubles the device traffic of every write, so it is meant for tests
//! and bring-up, not production builds.
//!
//! # Example
//!
//! ```
//! use alignflash::{AlignError, AlignedFlash, RamFlash, VerifyError, VerifyingDevice};
//!
//! let mut flash = AlignedFlash::new(VerifyingDevice::new(RamFlash::new(4096, 4096)));
//!
//! flash.write(0, &[0x0F]).unwrap();
//! let err = flash.write(0, &[0xF0]).unwrap_err();
//! assert!(matches!(
//!     err,
//!     AlignError::DeviceIo { source: VerifyError::WouldSetBits { address: 0, .. }, .. }
//! ));
//! ```

use core::fmt;
use core::num::NonZeroU32;

use crate::domain::{FlashDevice, WORD_SIZE, Word, WordAddress, value_objects::words_as_bytes};

/// Words compared per verification read.
const VERIFY_CHUNK_WORDS: usize = 16;

/// Errors from [`VerifyingDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError<E> {
    /// The wrapped device failed.
    Device(E),
    /// The program would need to turn a 0 bit back into a 1.
    WouldSetBits {
        /// Byte address of the first offending byte.
        address: u32,
        /// Byte currently stored.
        current: u8,
        /// Byte the caller asked to store.
        requested: u8,
    },
}

impl<E: fmt::Display> fmt::Display for VerifyError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "Device error: {}", e),
            Self::WouldSetBits {
                address,
                current,
                requested,
            } => write!(
                f,
                "Program at {:#x} would set bits ({:#04x} -> {:#04x}); erase first",
                address, current, requested
            ),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for VerifyError<E> {}

/// A [`FlashDevice`] wrapper that rejects programs needing a 0→1 transition.
///
/// Reads and erases pass straight through. A rejected write leaves the device
/// untouched: the whole source is checked before anything is programmed.
///
/// Requested `0xFF` bytes program nothing and are not checked. This is what
/// lets the `0xFF` padding of edge words sit next to programmed data, but it
/// also means an explicit `0xFF` over programmed bytes goes unnoticed.
pub struct VerifyingDevice<D> {
    inner: D,
}

impl<D> VerifyingDevice<D> {
    /// Wrap `inner`.
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    /// Get a reference to the inner device.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Get a mutable reference to the inner device.
    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    /// Consume the wrapper and return the inner device.
    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: FlashDevice> VerifyingDevice<D> {
    fn verify(&mut self, address: WordAddress, src: &[Word]) -> Result<(), VerifyError<D::Error>> {
        let mut current = [0u8; VERIFY_CHUNK_WORDS * WORD_SIZE];

        for (index, chunk) in src.chunks(VERIFY_CHUNK_WORDS).enumerate() {
            let chunk_address = address.add_words((index * VERIFY_CHUNK_WORDS) as u32);
            let requested = words_as_bytes(chunk);
            let current = &mut current[..requested.len()];

            self.inner
                .read_words(chunk_address, current)
                .map_err(VerifyError::Device)?;

            let offending = current
                .iter()
                .zip(requested)
                .position(|(current, requested)| *requested != 0xFF && requested & !current != 0);

            if let Some(offset) = offending {
                let error = VerifyError::WouldSetBits {
                    address: chunk_address.value() + offset as u32,
                    current: current[offset],
                    requested: requested[offset],
                };
                warn!(
                    "rejected program at {:#x}: {:#04x} -> {:#04x}",
                    chunk_address.value() + offset as u32,
                    current[offset],
                    requested[offset]
                );
                return Err(error);
            }
        }

        Ok(())
    }
}

impl<D: FlashDevice> FlashDevice for VerifyingDevice<D> {
    type Error = VerifyError<D::Error>;

    fn sector_size(&self) -> NonZeroU32 {
        self.inner.sector_size()
    }

    fn capacity(&self) -> u32 {
        self.inner.capacity()
    }

    fn read_words(&mut self, address: WordAddress, dest: &mut [u8]) -> Result<(), Self::Error> {
        self.inner.read_words(address, dest).map_err(VerifyError::Device)
    }

    fn write_words(&mut self, address: WordAddress, src: &[Word]) -> Result<(), Self::Error> {
        self.verify(address, src)?;
        self.inner.write_words(address, src).map_err(VerifyError::Device)
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), Self::Error> {
        self.inner.erase_sector(sector).map_err(VerifyError::Device)
    }
}
