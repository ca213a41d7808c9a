//! Byte-granular access over a word-programmed, sector-erased device.
//!
//! `AlignedFlash` is the primary adapter of the crate: it takes arbitrary
//! byte requests from a filesystem and turns them into word reads, word
//! programs and sector erases on a [`FlashDevice`].

use core::num::NonZeroU32;

use crate::adapters::error::{AlignError, Operation};
use crate::domain::{
    ByteRange, ERASED_WORD, EdgeWord, FlashDevice, RangeError, SectorRange, StagingBuffer,
    WORD_SIZE, Word, WordAddress, value_objects::try_cast_words,
};

/// Staging buffer size used when none is given: 128 words (512 bytes).
pub const DEFAULT_STAGING_WORDS: usize = 128;

/// Byte-granular read/write/erase over a [`FlashDevice`].
///
/// The adapter owns its device and keeps no other state between calls; the
/// only scratch memory is a staging buffer of `STAGING_WORDS` words that lives
/// on the stack for the duration of one [`write`](Self::write).
///
/// # Type Parameters
///
/// - `D`: The flash device
/// - `STAGING_WORDS`: Staging buffer size in words, used when a write source
///   is not word aligned in memory
///
/// # Examples
///
/// ```
/// use alignflash::{AlignedFlash, RamFlash};
///
/// let mut flash = AlignedFlash::new(RamFlash::new(8192, 4096));
///
/// flash.write(5, b"hello").unwrap();
///
/// let mut buf = [0u8; 5];
/// flash.read(5, &mut buf).unwrap();
/// assert_eq!(&buf, b"hello");
/// ```
pub struct AlignedFlash<D, const STAGING_WORDS: usize = DEFAULT_STAGING_WORDS> {
    device: D,
}

/// Adapter with a 512-byte staging buffer.
pub type AlignedFlash512<D> = AlignedFlash<D, 128>;

impl<D> AlignedFlash<D> {
    /// Create a new adapter wrapping the given device, with the default
    /// staging buffer.
    pub fn new(device: D) -> Self {
        Self::with_staging(device)
    }
}

impl<D, const STAGING_WORDS: usize> AlignedFlash<D, STAGING_WORDS> {
    /// Staging buffer capacity in bytes.
    pub const STAGING_BYTES: usize = STAGING_WORDS * WORD_SIZE;

    /// Create a new adapter with a staging buffer of `STAGING_WORDS` words.
    ///
    /// ```
    /// use alignflash::{AlignedFlash, RamFlash};
    ///
    /// let flash = AlignedFlash::<_, 16>::with_staging(RamFlash::new(4096, 4096));
    /// assert_eq!(AlignedFlash::<RamFlash, 16>::STAGING_BYTES, 64);
    /// # drop(flash);
    /// ```
    pub fn with_staging(device: D) -> Self {
        const { assert!(STAGING_WORDS > 0, "staging buffer must hold at least one word") };
        Self { device }
    }

    /// Get a reference to the underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Get a mutable reference to the underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Consume the adapter and return the underlying device.
    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: FlashDevice, const STAGING_WORDS: usize> AlignedFlash<D, STAGING_WORDS> {
    /// Erase sector size of the device.
    pub fn sector_size(&self) -> NonZeroU32 {
        self.device.sector_size()
    }

    /// Device size in bytes.
    pub fn capacity(&self) -> u32 {
        self.device.capacity()
    }

    /// Read `dest.len()` bytes starting at byte `address`.
    ///
    /// A partial word at either end is fetched whole and only the requested
    /// bytes are copied out; the aligned interior is read straight into
    /// `dest` with one device call. An empty `dest` touches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::DeviceIo`] on the first failing device read, or
    /// [`AlignError::Range`] if the request does not fit the address space.
    pub fn read(&mut self, address: u32, dest: &mut [u8]) -> Result<(), AlignError<D::Error>> {
        if dest.is_empty() {
            return Ok(());
        }
        let range = ByteRange::from_slice_len(address, dest.len())?;

        let window = range.word_window();
        trace!(
            "read {} bytes at {:#x} (aligned {:#x}..{:#x})",
            range.len(),
            address,
            window.aligned_start().value(),
            window.aligned_end().value()
        );

        if let Some(edge) = window.leading_edge() {
            let word = self.read_word(edge.word())?;
            dest[edge.buffer_range()].copy_from_slice(&word[edge.word_range()]);
        }

        if let Some(interior) = window.interior() {
            self.device
                .read_words(interior.start(), &mut dest[interior.buffer_range()])
                .map_err(device_error(Operation::Read, interior.start().value()))?;
        }

        if let Some(edge) = window.trailing_edge() {
            let word = self.read_word(edge.word())?;
            dest[edge.buffer_range()].copy_from_slice(&word[edge.word_range()]);
        }

        Ok(())
    }

    /// Program `data` starting at byte `address`.
    ///
    /// Edge words are programmed as `0xFF` with the request bytes overlaid,
    /// which leaves every neighbouring byte bit-for-bit unchanged. The aligned
    /// interior is programmed straight from `data` when it sits on a word
    /// boundary in memory, otherwise it is streamed through a
    /// `STAGING_WORDS`-word staging buffer, one device write per chunk. Empty
    /// `data` touches nothing.
    ///
    /// # Preconditions
    ///
    /// Programming can only clear bits. The target bytes must be erased, or
    /// `data` must only clear bits relative to their current contents, or the
    /// stored result is `old & data`. Wrap the device in
    /// [`VerifyingDevice`](super::VerifyingDevice) to check this at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::DeviceIo`] on the first failing device write,
    /// leaving whatever was already programmed in place, or
    /// [`AlignError::Range`] if the request does not fit the address space.
    pub fn write(&mut self, address: u32, data: &[u8]) -> Result<(), AlignError<D::Error>> {
        if data.is_empty() {
            return Ok(());
        }
        let range = ByteRange::from_slice_len(address, data.len())?;

        let window = range.word_window();
        trace!(
            "write {} bytes at {:#x} (aligned {:#x}..{:#x})",
            range.len(),
            address,
            window.aligned_start().value(),
            window.aligned_end().value()
        );

        if let Some(edge) = window.leading_edge() {
            self.write_edge(edge, data)?;
        }

        if let Some(interior) = window.interior() {
            let src = &data[interior.buffer_range()];
            match try_cast_words(src) {
                Some(words) => self.program(interior.start(), words)?,
                None => self.write_staged(interior.start(), src)?,
            }
        }

        if let Some(edge) = window.trailing_edge() {
            self.write_edge(edge, data)?;
        }

        Ok(())
    }

    /// Erase the sectors covering `size` bytes at `address`.
    ///
    /// Both values should be multiples of the sector size. Misaligned values
    /// are logged and then truncated: the erase covers sectors
    /// `address / sector_size` up to (not including)
    /// `address / sector_size + size / sector_size`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::DeviceIo`] for the first sector that fails to
    /// erase. Sectors before it stay erased and later ones are not attempted.
    /// Returns [`AlignError::Range`] if `address + size` does not fit in `u32`.
    pub fn erase(&mut self, address: u32, size: u32) -> Result<(), AlignError<D::Error>> {
        if size == 0 {
            return Ok(());
        }
        if address.checked_add(size).is_none() {
            return Err(RangeError::Overflow {
                address,
                length: size,
            }
            .into());
        }

        let (sectors, alignment) =
            SectorRange::from_request(address, size, self.device.sector_size());
        if !alignment.address_aligned {
            warn!("Unaligned erase addr={:#x}", address);
        }
        if !alignment.length_aligned {
            warn!("Unaligned erase size={}", size);
        }

        debug!(
            "erase sectors {}..{}",
            sectors.first_sector(),
            sectors.first_sector() + sectors.sector_count()
        );

        for sector in sectors.sectors() {
            self.device
                .erase_sector(sector)
                .map_err(device_error(Operation::Erase, sector))?;
        }

        Ok(())
    }

    fn read_word(&mut self, address: WordAddress) -> Result<Word, AlignError<D::Error>> {
        let mut word = ERASED_WORD;
        self.device
            .read_words(address, &mut word[..])
            .map_err(device_error(Operation::Read, address.value()))?;
        Ok(word)
    }

    fn write_edge(&mut self, edge: EdgeWord, data: &[u8]) -> Result<(), AlignError<D::Error>> {
        let mut word = ERASED_WORD;
        word[edge.word_range()].copy_from_slice(&data[edge.buffer_range()]);
        self.program(edge.word(), core::slice::from_ref(&word))
    }

    fn write_staged(&mut self, start: WordAddress, src: &[u8]) -> Result<(), AlignError<D::Error>> {
        let mut staging = StagingBuffer::<STAGING_WORDS>::new();
        for (index, chunk) in src.chunks(Self::STAGING_BYTES).enumerate() {
            let address = start.add_words((index * STAGING_WORDS) as u32);
            let words = staging.stage(chunk);
            self.program(address, words)?;
        }
        Ok(())
    }

    fn program(&mut self, address: WordAddress, words: &[Word]) -> Result<(), AlignError<D::Error>> {
        self.device
            .write_words(address, words)
            .map_err(device_error(Operation::Write, address.value()))
    }
}

fn device_error<E>(operation: Operation, address: u32) -> impl FnOnce(E) -> AlignError<E> {
    move |source| {
        error!("flash {} failed at {:#x}", operation, address);
        AlignError::DeviceIo {
            operation,
            address,
            source,
        }
    }
}
