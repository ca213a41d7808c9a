//! Generic stream flash device
//!
//! Provides a `FlashDevice` implementation over any blocking I/O stream,
//! typically a flash image file on the host.

use core::fmt;
use core::num::NonZeroU32;

use alignflash::domain::value_objects::words_as_bytes;
use alignflash::{FlashDevice, WORD_SIZE, Word, WordAddress};
use embedded_io::{Read, Seek, SeekFrom, Write};

/// Bytes moved per stream call when programming or erasing.
const CHUNK_SIZE: usize = 256;

/// Errors from [`StreamFlash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFlashError<E> {
    /// The stream failed.
    Io(E),
    /// Access past the end of the image.
    OutOfBounds {
        /// Start of the access.
        address: u32,
        /// Length of the access.
        len: usize,
    },
    /// The stream ended inside the image.
    UnexpectedEof,
    /// The stream length is not a whole number of sectors that fits in 32 bits.
    InvalidSize {
        /// Stream length in bytes.
        size: u64,
    },
}

impl<E: fmt::Debug> fmt::Display for StreamFlashError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {:?}", e),
            Self::OutOfBounds { address, len } => {
                write!(f, "Access of {} bytes at {:#x} is past the end of the image", len, address)
            }
            Self::UnexpectedEof => write!(f, "Unexpected end of stream"),
            Self::InvalidSize { size } => {
                write!(f, "Image size {} is not a whole number of sectors", size)
            }
        }
    }
}

impl<E: fmt::Debug> core::error::Error for StreamFlashError<E> {}

/// Flash device backed by a stream
///
/// Wraps any type implementing `embedded_io::{Read, Write, Seek}` and provides
/// the [`FlashDevice`] trait. Stream offset `n` is flash address `n`.
///
/// Programming keeps NOR semantics: the current bytes are read back, ANDed
/// with the new ones and written again, so the image behaves exactly like the
/// chip it stands in for. Erasing a sector writes `0xFF` over it.
///
/// # Example
///
/// ```ignore
/// use alignflash::AlignedFlash;
/// use alignflash_platform::StreamFlash;
/// use embedded_io_adapters::std::FromStd;
///
/// let file = std::fs::OpenOptions::new().read(true).write(true).open("flash.img")?;
/// let device = StreamFlash::open(FromStd::new(file), 4096)?;
/// let mut flash = AlignedFlash::new(device);
/// ```
pub struct StreamFlash<T> {
    inner: T,
    capacity: u32,
    sector_size: NonZeroU32,
}

impl<T> StreamFlash<T> {
    /// Create a device of `capacity` bytes over `inner`.
    ///
    /// The stream is not touched; reads past its end fail with
    /// [`StreamFlashError::UnexpectedEof`] until something is written there.
    ///
    /// # Panics
    /// Panics if `sector_size` is zero or not a multiple of the word size, or
    /// if `capacity` is not a whole number of sectors.
    pub fn new(inner: T, capacity: u32, sector_size: u32) -> Self {
        assert!(
            sector_size != 0 && sector_size % WORD_SIZE as u32 == 0,
            "sector_size must be a non-zero multiple of the word size"
        );
        assert!(
            capacity % sector_size == 0,
            "capacity must be a whole number of sectors"
        );
        Self {
            inner,
            capacity,
            sector_size: NonZeroU32::new(sector_size).unwrap_or(NonZeroU32::MIN),
        }
    }

    /// Get a reference to the inner stream.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Get a mutable reference to the inner stream.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the wrapper and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> StreamFlash<T>
where
    T: Read + Write + Seek,
{
    /// Wrap an existing image, taking the capacity from the stream length.
    ///
    /// # Errors
    /// Returns [`StreamFlashError::InvalidSize`] if the stream length is not a
    /// whole number of sectors or does not fit in 32 bits.
    ///
    /// # Panics
    /// Panics if `sector_size` is zero or not a multiple of the word size.
    pub fn open(mut inner: T, sector_size: u32) -> Result<Self, StreamFlashError<T::Error>> {
        // For files, seek to end to get size
        let size = inner.seek(SeekFrom::End(0)).map_err(StreamFlashError::Io)?;
        inner.seek(SeekFrom::Start(0)).map_err(StreamFlashError::Io)?;

        let capacity = u32::try_from(size)
            .ok()
            .filter(|c| sector_size != 0 && c % sector_size == 0)
            .ok_or(StreamFlashError::InvalidSize { size })?;

        Ok(Self::new(inner, capacity, sector_size))
    }

    /// Flush buffered writes to the underlying stream.
    pub fn sync(&mut self) -> Result<(), StreamFlashError<T::Error>> {
        self.inner.flush().map_err(StreamFlashError::Io)
    }

    fn check(&self, address: u32, len: usize) -> Result<(), StreamFlashError<T::Error>> {
        let end = (address as u64).checked_add(len as u64);
        match end {
            Some(end) if end <= self.capacity as u64 => Ok(()),
            _ => Err(StreamFlashError::OutOfBounds { address, len }),
        }
    }

    fn seek_to(&mut self, address: u32) -> Result<(), StreamFlashError<T::Error>> {
        self.inner
            .seek(SeekFrom::Start(address as u64))
            .map_err(StreamFlashError::Io)?;
        Ok(())
    }

    fn read_fully(&mut self, mut buf: &mut [u8]) -> Result<(), StreamFlashError<T::Error>> {
        while !buf.is_empty() {
            let n = self.inner.read(buf).map_err(StreamFlashError::Io)?;
            if n == 0 {
                return Err(StreamFlashError::UnexpectedEof);
            }
            buf = &mut buf[n..];
        }
        Ok(())
    }

    fn write_fully(&mut self, mut buf: &[u8]) -> Result<(), StreamFlashError<T::Error>> {
        while !buf.is_empty() {
            let n = self.inner.write(buf).map_err(StreamFlashError::Io)?;
            if n == 0 {
                return Err(StreamFlashError::UnexpectedEof);
            }
            buf = &buf[n..];
        }
        Ok(())
    }
}

impl<T> FlashDevice for StreamFlash<T>
where
    T: Read + Write + Seek,
{
    type Error = StreamFlashError<T::Error>;

    fn sector_size(&self) -> NonZeroU32 {
        self.sector_size
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn read_words(&mut self, address: WordAddress, dest: &mut [u8]) -> Result<(), Self::Error> {
        self.check(address.value(), dest.len())?;
        self.seek_to(address.value())?;
        self.read_fully(dest)
    }

    fn write_words(&mut self, address: WordAddress, src: &[Word]) -> Result<(), Self::Error> {
        let bytes = words_as_bytes(src);
        self.check(address.value(), bytes.len())?;

        let mut current = [0u8; CHUNK_SIZE];
        for (index, chunk) in bytes.chunks(CHUNK_SIZE).enumerate() {
            let offset = address.value() + (index * CHUNK_SIZE) as u32;
            let current = &mut current[..chunk.len()];

            self.seek_to(offset)?;
            self.read_fully(current)?;
            for (cell, byte) in current.iter_mut().zip(chunk) {
                *cell &= *byte;
            }

            self.seek_to(offset)?;
            self.write_fully(current)?;
        }
        Ok(())
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), Self::Error> {
        let size = self.sector_size.get();
        let address = sector.checked_mul(size).ok_or(StreamFlashError::OutOfBounds {
            address: u32::MAX,
            len: size as usize,
        })?;
        self.check(address, size as usize)?;

        let erased = [0xFFu8; CHUNK_SIZE];
        self.seek_to(address)?;
        let mut remaining = size as usize;
        while remaining > 0 {
            let n = remaining.min(CHUNK_SIZE);
            self.write_fully(&erased[..n])?;
            remaining -= n;
        }
        Ok(())
    }
}
