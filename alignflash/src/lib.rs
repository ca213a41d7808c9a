//! Byte-granular access to word-programmed, sector-erased flash.
//!
//! Raw NOR flash (ESP8266/ESP32 SPI flash, most MCU internal flash) can only
//! be programmed in aligned 4-byte words, can only be erased a whole sector at
//! a time, and a program pass can only clear bits (1→0). A filesystem sitting
//! on top of it wants to read and write arbitrary byte ranges. This crate is
//! the translation layer in between.
//!
//! # Architecture
//!
//! The crate follows the same ports-and-adapters layout as the rest of the
//! workspace:
//!
//! ## Domain Layer (`domain`)
//! Pure address arithmetic with no device dependencies:
//! - **Value Objects**: `ByteRange`, `WordAddress`, `WordWindow`, `SectorRange`
//! - **Staging**: `StagingBuffer`, a word-aligned scratch area for unaligned sources
//! - **Ports**: `FlashDevice`, the word/sector primitive the adapter drives
//!
//! ## Adapter Layer (`adapters`)
//! - **`AlignedFlash`**: byte-granular `read`/`write`/`erase` over any `FlashDevice`
//! - **`NorFlashDevice`**: `FlashDevice` for `embedded-storage` NOR flash drivers
//! - **`RamFlash`**: in-memory device with real program semantics (requires `alloc`)
//! - **`VerifyingDevice`**: rejects programs that would need a 0→1 transition
//!
//! # Quick Start
//!
//! ```
//! use alignflash::{AlignedFlash, RamFlash};
//!
//! let mut flash = AlignedFlash::new(RamFlash::new(16 * 1024, 4096));
//!
//! flash.erase(0, 4096).unwrap();
//! flash.write(2, &[0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
//!
//! let mut buf = [0u8; 6];
//! flash.read(0, &mut buf).unwrap();
//! assert_eq!(buf, [0xFF, 0xFF, 0xAA, 0xBB, 0xCC, 0xDD]);
//! ```
//!
//! # Features
//!
//! - `alloc`: Enable the in-memory `RamFlash` device
//! - `embedded-storage`: Enable `NorFlashDevice` for `embedded-storage` NOR flash
//! - `std`: Enable standard library features
//! - `log`: Enable logging support
//! - `defmt`: Enable defmt logging for embedded

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod fmt;

pub mod domain;
pub mod adapters;

pub use domain::{
    ByteRange, EdgeWord, ERASED_WORD, FlashDevice, Interior, RangeError, SectorAlignment,
    SectorRange, StagingBuffer, WORD_SIZE, Word, WordAddress, WordWindow,
};

pub use adapters::{
    AlignError, AlignedFlash, AlignedFlash512, DEFAULT_STAGING_WORDS, Operation, VerifyError,
    VerifyingDevice,
};

#[cfg(feature = "alloc")]
pub use adapters::{DeviceStats, RamFlash, RamFlashError, WriteRecord};

#[cfg(feature = "embedded-storage")]
pub use adapters::{NOR_FLASH_SECTOR_SIZE, NorFlashDevice, NorFlashError, NorFlashRegion};
