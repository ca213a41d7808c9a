//! Adapter layer - Concrete implementations around the `FlashDevice` port.
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │   Filesystem / caller            │
//!     └────────────┬─────────────────────┘
//!                  │ byte read/write/erase
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │  AlignedFlash                    │  ◄── primary adapter
//!     └────────────┬─────────────────────┘
//!                  │ FlashDevice (port)
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │  VerifyingDevice (optional)      │
//!     │  NorFlashDevice / RamFlash       │  ◄── secondary adapters
//!     └──────────────────────────────────┘
//! ```
//!
//! # Available Adapters
//!
//! - **`AlignedFlash`**: byte-granular access over any `FlashDevice`
//! - **`NorFlashDevice`**: `FlashDevice` over `embedded-storage` NOR flash (requires `embedded-storage`)
//! - **`RamFlash`**: in-memory `FlashDevice` with fault injection (requires `alloc`)
//! - **`VerifyingDevice`**: rejects programs that would set bits

mod aligned_flash;
mod error;
mod verifying_device;

#[cfg(feature = "alloc")]
mod ram_flash;

#[cfg(feature = "embedded-storage")]
mod nor_flash_device;

pub use aligned_flash::{AlignedFlash, AlignedFlash512, DEFAULT_STAGING_WORDS};
pub use error::{AlignError, Operation};
pub use verifying_device::{VerifyError, VerifyingDevice};

#[cfg(feature = "alloc")]
pub use ram_flash::{DeviceStats, RamFlash, RamFlashError, WriteRecord};

#[cfg(feature = "embedded-storage")]
pub use nor_flash_device::{NOR_FLASH_SECTOR_SIZE, NorFlashDevice, NorFlashError, NorFlashRegion};
