//! Domain layer - address arithmetic with zero device dependencies.
//!
//! Everything in here is pure: it decides *which* words and sectors a byte
//! request touches, never touches a device itself.
//! - **Value Objects**: `ByteRange`, `WordAddress`, `WordWindow`, `SectorRange`
//! - **Staging**: `StagingBuffer`, the bounded aligned scratch used by writes
//! - **Ports**: `FlashDevice`, what the adapter needs from the hardware
//! - **Domain Errors**: `RangeError`
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer (Core)         │
//!     │                                  │
//!     │  ┌────────────────────────────┐  │
//!     │  │  Value Objects             │  │
//!     │  │  - ByteRange, WordWindow   │  │
//!     │  │  - SectorRange             │  │
//!     │  └────────────────────────────┘  │
//!     │              │                   │
//!     │              ▼                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Ports (Interfaces)      │  │
//!     │  │    - FlashDevice           │  │
//!     │  └────────────────────────────┘  │
//!     └──────────────────────────────────┘
//!                    ▲
//!                    │ driven by / implemented by
//!                    │
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │
//!     │  - AlignedFlash                  │
//!     │  - NorFlashDevice, RamFlash      │
//!     └──────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```
//! use alignflash::domain::ByteRange;
//!
//! let window = ByteRange::new(1, 6).unwrap().word_window();
//! assert_eq!(window.aligned_start().value(), 4);
//! assert_eq!(window.aligned_end().value(), 4);
//! assert_eq!(window.leading_edge().unwrap().len(), 3);
//! assert_eq!(window.trailing_edge().unwrap().len(), 3);
//! ```

pub mod value_objects;
pub mod ports;
pub mod error;

mod staging_buffer;

pub use value_objects::{
    ByteRange, EdgeWord, ERASED_WORD, Interior, SectorAlignment, SectorRange, WORD_SIZE, Word,
    WordAddress, WordWindow,
};
pub use ports::FlashDevice;
pub use error::RangeError;
pub use staging_buffer::StagingBuffer;
