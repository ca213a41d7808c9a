//! Host-side [`FlashDevice`](alignflash::FlashDevice) implementations.
//!
//! - **`StreamFlash`**: a flash image behind any `embedded_io` stream, e.g. a
//!   file wrapped with `embedded_io_adapters::std::FromStd`

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

mod stream;

pub use stream::{StreamFlash, StreamFlashError};
