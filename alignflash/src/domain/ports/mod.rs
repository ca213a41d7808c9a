//! Ports define the interfaces between the domain and the outside world.
//!
//! This module contains the **secondary (driven) port** the alignment
//! adapter depends on: the word/sector primitives of a flash device.

mod flash_device;

pub use flash_device::FlashDevice;
