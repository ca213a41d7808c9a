//! Adapter-level errors.

use core::fmt;

use crate::domain::RangeError;

/// The device primitive a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Word read.
    Read,
    /// Word program.
    Write,
    /// Sector erase.
    Erase,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Erase => "erase",
        })
    }
}

/// Errors returned by [`AlignedFlash`](super::AlignedFlash).
#[derive(Debug)]
#[non_exhaustive]
pub enum AlignError<E> {
    /// A device sub-operation failed. Earlier sub-operations of the same call
    /// are not undone.
    DeviceIo {
        /// Which primitive failed.
        operation: Operation,
        /// Word address for reads and writes, sector index for erases.
        address: u32,
        /// The device error.
        source: E,
    },

    /// The request cannot be mapped onto the 32-bit address space.
    Range(RangeError),
}

impl<E> AlignError<E> {
    /// The failing device primitive, if this is a device error.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::DeviceIo { operation, .. } => Some(*operation),
            Self::Range(_) => None,
        }
    }

    /// The underlying device error, if any.
    pub fn device_error(&self) -> Option<&E> {
        match self {
            Self::DeviceIo { source, .. } => Some(source),
            Self::Range(_) => None,
        }
    }
}

impl<E> From<RangeError> for AlignError<E> {
    fn from(err: RangeError) -> Self {
        Self::Range(err)
    }
}

impl<E: fmt::Display> fmt::Display for AlignError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceIo {
                operation: Operation::Erase,
                address,
                source,
            } => write!(f, "Device erase failed at sector {}: {}", address, source),
            Self::DeviceIo {
                operation,
                address,
                source,
            } => write!(f, "Device {} failed at {:#010x}: {}", operation, address, source),
            Self::Range(e) => write!(f, "Invalid range: {}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for AlignError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Range(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_io_display() {
        let error: AlignError<&str> = AlignError::DeviceIo {
            operation: Operation::Write,
            address: 0x100,
            source: "timeout",
        };
        assert_eq!(format!("{}", error), "Device write failed at 0x00000100: timeout");
        assert_eq!(error.operation(), Some(Operation::Write));
        assert_eq!(error.device_error(), Some(&"timeout"));
    }

    #[test]
    fn test_erase_display_names_sector() {
        let error: AlignError<&str> = AlignError::DeviceIo {
            operation: Operation::Erase,
            address: 3,
            source: "locked",
        };
        assert_eq!(format!("{}", error), "Device erase failed at sector 3: locked");
    }

    #[test]
    fn test_range_error_conversion() {
        let error: AlignError<&str> = RangeError::Unaligned { address: 1 }.into();
        assert!(error.operation().is_none());
        assert!(core::error::Error::source(&error).is_some());
    }
}
