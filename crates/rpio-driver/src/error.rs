//! Error types for GPIO driver operations

use rpio_chip::peripheral::Subsystem;
use std::path::PathBuf;
use thiserror::Error;

use crate::gpio::Numbering;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, GpioError>;

/// Errors that can occur while identifying the board, mapping registers or
/// driving pins
#[derive(Debug, Error)]
pub enum GpioError {
    /// The board information source could not be read
    #[error("Unable to read board information from {path}: {source}")]
    HardwareInfoUnavailable {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The `Hardware` line names a chip family this driver does not support
    #[error(
        "Unable to determine hardware version. I see: {hardware} - expecting BCM2708, \
         BCM2709 or BCM2835. This driver supports the BCM283x board family only"
    )]
    UnsupportedHardware {
        /// Value of the `Hardware` line
        hardware: String,
    },

    /// No `Revision` line in the board information
    #[error("Unable to determine board revision: no Revision line in board information")]
    RevisionNotFound,

    /// The revision is not a hexadecimal number
    #[error("Invalid board revision {revision:?}: expected a hexadecimal number")]
    InvalidRevisionFormat {
        /// Revision string as read
        revision: String,
    },

    /// The revision is well-formed but not a known board
    #[error("Unknown board revision {revision:?}")]
    UnknownRevision {
        /// Revision string as read
        revision: String,
    },

    /// Neither memory device could be opened
    #[error(
        "Cannot open {} or {}: {reason}. Maybe try running with elevated privileges (sudo)",
        primary.display(),
        fallback.display()
    )]
    PrivilegedAccessDenied {
        /// Privileged full-memory device
        primary: PathBuf,
        /// Unprivileged GPIO-only device
        fallback: PathBuf,
        /// Reason reported for the fallback device
        reason: String,
    },

    /// Mapping one of the register blocks failed
    #[error("mmap ({subsystem}) failed: {reason}")]
    MemoryMapFailed {
        /// Block that failed to map
        subsystem: Subsystem,
        /// Reason for failure
        reason: String,
    },

    /// Registers are already mapped in this process
    #[error("Hardware registers are already mapped in this process")]
    AlreadyInitialized,

    /// Pin number has no GPIO line under the active numbering
    #[error("Pin {pin} does not exist in {numbering} numbering")]
    InvalidPin {
        /// Pin number as given
        pin: u32,
        /// Active numbering
        numbering: Numbering,
    },

    /// Register word index outside the mapped window
    #[error("Register {index} out of bounds for {subsystem} block ({len} words)")]
    RegisterOutOfBounds {
        /// Block accessed
        subsystem: Subsystem,
        /// Requested word index
        index: usize,
        /// Window length in words
        len: usize,
    },

    /// Value outside the accepted range
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Reason for rejection
        reason: String,
    },

    /// The pin or the numbering mode cannot perform this operation
    #[error("Unsupported operation: {reason}")]
    UnsupportedMode {
        /// Reason for rejection
        reason: String,
    },

    /// Hardware did not reach the expected state in time
    #[error("Timeout after {duration_us}µs waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: &'static str,
        /// Time waited in microseconds
        duration_us: u64,
    },

    /// I/O error during sysfs access
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl GpioError {
    /// Create a memory map failed error
    pub fn memory_map_failed(subsystem: Subsystem, reason: impl Into<String>) -> Self {
        Self::MemoryMapFailed {
            subsystem,
            reason: reason.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }

    /// Create an unsupported mode error
    pub fn unsupported_mode(reason: impl Into<String>) -> Self {
        Self::UnsupportedMode {
            reason: reason.into(),
        }
    }
}
