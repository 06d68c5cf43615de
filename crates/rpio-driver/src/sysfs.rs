//! Sysfs GPIO access
//!
//! Uses the value files of already exported lines under the sysfs GPIO class
//! directory (`<root>/gpio<N>/value`). Exporting and direction setup are left
//! to the system; this works without root once that is done.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gpio::Level;

/// Exported GPIO lines under a sysfs class directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl SysfsGpio {
    /// Lines under `root`, normally `/sys/class/gpio`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Class directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Value file of a BCM GPIO line
    #[must_use]
    pub fn value_path(&self, line: u8) -> PathBuf {
        self.root.join(format!("gpio{line}")).join("value")
    }

    /// `true` if the line has a value file
    #[must_use]
    pub fn is_exported(&self, line: u8) -> bool {
        self.value_path(line).is_file()
    }

    /// Read a line's level; anything but a leading `0` is high
    ///
    /// # Errors
    ///
    /// Returns `GpioError::Io` if the value file cannot be read (line not exported).
    pub fn read(&self, line: u8) -> Result<Level> {
        let path = self.value_path(line);
        let text = std::fs::read_to_string(&path).inspect_err(|e| {
            tracing::debug!("Cannot read {}: {e}", path.display());
        })?;

        let level = if text.trim_start().starts_with('0') {
            Level::Low
        } else {
            Level::High
        };
        tracing::trace!("gpio{line} (sysfs) -> {level}");
        Ok(level)
    }

    /// Drive a line
    ///
    /// # Errors
    ///
    /// Returns `GpioError::Io` if the value file cannot be written (line not exported).
    pub fn write(&self, line: u8, level: Level) -> Result<()> {
        let path = self.value_path(line);
        let text = match level {
            Level::Low => "0\n",
            Level::High => "1\n",
        };
        tracing::trace!("gpio{line} (sysfs) <- {level}");
        std::fs::write(&path, text).inspect_err(|e| {
            tracing::debug!("Cannot write {}: {e}", path.display());
        })?;
        Ok(())
    }
}
