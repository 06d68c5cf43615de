//! Register file abstraction
//!
//! A [`RegisterFile`] is one peripheral block seen as an array of 32-bit
//! words. It is either a real mapped window or an in-memory simulation, so
//! the pin operations run unchanged against hardware and in tests.

use rpio_chip::peripheral::{Subsystem, BLOCK_WORDS};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{GpioError, Result};
use crate::mmio::MemoryRegion;

/// One peripheral block's registers
#[derive(Debug)]
pub enum RegisterFile {
    /// Mapped hardware window
    Mapped(MemoryRegion),

    /// In-memory registers, zero at creation
    Simulated {
        /// Block the registers stand for
        subsystem: Subsystem,
        /// Register words
        words: Box<[AtomicU32]>,
        /// Every write in order, when recording
        journal: Option<Mutex<Vec<(usize, u32)>>>,
    },
}

impl RegisterFile {
    /// Simulated block of the standard window size
    #[must_use]
    pub fn simulated(subsystem: Subsystem) -> Self {
        Self::Simulated {
            subsystem,
            words: (0..BLOCK_WORDS).map(|_| AtomicU32::new(0)).collect(),
            journal: None,
        }
    }

    /// Simulated block that also keeps every `(index, value)` write in order
    #[must_use]
    pub fn recording(subsystem: Subsystem) -> Self {
        Self::Simulated {
            subsystem,
            words: (0..BLOCK_WORDS).map(|_| AtomicU32::new(0)).collect(),
            journal: Some(Mutex::new(Vec::new())),
        }
    }

    /// Drain the writes recorded since the last call.
    ///
    /// Empty unless the block was built with [`RegisterFile::recording`].
    #[must_use]
    pub fn take_writes(&self) -> Vec<(usize, u32)> {
        match self {
            Self::Simulated { journal: Some(journal), .. } => {
                std::mem::take(&mut *journal.lock().unwrap_or_else(PoisonError::into_inner))
            }
            _ => Vec::new(),
        }
    }

    /// Block these registers belong to
    #[must_use]
    pub const fn subsystem(&self) -> Subsystem {
        match self {
            Self::Mapped(region) => region.subsystem(),
            Self::Simulated { subsystem, .. } => *subsystem,
        }
    }

    /// Number of 32-bit words
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Mapped(region) => region.len(),
            Self::Simulated { words, .. } => words.len(),
        }
    }

    /// `true` if the block has no words
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` for a real hardware window
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }

    /// Read word `index`
    ///
    /// # Errors
    ///
    /// Returns `GpioError::RegisterOutOfBounds` if `index >= len()`.
    pub fn read(&self, index: usize) -> Result<u32> {
        let value = match self {
            Self::Mapped(region) => region.read(index)?,
            Self::Simulated { words, .. } => self.word(words, index)?.load(Ordering::SeqCst),
        };
        tracing::trace!("{} [{index}] -> {value:#010x}", self.subsystem());
        Ok(value)
    }

    /// Write word `index`
    ///
    /// # Errors
    ///
    /// Returns `GpioError::RegisterOutOfBounds` if `index >= len()`.
    pub fn write(&self, index: usize, value: u32) -> Result<()> {
        tracing::trace!("{} [{index}] <- {value:#010x}", self.subsystem());
        match self {
            Self::Mapped(region) => region.write(index, value),
            Self::Simulated { words, journal, .. } => {
                self.word(words, index)?.store(value, Ordering::SeqCst);
                if let Some(journal) = journal {
                    journal
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, value));
                }
                Ok(())
            }
        }
    }

    /// Replace the `mask` bits of word `index` with those of `bits`.
    ///
    /// A read followed by a write; not atomic with respect to other writers
    /// of the same word. Returns the value written.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::RegisterOutOfBounds` if `index >= len()`.
    pub fn modify(&self, index: usize, mask: u32, bits: u32) -> Result<u32> {
        let value = (self.read(index)? & !mask) | (bits & mask);
        self.write(index, value)?;
        Ok(value)
    }

    /// Set `mask` bits of word `index`, leaving the others unchanged
    ///
    /// # Errors
    ///
    /// Returns `GpioError::RegisterOutOfBounds` if `index >= len()`.
    pub fn set_bits(&self, index: usize, mask: u32) -> Result<u32> {
        self.modify(index, mask, mask)
    }

    /// Clear `mask` bits of word `index`, leaving the others unchanged
    ///
    /// # Errors
    ///
    /// Returns `GpioError::RegisterOutOfBounds` if `index >= len()`.
    pub fn clear_bits(&self, index: usize, mask: u32) -> Result<u32> {
        self.modify(index, mask, 0)
    }

    fn word<'a>(&self, words: &'a [AtomicU32], index: usize) -> Result<&'a AtomicU32> {
        words.get(index).ok_or(GpioError::RegisterOutOfBounds {
            subsystem: self.subsystem(),
            index,
            len: words.len(),
        })
    }
}
