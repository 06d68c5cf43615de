//! Memory-mapped register windows
//!
//! One [`MemoryRegion`] per peripheral block. The mapping outlives the file
//! it was created from, so the device can be closed right after mapping.

// Register windows are page aligned, so word pointers are always aligned
#![allow(clippy::cast_ptr_alignment)]

use rpio_chip::peripheral::{Subsystem, BLOCK_SIZE};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::File;
use std::os::unix::io::AsFd;
use std::ptr::NonNull;

use crate::error::{GpioError, Result};

/// Read/write shared mapping of one 4 KB register block
pub struct MemoryRegion {
    ptr: NonNull<u32>,
    size: usize,
    subsystem: Subsystem,
    physical_address: u64,
}

impl std::fmt::Debug for MemoryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegion")
            .field("subsystem", &self.subsystem)
            .field("physical_address", &format_args!("{:#010x}", self.physical_address))
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("size", &self.size)
            .finish()
    }
}

impl MemoryRegion {
    /// Map the block of `subsystem` starting at `offset` in `file`.
    ///
    /// `offset` is the position within the device file and must be page
    /// aligned. `physical_address` is the bus address the window stands for
    /// and is only used for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::MemoryMapFailed` if the kernel refuses the mapping.
    pub fn map(file: &File, subsystem: Subsystem, offset: u64, physical_address: u64) -> Result<Self> {
        tracing::debug!(
            "Mapping {subsystem} block: {physical_address:#010x} (file offset {offset:#x})"
        );

        // SAFETY: mmap with a null hint creates a fresh mapping, so it cannot
        // alias any existing Rust object.
        // - file is open read/write for the duration of the call
        // - BLOCK_SIZE is non-zero and a multiple of the page size
        // - READ|WRITE matches the open mode, SHARED is required for device memory
        // - the mapping holds its own reference to the file, so closing the
        //   file later does not invalidate it
        // - the result is checked; on success the pointer covers BLOCK_SIZE bytes
        let addr = unsafe {
            mmap(
                std::ptr::null_mut(),
                BLOCK_SIZE,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                offset,
            )
        }
        .map_err(|e| GpioError::memory_map_failed(subsystem, e.to_string()))?;

        let ptr = NonNull::new(addr.cast::<u32>())
            .ok_or_else(|| GpioError::memory_map_failed(subsystem, "null mapping"))?;

        tracing::trace!("{subsystem} block mapped at {ptr:p}");

        Ok(Self {
            ptr,
            size: BLOCK_SIZE,
            subsystem,
            physical_address,
        })
    }

    /// Read register word `index`
    ///
    /// # Errors
    ///
    /// Returns `GpioError::RegisterOutOfBounds` if `index` is outside the window.
    pub fn read(&self, index: usize) -> Result<u32> {
        self.check(index)?;

        // SAFETY: volatile read of a hardware register.
        // - index < len(), so the word lies inside the mapping
        // - ptr came from a successful mmap and stays valid until Drop
        // - the mapping is page aligned, so every word is 4-byte aligned
        // - volatile keeps the compiler from caching or eliding the access
        let value = unsafe { self.ptr.as_ptr().add(index).read_volatile() };

        Ok(value)
    }

    /// Write register word `index`
    ///
    /// # Errors
    ///
    /// Returns `GpioError::RegisterOutOfBounds` if `index` is outside the window.
    pub fn write(&self, index: usize, value: u32) -> Result<()> {
        self.check(index)?;

        // SAFETY: volatile write to a hardware register.
        // - index < len(), so the word lies inside the mapping
        // - ptr came from a successful mmap and stays valid until Drop
        // - the mapping is page aligned, so every word is 4-byte aligned
        // - volatile keeps the write in program order relative to other
        //   volatile accesses, which the register protocols rely on
        unsafe { self.ptr.as_ptr().add(index).write_volatile(value) };

        Ok(())
    }

    /// Window length in 32-bit words
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size / 4
    }

    /// Always `false`; a mapped window is never empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Block this window maps
    #[must_use]
    pub const fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    /// Bus address of the first word
    #[must_use]
    pub const fn physical_address(&self) -> u64 {
        self.physical_address
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(GpioError::RegisterOutOfBounds {
                subsystem: self.subsystem,
                index,
                len: self.len(),
            })
        }
    }
}

impl Drop for MemoryRegion {
    fn drop(&mut self) {
        tracing::debug!(
            "Unmapping {} block ({:#010x})",
            self.subsystem,
            self.physical_address
        );

        // SAFETY: munmap of exactly the range returned by mmap in map().
        // - ptr and size are unchanged since map()
        // - Drop runs once, and no borrow of the window can outlive self
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap of {} block failed: {e}", self.subsystem);
            }
        }
    }
}

// SAFETY: Send - the region owns its mapping exclusively. Mapped memory is
// process-wide, so moving the owner to another thread keeps it valid.
unsafe impl Send for MemoryRegion {}

// SAFETY: Sync - every access is a bounds-checked, aligned, volatile 32-bit
// load or store, which the bus performs as a single transaction. Multi-step
// register sequences are not atomic; callers serialize them (see
// `HardwareContext`).
unsafe impl Sync for MemoryRegion {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};

    fn backing_file(pages: u64) -> File {
        let file = tempfile::tempfile().unwrap();
        file.set_len(pages * BLOCK_SIZE as u64).unwrap();
        file
    }

    #[test]
    fn writes_reach_the_backing_file() {
        let mut file = backing_file(2);
        let offset = BLOCK_SIZE as u64;

        {
            let region = MemoryRegion::map(&file, Subsystem::Pwm, offset, 0x3F20_C000).unwrap();
            region.write(3, 0xDEAD_BEEF).unwrap();
            assert_eq!(region.read(3).unwrap(), 0xDEAD_BEEF);
            assert_eq!(region.read(0).unwrap(), 0);
        }

        let mut word = [0u8; 4];
        file.seek(SeekFrom::Start(offset + 12)).unwrap();
        file.read_exact(&mut word).unwrap();
        assert_eq!(u32::from_ne_bytes(word), 0xDEAD_BEEF);
    }

    #[test]
    fn mapping_survives_closing_the_file() {
        let file = backing_file(1);
        let region = MemoryRegion::map(&file, Subsystem::Gpio, 0, 0x3F20_0000).unwrap();
        drop(file);

        region.write(1023, 7).unwrap();
        assert_eq!(region.read(1023).unwrap(), 7);
    }

    #[test]
    fn out_of_window_access_is_rejected() {
        let file = backing_file(1);
        let region = MemoryRegion::map(&file, Subsystem::Pads, 0, 0x2010_0000).unwrap();

        assert_eq!(region.len(), 1024);
        let err = region.read(1024).unwrap_err();
        assert!(matches!(
            err,
            GpioError::RegisterOutOfBounds { subsystem: Subsystem::Pads, index: 1024, len: 1024 }
        ));
        assert!(region.write(usize::MAX, 0).is_err());
    }

    #[test]
    fn unaligned_offset_fails_with_subsystem() {
        let file = backing_file(2);
        let err = MemoryRegion::map(&file, Subsystem::Clock, 5, 0).unwrap_err();
        assert!(err.to_string().starts_with("mmap (CLOCK) failed"));
    }
}
