//! Hardware context
//!
//! [`HardwareContext`] owns the four register blocks (GPIO, PWM, Clock,
//! Pads) and the board they belong to. Build it once at startup and pass it
//! to every pin operation.
//!
//! # Concurrency
//!
//! The context is `Send + Sync` and does no locking. Single register reads
//! and writes are individual bus transactions, but read-modify-write
//! sequences and the multi-step protocols (pull clocking, clock restart) are
//! not atomic. Callers that drive pins from several threads must serialize
//! operations touching the same register, for example by keeping the
//! context behind their own `Mutex`.
//!
//! # One-time mapping
//!
//! Only one mapped context may exist per process. [`HardwareContext::initialize`]
//! returns [`GpioError::AlreadyInitialized`] while another is alive; the
//! claim is released when the context is dropped or initialization fails.
//! Simulated contexts are not limited.

use rpio_chip::board::BoardDescriptor;
use rpio_chip::peripheral::{PeripheralLayout, Subsystem};
use rustix::fs::OFlags;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::board::identify_board;
use crate::config::DriverConfig;
use crate::error::{GpioError, Result};
use crate::mmio::MemoryRegion;
use crate::registers::RegisterFile;

static MAPPED: AtomicBool = AtomicBool::new(false);

/// Process-wide claim on the register mapping
#[derive(Debug)]
struct MappingClaim(());

impl MappingClaim {
    fn acquire() -> Result<Self> {
        MAPPED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(()))
            .map_err(|_| GpioError::AlreadyInitialized)
    }
}

impl Drop for MappingClaim {
    fn drop(&mut self) {
        MAPPED.store(false, Ordering::Release);
    }
}

/// How the register blocks are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    /// Full physical memory device, blocks at their physical addresses
    PhysicalMemory,
    /// GPIO-only device, GPIO block at offset 0
    GpioMemory,
    /// In-memory registers
    Simulated,
}

impl MemoryAccess {
    /// File offset of a block within the opened device
    const fn file_offset(self, layout: &PeripheralLayout, subsystem: Subsystem) -> u64 {
        match (self, subsystem) {
            (Self::GpioMemory, Subsystem::Gpio) => 0,
            _ => layout.address(subsystem),
        }
    }
}

/// Board descriptor plus the four register blocks
#[derive(Debug)]
pub struct HardwareContext {
    descriptor: BoardDescriptor,
    layout: PeripheralLayout,
    access: MemoryAccess,
    gpio: RegisterFile,
    pwm: RegisterFile,
    clock: RegisterFile,
    pads: RegisterFile,
    // Dropped after the register blocks
    _claim: Option<MappingClaim>,
}

impl HardwareContext {
    /// Identify the board and map its register blocks.
    ///
    /// Opens the privileged memory device for synchronized read/write,
    /// falling back to the GPIO-only device. The device is closed once all
    /// four blocks are mapped. On any failure nothing stays mapped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A mapped context already exists (`AlreadyInitialized`)
    /// - Board identification fails (see [`identify_board`])
    /// - Neither memory device can be opened (`PrivilegedAccessDenied`)
    /// - A block cannot be mapped (`MemoryMapFailed`)
    pub fn initialize(config: &DriverConfig) -> Result<Self> {
        let claim = MappingClaim::acquire()?;

        let identity = identify_board(config)?;
        let layout = PeripheralLayout::new(identity.peripheral_base());
        tracing::debug!("Peripheral base: {:#010x}", layout.base());

        let (file, access) = open_memory_device(config)?;

        let map = |subsystem: Subsystem| -> Result<RegisterFile> {
            let offset = access.file_offset(&layout, subsystem);
            let region = MemoryRegion::map(&file, subsystem, offset, layout.address(subsystem))?;
            tracing::info!("Mapped {subsystem} block at {:#010x}", layout.address(subsystem));
            Ok(RegisterFile::Mapped(region))
        };

        let gpio = map(Subsystem::Gpio)?;
        let pwm = map(Subsystem::Pwm)?;
        let clock = map(Subsystem::Clock)?;
        let pads = map(Subsystem::Pads)?;

        drop(file);

        Ok(Self {
            descriptor: identity.descriptor,
            layout,
            access,
            gpio,
            pwm,
            clock,
            pads,
            _claim: Some(claim),
        })
    }

    /// Context over zeroed in-memory registers for `descriptor`
    #[must_use]
    pub fn simulated(descriptor: BoardDescriptor) -> Self {
        Self {
            descriptor,
            layout: PeripheralLayout::for_model(descriptor.model),
            access: MemoryAccess::Simulated,
            gpio: RegisterFile::simulated(Subsystem::Gpio),
            pwm: RegisterFile::simulated(Subsystem::Pwm),
            clock: RegisterFile::simulated(Subsystem::Clock),
            pads: RegisterFile::simulated(Subsystem::Pads),
            _claim: None,
        }
    }

    /// Like [`HardwareContext::simulated`], with every register write recorded
    #[must_use]
    pub fn recording(descriptor: BoardDescriptor) -> Self {
        Self {
            gpio: RegisterFile::recording(Subsystem::Gpio),
            pwm: RegisterFile::recording(Subsystem::Pwm),
            clock: RegisterFile::recording(Subsystem::Clock),
            pads: RegisterFile::recording(Subsystem::Pads),
            ..Self::simulated(descriptor)
        }
    }

    /// `true` while a mapped context exists in this process
    #[must_use]
    pub fn is_mapped_in_process() -> bool {
        MAPPED.load(Ordering::Acquire)
    }

    /// Board the registers belong to
    #[must_use]
    pub const fn descriptor(&self) -> &BoardDescriptor {
        &self.descriptor
    }

    /// Physical addresses of the blocks
    #[must_use]
    pub const fn layout(&self) -> &PeripheralLayout {
        &self.layout
    }

    /// How the blocks are reached
    #[must_use]
    pub const fn access(&self) -> MemoryAccess {
        self.access
    }

    /// GPIO block
    #[must_use]
    pub const fn gpio(&self) -> &RegisterFile {
        &self.gpio
    }

    /// PWM block
    #[must_use]
    pub const fn pwm(&self) -> &RegisterFile {
        &self.pwm
    }

    /// Clock manager block
    #[must_use]
    pub const fn clock(&self) -> &RegisterFile {
        &self.clock
    }

    /// Pads block
    #[must_use]
    pub const fn pads(&self) -> &RegisterFile {
        &self.pads
    }

    /// Block by subsystem
    #[must_use]
    pub const fn registers(&self, subsystem: Subsystem) -> &RegisterFile {
        match subsystem {
            Subsystem::Gpio => &self.gpio,
            Subsystem::Pwm => &self.pwm,
            Subsystem::Clock => &self.clock,
            Subsystem::Pads => &self.pads,
        }
    }
}

fn open_synchronized(path: &Path) -> std::io::Result<File> {
    #[allow(clippy::cast_possible_wrap)]
    let sync_flag = OFlags::SYNC.bits() as i32;

    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(sync_flag)
        .open(path)
}

fn open_memory_device(config: &DriverConfig) -> Result<(File, MemoryAccess)> {
    let primary = config.mem_device();
    let fallback = config.gpiomem_device();

    tracing::debug!("Opening {}", primary.display());
    let primary_err = match open_synchronized(primary) {
        Ok(file) => return Ok((file, MemoryAccess::PhysicalMemory)),
        Err(e) => e,
    };
    tracing::debug!("Cannot open {}: {primary_err}", primary.display());

    match open_synchronized(fallback) {
        Ok(file) => {
            tracing::warn!(
                "Falling back to {}; only the GPIO block is guaranteed to map",
                fallback.display()
            );
            Ok((file, MemoryAccess::GpioMemory))
        }
        Err(fallback_err) => Err(GpioError::PrivilegedAccessDenied {
            primary: primary.to_path_buf(),
            fallback: fallback.to_path_buf(),
            reason: format!("{primary_err}; {fallback_err}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpio_chip::board::BoardModel;

    #[test]
    fn gpiomem_maps_gpio_at_zero() {
        let layout = PeripheralLayout::for_model(BoardModel::Pi3B);
        assert_eq!(MemoryAccess::GpioMemory.file_offset(&layout, Subsystem::Gpio), 0);
        assert_eq!(
            MemoryAccess::GpioMemory.file_offset(&layout, Subsystem::Pwm),
            0x3F20_C000
        );
        assert_eq!(
            MemoryAccess::PhysicalMemory.file_offset(&layout, Subsystem::Gpio),
            0x3F20_0000
        );
    }

    #[test]
    fn simulated_context_has_full_blocks() {
        let descriptor = BoardDescriptor::from_legacy("0010").unwrap();
        let ctx = HardwareContext::simulated(descriptor);

        assert_eq!(ctx.access(), MemoryAccess::Simulated);
        assert_eq!(ctx.layout().base(), 0x2000_0000);
        for subsystem in Subsystem::ALL {
            let regs = ctx.registers(subsystem);
            assert_eq!(regs.subsystem(), subsystem);
            assert_eq!(regs.len(), 1024);
        }
    }

    #[test]
    fn context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HardwareContext>();
    }
}
