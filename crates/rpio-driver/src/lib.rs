//! User-space GPIO driver for BCM2835 / BCM2836 / BCM2837 boards.
//!
//! Identifies the board from `/proc/cpuinfo`, maps the GPIO, PWM, Clock and
//! Pads register blocks from `/dev/mem` (or `/dev/gpiomem`) and drives pins
//! through them. No kernel module, no C library.
//!
//! # Layers
//!
//! ```text
//! identify_board      cpuinfo ─▶ BoardIdentity ─▶ peripheral base
//! HardwareContext     four RegisterFiles (mapped, or simulated for tests)
//! Gpio                pin numbering + register protocols, or sysfs
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use rpio_driver::{DriverConfig, Gpio, Level, Numbering, PinMode};
//!
//! # fn main() -> rpio_driver::Result<()> {
//! let config = DriverConfig::from_env();
//! let gpio = Gpio::setup(&config, Numbering::Gpio)?;
//!
//! gpio.pin_mode(17, PinMode::Output)?;
//! gpio.digital_write(17, Level::High)?;
//! # Ok(())
//! # }
//! ```
//!
//! Without root, either run with `sudo` or use [`Numbering::Sys`] on lines
//! exported through sysfs.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod board;
pub mod config;
mod context;
mod error;
pub mod gpio;
pub mod mmio;
mod registers;
pub mod sysfs;

/// Board and silicon model (re-exported from rpio-chip).
pub mod chip {
    pub use rpio_chip::board::{
        BoardDescriptor, BoardModel, Manufacturer, Processor, RevisionEncoding,
    };
    pub use rpio_chip::peripheral::{resolve_base, PeripheralLayout, Subsystem};
    pub use rpio_chip::pins::GpioLayout;
}

pub use board::{identify_board, identify_board_from_str, BoardIdentity};
pub use config::DriverConfig;
pub use context::{HardwareContext, MemoryAccess};
pub use error::{GpioError, Result};
pub use gpio::{Gpio, Level, Numbering, PinFunction, PinMode, Pull, PwmMode};
pub use registers::RegisterFile;
pub use sysfs::SysfsGpio;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        identify_board, DriverConfig, Gpio, GpioError, HardwareContext, Level, Numbering,
        PinMode, Pull, PwmMode, Result,
    };
}
