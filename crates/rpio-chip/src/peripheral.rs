//! Peripheral address map.
//!
//! ```text
//! Block         Offset from base   Window
//! ───────────── ────────────────── ───────
//! Pads          0x0010_0000        4 KB
//! Clock manager 0x0010_1000        4 KB
//! GPIO          0x0020_0000        4 KB
//! PWM           0x0020_C000        4 KB
//! ```
//!
//! The base is `0x2000_0000` on BCM2835 boards and `0x3F00_0000` on
//! BCM2836 / BCM2837 boards.

use crate::board::BoardModel;

/// Peripheral base on BCM2835 boards (A, B, A+, B+, Alpha, CM, Zero, Zero W).
pub const LEGACY_BASE: u64 = 0x2000_0000;

/// Peripheral base on every later board.
pub const BASE: u64 = 0x3F00_0000;

/// Size of each mapped register window in bytes.
pub const BLOCK_SIZE: usize = 4 * 1024;

/// Number of 32-bit register words in each window.
pub const BLOCK_WORDS: usize = BLOCK_SIZE / 4;

/// Offsets of the register blocks from the peripheral base.
pub mod offset {
    /// Pads (drive strength) control.
    pub const PADS: u64 = 0x0010_0000;
    /// Clock manager.
    pub const CLOCK: u64 = 0x0010_1000;
    /// GPIO control.
    pub const GPIO: u64 = 0x0020_0000;
    /// PWM control.
    pub const PWM: u64 = 0x0020_C000;
}

/// Select the peripheral base for a board model.
///
/// Total over [`BoardModel`]: anything not known to be a BCM2835 board,
/// including unknown codes, gets the newer base.
#[must_use]
pub const fn resolve_base(model: BoardModel) -> u64 {
    if model.is_pre_pi2() {
        LEGACY_BASE
    } else {
        BASE
    }
}

/// One of the four register blocks that get mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// GPIO function select, level, pull control.
    Gpio,
    /// PWM controller.
    Pwm,
    /// Clock manager.
    Clock,
    /// Pad drive strength.
    Pads,
}

impl Subsystem {
    /// All blocks, in mapping order.
    pub const ALL: [Self; 4] = [Self::Gpio, Self::Pwm, Self::Clock, Self::Pads];

    /// Offset of this block from the peripheral base.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        match self {
            Self::Gpio => offset::GPIO,
            Self::Pwm => offset::PWM,
            Self::Clock => offset::CLOCK,
            Self::Pads => offset::PADS,
        }
    }

    /// Short upper-case name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gpio => "GPIO",
            Self::Pwm => "PWM",
            Self::Clock => "CLOCK",
            Self::Pads => "PADS",
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical addresses of the four blocks, all derived from one base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralLayout {
    base: u64,
}

impl PeripheralLayout {
    /// Layout for an explicit peripheral base.
    #[must_use]
    pub const fn new(base: u64) -> Self {
        Self { base }
    }

    /// Layout for a board model.
    #[must_use]
    pub const fn for_model(model: BoardModel) -> Self {
        Self::new(resolve_base(model))
    }

    /// Peripheral base.
    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Physical address of a block.
    #[must_use]
    pub const fn address(&self, subsystem: Subsystem) -> u64 {
        self.base + subsystem.offset()
    }
}
