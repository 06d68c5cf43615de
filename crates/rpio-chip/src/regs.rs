//! Register word indices and bit definitions.
//!
//! Indices are in 32-bit words from the start of each 4 KB block, matching
//! how the mapped windows are addressed. Values follow the BCM2835 ARM
//! Peripherals datasheet; the BCM2836/BCM2837 keep the same layout at a
//! different base.

/// Password that must accompany every clock manager and pads write.
pub const BCM_PASSWORD: u32 = 0x5A00_0000;

/// GPIO block (`base + 0x20_0000`).
pub mod gpio {
    // ── Function select ──────────────────────────────────────────────────────

    /// GPFSEL0, first of six function select registers (10 pins each).
    pub const GPFSEL0: usize = 0;
    /// Pins per function select register.
    pub const PINS_PER_FSEL: u8 = 10;
    /// Bits per pin in a function select register.
    pub const FSEL_BITS: u8 = 3;
    /// Mask of one pin's function select field.
    pub const FSEL_MASK: u32 = 0b111;

    // ── Output set / clear, level ────────────────────────────────────────────

    /// GPSET0 (pins 0-31); GPSET1 follows.
    pub const GPSET0: usize = 7;
    /// GPCLR0 (pins 0-31); GPCLR1 follows.
    pub const GPCLR0: usize = 10;
    /// GPLEV0 (pins 0-31); GPLEV1 follows.
    pub const GPLEV0: usize = 13;

    // ── Pull up / down ───────────────────────────────────────────────────────

    /// GPPUD, pull control code for the next clock pulse.
    pub const GPPUD: usize = 37;
    /// GPPUDCLK0 (pins 0-31); GPPUDCLK1 follows.
    pub const GPPUDCLK0: usize = 38;

    /// Function select codes.
    pub mod fsel {
        /// Input.
        pub const INPUT: u32 = 0b000;
        /// Output.
        pub const OUTPUT: u32 = 0b001;
        /// Alternate function 0.
        pub const ALT0: u32 = 0b100;
        /// Alternate function 1.
        pub const ALT1: u32 = 0b101;
        /// Alternate function 2.
        pub const ALT2: u32 = 0b110;
        /// Alternate function 3.
        pub const ALT3: u32 = 0b111;
        /// Alternate function 4.
        pub const ALT4: u32 = 0b011;
        /// Alternate function 5.
        pub const ALT5: u32 = 0b010;
    }

    /// GPPUD control codes.
    pub mod pud {
        /// Disable pull-up/down.
        pub const OFF: u32 = 0b00;
        /// Enable pull-down.
        pub const DOWN: u32 = 0b01;
        /// Enable pull-up.
        pub const UP: u32 = 0b10;
    }
}

/// PWM block (`base + 0x20_C000`).
pub mod pwm {
    /// Control register.
    pub const CONTROL: usize = 0;
    /// Channel 0 range.
    pub const PWM0_RANGE: usize = 4;
    /// Channel 0 data.
    pub const PWM0_DATA: usize = 5;
    /// Channel 1 range.
    pub const PWM1_RANGE: usize = 8;
    /// Channel 1 data.
    pub const PWM1_DATA: usize = 9;

    /// Range programmed when a pin is switched to PWM output.
    pub const DEFAULT_RANGE: u32 = 1024;
    /// Clock divisor programmed when a pin is switched to PWM output.
    pub const DEFAULT_CLOCK_DIVISOR: u32 = 32;

    /// Control register bits.
    pub mod control {
        /// Channel 0 enable.
        pub const PWM0_ENABLE: u32 = 0x0001;
        /// Channel 0 mark:space mode.
        pub const PWM0_MS_MODE: u32 = 0x0080;
        /// Channel 1 enable.
        pub const PWM1_ENABLE: u32 = 0x0100;
        /// Channel 1 mark:space mode.
        pub const PWM1_MS_MODE: u32 = 0x8000;
    }
}

/// Clock manager block (`base + 0x10_1000`).
pub mod clock {
    /// General purpose clock 0 control; divider at `+1`.
    pub const GP0_CTL: usize = 28;
    /// General purpose clock 1 control; divider at `+1`.
    pub const GP1_CTL: usize = 30;
    /// General purpose clock 2 control; divider at `+1`.
    pub const GP2_CTL: usize = 32;
    /// PWM clock control.
    pub const PWM_CTL: usize = 40;
    /// PWM clock divider.
    pub const PWM_DIV: usize = 41;

    /// Oscillator frequency feeding the clock generators (Hz).
    pub const OSCILLATOR_HZ: u32 = 19_200_000;
    /// Largest integer divisor.
    pub const MAX_DIVI: u32 = 4095;
    /// Bit offset of the integer divisor in a divider register.
    pub const DIVI_SHIFT: u32 = 12;

    /// Control register bits.
    pub mod ctl {
        /// Clock source: oscillator.
        pub const SRC_OSCILLATOR: u32 = 0x01;
        /// Enable the generator.
        pub const ENABLE: u32 = 0x10;
        /// Generator is running.
        pub const BUSY: u32 = 0x80;
    }
}

/// Pads block (`base + 0x10_0000`).
pub mod pads {
    /// Pad control for GPIO 0-27; groups 1 and 2 follow.
    pub const GPIO_0_27: usize = 11;
    /// Number of pad groups.
    pub const GROUPS: u8 = 3;
    /// Slew rate not limited.
    pub const SLEW: u32 = 0x10;
    /// Input hysteresis enabled.
    pub const HYSTERESIS: u32 = 0x08;
    /// Drive strength field mask (2 mA .. 16 mA).
    pub const DRIVE_MASK: u32 = 0x07;
}
