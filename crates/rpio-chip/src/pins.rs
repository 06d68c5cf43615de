//! Pin mapping tables.
//!
//! Three numbering schemes reach the same BCM GPIO lines:
//!
//! ```text
//! wiringPi   logical pins 0..=31 (0..=16 on layout 1 boards)
//! physical   header pin numbers 1..=40, P5 header at 51..=54
//! BCM GPIO   the SoC's own line numbers 0..=53
//! ```
//!
//! Everything here is data: the register/bit placement of each GPIO line is
//! built at compile time so the read-modify-write code never does its own
//! arithmetic.

use crate::regs::{clock, gpio, pwm};

/// Number of GPIO lines on the SoC.
pub const GPIO_COUNT: u8 = 54;

/// Header layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpioLayout {
    /// First-run Model B (PCB 1.0 / 1.1).
    Rev1,
    /// Every later board.
    Rev2,
}

// ── Logical / physical → BCM GPIO ───────────────────────────────────────────

#[rustfmt::skip]
const WIRINGPI_REV1: [Option<u8>; 17] = [
    Some(17), Some(18), Some(21), Some(22), Some(23), Some(24), Some(25), Some(4),
    Some(0), Some(1),
    Some(8), Some(7), Some(10), Some(9), Some(11),
    Some(14), Some(15),
];

#[rustfmt::skip]
const WIRINGPI_REV2: [Option<u8>; 32] = [
    Some(17), Some(18), Some(27), Some(22), Some(23), Some(24), Some(25), Some(4),
    Some(2), Some(3),
    Some(8), Some(7), Some(10), Some(9), Some(11),
    Some(14), Some(15),
    Some(28), Some(29), Some(30), Some(31),
    Some(5), Some(6), Some(13), Some(19), Some(26), Some(12), Some(16), Some(20), Some(21),
    Some(0), Some(1),
];

#[rustfmt::skip]
const PHYSICAL_REV1: [Option<u8>; 27] = [
    None,
    None, None,
    Some(0), None,
    Some(1), None,
    Some(4), Some(14),
    None, Some(15),
    Some(17), Some(18),
    Some(21), None,
    Some(22), Some(23),
    None, Some(24),
    Some(10), None,
    Some(9), Some(25),
    Some(11), Some(8),
    None, Some(7),
];

#[rustfmt::skip]
const PHYSICAL_REV2: [Option<u8>; 55] = [
    None,
    None, None,
    Some(2), None,
    Some(3), None,
    Some(4), Some(14),
    None, Some(15),
    Some(17), Some(18),
    Some(27), None,
    Some(22), Some(23),
    None, Some(24),
    Some(10), None,
    Some(9), Some(25),
    Some(11), Some(8),
    None, Some(7),
    Some(0), Some(1),
    Some(5), None,
    Some(6), Some(12),
    Some(13), None,
    Some(19), Some(16),
    Some(26), Some(20),
    None, Some(21),
    // 41..=50 unused
    None, None, None, None, None, None, None, None, None, None,
    // P5 header
    Some(28), Some(29), Some(30), Some(31),
];

const fn lookup(table: &[Option<u8>], pin: u32) -> Option<u8> {
    if (pin as usize) < table.len() {
        table[pin as usize]
    } else {
        None
    }
}

/// BCM GPIO line for a wiringPi logical pin.
#[must_use]
pub const fn wiringpi_to_gpio(layout: GpioLayout, pin: u32) -> Option<u8> {
    match layout {
        GpioLayout::Rev1 => lookup(&WIRINGPI_REV1, pin),
        GpioLayout::Rev2 => lookup(&WIRINGPI_REV2, pin),
    }
}

/// BCM GPIO line for a physical header pin.
#[must_use]
pub const fn physical_to_gpio(layout: GpioLayout, pin: u32) -> Option<u8> {
    match layout {
        GpioLayout::Rev1 => lookup(&PHYSICAL_REV1, pin),
        GpioLayout::Rev2 => lookup(&PHYSICAL_REV2, pin),
    }
}

/// Physical header pins of a layout, in header order.
///
/// Yields `(physical pin, BCM GPIO)` for every header pin wired to a GPIO line.
pub fn physical_pins(layout: GpioLayout) -> impl Iterator<Item = (u32, u8)> {
    let table: &'static [Option<u8>] = match layout {
        GpioLayout::Rev1 => &PHYSICAL_REV1,
        GpioLayout::Rev2 => &PHYSICAL_REV2,
    };
    (0u32..)
        .zip(table.iter())
        .filter_map(|(pin, gpio)| gpio.map(|g| (pin, g)))
}

/// wiringPi logical pin of a BCM GPIO line, if it has one.
#[must_use]
pub fn gpio_to_wiringpi(layout: GpioLayout, line: u8) -> Option<u32> {
    let table: &[Option<u8>] = match layout {
        GpioLayout::Rev1 => &WIRINGPI_REV1,
        GpioLayout::Rev2 => &WIRINGPI_REV2,
    };
    (0u32..)
        .zip(table.iter())
        .find_map(|(pin, gpio)| (*gpio == Some(line)).then_some(pin))
}

// ── BCM GPIO → register placement ───────────────────────────────────────────

/// Where one GPIO line lives inside the GPIO block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRegisters {
    /// GPFSELn word index.
    pub fsel: usize,
    /// Bit offset of the 3-bit function field inside GPFSELn.
    pub fsel_shift: u32,
    /// Bank (0 for lines 0-31, 1 for 32-53); added to GPSET0/GPCLR0/GPLEV0/GPPUDCLK0.
    pub bank: usize,
    /// Single-bit mask of the line inside its bank.
    pub mask: u32,
}

impl PinRegisters {
    /// GPSETn word index.
    #[must_use]
    pub const fn set(&self) -> usize {
        gpio::GPSET0 + self.bank
    }

    /// GPCLRn word index.
    #[must_use]
    pub const fn clear(&self) -> usize {
        gpio::GPCLR0 + self.bank
    }

    /// GPLEVn word index.
    #[must_use]
    pub const fn level(&self) -> usize {
        gpio::GPLEV0 + self.bank
    }

    /// GPPUDCLKn word index.
    #[must_use]
    pub const fn pull_clock(&self) -> usize {
        gpio::GPPUDCLK0 + self.bank
    }
}

const PIN_REGISTERS: [PinRegisters; GPIO_COUNT as usize] = {
    let mut table = [PinRegisters {
        fsel: 0,
        fsel_shift: 0,
        bank: 0,
        mask: 0,
    }; GPIO_COUNT as usize];
    let mut line = 0;
    while line < GPIO_COUNT {
        table[line as usize] = PinRegisters {
            fsel: gpio::GPFSEL0 + (line / gpio::PINS_PER_FSEL) as usize,
            fsel_shift: ((line % gpio::PINS_PER_FSEL) * gpio::FSEL_BITS) as u32,
            bank: (line / 32) as usize,
            mask: 1u32 << (line % 32) as u32,
        };
        line += 1;
    }
    table
};

/// Register placement of a BCM GPIO line.
#[must_use]
pub const fn registers(line: u8) -> Option<PinRegisters> {
    if line < GPIO_COUNT {
        Some(PIN_REGISTERS[line as usize])
    } else {
        None
    }
}

// ── PWM ─────────────────────────────────────────────────────────────────────

/// One of the two PWM channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PwmChannel {
    /// Channel 0.
    Pwm0,
    /// Channel 1.
    Pwm1,
}

impl PwmChannel {
    /// Both channels.
    pub const ALL: [Self; 2] = [Self::Pwm0, Self::Pwm1];

    /// Range register word index.
    #[must_use]
    pub const fn range_register(&self) -> usize {
        match self {
            Self::Pwm0 => pwm::PWM0_RANGE,
            Self::Pwm1 => pwm::PWM1_RANGE,
        }
    }

    /// Data register word index.
    #[must_use]
    pub const fn data_register(&self) -> usize {
        match self {
            Self::Pwm0 => pwm::PWM0_DATA,
            Self::Pwm1 => pwm::PWM1_DATA,
        }
    }
}

/// A GPIO line that can carry a PWM channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmPin {
    /// BCM GPIO line.
    pub gpio: u8,
    /// Channel routed to the line.
    pub channel: PwmChannel,
    /// Function select code that routes it.
    pub alt: u32,
}

/// Every PWM-capable line.
#[rustfmt::skip]
pub const PWM_PINS: &[PwmPin] = &[
    PwmPin { gpio: 12, channel: PwmChannel::Pwm0, alt: gpio::fsel::ALT0 },
    PwmPin { gpio: 13, channel: PwmChannel::Pwm1, alt: gpio::fsel::ALT0 },
    PwmPin { gpio: 18, channel: PwmChannel::Pwm0, alt: gpio::fsel::ALT5 },
    PwmPin { gpio: 19, channel: PwmChannel::Pwm1, alt: gpio::fsel::ALT5 },
    PwmPin { gpio: 40, channel: PwmChannel::Pwm0, alt: gpio::fsel::ALT0 },
    PwmPin { gpio: 41, channel: PwmChannel::Pwm1, alt: gpio::fsel::ALT0 },
    PwmPin { gpio: 45, channel: PwmChannel::Pwm1, alt: gpio::fsel::ALT0 },
];

/// PWM routing for a line.
#[must_use]
pub fn pwm_pin(line: u8) -> Option<PwmPin> {
    PWM_PINS.iter().copied().find(|p| p.gpio == line)
}

// ── General purpose clocks ──────────────────────────────────────────────────

/// One of the three general purpose clock generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpClock {
    /// GPCLK0.
    Gp0,
    /// GPCLK1.
    Gp1,
    /// GPCLK2.
    Gp2,
}

impl GpClock {
    /// Control register word index in the clock block.
    #[must_use]
    pub const fn control_register(&self) -> usize {
        match self {
            Self::Gp0 => clock::GP0_CTL,
            Self::Gp1 => clock::GP1_CTL,
            Self::Gp2 => clock::GP2_CTL,
        }
    }

    /// Divider register word index in the clock block.
    #[must_use]
    pub const fn divider_register(&self) -> usize {
        self.control_register() + 1
    }
}

/// A GPIO line that can output a general purpose clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPin {
    /// BCM GPIO line.
    pub gpio: u8,
    /// Generator routed to the line.
    pub clock: GpClock,
    /// Function select code that routes it.
    pub alt: u32,
}

/// Every clock-capable line.
#[rustfmt::skip]
pub const CLOCK_PINS: &[ClockPin] = &[
    ClockPin { gpio: 4, clock: GpClock::Gp0, alt: gpio::fsel::ALT0 },
    ClockPin { gpio: 5, clock: GpClock::Gp1, alt: gpio::fsel::ALT0 },
    ClockPin { gpio: 6, clock: GpClock::Gp2, alt: gpio::fsel::ALT0 },
    ClockPin { gpio: 20, clock: GpClock::Gp0, alt: gpio::fsel::ALT5 },
    ClockPin { gpio: 21, clock: GpClock::Gp1, alt: gpio::fsel::ALT5 },
    ClockPin { gpio: 32, clock: GpClock::Gp0, alt: gpio::fsel::ALT0 },
    ClockPin { gpio: 34, clock: GpClock::Gp0, alt: gpio::fsel::ALT0 },
    ClockPin { gpio: 42, clock: GpClock::Gp1, alt: gpio::fsel::ALT0 },
    ClockPin { gpio: 43, clock: GpClock::Gp2, alt: gpio::fsel::ALT0 },
    ClockPin { gpio: 44, clock: GpClock::Gp1, alt: gpio::fsel::ALT0 },
];

/// Clock routing for a line.
#[must_use]
pub fn clock_pin(line: u8) -> Option<ClockPin> {
    CLOCK_PINS.iter().copied().find(|p| p.gpio == line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiringpi_pin_zero_is_gpio_17_on_both_layouts() {
        assert_eq!(wiringpi_to_gpio(GpioLayout::Rev1, 0), Some(17));
        assert_eq!(wiringpi_to_gpio(GpioLayout::Rev2, 0), Some(17));
    }

    #[test]
    fn layouts_differ_on_i2c_and_pin_two() {
        assert_eq!(wiringpi_to_gpio(GpioLayout::Rev1, 2), Some(21));
        assert_eq!(wiringpi_to_gpio(GpioLayout::Rev2, 2), Some(27));
        assert_eq!(physical_to_gpio(GpioLayout::Rev1, 3), Some(0));
        assert_eq!(physical_to_gpio(GpioLayout::Rev2, 3), Some(2));
    }

    #[test]
    fn power_and_ground_pins_have_no_gpio() {
        for pin in [1, 2, 4, 6, 9, 14, 17, 20, 25] {
            assert_eq!(physical_to_gpio(GpioLayout::Rev2, pin), None, "pin {pin}");
        }
        assert_eq!(physical_to_gpio(GpioLayout::Rev1, 40), None);
        assert_eq!(physical_to_gpio(GpioLayout::Rev2, 40), Some(21));
        assert_eq!(physical_to_gpio(GpioLayout::Rev2, 54), Some(31));
        assert_eq!(physical_to_gpio(GpioLayout::Rev2, 55), None);
        assert_eq!(wiringpi_to_gpio(GpioLayout::Rev1, 17), None);
    }

    #[test]
    fn register_placement() {
        let r = registers(17).unwrap();
        assert_eq!(r.fsel, 1);
        assert_eq!(r.fsel_shift, 21);
        assert_eq!(r.set(), gpio::GPSET0);
        assert_eq!(r.mask, 1 << 17);

        let r = registers(45).unwrap();
        assert_eq!(r.fsel, 4);
        assert_eq!(r.fsel_shift, 15);
        assert_eq!(r.clear(), gpio::GPCLR0 + 1);
        assert_eq!(r.level(), gpio::GPLEV0 + 1);
        assert_eq!(r.pull_clock(), gpio::GPPUDCLK0 + 1);
        assert_eq!(r.mask, 1 << 13);

        assert!(registers(53).is_some());
        assert!(registers(54).is_none());
    }

    #[test]
    fn pwm_and_clock_routing() {
        let p = pwm_pin(18).unwrap();
        assert_eq!(p.channel, PwmChannel::Pwm0);
        assert_eq!(p.alt, gpio::fsel::ALT5);
        assert_eq!(p.channel.data_register(), pwm::PWM0_DATA);
        assert!(pwm_pin(17).is_none());
        assert_eq!(
            PwmChannel::ALL.map(|c| c.range_register()),
            [pwm::PWM0_RANGE, pwm::PWM1_RANGE]
        );

        let c = clock_pin(4).unwrap();
        assert_eq!(c.clock.control_register(), clock::GP0_CTL);
        assert_eq!(c.clock.divider_register(), clock::GP0_CTL + 1);
        assert!(clock_pin(7).is_none());
    }

    #[test]
    fn reverse_lookups() {
        assert_eq!(gpio_to_wiringpi(GpioLayout::Rev2, 18), Some(1));
        assert_eq!(gpio_to_wiringpi(GpioLayout::Rev1, 27), None);
        let header: Vec<_> = physical_pins(GpioLayout::Rev2).take(2).collect();
        assert_eq!(header, vec![(3, 2), (5, 3)]);
    }
}
