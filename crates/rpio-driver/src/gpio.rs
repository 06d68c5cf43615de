//! Pin-level operations
//!
//! [`Gpio`] resolves a pin number under the active [`Numbering`] to a BCM
//! GPIO line and drives it through the register blocks of a
//! [`HardwareContext`], or through sysfs value files in [`Numbering::Sys`].
//!
//! ```text
//! pin ──numbering──▶ BCM line ──pins::registers──▶ word index + bit mask
//!                                                   │
//!                         GPFSEL / GPSET / GPCLR / GPLEV / GPPUD(CLK)
//! ```
//!
//! In sys numbering only reads and writes have an effect; mode, pull, PWM,
//! clock and pad operations are accepted and do nothing, because sysfs does
//! not expose them.

use rpio_chip::pins::{self, GpioLayout, PinRegisters, PwmChannel, GPIO_COUNT};
use rpio_chip::regs::{clock, gpio as gpio_regs, pads, pwm, BCM_PASSWORD};
use std::time::{Duration, Instant};

use crate::config::DriverConfig;
use crate::context::HardwareContext;
use crate::error::{GpioError, Result};
use crate::registers::RegisterFile;
use crate::sysfs::SysfsGpio;

/// Settle time after routing a pin to PWM or a clock generator
const ALT_SETTLE: Duration = Duration::from_micros(110);
/// Hold time around each step of the pull clocking protocol
const PULL_SETUP: Duration = Duration::from_micros(5);
/// Settle time between PWM range writes
const PWM_RANGE_SETTLE: Duration = Duration::from_micros(10);
/// Upper bound on waiting for a clock generator to stop
const CLOCK_IDLE_TIMEOUT: Duration = Duration::from_millis(10);

/// Clock frequency programmed when a pin switches to clock output
pub const DEFAULT_GPIO_CLOCK_HZ: u32 = 100_000;

/// Largest PWM duty value
pub const PWM_MAX_VALUE: u32 = 1024;

// ── Value types ─────────────────────────────────────────────────────────────

/// How pin numbers are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Numbering {
    /// wiringPi logical pins
    WiringPi,
    /// BCM GPIO lines
    Gpio,
    /// Header pin numbers
    Physical,
    /// BCM GPIO lines through sysfs value files
    Sys,
}

impl std::fmt::Display for Numbering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::WiringPi => "wiringPi",
            Self::Gpio => "BCM GPIO",
            Self::Physical => "physical",
            Self::Sys => "sysfs",
        })
    }
}

/// Logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// 0
    Low,
    /// 1
    High,
}

impl Level {
    /// Any non-zero value is high
    #[must_use]
    pub const fn from_value(value: u32) -> Self {
        if value == 0 {
            Self::Low
        } else {
            Self::High
        }
    }

    /// 0 or 1
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Internal pull resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pull {
    /// No pull
    Off,
    /// Pull to ground
    Down,
    /// Pull to 3.3 V
    Up,
}

impl Pull {
    /// GPPUD control code
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Off => gpio_regs::pud::OFF,
            Self::Down => gpio_regs::pud::DOWN,
            Self::Up => gpio_regs::pud::UP,
        }
    }
}

/// Pin modes accepted by [`Gpio::pin_mode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// Digital input
    Input,
    /// Digital output
    Output,
    /// Hardware PWM output
    PwmOutput,
    /// General purpose clock output
    GpioClock,
}

/// PWM output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PwmMode {
    /// Mark:space, a fixed period with a variable high time
    MarkSpace,
    /// Balanced, pulses spread evenly across the range
    Balanced,
}

/// Function a GPIO line is currently routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinFunction {
    /// Input
    Input,
    /// Output
    Output,
    /// Alternate function 0..=5
    Alt(u8),
}

impl PinFunction {
    /// Decode a 3-bit function select field
    #[must_use]
    pub const fn from_fsel(code: u32) -> Self {
        match code & gpio_regs::FSEL_MASK {
            gpio_regs::fsel::INPUT => Self::Input,
            gpio_regs::fsel::OUTPUT => Self::Output,
            gpio_regs::fsel::ALT0 => Self::Alt(0),
            gpio_regs::fsel::ALT1 => Self::Alt(1),
            gpio_regs::fsel::ALT2 => Self::Alt(2),
            gpio_regs::fsel::ALT3 => Self::Alt(3),
            gpio_regs::fsel::ALT4 => Self::Alt(4),
            _ => Self::Alt(5),
        }
    }
}

impl std::fmt::Display for PinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => f.write_str("IN"),
            Self::Output => f.write_str("OUT"),
            Self::Alt(n) => write!(f, "ALT{n}"),
        }
    }
}

// ── Facade ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Backend {
    Registers(HardwareContext),
    Sysfs(SysfsGpio),
}

/// Pin operations under one numbering mode
#[derive(Debug)]
pub struct Gpio {
    backend: Backend,
    numbering: Numbering,
}

impl Gpio {
    /// Drive pins through the registers of `context`.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::UnsupportedMode` for [`Numbering::Sys`]; use [`Gpio::sys`].
    pub fn new(context: HardwareContext, numbering: Numbering) -> Result<Self> {
        if numbering == Numbering::Sys {
            return Err(GpioError::unsupported_mode(
                "sys numbering drives sysfs value files, not mapped registers",
            ));
        }
        tracing::debug!(
            "Pin numbering: {numbering} ({:?} header)",
            context.descriptor().gpio_layout()
        );
        Ok(Self {
            backend: Backend::Registers(context),
            numbering,
        })
    }

    /// Drive exported lines through sysfs, numbered by BCM GPIO
    #[must_use]
    pub const fn sys(sysfs: SysfsGpio) -> Self {
        Self {
            backend: Backend::Sysfs(sysfs),
            numbering: Numbering::Sys,
        }
    }

    /// Set up for `numbering` using the configured paths.
    ///
    /// Sys numbering needs no privileges; every other mode maps the registers.
    ///
    /// # Errors
    ///
    /// Returns any error of [`HardwareContext::initialize`].
    pub fn setup(config: &DriverConfig, numbering: Numbering) -> Result<Self> {
        match numbering {
            Numbering::Sys => Ok(Self::sys(SysfsGpio::new(config.sysfs_gpio()))),
            _ => Self::new(HardwareContext::initialize(config)?, numbering),
        }
    }

    /// Active numbering
    #[must_use]
    pub const fn numbering(&self) -> Numbering {
        self.numbering
    }

    /// Register context, absent in sys numbering
    #[must_use]
    pub const fn context(&self) -> Option<&HardwareContext> {
        match &self.backend {
            Backend::Registers(ctx) => Some(ctx),
            Backend::Sysfs(_) => None,
        }
    }

    /// BCM GPIO line a pin refers to
    ///
    /// # Errors
    ///
    /// Returns `GpioError::InvalidPin` if the pin has no line under the active numbering.
    pub fn resolve(&self, pin: u32) -> Result<u8> {
        let line = match self.numbering {
            Numbering::WiringPi => pins::wiringpi_to_gpio(self.layout(), pin),
            Numbering::Physical => pins::physical_to_gpio(self.layout(), pin),
            Numbering::Gpio | Numbering::Sys => {
                u8::try_from(pin).ok().filter(|line| *line < GPIO_COUNT)
            }
        };
        line.ok_or(GpioError::InvalidPin {
            pin,
            numbering: self.numbering,
        })
    }

    /// Set a pin's mode.
    ///
    /// PWM output also selects mark:space mode, range 1024 and clock
    /// divisor 32. Clock output starts the generator at 100 kHz.
    ///
    /// The C wiringPi library leaves PWM in balanced mode here; call
    /// [`Gpio::pwm_set_mode`] afterwards for that behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pin does not exist (`InvalidPin`)
    /// - The pin has no PWM channel or clock generator for that mode (`UnsupportedMode`)
    /// - A clock generator does not stop in time (`Timeout`)
    pub fn pin_mode(&self, pin: u32, mode: PinMode) -> Result<()> {
        let line = self.resolve(pin)?;
        let Some(ctx) = self.registers_or_skip("pin mode") else {
            return Ok(());
        };
        let place = self.placement(pin, line)?;
        tracing::debug!("GPIO {line}: mode {mode:?}");

        match mode {
            PinMode::Input => set_function(ctx.gpio(), place, gpio_regs::fsel::INPUT),
            PinMode::Output => set_function(ctx.gpio(), place, gpio_regs::fsel::OUTPUT),
            PinMode::PwmOutput => {
                let route = pins::pwm_pin(line).ok_or_else(|| {
                    GpioError::unsupported_mode(format!("GPIO {line} has no PWM channel"))
                })?;
                set_function(ctx.gpio(), place, route.alt)?;
                delay(ALT_SETTLE);

                self.pwm_set_mode(PwmMode::MarkSpace)?;
                self.pwm_set_range(pwm::DEFAULT_RANGE)?;
                self.pwm_set_clock(pwm::DEFAULT_CLOCK_DIVISOR)
            }
            PinMode::GpioClock => {
                let route = pins::clock_pin(line).ok_or_else(|| {
                    GpioError::unsupported_mode(format!("GPIO {line} has no clock generator"))
                })?;
                set_function(ctx.gpio(), place, route.alt)?;
                delay(ALT_SETTLE);

                self.gpio_clock_set(pin, DEFAULT_GPIO_CLOCK_HZ)
            }
        }
    }

    /// Function a pin is currently routed to
    ///
    /// # Errors
    ///
    /// Returns `InvalidPin` for an unknown pin and `UnsupportedMode` in sys numbering.
    pub fn pin_function(&self, pin: u32) -> Result<PinFunction> {
        let line = self.resolve(pin)?;
        let ctx = self.registers_required("reading a pin function")?;
        let place = self.placement(pin, line)?;
        let word = ctx.gpio().read(place.fsel)?;
        Ok(PinFunction::from_fsel(word >> place.fsel_shift))
    }

    /// Drive an output pin
    ///
    /// # Errors
    ///
    /// Returns `InvalidPin` for an unknown pin, or `Io` if a sysfs write fails.
    pub fn digital_write(&self, pin: u32, level: Level) -> Result<()> {
        let line = self.resolve(pin)?;
        match &self.backend {
            Backend::Sysfs(sysfs) => sysfs.write(line, level),
            Backend::Registers(ctx) => {
                let place = self.placement(pin, line)?;
                let index = match level {
                    Level::Low => place.clear(),
                    Level::High => place.set(),
                };
                ctx.gpio().write(index, place.mask)
            }
        }
    }

    /// Read a pin's level
    ///
    /// # Errors
    ///
    /// Returns `InvalidPin` for an unknown pin, or `Io` if a sysfs read fails.
    pub fn digital_read(&self, pin: u32) -> Result<Level> {
        let line = self.resolve(pin)?;
        match &self.backend {
            Backend::Sysfs(sysfs) => sysfs.read(line),
            Backend::Registers(ctx) => {
                let place = self.placement(pin, line)?;
                let word = ctx.gpio().read(place.level())?;
                Ok(Level::from(word & place.mask != 0))
            }
        }
    }

    /// Set a pin's pull resistor.
    ///
    /// The control code is latched by clocking it into the pin:
    /// GPPUD ← code, GPPUDCLKn ← pin bit, then both cleared, with a hold
    /// time after each step.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPin` for an unknown pin.
    pub fn pull_up_down(&self, pin: u32, pull: Pull) -> Result<()> {
        let line = self.resolve(pin)?;
        let Some(ctx) = self.registers_or_skip("pull control") else {
            return Ok(());
        };
        let place = self.placement(pin, line)?;
        let regs = ctx.gpio();
        tracing::debug!("GPIO {line}: pull {pull:?}");

        regs.write(gpio_regs::GPPUD, pull.code())?;
        delay(PULL_SETUP);
        regs.write(place.pull_clock(), place.mask)?;
        delay(PULL_SETUP);

        regs.write(gpio_regs::GPPUD, 0)?;
        delay(PULL_SETUP);
        regs.write(place.pull_clock(), 0)?;
        delay(PULL_SETUP);
        Ok(())
    }

    /// Set the PWM duty of a pin's channel, 0..=1024
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pin does not exist (`InvalidPin`)
    /// - `value` exceeds 1024 (`InvalidValue`)
    /// - The pin has no PWM channel (`UnsupportedMode`)
    pub fn pwm_write(&self, pin: u32, value: u32) -> Result<()> {
        let line = self.resolve(pin)?;
        if value > PWM_MAX_VALUE {
            return Err(GpioError::invalid_value(format!(
                "PWM value {value} exceeds {PWM_MAX_VALUE}"
            )));
        }
        let Some(ctx) = self.registers_or_skip("PWM write") else {
            return Ok(());
        };
        let route = pins::pwm_pin(line)
            .ok_or_else(|| GpioError::unsupported_mode(format!("GPIO {line} has no PWM channel")))?;

        tracing::trace!("GPIO {line}: PWM {:?} <- {value}", route.channel);
        ctx.pwm().write(route.channel.data_register(), value)
    }

    /// Select the PWM mode of both channels; also enables them
    ///
    /// # Errors
    ///
    /// Propagates register access errors.
    pub fn pwm_set_mode(&self, mode: PwmMode) -> Result<()> {
        use pwm::control::{PWM0_ENABLE, PWM0_MS_MODE, PWM1_ENABLE, PWM1_MS_MODE};

        let Some(ctx) = self.registers_or_skip("PWM mode") else {
            return Ok(());
        };
        let control = match mode {
            PwmMode::MarkSpace => PWM0_ENABLE | PWM1_ENABLE | PWM0_MS_MODE | PWM1_MS_MODE,
            PwmMode::Balanced => PWM0_ENABLE | PWM1_ENABLE,
        };
        tracing::debug!("PWM mode {mode:?}");
        ctx.pwm().write(pwm::CONTROL, control)
    }

    /// Set the PWM range of both channels
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for a zero range.
    pub fn pwm_set_range(&self, range: u32) -> Result<()> {
        if range == 0 {
            return Err(GpioError::invalid_value("PWM range must be non-zero"));
        }
        let Some(ctx) = self.registers_or_skip("PWM range") else {
            return Ok(());
        };
        tracing::debug!("PWM range {range}");

        for channel in PwmChannel::ALL {
            ctx.pwm().write(channel.range_register(), range)?;
            delay(PWM_RANGE_SETTLE);
        }
        Ok(())
    }

    /// Set the PWM clock divisor (1..=4095).
    ///
    /// PWM and its clock are stopped while the divisor changes; the PWM
    /// control word is restored afterwards.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for a divisor out of range, or `Timeout` if the
    /// clock does not stop.
    pub fn pwm_set_clock(&self, divisor: u32) -> Result<()> {
        if !(1..=clock::MAX_DIVI).contains(&divisor) {
            return Err(GpioError::invalid_value(format!(
                "PWM clock divisor {divisor} outside 1..={}",
                clock::MAX_DIVI
            )));
        }
        let Some(ctx) = self.registers_or_skip("PWM clock") else {
            return Ok(());
        };
        let (pwm_regs, clk) = (ctx.pwm(), ctx.clock());
        tracing::debug!("PWM clock divisor {divisor}");

        let saved = pwm_regs.read(pwm::CONTROL)?;
        pwm_regs.write(pwm::CONTROL, 0)?;

        clk.write(clock::PWM_CTL, BCM_PASSWORD | clock::ctl::SRC_OSCILLATOR)?;
        delay(ALT_SETTLE);
        wait_clock_idle(clk, clock::PWM_CTL, "PWM clock to stop")?;

        clk.write(clock::PWM_DIV, BCM_PASSWORD | (divisor << clock::DIVI_SHIFT))?;
        clk.write(
            clock::PWM_CTL,
            BCM_PASSWORD | clock::ctl::ENABLE | clock::ctl::SRC_OSCILLATOR,
        )?;

        pwm_regs.write(pwm::CONTROL, saved)
    }

    /// Run a pin's clock generator at `freq_hz`.
    ///
    /// The divisor is taken from the 19.2 MHz oscillator: integer part
    /// capped at 4095, fractional part in 1/4096ths.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pin does not exist (`InvalidPin`)
    /// - `freq_hz` is zero or above 19.2 MHz (`InvalidValue`)
    /// - The pin has no clock generator (`UnsupportedMode`)
    /// - The generator does not stop in time (`Timeout`)
    pub fn gpio_clock_set(&self, pin: u32, freq_hz: u32) -> Result<()> {
        let line = self.resolve(pin)?;
        if freq_hz == 0 || freq_hz > clock::OSCILLATOR_HZ {
            return Err(GpioError::invalid_value(format!(
                "clock frequency {freq_hz} Hz outside 1..={} Hz",
                clock::OSCILLATOR_HZ
            )));
        }
        let Some(ctx) = self.registers_or_skip("clock setup") else {
            return Ok(());
        };
        let route = pins::clock_pin(line).ok_or_else(|| {
            GpioError::unsupported_mode(format!("GPIO {line} has no clock generator"))
        })?;

        let (divi, divf) = clock_divisors(freq_hz);
        let ctl = route.clock.control_register();
        let clk = ctx.clock();
        tracing::debug!("GPIO {line}: {:?} at {freq_hz} Hz (divi {divi}, divf {divf})", route.clock);

        clk.write(ctl, BCM_PASSWORD | clock::ctl::SRC_OSCILLATOR)?;
        wait_clock_idle(clk, ctl, "GPIO clock to stop")?;

        clk.write(
            route.clock.divider_register(),
            BCM_PASSWORD | (divi << clock::DIVI_SHIFT) | divf,
        )?;
        clk.write(
            ctl,
            BCM_PASSWORD | clock::ctl::ENABLE | clock::ctl::SRC_OSCILLATOR,
        )
    }

    /// Set the drive strength of a pad group (0..=2) to 0..=7 (2 mA to 16 mA)
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for a group or strength out of range.
    pub fn set_pad_drive(&self, group: u8, strength: u32) -> Result<()> {
        if group >= pads::GROUPS {
            return Err(GpioError::invalid_value(format!(
                "pad group {group} outside 0..{}",
                pads::GROUPS
            )));
        }
        if strength > pads::DRIVE_MASK {
            return Err(GpioError::invalid_value(format!(
                "drive strength {strength} outside 0..={}",
                pads::DRIVE_MASK
            )));
        }
        let Some(ctx) = self.registers_or_skip("pad drive") else {
            return Ok(());
        };
        tracing::debug!("Pad group {group}: drive {strength}");

        ctx.pads().write(
            pads::GPIO_0_27 + usize::from(group),
            BCM_PASSWORD | pads::SLEW | pads::HYSTERESIS | strength,
        )
    }

    fn placement(&self, pin: u32, line: u8) -> Result<PinRegisters> {
        pins::registers(line).ok_or(GpioError::InvalidPin {
            pin,
            numbering: self.numbering,
        })
    }

    fn layout(&self) -> GpioLayout {
        match &self.backend {
            Backend::Registers(ctx) => ctx.descriptor().gpio_layout(),
            Backend::Sysfs(_) => GpioLayout::Rev2,
        }
    }

    fn registers_or_skip(&self, what: &str) -> Option<&HardwareContext> {
        match &self.backend {
            Backend::Registers(ctx) => Some(ctx),
            Backend::Sysfs(_) => {
                tracing::debug!("{what} has no effect in sys numbering");
                None
            }
        }
    }

    fn registers_required(&self, what: &str) -> Result<&HardwareContext> {
        self.context()
            .ok_or_else(|| GpioError::unsupported_mode(format!("{what} needs mapped registers")))
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn set_function(regs: &RegisterFile, place: PinRegisters, code: u32) -> Result<()> {
    regs.modify(
        place.fsel,
        gpio_regs::FSEL_MASK << place.fsel_shift,
        code << place.fsel_shift,
    )
    .map(|_| ())
}

/// Integer and fractional divisors for a clock generator
fn clock_divisors(freq_hz: u32) -> (u32, u32) {
    let divi = (clock::OSCILLATOR_HZ / freq_hz).min(clock::MAX_DIVI);
    let divr = u64::from(clock::OSCILLATOR_HZ % freq_hz);
    let divf = divr * 4096 / u64::from(clock::OSCILLATOR_HZ);
    // divr < OSCILLATOR_HZ, so divf < 4096
    #[allow(clippy::cast_possible_truncation)]
    (divi, divf as u32)
}

fn wait_clock_idle(clk: &RegisterFile, ctl: usize, what: &'static str) -> Result<()> {
    let start = Instant::now();
    while clk.read(ctl)? & clock::ctl::BUSY != 0 {
        if start.elapsed() > CLOCK_IDLE_TIMEOUT {
            #[allow(clippy::cast_possible_truncation)]
            return Err(GpioError::Timeout {
                what,
                duration_us: CLOCK_IDLE_TIMEOUT.as_micros() as u64,
            });
        }
        delay(Duration::from_micros(1));
    }
    Ok(())
}

/// Busy-wait; these holds are too short for the scheduler
fn delay(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
