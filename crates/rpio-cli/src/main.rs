//! `rpio`: command-line GPIO tool for BCM283x boards.
//!
//! ```text
//! USAGE:
//!   rpio board                           Identify the board
//!   rpio mode <pin> <in|out|pwm|clock>   Set a pin's mode
//!   rpio read <pin>                      Read a pin
//!   rpio write <pin> <0|1>               Drive a pin
//!   rpio pull <pin> <up|down|off>        Set a pin's pull resistor
//!   rpio pwm <pin> <0..=1024>            Set a PWM duty value
//!   rpio drive <group> <0..=7>           Set pad drive strength
//!   rpio readall                         Show every header pin
//! ```
//!
//! Pins are wiringPi numbers unless `--numbering` says otherwise.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rpio_chip::pins::{gpio_to_wiringpi, physical_pins, GpioLayout};
use rpio_driver::{identify_board, DriverConfig, Gpio, Level, Numbering, PinMode, Pull};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rpio", about = "GPIO tool for BCM283x boards", version)]
struct Cli {
    /// How pin numbers are read.
    #[arg(short, long, value_enum, default_value_t = NumberingArg::Wpi, global = true)]
    numbering: NumberingArg,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Clone, Copy, ValueEnum)]
enum NumberingArg {
    /// wiringPi logical pins
    Wpi,
    /// BCM GPIO lines
    Gpio,
    /// Header pin numbers
    Phys,
    /// BCM GPIO lines through /sys/class/gpio (no root needed)
    Sys,
}

impl From<NumberingArg> for Numbering {
    fn from(arg: NumberingArg) -> Self {
        match arg {
            NumberingArg::Wpi => Self::WiringPi,
            NumberingArg::Gpio => Self::Gpio,
            NumberingArg::Phys => Self::Physical,
            NumberingArg::Sys => Self::Sys,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    In,
    Out,
    Pwm,
    Clock,
}

impl From<ModeArg> for PinMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::In => Self::Input,
            ModeArg::Out => Self::Output,
            ModeArg::Pwm => Self::PwmOutput,
            ModeArg::Clock => Self::GpioClock,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PullArg {
    Up,
    Down,
    Off,
}

impl From<PullArg> for Pull {
    fn from(arg: PullArg) -> Self {
        match arg {
            PullArg::Up => Self::Up,
            PullArg::Down => Self::Down,
            PullArg::Off => Self::Off,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Identify the board (no root needed).
    Board,
    /// Set a pin's mode.
    Mode {
        /// Pin number.
        pin: u32,
        /// New mode.
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// Read a pin's level.
    Read {
        /// Pin number.
        pin: u32,
    },
    /// Drive a pin; any non-zero value is high.
    Write {
        /// Pin number.
        pin: u32,
        /// 0 or 1.
        value: u32,
    },
    /// Set a pin's pull resistor.
    Pull {
        /// Pin number.
        pin: u32,
        /// Pull direction.
        #[arg(value_enum)]
        pull: PullArg,
    },
    /// Set a PWM duty value.
    Pwm {
        /// Pin number.
        pin: u32,
        /// Duty, 0..=1024.
        value: u32,
    },
    /// Set a pad group's drive strength.
    Drive {
        /// Pad group, 0..=2.
        group: u8,
        /// Strength, 0 (2 mA) ..= 7 (16 mA).
        strength: u32,
    },
    /// Show mode and level of every header pin.
    Readall,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = DriverConfig::from_env();
    let numbering = Numbering::from(cli.numbering);
    tracing::debug!("Pin numbering: {numbering}");

    match cli.command {
        Cmd::Board => cmd_board(&config)?,
        Cmd::Readall => cmd_readall(&config, numbering)?,
        Cmd::Mode { pin, mode } => open(&config, numbering)?.pin_mode(pin, mode.into())?,
        Cmd::Read { pin } => println!("{}", open(&config, numbering)?.digital_read(pin)?),
        Cmd::Write { pin, value } => {
            open(&config, numbering)?.digital_write(pin, Level::from_value(value))?;
        }
        Cmd::Pull { pin, pull } => open(&config, numbering)?.pull_up_down(pin, pull.into())?,
        Cmd::Pwm { pin, value } => open(&config, numbering)?.pwm_write(pin, value)?,
        Cmd::Drive { group, strength } => {
            open(&config, numbering)?.set_pad_drive(group, strength)?;
        }
    }

    Ok(())
}

fn open(config: &DriverConfig, numbering: Numbering) -> Result<Gpio> {
    Gpio::setup(config, numbering)
        .with_context(|| format!("Cannot set up GPIO access in {numbering} numbering"))
}

fn cmd_board(config: &DriverConfig) -> Result<()> {
    let id = identify_board(config)
        .with_context(|| format!("Cannot identify board from {}", config.cpuinfo().display()))?;
    let d = id.descriptor;

    println!("Model        : {}", d.model);
    println!("Revision     : {} ({:?})", id.revision, id.encoding);
    println!("PCB revision : {}", d.pcb_revision);
    println!("Processor    : {:?}", d.processor);
    println!("Manufacturer : {}", d.manufacturer);
    println!("Memory       : {} MB", d.ram_mb());
    println!("Base address : {:#010x}", id.peripheral_base());
    if let Some(hw) = &id.hardware {
        println!("Hardware     : {hw}");
    }
    if d.warranty_voided {
        println!("Warranty     : void (over-volted)");
    }
    if !id.recognized {
        println!("Note         : unknown revision, defaults assumed");
    }

    Ok(())
}

fn cmd_readall(config: &DriverConfig, numbering: Numbering) -> Result<()> {
    // Header rows are listed by BCM line regardless of the chosen numbering
    let backend = if numbering == Numbering::Sys {
        Numbering::Sys
    } else {
        Numbering::Gpio
    };
    let gpio = open(config, backend)?;

    let layout = match gpio.context() {
        Some(ctx) => ctx.descriptor().gpio_layout(),
        None => identify_board(config).map_or(GpioLayout::Rev2, |id| id.descriptor.gpio_layout()),
    };

    println!(" Phys | BCM | wPi | Mode | V");
    println!("------+-----+-----+------+---");
    for (phys, line) in physical_pins(layout) {
        let bcm = u32::from(line);
        let wpi = gpio_to_wiringpi(layout, line).map_or_else(|| "-".to_string(), |p| p.to_string());
        let mode = gpio
            .pin_function(bcm)
            .map_or_else(|_| "-".to_string(), |f| f.to_string());
        let value = gpio
            .digital_read(bcm)
            .map_or_else(|_| "-".to_string(), |v| v.to_string());
        println!(" {phys:>4} | {bcm:>3} | {wpi:>3} | {mode:>4} | {value}");
    }

    Ok(())
}
