//! Blink an LED
//!
//! ```text
//! sudo cargo run --example blink -- 17
//! ```
//!
//! Toggles the given BCM GPIO line ten times.

use std::time::Duration;

use rpio_driver::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("rpio_driver=info")
        .init();

    let line: u32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(17);

    let gpio = Gpio::setup(&DriverConfig::from_env(), Numbering::Gpio)?;
    gpio.pin_mode(line, PinMode::Output)?;

    for _ in 0..10 {
        gpio.digital_write(line, Level::High)?;
        std::thread::sleep(Duration::from_millis(500));
        gpio.digital_write(line, Level::Low)?;
        std::thread::sleep(Duration::from_millis(500));
    }

    Ok(())
}
