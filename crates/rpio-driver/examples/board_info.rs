//! Identify the board
//!
//! Reads cpuinfo only; no privileges needed.

use rpio_driver::chip::PeripheralLayout;
use rpio_driver::chip::Subsystem;
use rpio_driver::{identify_board, DriverConfig, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("rpio_driver=debug")
        .init();

    let id = identify_board(&DriverConfig::from_env())?;
    let d = id.descriptor;
    let layout = PeripheralLayout::new(id.peripheral_base());

    println!("Model:         {}", d.model);
    println!("Revision:      {} ({:?})", id.revision, id.encoding);
    println!("PCB revision:  {}", d.pcb_revision);
    println!("Processor:     {:?}", d.processor);
    println!("Manufacturer:  {}", d.manufacturer);
    println!("Memory:        {} MB", d.ram_mb());
    println!("Header layout: {:?}", d.gpio_layout());
    if d.warranty_voided {
        println!("Warranty:      void (over-volted)");
    }
    if !id.recognized {
        println!("Note:          revision not in the known-board table");
    }

    println!("\nPeripheral base {:#010x}", layout.base());
    for subsystem in Subsystem::ALL {
        println!("  {subsystem:<6} {:#010x}", layout.address(subsystem));
    }

    Ok(())
}
