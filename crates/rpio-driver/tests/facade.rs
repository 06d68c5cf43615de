//! Pin operations against simulated register blocks
//!
//! The simulated context starts with every register at zero and keeps what
//! is written, so each test checks the words a protocol leaves behind. A
//! recording context also keeps the order of writes for timed sequences.

use rpio_chip::pins;
use rpio_chip::regs::{clock, gpio, pads, pwm, BCM_PASSWORD};
use rpio_driver::chip::BoardDescriptor;
use rpio_driver::{
    Gpio, GpioError, HardwareContext, Level, Numbering, PinFunction, PinMode, Pull, PwmMode,
    SysfsGpio,
};

fn board(revision: u32) -> BoardDescriptor {
    BoardDescriptor::from_bitfield(revision)
}

fn pi3(numbering: Numbering) -> Gpio {
    Gpio::new(HardwareContext::simulated(board(0x00A0_2082)), numbering).unwrap()
}

fn regs(gpio: &Gpio) -> &HardwareContext {
    gpio.context().unwrap()
}

// ── Numbering ───────────────────────────────────────────────────────────────

#[test]
fn numbering_modes_reach_the_same_line() {
    // BCM GPIO 17 is wiringPi 0 and header pin 11
    assert_eq!(pi3(Numbering::Gpio).resolve(17).unwrap(), 17);
    assert_eq!(pi3(Numbering::WiringPi).resolve(0).unwrap(), 17);
    assert_eq!(pi3(Numbering::Physical).resolve(11).unwrap(), 17);
}

#[test]
fn header_layout_follows_the_board() {
    // wiringPi 2 is GPIO 21 on the first Model B and GPIO 27 afterwards
    let rev1 = BoardDescriptor::from_legacy("0002").unwrap();
    let gpio = Gpio::new(HardwareContext::simulated(rev1), Numbering::WiringPi).unwrap();
    assert_eq!(gpio.resolve(2).unwrap(), 21);
    assert_eq!(pi3(Numbering::WiringPi).resolve(2).unwrap(), 27);
}

#[test]
fn unmapped_pins_are_invalid() {
    let physical = pi3(Numbering::Physical);
    // header pin 1 is 3.3 V
    assert!(matches!(
        physical.resolve(1),
        Err(GpioError::InvalidPin { pin: 1, numbering: Numbering::Physical })
    ));
    assert!(physical.digital_write(41, Level::High).is_err());

    let wpi = pi3(Numbering::WiringPi);
    let err = wpi.pin_mode(64, PinMode::Output).unwrap_err();
    assert!(err.to_string().contains("wiringPi"));
}

// ── Function select ─────────────────────────────────────────────────────────

#[test]
fn pin_mode_writes_only_its_own_field() {
    let gpio = pi3(Numbering::Gpio);
    let ctx = regs(&gpio);

    // GPIO 17 lives in GPFSEL1 bits 21..24
    ctx.gpio().write(gpio::GPFSEL0 + 1, 0xFFFF_FFFF).unwrap();
    gpio.pin_mode(17, PinMode::Input).unwrap();
    assert_eq!(ctx.gpio().read(gpio::GPFSEL0 + 1).unwrap(), 0xFFFF_FFFF & !(0b111 << 21));

    gpio.pin_mode(17, PinMode::Output).unwrap();
    assert_eq!(
        ctx.gpio().read(gpio::GPFSEL0 + 1).unwrap(),
        (0xFFFF_FFFF & !(0b111 << 21)) | (1 << 21)
    );
    assert_eq!(gpio.pin_function(17).unwrap(), PinFunction::Output);
}

#[test]
fn every_line_has_a_function_field() {
    let gpio = pi3(Numbering::Gpio);
    for line in 0..54 {
        gpio.pin_mode(line, PinMode::Output).unwrap();
        assert_eq!(gpio.pin_function(line).unwrap(), PinFunction::Output, "GPIO {line}");
    }
    let ctx = regs(&gpio);
    // 0b001 repeated in all ten fields
    assert_eq!(ctx.gpio().read(gpio::GPFSEL0).unwrap(), 0x0924_9249);
}

// ── Levels ──────────────────────────────────────────────────────────────────

#[test]
fn digital_write_uses_set_and_clear_registers() {
    let gpio = pi3(Numbering::Gpio);
    let ctx = regs(&gpio);

    gpio.digital_write(4, Level::High).unwrap();
    assert_eq!(ctx.gpio().read(gpio::GPSET0).unwrap(), 1 << 4);

    gpio.digital_write(35, Level::Low).unwrap();
    assert_eq!(ctx.gpio().read(gpio::GPCLR0 + 1).unwrap(), 1 << 3);
    assert_eq!(ctx.gpio().read(gpio::GPCLR0).unwrap(), 0);
}

#[test]
fn digital_read_tests_one_bit() {
    let gpio = pi3(Numbering::Gpio);
    let ctx = regs(&gpio);

    ctx.gpio().write(gpio::GPLEV0, 1 << 22).unwrap();
    assert_eq!(gpio.digital_read(22).unwrap(), Level::High);
    assert_eq!(gpio.digital_read(23).unwrap(), Level::Low);

    ctx.gpio().write(gpio::GPLEV0 + 1, 1 << 21).unwrap();
    assert_eq!(gpio.digital_read(53).unwrap(), Level::High);
}

// ── Pull control ────────────────────────────────────────────────────────────

#[test]
fn pull_protocol_asserts_clocks_then_deasserts() {
    let gpio = Gpio::new(HardwareContext::recording(board(0x00A0_2082)), Numbering::Gpio).unwrap();
    let ctx = regs(&gpio);

    // GPIO 40 sits in the second bank, bit 8
    for (pull, code) in [(Pull::Up, 2_u32), (Pull::Down, 1)] {
        gpio.pull_up_down(40, pull).unwrap();
        assert_eq!(
            ctx.gpio().take_writes(),
            vec![
                (gpio::GPPUD, code),
                (gpio::GPPUDCLK0 + 1, 1_u32 << 8),
                (gpio::GPPUD, 0),
                (gpio::GPPUDCLK0 + 1, 0),
            ],
            "{pull:?}"
        );
    }

    gpio.pull_up_down(40, Pull::Off).unwrap();
    assert_eq!(ctx.gpio().read(gpio::GPPUD).unwrap(), 0);
    assert_eq!(ctx.gpio().read(gpio::GPPUDCLK0 + 1).unwrap(), 0);
}

// ── PWM ─────────────────────────────────────────────────────────────────────

#[test]
fn pwm_output_mode_programs_the_block() {
    let gpio = pi3(Numbering::Gpio);
    let ctx = regs(&gpio);

    gpio.pin_mode(18, PinMode::PwmOutput).unwrap();

    assert_eq!(gpio.pin_function(18).unwrap(), PinFunction::Alt(5));
    assert_eq!(ctx.pwm().read(pwm::PWM0_RANGE).unwrap(), 1024);
    assert_eq!(ctx.pwm().read(pwm::PWM1_RANGE).unwrap(), 1024);
    assert_eq!(
        ctx.pwm().read(pwm::CONTROL).unwrap(),
        pwm::control::PWM0_ENABLE
            | pwm::control::PWM1_ENABLE
            | pwm::control::PWM0_MS_MODE
            | pwm::control::PWM1_MS_MODE
    );
    assert_eq!(
        ctx.clock().read(clock::PWM_DIV).unwrap(),
        BCM_PASSWORD | (32 << clock::DIVI_SHIFT)
    );
    assert_eq!(
        ctx.clock().read(clock::PWM_CTL).unwrap(),
        BCM_PASSWORD | clock::ctl::ENABLE | clock::ctl::SRC_OSCILLATOR
    );
}

#[test]
fn pwm_write_targets_the_pin_channel() {
    let gpio = pi3(Numbering::Gpio);
    let ctx = regs(&gpio);

    gpio.pwm_write(18, 512).unwrap();
    gpio.pwm_write(13, 1024).unwrap();
    assert_eq!(ctx.pwm().read(pwm::PWM0_DATA).unwrap(), 512);
    assert_eq!(ctx.pwm().read(pwm::PWM1_DATA).unwrap(), 1024);
}

#[test]
fn pwm_write_validates_value_and_pin() {
    let gpio = pi3(Numbering::Gpio);

    assert!(matches!(gpio.pwm_write(18, 1025), Err(GpioError::InvalidValue { .. })));
    assert!(matches!(gpio.pwm_write(17, 1), Err(GpioError::UnsupportedMode { .. })));
    assert!(matches!(
        gpio.pin_mode(17, PinMode::PwmOutput),
        Err(GpioError::UnsupportedMode { .. })
    ));
}

#[test]
fn balanced_mode_drops_mark_space_bits() {
    let gpio = pi3(Numbering::Gpio);
    gpio.pwm_set_mode(PwmMode::Balanced).unwrap();
    assert_eq!(
        regs(&gpio).pwm().read(pwm::CONTROL).unwrap(),
        pwm::control::PWM0_ENABLE | pwm::control::PWM1_ENABLE
    );
}

#[test]
fn pwm_clock_change_restores_control() {
    let gpio = pi3(Numbering::Gpio);
    let ctx = regs(&gpio);

    gpio.pwm_set_mode(PwmMode::Balanced).unwrap();
    gpio.pwm_set_clock(400).unwrap();

    assert_eq!(
        ctx.clock().read(clock::PWM_DIV).unwrap(),
        BCM_PASSWORD | (400 << clock::DIVI_SHIFT)
    );
    assert_eq!(
        ctx.pwm().read(pwm::CONTROL).unwrap(),
        pwm::control::PWM0_ENABLE | pwm::control::PWM1_ENABLE
    );
    assert!(gpio.pwm_set_clock(0).is_err());
    assert!(gpio.pwm_set_clock(4096).is_err());
    assert!(gpio.pwm_set_range(0).is_err());
}

// ── General purpose clocks ──────────────────────────────────────────────────

#[test]
fn clock_output_starts_generator() {
    let gpio = pi3(Numbering::Gpio);
    let ctx = regs(&gpio);

    gpio.pin_mode(4, PinMode::GpioClock).unwrap();
    assert_eq!(gpio.pin_function(4).unwrap(), PinFunction::Alt(0));

    let route = pins::clock_pin(4).unwrap();
    assert_eq!(
        ctx.clock().read(route.clock.divider_register()).unwrap(),
        BCM_PASSWORD | (192 << clock::DIVI_SHIFT)
    );
    assert_eq!(
        ctx.clock().read(route.clock.control_register()).unwrap(),
        BCM_PASSWORD | clock::ctl::ENABLE | clock::ctl::SRC_OSCILLATOR
    );
}

#[test]
fn clock_frequency_is_validated() {
    let gpio = pi3(Numbering::Gpio);
    assert!(matches!(gpio.gpio_clock_set(4, 0), Err(GpioError::InvalidValue { .. })));
    assert!(matches!(
        gpio.gpio_clock_set(4, 19_200_001),
        Err(GpioError::InvalidValue { .. })
    ));
    assert!(matches!(
        gpio.gpio_clock_set(17, 1_000),
        Err(GpioError::UnsupportedMode { .. })
    ));
}

// ── Pads ────────────────────────────────────────────────────────────────────

#[test]
fn pad_drive_carries_password() {
    let gpio = pi3(Numbering::Gpio);
    gpio.set_pad_drive(1, 7).unwrap();
    assert_eq!(
        regs(&gpio).pads().read(pads::GPIO_0_27 + 1).unwrap(),
        BCM_PASSWORD | 0x18 | 7
    );

    assert!(gpio.set_pad_drive(3, 0).is_err());
    assert!(gpio.set_pad_drive(0, 8).is_err());
}

// ── Sys numbering ───────────────────────────────────────────────────────────

#[test]
fn sys_numbering_uses_value_files() {
    let dir = tempfile::tempdir().unwrap();
    let line = dir.path().join("gpio27");
    std::fs::create_dir(&line).unwrap();
    std::fs::write(line.join("value"), "1\n").unwrap();

    let gpio = Gpio::sys(SysfsGpio::new(dir.path()));
    assert!(gpio.context().is_none());
    assert_eq!(gpio.digital_read(27).unwrap(), Level::High);

    gpio.digital_write(27, Level::Low).unwrap();
    assert_eq!(std::fs::read_to_string(line.join("value")).unwrap(), "0\n");
}

#[test]
fn sys_numbering_ignores_register_only_operations() {
    let dir = tempfile::tempdir().unwrap();
    let gpio = Gpio::sys(SysfsGpio::new(dir.path()));

    gpio.pin_mode(18, PinMode::PwmOutput).unwrap();
    gpio.pull_up_down(18, Pull::Up).unwrap();
    gpio.pwm_write(18, 100).unwrap();
    gpio.pwm_set_mode(PwmMode::MarkSpace).unwrap();
    gpio.gpio_clock_set(4, 100_000).unwrap();
    gpio.set_pad_drive(0, 3).unwrap();

    // pin numbers and values are still checked
    assert!(gpio.pin_mode(54, PinMode::Input).is_err());
    assert!(gpio.pwm_write(18, 2000).is_err());
    assert!(matches!(gpio.pin_function(18), Err(GpioError::UnsupportedMode { .. })));
}
