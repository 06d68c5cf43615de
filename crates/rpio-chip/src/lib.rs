//! Silicon and board model for the BCM2835 / BCM2836 / BCM2837 board family.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the hardware: the board revision encodings, peripheral base
//! addresses, register word indices and pin mapping tables.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`board`] | Board model, manufacturer, processor, revision bit layout, legacy revision table |
//! | [`peripheral`] | Peripheral base addresses and the four register block offsets |
//! | [`regs`] | Register word indices and bit definitions inside each block |
//! | [`pins`] | wiringPi / physical header / BCM GPIO mapping tables |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod board;
pub mod peripheral;
pub mod pins;
pub mod regs;
