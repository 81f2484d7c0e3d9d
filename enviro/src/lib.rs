//! Drivers for the sensors and LEDs of a Pimoroni Enviro board.
//!
//! - [`bmp280::Bmp280`]: temperature, barometric pressure and altitude
//! - [`tcs3472::Tcs3472`]: ambient RGBC light
//! - [`led::Leds`]: the two white LEDs on one output pin
//! - [`Enviro`]: all three over one shared bus, opened and shut down together
//!
//! Any `embedded-hal` 1.0 I2C bus and output pin can be used. Enable the
//! `log` or `defmt` feature to get driver logging.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod bmp280;
pub mod bus;
pub mod config;
pub mod convert;
mod enviro;
mod error;
pub mod led;
pub mod tcs3472;

pub use config::Config;
pub use enviro::{BusError, Enviro};
pub use error::Error;
