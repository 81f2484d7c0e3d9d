#[allow(clippy::module_inception)]
mod bmp280;
mod calibration;
pub(crate) mod raw;

// Re-export the public API things
// This avoids having to do enviro::bmp280::bmp280::Bmp280, etc
pub use bmp280::{Bmp280, Measurement, BMP280_SIGNATURE};
pub use calibration::{altitude, Calibration, FINE_PER_CELSIUS};
