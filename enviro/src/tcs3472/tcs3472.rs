use embedded_hal::i2c::I2c;

use crate::bus::RegisterDevice;
use crate::config::Tcs3472Config;
use crate::convert::le_u16;
use crate::tcs3472::rgb::RgbSample;
use crate::Error;

// Every register access goes through the command register.
const COMMAND_BIT: u8 = 0x80;
const AUTO_INCREMENT: u8 = 0x20;

const REGISTER_ENABLE: u8 = 0x00;
const REGISTER_ATIME: u8 = 0x01;
const REGISTER_CONTROL: u8 = 0x0F;
const REGISTER_STATUS: u8 = 0x13;
// cdatal, cdatah, rdatal, rdatah, gdatal, gdatah, bdatal, bdatah
const REGISTER_CDATA: u8 = 0x14;

const ENABLE_POWER_ON: u8 = 0x01;
const ENABLE_RGBC: u8 = 0x02;
const STATUS_VALID: u8 = 0x01;

/// Longest integration time in 2.4 ms cycles.
pub const MAX_INTEGRATION_CYCLES: u16 = 256;

/// RGBC analog gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1 = 0b00,
    X4 = 0b01,
    X16 = 0b10,
    X60 = 0b11,
}

/// TAOS TCS3472 colour light-to-digital converter.
pub struct Tcs3472<I2C> {
    device: RegisterDevice<I2C>,
}

impl<I2C: I2c> Tcs3472<I2C> {
    /// Powers the sensor on and enables the RGBC converter.
    ///
    /// The chip has no identity check here; a failed enable write is the only
    /// way construction fails.
    pub fn new(i2c: I2C, config: Tcs3472Config) -> Result<Self, Error<I2C::Error>> {
        let mut device = RegisterDevice::new(i2c, config.address);
        device.write_byte(COMMAND_BIT | REGISTER_ENABLE, ENABLE_RGBC | ENABLE_POWER_ON)?;
        debug!("TCS3472 at {:#x} enabled", config.address);
        Ok(Self { device })
    }

    /// Reads clear, red, green and blue in one auto-incrementing burst.
    pub fn read_rgb(&mut self) -> Result<RgbSample, Error<I2C::Error>> {
        let mut data = [0u8; 8];
        self.device
            .read_register(COMMAND_BIT | AUTO_INCREMENT | REGISTER_CDATA, &mut data)?;
        let clear = le_u16(&data, 0);
        let red = le_u16(&data, 2);
        let green = le_u16(&data, 4);
        let blue = le_u16(&data, 6);
        trace!(
            "TCS3472 raw clear {} red {} green {} blue {}",
            clear,
            red,
            green,
            blue
        );
        if clear == 0 {
            warn!("TCS3472 clear channel is zero, colour channels clamped");
        }
        Ok(RgbSample::from_counts(clear, red, green, blue))
    }

    /// `true` once a full integration cycle has completed since enabling.
    pub fn data_valid(&mut self) -> Result<bool, Error<I2C::Error>> {
        let status = self.device.read_byte(COMMAND_BIT | REGISTER_STATUS)?;
        Ok(status & STATUS_VALID != 0)
    }

    /// Sets the integration time in 2.4 ms cycles, clamped to `1..=256`.
    pub fn set_integration_cycles(&mut self, cycles: u16) -> Result<(), Error<I2C::Error>> {
        let cycles = cycles.clamp(1, MAX_INTEGRATION_CYCLES);
        let atime = (MAX_INTEGRATION_CYCLES - cycles) as u8;
        self.device.write_byte(COMMAND_BIT | REGISTER_ATIME, atime)?;
        debug!("TCS3472 ATIME {:#x}", atime);
        Ok(())
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Error<I2C::Error>> {
        self.device
            .write_byte(COMMAND_BIT | REGISTER_CONTROL, gain as u8)
    }

    /// Releases the bus handle. Reads afterwards fail with [`Error::Closed`].
    pub fn shutdown(&mut self) {
        if self.device.close().is_some() {
            info!("TCS3472 at {:#x} shut down", self.device.address());
        }
    }

    pub fn is_open(&self) -> bool {
        self.device.is_open()
    }

    /// Consumes the driver and hands back the bus, unless it was already shut down.
    pub fn release(mut self) -> Option<I2C> {
        self.device.close()
    }
}
