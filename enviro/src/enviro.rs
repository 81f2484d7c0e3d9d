use core::cell::RefCell;

use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_embedded_hal::shared_bus::I2cDeviceError;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::{ErrorType, I2c};

use crate::bmp280::{Bmp280, Measurement};
use crate::config::Config;
use crate::led::Leds;
use crate::tcs3472::{RgbSample, Tcs3472};
use crate::Error;

/// Error of a sensor transaction over the shared bus.
pub type BusError<BUS> = Error<I2cDeviceError<<BUS as ErrorType>::Error>>;

/// Both sensors and the LEDs of one board behind a single lifecycle.
///
/// The bus stays owned by the caller; every sensor transaction locks it, so
/// the facade can be shared behind a mutex by concurrent request handlers.
/// Dropping the facade runs [`shutdown`](Self::shutdown).
pub struct Enviro<'a, M, BUS, PIN, D>
where
    M: RawMutex,
    BUS: I2c,
    PIN: OutputPin,
    D: DelayNs,
{
    bmp280: Bmp280<I2cDevice<'a, M, BUS>, D>,
    tcs3472: Tcs3472<I2cDevice<'a, M, BUS>>,
    leds: Leds<PIN>,
}

impl<'a, M, BUS, PIN, D> Enviro<'a, M, BUS, PIN, D>
where
    M: RawMutex,
    BUS: I2c,
    PIN: OutputPin,
    D: DelayNs,
{
    /// Brings up the BMP280, then the TCS3472.
    ///
    /// If either sensor fails, whatever was already opened is shut down
    /// before the error is returned.
    pub fn open(
        bus: &'a Mutex<M, RefCell<BUS>>,
        pin: PIN,
        delay: D,
        config: Config,
    ) -> Result<Self, BusError<BUS>> {
        let mut leds = Leds::new(pin);

        let mut bmp280 = match Bmp280::new(I2cDevice::new(bus), delay, config.bmp280) {
            Ok(bmp280) => bmp280,
            Err(e) => {
                error!("BMP280 failed to start");
                leds.shutdown();
                return Err(e);
            }
        };

        let tcs3472 = match Tcs3472::new(I2cDevice::new(bus), config.tcs3472) {
            Ok(tcs3472) => tcs3472,
            Err(e) => {
                error!("TCS3472 failed to start");
                bmp280.shutdown();
                leds.shutdown();
                return Err(e);
            }
        };

        info!("Enviro sensors ready");
        Ok(Self {
            bmp280,
            tcs3472,
            leds,
        })
    }

    pub fn read_temperature(&mut self) -> Result<f64, BusError<BUS>> {
        self.bmp280.read_temperature()
    }

    pub fn read_fine_temperature(&mut self) -> Result<f64, BusError<BUS>> {
        self.bmp280.read_fine_temperature()
    }

    pub fn read_pressure(&mut self) -> Result<f64, BusError<BUS>> {
        self.bmp280.read_pressure()
    }

    pub fn read_altitude(&mut self) -> Result<f64, BusError<BUS>> {
        self.bmp280.read_altitude()
    }

    pub fn measure(&mut self) -> Result<Measurement, BusError<BUS>> {
        self.bmp280.measure()
    }

    pub fn read_rgb(&mut self) -> Result<RgbSample, BusError<BUS>> {
        self.tcs3472.read_rgb()
    }

    pub fn turn_on(&mut self) -> Result<(), Error<PIN::Error>> {
        self.leds.turn_on()
    }

    pub fn turn_off(&mut self) -> Result<(), Error<PIN::Error>> {
        self.leds.turn_off()
    }

    pub fn bmp280(&mut self) -> &mut Bmp280<I2cDevice<'a, M, BUS>, D> {
        &mut self.bmp280
    }

    pub fn tcs3472(&mut self) -> &mut Tcs3472<I2cDevice<'a, M, BUS>> {
        &mut self.tcs3472
    }

    pub fn leds(&mut self) -> &mut Leds<PIN> {
        &mut self.leds
    }

    pub fn is_open(&self) -> bool {
        self.bmp280.is_open() || self.tcs3472.is_open() || self.leds.is_open()
    }

    /// Releases both sensors and the LED pin. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if !self.is_open() {
            return;
        }
        self.bmp280.shutdown();
        self.tcs3472.shutdown();
        self.leds.shutdown();
        info!("Enviro shut down");
    }
}

impl<M, BUS, PIN, D> Drop for Enviro<'_, M, BUS, PIN, D>
where
    M: RawMutex,
    BUS: I2c,
    PIN: OutputPin,
    D: DelayNs,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
