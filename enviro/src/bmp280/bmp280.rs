use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bmp280::calibration::{altitude, Calibration, CALIBRATION_LEN, FINE_PER_CELSIUS};
use crate::bmp280::raw::RawSample;
use crate::bus::RegisterDevice;
use crate::config::{Bmp280Config, Mode};
use crate::Error;

pub const BMP280_SIGNATURE: u8 = 0x58;

const REGISTER_CHIPID: u8 = 0xD0;
const REGISTER_CALIBRATION: u8 = 0x88;
const REGISTER_STATUS: u8 = 0xF3;
const REGISTER_CTRL_MEAS: u8 = 0xF4;
const REGISTER_CONFIG: u8 = 0xF5;
// press_msb, press_lsb, press_xlsb, temp_msb, temp_lsb, temp_xlsb
const REGISTER_PRESSURE: u8 = 0xF7;
const REGISTER_TEMPERATURE: u8 = 0xFA;

const STATUS_MEASURING: u8 = 0x08;
const STATUS_POLL_US: u32 = 2000;

/// Temperature and pressure from one acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Hectopascal.
    pub pressure: f64,
}

/// Bosch BMP280 temperature and barometric pressure sensor.
pub struct Bmp280<I2C, D> {
    device: RegisterDevice<I2C>,
    delay: D,
    calibration: Calibration,
    config: Bmp280Config,
}

impl<I2C: I2c, D: DelayNs> Bmp280<I2C, D> {
    /// Checks the chip signature, loads the trimming parameters and applies
    /// `config`.
    ///
    /// A wrong signature fails before anything else is read. On any error the
    /// bus handle is dropped with the partially built driver. In normal mode
    /// this returns after the first conversion has completed, so the first
    /// read never sees the power-on reset value.
    pub fn new(i2c: I2C, mut delay: D, config: Bmp280Config) -> Result<Self, Error<I2C::Error>> {
        let mut device = RegisterDevice::new(i2c, config.address);

        let signature = device.read_byte(REGISTER_CHIPID)?;
        if signature != BMP280_SIGNATURE {
            error!(
                "BMP280 signature mismatch at {:#x}: {:#x}",
                config.address, signature
            );
            return Err(Error::UnexpectedSignature {
                expected: BMP280_SIGNATURE,
                found: signature,
            });
        }

        let mut data = [0u8; CALIBRATION_LEN];
        device.read_register(REGISTER_CALIBRATION, &mut data)?;
        let calibration = Calibration::from_bytes(&data);
        debug!("BMP280 calibration coefficients: {:?}", calibration);

        device.write_byte(REGISTER_CONFIG, config.config())?;
        device.write_byte(REGISTER_CTRL_MEAS, config.ctrl_meas(config.mode))?;
        debug!(
            "BMP280 config {:#x}, ctrl_meas {:#x}",
            config.config(),
            config.ctrl_meas(config.mode)
        );
        if config.mode == Mode::Normal {
            delay.delay_us(config.measurement_time_us());
        }

        Ok(Self {
            device,
            delay,
            calibration,
            config,
        })
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn config(&self) -> &Bmp280Config {
        &self.config
    }

    /// Reads the temperature in degrees Celsius.
    pub fn read_temperature(&mut self) -> Result<f64, Error<I2C::Error>> {
        Ok(self.read_fine_temperature()? / FINE_PER_CELSIUS)
    }

    /// Reads the uncorrected fine temperature the pressure formula consumes.
    pub fn read_fine_temperature(&mut self) -> Result<f64, Error<I2C::Error>> {
        self.start_conversion()?;
        let mut raw = RawSample::default();
        self.device.read_register(REGISTER_TEMPERATURE, &mut raw.0)?;
        trace!("BMP280 raw temperature {:?}", raw);
        Ok(self.calibration.fine_temperature(raw.adc()))
    }

    /// Reads the pressure in hPa.
    pub fn read_pressure(&mut self) -> Result<f64, Error<I2C::Error>> {
        Ok(self.measure()?.pressure)
    }

    /// Reads the altitude in metres relative to the configured QNH.
    pub fn read_altitude(&mut self) -> Result<f64, Error<I2C::Error>> {
        let measurement = self.measure()?;
        let metres = altitude(
            measurement.temperature,
            measurement.pressure,
            self.config.qnh_hpa,
        );
        if metres.is_finite() {
            Ok(metres)
        } else {
            Err(Error::InvalidCompensation)
        }
    }

    /// Reads pressure and temperature in one burst so both belong to the
    /// same conversion.
    pub fn measure(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        self.start_conversion()?;
        let mut data = [0u8; 6];
        self.device.read_register(REGISTER_PRESSURE, &mut data)?;
        let (pressure, temperature) = RawSample::split_burst(&data);
        trace!("BMP280 raw pressure {:?} temperature {:?}", pressure, temperature);

        let t_fine = self.calibration.fine_temperature(temperature.adc());
        let pressure = self
            .calibration
            .pressure(pressure.adc(), t_fine)
            .ok_or(Error::InvalidCompensation)?;

        Ok(Measurement {
            temperature: t_fine / FINE_PER_CELSIUS,
            pressure,
        })
    }

    // In forced mode every read triggers its own conversion, sleeps for the
    // longest conversion time, then polls the measuring bit. Normal mode
    // converts continuously.
    fn start_conversion(&mut self) -> Result<(), Error<I2C::Error>> {
        if self.config.mode != Mode::Forced {
            return Ok(());
        }
        self.device
            .write_byte(REGISTER_CTRL_MEAS, self.config.ctrl_meas(Mode::Forced))?;

        let timeout_us = self.config.conversion_timeout_ms.saturating_mul(1000);
        let mut waited_us = self.config.measurement_time_us();
        self.delay.delay_us(waited_us);
        while self.device.read_byte(REGISTER_STATUS)? & STATUS_MEASURING != 0 {
            if waited_us >= timeout_us {
                warn!(
                    "BMP280 conversion still running after {} us",
                    waited_us
                );
                return Err(Error::ConversionTimeout);
            }
            self.delay.delay_us(STATUS_POLL_US);
            waited_us += STATUS_POLL_US;
        }
        Ok(())
    }

    /// Releases the bus handle. Reads afterwards fail with [`Error::Closed`].
    pub fn shutdown(&mut self) {
        if self.device.close().is_some() {
            info!("BMP280 at {:#x} shut down", self.device.address());
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp280::calibration::tests::{to_bytes, DATASHEET};
    use crate::config::Oversampling;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::cell::Cell;
    use std::rc::Rc;

    const ADDR: u8 = 0x77;
    const TEMPERATURE: [u8; 3] = [0x7E, 0xED, 0x00];
    const BURST: [u8; 6] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00];

    /// Adds up every requested delay instead of sleeping.
    #[derive(Clone, Default)]
    struct Stopwatch(Rc<Cell<u64>>);

    impl Stopwatch {
        fn elapsed_us(&self) -> u64 {
            self.0.get() / 1000
        }
    }

    impl DelayNs for Stopwatch {
        fn delay_ns(&mut self, ns: u32) {
            self.0.set(self.0.get() + ns as u64);
        }
    }

    fn init_transactions(config: &Bmp280Config) -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write_read(ADDR, vec![0x88], to_bytes(&DATASHEET).to_vec()),
            I2cTransaction::write(ADDR, vec![0xF5, config.config()]),
            I2cTransaction::write(ADDR, vec![0xF4, config.ctrl_meas(config.mode)]),
        ]
    }

    #[test]
    fn init_reads_calibration() {
        let config = Bmp280Config::default();
        let mut i2c = I2cMock::new(&init_transactions(&config));
        let bmp280 = Bmp280::new(i2c.clone(), NoopDelay, config).unwrap();
        assert_eq!(bmp280.calibration(), &DATASHEET);
        i2c.done();
    }

    #[test]
    fn wrong_signature_stops_before_calibration() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDR,
            vec![0xD0],
            vec![0x60],
        )]);
        let result = Bmp280::new(i2c.clone(), NoopDelay, Bmp280Config::default());
        assert!(matches!(
            result,
            Err(Error::UnexpectedSignature {
                expected: 0x58,
                found: 0x60
            })
        ));
        i2c.done();
    }

    #[test]
    fn calibration_failure_is_io_error() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write_read(ADDR, vec![0x88], vec![0; CALIBRATION_LEN])
                .with_error(ErrorKind::Other),
        ]);
        let result = Bmp280::new(i2c.clone(), NoopDelay, Bmp280Config::default());
        assert!(matches!(result, Err(Error::Io(ErrorKind::Other))));
        i2c.done();
    }

    #[test]
    fn reads_compensated_values() {
        let config = Bmp280Config::default();
        let mut expectations = init_transactions(&config);
        expectations.extend([
            I2cTransaction::write_read(ADDR, vec![0xFA], TEMPERATURE.to_vec()),
            I2cTransaction::write_read(ADDR, vec![0xFA], TEMPERATURE.to_vec()),
            I2cTransaction::write_read(ADDR, vec![0xF7], BURST.to_vec()),
            I2cTransaction::write_read(ADDR, vec![0xF7], BURST.to_vec()),
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let mut bmp280 = Bmp280::new(i2c.clone(), NoopDelay, config).unwrap();

        let celsius = bmp280.read_temperature().unwrap();
        assert!((celsius - 25.0825).abs() < 1e-4);
        let fine = bmp280.read_fine_temperature().unwrap();
        assert!((fine - 128422.287).abs() < 1e-3);
        let hpa = bmp280.read_pressure().unwrap();
        assert!((hpa - 1006.5327).abs() < 1e-4);
        let metres = bmp280.read_altitude().unwrap();
        assert!((metres - 116.149).abs() < 1e-2);

        i2c.done();
    }

    #[test]
    fn zero_divisor_fails_fast() {
        let config = Bmp280Config::default();
        let calibration = Calibration {
            dig_p1: 0,
            ..DATASHEET
        };
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write_read(ADDR, vec![0x88], to_bytes(&calibration).to_vec()),
            I2cTransaction::write(ADDR, vec![0xF5, 0xA0]),
            I2cTransaction::write(ADDR, vec![0xF4, 0x27]),
            I2cTransaction::write_read(ADDR, vec![0xF7], BURST.to_vec()),
            I2cTransaction::write_read(ADDR, vec![0xF7], BURST.to_vec()),
        ]);
        let mut bmp280 = Bmp280::new(i2c.clone(), NoopDelay, config).unwrap();
        assert_eq!(bmp280.read_pressure(), Err(Error::InvalidCompensation));
        assert_eq!(bmp280.read_altitude(), Err(Error::InvalidCompensation));
        i2c.done();
    }

    #[test]
    fn normal_mode_waits_for_first_conversion() {
        let config = Bmp280Config::default();
        let mut i2c = I2cMock::new(&init_transactions(&config));
        let clock = Stopwatch::default();
        let _bmp280 = Bmp280::new(i2c.clone(), clock.clone(), config).unwrap();
        assert_eq!(clock.elapsed_us(), config.measurement_time_us() as u64);
        i2c.done();
    }

    #[test]
    fn forced_mode_waits_for_conversion() {
        let config = Bmp280Config {
            mode: Mode::Forced,
            ..Default::default()
        };
        let mut expectations = init_transactions(&config);
        expectations.extend([
            I2cTransaction::write(ADDR, vec![0xF4, 0x25]),
            I2cTransaction::write_read(ADDR, vec![0xF3], vec![0x08]),
            I2cTransaction::write_read(ADDR, vec![0xF3], vec![0x00]),
            I2cTransaction::write_read(ADDR, vec![0xFA], TEMPERATURE.to_vec()),
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let clock = Stopwatch::default();
        let mut bmp280 = Bmp280::new(i2c.clone(), clock.clone(), config).unwrap();
        assert_eq!(clock.elapsed_us(), 0);
        assert!((bmp280.read_temperature().unwrap() - 25.0825).abs() < 1e-4);
        assert_eq!(clock.elapsed_us(), 6425 + 2000);
        i2c.done();
    }

    #[test]
    fn forced_mode_sleeps_through_long_oversampling() {
        let config = Bmp280Config {
            mode: Mode::Forced,
            pressure_oversampling: Oversampling::X16,
            ..Default::default()
        };
        let mut expectations = init_transactions(&config);
        expectations.extend([
            I2cTransaction::write(ADDR, vec![0xF4, config.ctrl_meas(Mode::Forced)]),
            I2cTransaction::write_read(ADDR, vec![0xF3], vec![0x08]),
            I2cTransaction::write_read(ADDR, vec![0xF3], vec![0x00]),
            I2cTransaction::write_read(ADDR, vec![0xF7], BURST.to_vec()),
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let clock = Stopwatch::default();
        let mut bmp280 = Bmp280::new(i2c.clone(), clock.clone(), config).unwrap();
        assert!((bmp280.read_pressure().unwrap() - 1006.5327).abs() < 1e-4);
        assert!(clock.elapsed_us() >= 40_925);
        i2c.done();
    }

    #[test]
    fn forced_mode_gives_up_after_timeout() {
        let config = Bmp280Config {
            mode: Mode::Forced,
            conversion_timeout_ms: 10,
            ..Default::default()
        };
        let mut expectations = init_transactions(&config);
        expectations.extend([
            I2cTransaction::write(ADDR, vec![0xF4, 0x25]),
            I2cTransaction::write_read(ADDR, vec![0xF3], vec![0x08]),
            I2cTransaction::write_read(ADDR, vec![0xF3], vec![0x08]),
            I2cTransaction::write_read(ADDR, vec![0xF3], vec![0x08]),
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let clock = Stopwatch::default();
        let mut bmp280 = Bmp280::new(i2c.clone(), clock.clone(), config).unwrap();
        assert_eq!(bmp280.read_pressure(), Err(Error::ConversionTimeout));
        assert!(clock.elapsed_us() >= 10_000);
        i2c.done();
    }

    #[test]
    fn reads_after_shutdown_fail() {
        let config = Bmp280Config::default();
        let mut i2c = I2cMock::new(&init_transactions(&config));
        let mut bmp280 = Bmp280::new(i2c.clone(), NoopDelay, config).unwrap();

        bmp280.shutdown();
        bmp280.shutdown();
        assert!(!bmp280.is_open());
        assert_eq!(bmp280.read_temperature(), Err(Error::Closed));
        assert_eq!(bmp280.read_pressure(), Err(Error::Closed));
        assert_eq!(bmp280.read_altitude(), Err(Error::Closed));
        assert!(bmp280.release().is_none());
        i2c.done();
    }
}
