//! Register-addressed access to one device on an I2C bus.
//!
//! Sensors sharing a physical bus are each handed an
//! [`I2cDevice`](embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice)
//! borrowed from the same `Mutex<M, RefCell<BUS>>`. The mutex is held for one
//! transaction at a time, and every multi-register read in this crate is a
//! single burst transaction, so two callers can never interleave inside one
//! value.

use embedded_hal::i2c::I2c;

use crate::Error;

/// A bus handle bound to one 7-bit device address.
///
/// Once closed, every access fails with [`Error::Closed`].
pub struct RegisterDevice<I2C> {
    i2c: Option<I2C>,
    address: u8,
}

impl<I2C: I2c> RegisterDevice<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c: Some(i2c),
            address,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_open(&self) -> bool {
        self.i2c.is_some()
    }

    /// Reads `buf.len()` bytes starting at `register`.
    pub fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        self.i2c
            .as_mut()
            .ok_or(Error::Closed)?
            .write_read(address, &[register], buf)
            .map_err(Error::Io)
    }

    pub fn read_byte(&mut self, register: u8) -> Result<u8, Error<I2C::Error>> {
        let mut data = [0u8; 1];
        self.read_register(register, &mut data)?;
        Ok(data[0])
    }

    pub fn write_byte(&mut self, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        self.i2c
            .as_mut()
            .ok_or(Error::Closed)?
            .write(address, &[register, value])
            .map_err(Error::Io)
    }

    /// Gives the bus handle back. Later calls return `None`.
    pub fn close(&mut self) -> Option<I2C> {
        self.i2c.take()
    }
}
