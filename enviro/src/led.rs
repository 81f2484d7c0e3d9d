//! The pair of white LEDs next to the colour sensor, switched by one pin.

use embedded_hal::digital::OutputPin;

use crate::Error;

pub struct Leds<PIN> {
    pin: Option<PIN>,
    on: bool,
}

impl<PIN: OutputPin> Leds<PIN> {
    /// Takes an already configured output pin. The pin level is left as is
    /// until the first command or [`shutdown`](Self::shutdown).
    pub fn new(pin: PIN) -> Self {
        Self { pin: Some(pin), on: false }
    }

    pub fn turn_on(&mut self) -> Result<(), Error<PIN::Error>> {
        self.pin()?.set_high().map_err(Error::Io)?;
        self.on = true;
        Ok(())
    }

    pub fn turn_off(&mut self) -> Result<(), Error<PIN::Error>> {
        self.pin()?.set_low().map_err(Error::Io)?;
        self.on = false;
        Ok(())
    }

    /// Last commanded state; the pin is never read back.
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_open(&self) -> bool {
        self.pin.is_some()
    }

    /// Drives the pin low, then releases it. The pin is never read back, so
    /// it is driven low even if no command was issued.
    /// Commands afterwards fail with [`Error::Closed`].
    pub fn shutdown(&mut self) {
        if let Some(mut pin) = self.pin.take() {
            if pin.set_low().is_err() {
                warn!("LEDs could not be switched off on shutdown");
            }
            self.on = false;
            info!("LEDs shut down");
        }
    }

    /// Consumes the actuator and hands back the pin, unless it was already shut down.
    pub fn release(mut self) -> Option<PIN> {
        self.pin.take()
    }

    fn pin(&mut self) -> Result<&mut PIN, Error<PIN::Error>> {
        self.pin.as_mut().ok_or(Error::Closed)
    }
}
