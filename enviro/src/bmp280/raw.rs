use crate::convert::raw_sample;

/// MSB, LSB and XLSB register bytes of one temperature or pressure conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawSample(pub [u8; 3]);

impl RawSample {
    /// Splits the 6-byte burst starting at the pressure MSB register into
    /// `(pressure, temperature)`.
    pub fn split_burst(data: &[u8; 6]) -> (Self, Self) {
        (
            Self([data[0], data[1], data[2]]),
            Self([data[3], data[4], data[5]]),
        )
    }

    /// The 20-bit uncompensated ADC value.
    pub fn adc(&self) -> u32 {
        raw_sample(self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RawSample {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{:#x}", self.0);
    }
}
