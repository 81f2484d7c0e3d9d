use crate::convert::{le_i16, le_u16};

/// Length of the trimming parameter block starting at register 0x88.
pub(crate) const CALIBRATION_LEN: usize = 24;

/// Divisor between the fine temperature and degrees Celsius.
pub const FINE_PER_CELSIUS: f64 = 5120.0;

/// Factory trimming parameters of one BMP280.
///
/// `dig_t1` and `dig_p1` are unsigned, all other words are two's complement.
/// The field types carry that rule so a coefficient can't be widened with
/// the wrong sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
}

impl Calibration {
    /// Unpacks the little-endian words read from 0x88..=0x9F.
    pub fn from_bytes(bytes: &[u8; CALIBRATION_LEN]) -> Self {
        Self {
            dig_t1: le_u16(bytes, 0),
            dig_t2: le_i16(bytes, 2),
            dig_t3: le_i16(bytes, 4),
            dig_p1: le_u16(bytes, 6),
            dig_p2: le_i16(bytes, 8),
            dig_p3: le_i16(bytes, 10),
            dig_p4: le_i16(bytes, 12),
            dig_p5: le_i16(bytes, 14),
            dig_p6: le_i16(bytes, 16),
            dig_p7: le_i16(bytes, 18),
            dig_p8: le_i16(bytes, 20),
            dig_p9: le_i16(bytes, 22),
        }
    }

    /// Fine temperature (`t_fine`) for a raw temperature conversion, using
    /// the floating point formula of the BMP280 datasheet.
    pub fn fine_temperature(&self, adc_t: u32) -> f64 {
        let adc_t = adc_t as f64;
        let t1 = self.dig_t1 as f64;
        let part1 = (adc_t / 16384.0 - t1 / 1024.0) * self.dig_t2 as f64;
        let delta = adc_t / 131072.0 - t1 / 8192.0;
        let part2 = delta * delta * self.dig_t3 as f64;
        part1 + part2
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self, adc_t: u32) -> f64 {
        self.fine_temperature(adc_t) / FINE_PER_CELSIUS
    }

    /// Pressure in hPa for a raw pressure conversion.
    ///
    /// `t_fine` must come from [`fine_temperature`](Self::fine_temperature)
    /// over the same acquisition cycle, never from the Celsius value.
    /// Returns `None` if the chain divides by zero or leaves the finite range.
    pub fn pressure(&self, adc_p: u32, t_fine: f64) -> Option<f64> {
        let mut part1 = t_fine / 2.0 - 64000.0;
        let mut part2 = part1 * part1 * self.dig_p6 as f64 / 32768.0;
        part2 += part1 * self.dig_p5 as f64 * 2.0;
        part2 = part2 / 4.0 + self.dig_p4 as f64 * 65536.0;
        part1 = (self.dig_p3 as f64 * part1 * part1 / 524288.0 + self.dig_p2 as f64 * part1)
            / 524288.0;
        part1 = (1.0 + part1 / 32768.0) * self.dig_p1 as f64;
        if part1 == 0.0 || !part1.is_finite() {
            return None;
        }

        let mut pascal = 1048576.0 - adc_p as f64;
        pascal = (pascal - part2 / 4096.0) * 6250.0 / part1;
        part1 = self.dig_p9 as f64 * pascal * pascal / 2147483648.0;
        part2 = pascal * self.dig_p8 as f64 / 32768.0;
        pascal += (part1 + part2 + self.dig_p7 as f64) / 16.0;

        let hpa = pascal / 100.0;
        hpa.is_finite().then_some(hpa)
    }
}

/// Altitude in metres from the international barometric formula.
///
/// Relative to `qnh_hpa`, so results drift as soon as the weather or the
/// location differs from where the reference was taken.
pub fn altitude(temperature: f64, pressure_hpa: f64, qnh_hpa: f64) -> f64 {
    (libm::pow(qnh_hpa / pressure_hpa, 1.0 / 5.257) - 1.0) * (temperature + 273.15) / 0.0065
}
