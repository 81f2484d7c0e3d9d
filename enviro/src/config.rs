//! Driver settings. `Config::default()` matches the Enviro board wiring.

/// Reference sea-level pressure used for altitude, in hPa.
pub const DEFAULT_QNH_HPA: f64 = 1020.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub bmp280: Bmp280Config,
    pub tcs3472: Tcs3472Config,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bmp280Config {
    pub address: u8,
    pub temperature_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    pub mode: Mode,
    pub standby: Standby,
    pub filter: Filter,
    /// Only valid near the location it was taken for.
    pub qnh_hpa: f64,
    /// Longest wait for a forced-mode conversion before giving up.
    pub conversion_timeout_ms: u32,
}

impl Default for Bmp280Config {
    fn default() -> Self {
        Self {
            address: 0x77,
            temperature_oversampling: Oversampling::X1,
            pressure_oversampling: Oversampling::X1,
            mode: Mode::Normal,
            standby: Standby::Ms1000,
            filter: Filter::Off,
            qnh_hpa: DEFAULT_QNH_HPA,
            conversion_timeout_ms: 100,
        }
    }
}

impl Bmp280Config {
    /// Value of the ctrl_meas register for `mode`.
    pub fn ctrl_meas(&self, mode: Mode) -> u8 {
        ((self.temperature_oversampling as u8) << 5)
            | ((self.pressure_oversampling as u8) << 2)
            | mode as u8
    }

    /// Value of the config register.
    pub fn config(&self) -> u8 {
        ((self.standby as u8) << 5) | ((self.filter as u8) << 2)
    }

    /// Maximum duration of one conversion at the configured oversampling,
    /// from the datasheet's measurement time formula.
    pub fn measurement_time_us(&self) -> u32 {
        let mut us = 1250 + 2300 * self.temperature_oversampling.samples();
        let pressure = self.pressure_oversampling.samples();
        if pressure > 0 {
            us += 2300 * pressure + 575;
        }
        us
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    Skipped = 0b000,
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

impl Oversampling {
    pub fn samples(self) -> u32 {
        match self {
            Oversampling::Skipped => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
            Oversampling::X8 => 8,
            Oversampling::X16 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

/// Inactive time between conversions in normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Standby {
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms2000 = 0b110,
    Ms4000 = 0b111,
}

/// IIR filter coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tcs3472Config {
    pub address: u8,
}

impl Default for Tcs3472Config {
    fn default() -> Self {
        Self { address: 0x29 }
    }
}
