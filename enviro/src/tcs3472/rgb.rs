/// Full scale of every 16-bit RGBC channel.
pub const FULL_SCALE: u16 = u16::MAX;

/// Clear count above which the scene counts as bright.
pub const BRIGHTNESS_THRESHOLD: u16 = 215;

/// One RGBC reading.
///
/// The scaled channels are fractions of the clear count; the `red`, `green`
/// and `blue` bytes are those fractions mapped onto 0..=255. A reading with a
/// zero clear count (darkness, or no conversion finished yet) is clamped:
/// every scaled channel is 0.0 and every byte is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RgbSample {
    pub clear: u16,
    pub raw_red: u16,
    pub raw_green: u16,
    pub raw_blue: u16,
    /// `clear` as a fraction of [`FULL_SCALE`].
    pub scaled_clear: f64,
    pub scaled_red: f64,
    pub scaled_green: f64,
    pub scaled_blue: f64,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbSample {
    pub fn from_counts(clear: u16, raw_red: u16, raw_green: u16, raw_blue: u16) -> Self {
        let scaled = |channel: u16| {
            if clear == 0 {
                0.0
            } else {
                channel as f64 / clear as f64
            }
        };
        let scaled_red = scaled(raw_red);
        let scaled_green = scaled(raw_green);
        let scaled_blue = scaled(raw_blue);

        Self {
            clear,
            raw_red,
            raw_green,
            raw_blue,
            scaled_clear: clear as f64 / FULL_SCALE as f64,
            scaled_red,
            scaled_green,
            scaled_blue,
            red: to_byte(scaled_red),
            green: to_byte(scaled_green),
            blue: to_byte(scaled_blue),
        }
    }

    /// `true` once the clear count exceeds [`BRIGHTNESS_THRESHOLD`].
    pub fn is_bright(&self) -> bool {
        self.clear > BRIGHTNESS_THRESHOLD
    }
}

// A channel can read above clear on real parts; such readings saturate.
fn to_byte(scaled: f64) -> u8 {
    libm::round(scaled * 255.0).clamp(0.0, 255.0) as u8
}
