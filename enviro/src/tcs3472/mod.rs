mod rgb;
#[allow(clippy::module_inception)]
mod tcs3472;

pub use rgb::{RgbSample, BRIGHTNESS_THRESHOLD, FULL_SCALE};
pub use tcs3472::{Gain, Tcs3472, MAX_INTEGRATION_CYCLES};
