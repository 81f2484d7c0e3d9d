use core::fmt;

/// Errors returned by the drivers in this crate.
///
/// `E` is the error type of the underlying bus or pin. Nothing here is
/// retried internally; the caller decides whether another attempt makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The identity register did not hold the expected chip signature.
    UnexpectedSignature { expected: u8, found: u8 },
    /// A register transaction or pin write failed.
    Io(E),
    /// The driver was used after `shutdown()`.
    Closed,
    /// The pressure compensation chain hit a zero divisor or produced a
    /// non-finite value.
    InvalidCompensation,
    /// A forced-mode conversion did not finish within the configured polls.
    ConversionTimeout,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedSignature { expected, found } => write!(
                f,
                "unexpected device signature {:#04x}, expected {:#04x}",
                found, expected
            ),
            Error::Io(e) => write!(f, "device I/O error: {:?}", e),
            Error::Closed => f.write_str("device has been shut down"),
            Error::InvalidCompensation => f.write_str("pressure compensation is undefined"),
            Error::ConversionTimeout => f.write_str("conversion did not complete"),
        }
    }
}
