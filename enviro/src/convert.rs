//! Byte helpers shared by the sensor drivers.

/// Joins a 20-bit ADC reading spread over MSB, LSB and the upper nibble of XLSB.
pub fn raw_sample(bytes: [u8; 3]) -> u32 {
    ((bytes[0] as u32) << 12) | ((bytes[1] as u32) << 4) | ((bytes[2] as u32) >> 4)
}

/// Little-endian unsigned 16-bit word at `offset`.
pub fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// Little-endian two's complement 16-bit word at `offset`.
pub fn le_i16(bytes: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}
