//! Pure conversions between native values and their wire representations.
//!
//! Outbound frames travel as ASCII hex text (apart from the raw command-name
//! field), one fixed-width hex image per field. Responses come back as raw
//! little-endian binary. [`hex_to_le_bytes`] bridges the two directions: it
//! lowers a hex image to the byte sequence the decoders read, which is what
//! the round-trip tests pin down.
//!
//! No I/O and no state here; everything is a plain function.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::ProtocolError;

/// Encode a signed or unsigned integer as a fixed-width hex string.
///
/// Negative values are represented as two's-complement over
/// `width_bytes * 8` bits, so `to_hex(-1, 2)` yields `"ffff"`.
pub fn to_hex(value: i64, width_bytes: usize) -> String {
    debug_assert!((1..=8).contains(&width_bytes));
    let masked = if width_bytes >= 8 {
        value as u64
    } else {
        (value as u64) & ((1u64 << (width_bytes * 8)) - 1)
    };
    format!("{masked:0width$x}", width = width_bytes * 2)
}

/// Encode an `f32` as the hex image of its IEEE-754 bit pattern.
///
/// Both positive and negative zero serialize as the all-zero pattern; the
/// controller treats any other bit pattern for zero as a nonzero setpoint.
pub fn encode_f32(value: f32) -> String {
    if value == 0.0 {
        return "00000000".to_string();
    }
    format!("{:08x}", value.to_bits())
}

/// Encode an `f64` as the hex image of its IEEE-754 bit pattern.
/// Zero serializes as the all-zero pattern, as for [`encode_f32`].
pub fn encode_f64(value: f64) -> String {
    if value == 0.0 {
        return "0000000000000000".to_string();
    }
    format!("{:016x}", value.to_bits())
}

fn expect_len(bytes: &[u8], want: usize, what: &str) -> Result<(), ProtocolError> {
    if bytes.len() < want {
        return Err(ProtocolError::Framing(format!(
            "decoding {what}: need {want} bytes, have {}",
            bytes.len()
        )));
    }
    Ok(())
}

pub fn decode_u16(bytes: &[u8]) -> Result<u16, ProtocolError> {
    expect_len(bytes, 2, "u16")?;
    Ok(LittleEndian::read_u16(bytes))
}

pub fn decode_i16(bytes: &[u8]) -> Result<i16, ProtocolError> {
    expect_len(bytes, 2, "i16")?;
    Ok(LittleEndian::read_i16(bytes))
}

pub fn decode_u32(bytes: &[u8]) -> Result<u32, ProtocolError> {
    expect_len(bytes, 4, "u32")?;
    Ok(LittleEndian::read_u32(bytes))
}

pub fn decode_i32(bytes: &[u8]) -> Result<i32, ProtocolError> {
    expect_len(bytes, 4, "i32")?;
    Ok(LittleEndian::read_i32(bytes))
}

pub fn decode_f32(bytes: &[u8]) -> Result<f32, ProtocolError> {
    expect_len(bytes, 4, "f32")?;
    Ok(LittleEndian::read_f32(bytes))
}

pub fn decode_f64(bytes: &[u8]) -> Result<f64, ProtocolError> {
    expect_len(bytes, 8, "f64")?;
    Ok(LittleEndian::read_f64(bytes))
}

/// Decode `length` bytes as UTF-8 text. Invalid byte sequences become the
/// replacement character; malformed text from the device is display data,
/// not a protocol fault.
pub fn decode_string(bytes: &[u8], length: usize) -> Result<String, ProtocolError> {
    expect_len(bytes, length, "string")?;
    Ok(String::from_utf8_lossy(&bytes[..length]).into_owned())
}

/// Lower a hex image to its little-endian wire byte sequence: digit pairs
/// are read most-significant first and emitted last, so `"00c8"` lowers to
/// `[0xc8, 0x00]`.
pub fn hex_to_le_bytes(hex: &str) -> Result<Vec<u8>, ProtocolError> {
    let digits = hex.as_bytes();
    if !hex.is_ascii() || digits.len() % 2 != 0 {
        return Err(ProtocolError::Framing(format!(
            "`{hex}` is not an even-width ASCII hex image"
        )));
    }
    let mut out = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks_exact(2).rev() {
        let pair = std::str::from_utf8(pair)
            .map_err(|_| ProtocolError::Framing(format!("non-ASCII hex image `{hex}`")))?;
        let byte = u8::from_str_radix(pair, 16).map_err(|_| {
            ProtocolError::Framing(format!("invalid hex pair `{pair}` in `{hex}`"))
        })?;
        out.push(byte);
    }
    Ok(out)
}
