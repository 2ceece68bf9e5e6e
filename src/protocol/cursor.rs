//! Running-offset decoder over a response body.
//!
//! Several responses interleave fixed-width scalars with length-prefixed
//! strings and arrays, so the byte offset of each field depends on what came
//! before it. `DecodeCursor` tracks that offset so verb decoders read fields
//! in order and then know exactly where the trailing error block starts.

use super::codec;
use crate::error::ProtocolError;

pub struct DecodeCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DecodeCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Byte offset of the next unread field.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], ProtocolError> {
        let end = self.pos.checked_add(n).ok_or_else(|| {
            ProtocolError::Framing(format!("field length overflow reading {what}"))
        })?;
        if end > self.buf.len() {
            return Err(ProtocolError::Framing(format!(
                "response truncated reading {what} at byte {} (need {n}, have {})",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn u16(&mut self) -> Result<u16, ProtocolError> {
        codec::decode_u16(self.take(2, "u16")?)
    }

    pub fn i16(&mut self) -> Result<i16, ProtocolError> {
        codec::decode_i16(self.take(2, "i16")?)
    }

    pub fn u32(&mut self) -> Result<u32, ProtocolError> {
        codec::decode_u32(self.take(4, "u32")?)
    }

    pub fn i32(&mut self) -> Result<i32, ProtocolError> {
        codec::decode_i32(self.take(4, "i32")?)
    }

    pub fn f32(&mut self) -> Result<f32, ProtocolError> {
        codec::decode_f32(self.take(4, "f32")?)
    }

    pub fn f64(&mut self) -> Result<f64, ProtocolError> {
        codec::decode_f64(self.take(8, "f64")?)
    }

    /// A u32 on-off flag; anything nonzero reads as on.
    pub fn flag(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.u32()? != 0)
    }

    pub fn string(&mut self, length: usize) -> Result<String, ProtocolError> {
        codec::decode_string(self.take(length, "string")?, length)
    }

    /// An i32 length followed by that many UTF-8 bytes.
    pub fn length_prefixed_string(&mut self) -> Result<String, ProtocolError> {
        let length = self.i32()?;
        let length = usize::try_from(length).map_err(|_| {
            ProtocolError::Framing(format!("negative string length {length}"))
        })?;
        self.string(length)
    }

    pub fn f32_array(&mut self, count: usize) -> Result<Vec<f32>, ProtocolError> {
        // Capacity is capped by what the body can actually hold, so a bogus
        // count fails on truncation instead of allocating first.
        let mut values = Vec::with_capacity(count.min(self.remaining() / 4));
        for _ in 0..count {
            values.push(self.f32()?);
        }
        Ok(values)
    }

    pub fn i32_array(&mut self, count: usize) -> Result<Vec<i32>, ProtocolError> {
        let mut values = Vec::with_capacity(count.min(self.remaining() / 4));
        for _ in 0..count {
            values.push(self.i32()?);
        }
        Ok(values)
    }
}
