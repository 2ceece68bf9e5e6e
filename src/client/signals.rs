use super::{RequestBody, Session};
use crate::error::{ClientError, ProtocolError};
use crate::protocol::{DecodeCursor, check_error, codec};
use crate::types::SignalSlots;

impl Session<'_> {
    /// Get the names of all available signals, in signal-index order.
    pub fn get_signal_names(&mut self) -> Result<Vec<String>, ClientError> {
        let body = self.round_trip("signals_names_get", &RequestBody::new(), None)?;
        let (names, end) = decode_string_block(&body)?;
        check_error(&body, Some(end), self.protocol_version())?;
        Ok(names)
    }

    /// Get the signal-slot assignment: slot display names and the signal
    /// indices routed into them, as two independently length-prefixed lists
    /// back to back.
    pub fn get_signals_in_slots(&mut self) -> Result<SignalSlots, ClientError> {
        let body = self.round_trip("signals_in_slots_get", &RequestBody::new(), None)?;
        let mut cursor = DecodeCursor::new(&body);

        let name_count = read_count(&mut cursor, "slot name count")?;
        let mut names = Vec::with_capacity(name_count.min(body.len() / 4));
        for _ in 0..name_count {
            names.push(cursor.length_prefixed_string()?);
        }

        let index_count = read_count(&mut cursor, "slot index count")?;
        let indices = cursor.i32_array(index_count)?;

        check_error(&body, Some(cursor.position()), self.protocol_version())?;
        Ok(SignalSlots { names, indices })
    }

    /// Read the current value of one signal in its calibrated SI unit.
    ///
    /// With `wait` set, the first buffered value is discarded and the call
    /// returns freshly acquired data.
    pub fn get_signal_value(&mut self, signal_index: i32, wait: bool) -> Result<f32, ClientError> {
        let body = self.round_trip(
            "signal_val_get",
            &RequestBody::new().i32(signal_index).flag(wait),
            Some(4),
        )?;
        Ok(codec::decode_f32(&body)?)
    }
}

fn read_count(cursor: &mut DecodeCursor<'_>, what: &str) -> Result<usize, ProtocolError> {
    let count = cursor.i32()?;
    usize::try_from(count).map_err(|_| ProtocolError::Framing(format!("negative {what}: {count}")))
}

/// A count-prefixed list of length-prefixed strings, returned together with
/// the byte offset of whatever follows it.
fn decode_string_block(body: &[u8]) -> Result<(Vec<String>, usize), ProtocolError> {
    let mut cursor = DecodeCursor::new(body);
    let count = read_count(&mut cursor, "string count")?;
    let mut strings = Vec::with_capacity(count.min(body.len() / 4));
    for _ in 0..count {
        strings.push(cursor.length_prefixed_string()?);
    }
    Ok((strings, cursor.position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::ok_block;

    fn push_string(body: &mut Vec<u8>, s: &str) {
        body.extend_from_slice(&(s.len() as i32).to_le_bytes());
        body.extend_from_slice(s.as_bytes());
    }

    #[test]
    fn string_block_decodes_names_and_end_offset() {
        let mut body = Vec::new();
        body.extend_from_slice(&3i32.to_le_bytes());
        push_string(&mut body, "Current (A)");
        push_string(&mut body, "Bias (V)");
        push_string(&mut body, "Z (m)");
        let tail = body.len();
        body.extend_from_slice(&ok_block());

        let (names, end) = decode_string_block(&body).unwrap();
        assert_eq!(names, vec!["Current (A)", "Bias (V)", "Z (m)"]);
        assert_eq!(end, tail);
    }

    #[test]
    fn string_block_rejects_negative_count() {
        let body = (-1i32).to_le_bytes();
        assert!(matches!(
            decode_string_block(&body),
            Err(ProtocolError::Framing(_))
        ));
    }

    #[test]
    fn string_block_rejects_truncated_entries() {
        let mut body = Vec::new();
        body.extend_from_slice(&2i32.to_le_bytes());
        push_string(&mut body, "Current (A)");
        // Second entry declared but missing.
        assert!(matches!(
            decode_string_block(&body),
            Err(ProtocolError::Framing(_))
        ));
    }
}
