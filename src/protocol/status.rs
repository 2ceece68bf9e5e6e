//! Device-side error decoding.
//!
//! Two incompatible layouts exist in the field, selected by the controller
//! software version. Picking the wrong one does not just garble the error
//! message; it shifts every byte offset the caller decodes after the status
//! word, so the branch below has to be exact.

use super::codec;
use crate::error::ProtocolError;

/// Versions strictly above this speak the structured error layout; older
/// controllers use the legacy trailing-message layout.
pub const STRUCTURED_ERRORS_ABOVE: u32 = 14000;

/// Decode the error block of a response body.
///
/// `error_index` is the byte offset of the status field within `body`;
/// `None` means the command carries no error block and checking is skipped.
/// Returns `Ok(())` when the status is zero, `ProtocolError::Device` when
/// the controller reported a fault.
pub fn check_error(
    body: &[u8],
    error_index: Option<usize>,
    protocol_version: u32,
) -> Result<(), ProtocolError> {
    let Some(index) = error_index else {
        return Ok(());
    };
    if protocol_version > STRUCTURED_ERRORS_ABOVE {
        check_structured(body, index)
    } else {
        check_legacy(body, index)
    }
}

/// Structured layout: i32 status, i32 code, then (only when status is
/// nonzero) u32 message length and the message bytes.
fn check_structured(body: &[u8], index: usize) -> Result<(), ProtocolError> {
    let section = body.get(index..).ok_or_else(|| {
        ProtocolError::Framing(format!(
            "error block offset {index} outside {}-byte body",
            body.len()
        ))
    })?;
    let status = codec::decode_i32(section)?;
    if status == 0 {
        return Ok(());
    }

    let code = codec::decode_i32(&section[4..])?;
    let message_len = codec::decode_u32(&section[8..])? as usize;
    let message_bytes = section.get(12..12 + message_len).ok_or_else(|| {
        ProtocolError::Framing(format!(
            "error message truncated: declared {message_len} bytes, have {}",
            section.len().saturating_sub(12)
        ))
    })?;
    let message = String::from_utf8_lossy(message_bytes).trim().to_string();

    Err(ProtocolError::Device {
        code: Some(code),
        message,
    })
}

/// Legacy layout: u16 status, then the message as the entire remainder of
/// the body. There is no length prefix; this assumes no command ever places
/// fields after a legacy error message, which holds for the whole supported
/// surface.
fn check_legacy(body: &[u8], index: usize) -> Result<(), ProtocolError> {
    let section = body.get(index..).ok_or_else(|| {
        ProtocolError::Framing(format!(
            "error block offset {index} outside {}-byte body",
            body.len()
        ))
    })?;
    let status = codec::decode_u16(section)?;
    if status == 0 {
        return Ok(());
    }

    let message = String::from_utf8_lossy(&section[2..]).trim().to_string();
    Err(ProtocolError::Device {
        code: None,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: u32 = 13520;
    const STRUCTURED: u32 = 15000;

    fn structured_block(status: i32, code: i32, message: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&status.to_le_bytes());
        body.extend_from_slice(&code.to_le_bytes());
        if status != 0 {
            body.extend_from_slice(&(message.len() as u32).to_le_bytes());
            body.extend_from_slice(message.as_bytes());
        }
        body
    }

    fn legacy_block(status: u16, message: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&status.to_le_bytes());
        if status != 0 {
            body.extend_from_slice(message.as_bytes());
        }
        body
    }

    #[test]
    fn both_layouts_decode_the_same_fault() {
        let err = check_error(&legacy_block(1, "boom"), Some(0), LEGACY).unwrap_err();
        match err {
            ProtocolError::Device { code, message } => {
                assert_eq!(code, None);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Device, got {other:?}"),
        }

        let err =
            check_error(&structured_block(1, -32601, "boom"), Some(0), STRUCTURED).unwrap_err();
        match err {
            ProtocolError::Device { code, message } => {
                assert_eq!(code, Some(-32601));
                assert_eq!(message, "boom");
            }
            other => panic!("expected Device, got {other:?}"),
        }
    }

    #[test]
    fn zero_status_is_ok_in_both_layouts() {
        assert!(check_error(&legacy_block(0, ""), Some(0), LEGACY).is_ok());
        assert!(check_error(&structured_block(0, 0, ""), Some(0), STRUCTURED).is_ok());
    }

    #[test]
    fn skipped_when_no_error_index() {
        assert!(check_error(&[], None, STRUCTURED).is_ok());
        assert!(check_error(&[0xff; 4], None, LEGACY).is_ok());
    }

    #[test]
    fn error_block_after_data_fields() {
        // A 4-byte value precedes the error block, as in most read verbs.
        let mut body = 1.25f32.to_le_bytes().to_vec();
        body.extend_from_slice(&structured_block(0, 0, ""));
        assert!(check_error(&body, Some(4), STRUCTURED).is_ok());

        let mut body = 1.25f32.to_le_bytes().to_vec();
        body.extend_from_slice(&structured_block(3, 7, "range"));
        assert!(matches!(
            check_error(&body, Some(4), STRUCTURED),
            Err(ProtocolError::Device { code: Some(7), .. })
        ));
    }

    #[test]
    fn truncated_error_block_is_a_framing_error() {
        // Status says fault but the declared message overruns the body.
        let mut body = Vec::new();
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&9i32.to_le_bytes());
        body.extend_from_slice(&100u32.to_le_bytes());
        body.extend_from_slice(b"short");
        assert!(matches!(
            check_error(&body, Some(0), STRUCTURED),
            Err(ProtocolError::Framing(_))
        ));

        // Offset beyond the body is desync in either layout.
        assert!(matches!(
            check_error(&[0u8; 2], Some(8), LEGACY),
            Err(ProtocolError::Framing(_))
        ));
    }

    #[test]
    fn version_threshold_is_exclusive() {
        // Exactly 14000 still speaks the legacy layout.
        let body = legacy_block(2, "tilt");
        assert!(matches!(
            check_error(&body, Some(0), STRUCTURED_ERRORS_ABOVE),
            Err(ProtocolError::Device { code: None, .. })
        ));
    }
}
