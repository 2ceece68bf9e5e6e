use super::{RequestBody, Session};
use crate::error::ClientError;
use crate::protocol::{DecodeCursor, check_error};

impl Session<'_> {
    /// Get the device-side directory scan and spectroscopy files are being
    /// saved into.
    pub fn session_path(&mut self) -> Result<String, ClientError> {
        let body = self.round_trip("session_path_get", &RequestBody::new(), None)?;
        let mut cursor = DecodeCursor::new(&body);
        let path = cursor.length_prefixed_string()?;
        check_error(&body, Some(cursor.position()), self.protocol_version())?;
        Ok(path)
    }
}
