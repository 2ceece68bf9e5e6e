use super::{RequestBody, Session};
use crate::error::ClientError;
use crate::protocol::codec;

impl Session<'_> {
    /// Open the auto-approach module on the controller. The module must be
    /// open before it accepts on/off commands.
    pub fn auto_approach_open(&mut self) -> Result<(), ClientError> {
        self.round_trip("auto_approach_open", &RequestBody::new(), Some(0))?;
        Ok(())
    }

    /// Start or stop the auto-approach procedure.
    pub fn auto_approach(&mut self, on: bool) -> Result<(), ClientError> {
        let body = RequestBody::new().u16(u16::from(on));
        self.round_trip("auto_approach_set", &body, Some(0))?;
        Ok(())
    }

    /// True while the auto-approach procedure is running.
    pub fn auto_approach_status(&mut self) -> Result<bool, ClientError> {
        let body = self.round_trip("auto_approach_get", &RequestBody::new(), Some(2))?;
        Ok(codec::decode_u16(&body)? != 0)
    }
}
