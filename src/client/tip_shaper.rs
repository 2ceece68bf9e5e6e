use std::time::Duration;

use super::{RequestBody, Session};
use crate::error::ClientError;

impl Session<'_> {
    /// Run the tip-shaper procedure (controlled tip crash and retraction
    /// for reforming the apex).
    ///
    /// With `wait` set, the response is delayed until the procedure ends;
    /// the long-motion read deadline applies. `timeout` of `None` lets the
    /// device wait indefinitely.
    pub fn shape_tip(&mut self, wait: bool, timeout: Option<Duration>) -> Result<(), ClientError> {
        let timeout_ms = timeout.map_or(-1, |t| t.as_millis() as i32);
        let body = RequestBody::new().flag(wait).i32(timeout_ms);
        self.round_trip_long("tip_shaper_start", &body, Some(0))?;
        Ok(())
    }
}
