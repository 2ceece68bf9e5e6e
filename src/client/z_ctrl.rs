use std::time::Duration;

use super::{RequestBody, Session};
use crate::error::ClientError;
use crate::protocol::{DecodeCursor, check_error, codec};
use crate::types::{GainOverride, ZGains};

impl Session<'_> {
    /// Get the current Z position of the tip in meters.
    ///
    /// Works whether the Z-controller is on or off.
    pub fn get_z(&mut self) -> Result<f32, ClientError> {
        let body = self.round_trip("z_pos_get", &RequestBody::new(), Some(4))?;
        Ok(codec::decode_f32(&body)?)
    }

    /// Set the Z position of the tip in meters.
    ///
    /// The Z-controller must be off; the device refuses the move otherwise
    /// and the refusal surfaces as a device error.
    pub fn set_z(&mut self, z_m: f32) -> Result<(), ClientError> {
        self.round_trip("z_pos_set", &RequestBody::new().f32(z_m), Some(0))?;
        Ok(())
    }

    /// Get the Z-controller (feedback) state.
    ///
    /// # Examples
    /// ```no_run
    /// use stm_bridge::{NanonisClient, NanonisConfig};
    ///
    /// let client = NanonisClient::new(&NanonisConfig::load(None)?)?;
    /// let on = client.with_session(|s| s.get_feedback())?;
    /// println!("feedback loop is {}", if on { "on" } else { "off" });
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get_feedback(&mut self) -> Result<bool, ClientError> {
        let body = self.round_trip("feedback_get", &RequestBody::new(), Some(4))?;
        Ok(codec::decode_u32(&body)? != 0)
    }

    /// Switch the Z-controller (feedback) on or off.
    pub fn set_feedback(&mut self, on: bool) -> Result<(), ClientError> {
        self.round_trip("feedback_set", &RequestBody::new().flag(on), Some(0))?;
        Ok(())
    }

    /// Get the Z-controller setpoint in amperes.
    pub fn get_setpoint(&mut self) -> Result<f32, ClientError> {
        let body = self.round_trip("setpoint_get", &RequestBody::new(), Some(4))?;
        Ok(codec::decode_f32(&body)?)
    }

    /// Set the Z-controller setpoint in amperes.
    pub fn set_setpoint(&mut self, setpoint_a: f32) -> Result<(), ClientError> {
        self.round_trip("setpoint_set", &RequestBody::new().f32(setpoint_a), Some(0))?;
        Ok(())
    }

    /// Get the Z-controller loop gains.
    pub fn get_gains(&mut self) -> Result<ZGains, ClientError> {
        let body = self.round_trip("gains_get", &RequestBody::new(), Some(12))?;
        let mut cursor = DecodeCursor::new(&body);
        Ok(ZGains {
            p_gain: cursor.f32()?,
            time_const: cursor.f32()?,
            i_gain: cursor.f32()?,
        })
    }

    /// Update the Z-controller loop gains.
    ///
    /// Fields left unset in the override keep their current device values:
    /// the current gains are read first and merged, so a partial update
    /// never zeroes an unrelated gain.
    pub fn set_gains(&mut self, update: GainOverride) -> Result<ZGains, ClientError> {
        let merged = update.apply_to(self.get_gains()?);
        let body = RequestBody::new()
            .f32(merged.p_gain)
            .f32(merged.time_const)
            .f32(merged.i_gain);
        self.round_trip("gains_set", &body, Some(0))?;
        Ok(merged)
    }

    /// Get the Z soft limits as `(high, low)` in meters.
    pub fn get_z_limits(&mut self) -> Result<(f32, f32), ClientError> {
        let body = self.round_trip("z_limits_get", &RequestBody::new(), None)?;
        let mut cursor = DecodeCursor::new(&body);
        let high = cursor.f32()?;
        let low = cursor.f32()?;
        check_error(&body, Some(cursor.position()), self.protocol_version())?;
        Ok((high, low))
    }

    /// Withdraw the tip to the upper Z limit and switch the controller off.
    ///
    /// With `wait` set, the response is delayed until the physical motion
    /// finishes; the long-motion read deadline applies. `timeout` of `None`
    /// lets the device wait indefinitely.
    pub fn withdraw(&mut self, wait: bool, timeout: Option<Duration>) -> Result<(), ClientError> {
        let timeout_ms = timeout.map_or(-1, |t| t.as_millis() as i32);
        let body = RequestBody::new().flag(wait).i32(timeout_ms);
        self.round_trip_long("withdraw", &body, Some(0))?;
        Ok(())
    }
}
