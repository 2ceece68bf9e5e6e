use std::time::Duration;

use super::{RequestBody, Session};
use crate::error::ClientError;
use crate::protocol::codec;
use crate::types::{PulseMode, ZControllerHold};

impl Session<'_> {
    /// Get the bias voltage applied to the scanning probe tip.
    ///
    /// # Returns
    /// The current bias voltage in volts.
    ///
    /// # Errors
    /// Returns `ClientError` if communication fails or the device reports a
    /// fault.
    ///
    /// # Examples
    /// ```no_run
    /// use stm_bridge::{NanonisClient, NanonisConfig};
    ///
    /// let client = NanonisClient::new(&NanonisConfig::load(None)?)?;
    /// let bias = client.with_session(|s| s.get_bias())?;
    /// println!("current bias: {bias:.3} V");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get_bias(&mut self) -> Result<f32, ClientError> {
        let body = self.round_trip("bias_get", &RequestBody::new(), Some(4))?;
        Ok(codec::decode_f32(&body)?)
    }

    /// Set the bias voltage applied to the scanning probe tip.
    ///
    /// The configured bias limit is enforced here, before any frame is
    /// sent: an out-of-range voltage never reaches the wire.
    ///
    /// # Arguments
    /// * `voltage_v` - Bias voltage in volts
    ///
    /// # Errors
    /// Returns `ClientError::LimitExceeded` for voltages beyond the
    /// configured limit, otherwise any transport or device error.
    ///
    /// # Examples
    /// ```no_run
    /// use stm_bridge::{NanonisClient, NanonisConfig};
    ///
    /// let client = NanonisClient::new(&NanonisConfig::load(None)?)?;
    /// client.with_session(|s| s.set_bias(1.5))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn set_bias(&mut self, voltage_v: f32) -> Result<(), ClientError> {
        let limit = self.bias_limit_v();
        if !voltage_v.is_finite() || voltage_v.abs() > limit {
            return Err(ClientError::LimitExceeded {
                what: "bias voltage",
                value: voltage_v as f64,
                limit: limit as f64,
            });
        }
        self.round_trip("bias_set", &RequestBody::new().f32(voltage_v), Some(0))?;
        Ok(())
    }

    /// Generate one bias pulse.
    ///
    /// # Arguments
    /// * `voltage_v` - Pulse voltage, interpreted according to `mode`
    /// * `width` - Pulse duration
    /// * `wait` - Wait until the pulse completes before returning
    /// * `hold` - Z-controller behavior during the pulse
    /// * `mode` - Whether `voltage_v` is relative to the current bias or
    ///   absolute
    pub fn pulse(
        &mut self,
        voltage_v: f32,
        width: Duration,
        wait: bool,
        hold: ZControllerHold,
        mode: PulseMode,
    ) -> Result<(), ClientError> {
        let body = RequestBody::new()
            .flag(wait)
            .f32(width.as_secs_f32())
            .f32(voltage_v)
            .u16(hold.into())
            .u16(mode.into());
        self.round_trip("bias_pulse", &body, Some(0))?;
        Ok(())
    }
}
