use super::{RequestBody, Session};
use crate::error::ClientError;
use crate::protocol::DecodeCursor;
use crate::types::{MotorAxis, MotorDirection, MotorGroup};

impl Session<'_> {
    /// Step the coarse positioning motor.
    ///
    /// Coarse motion is destructive if misdirected; direction values come
    /// in as [`MotorDirection`], which rejects unknown aliases before this
    /// point. With `wait` set, the response is delayed until the steps have
    /// been executed, so the long-motion read deadline applies.
    pub fn coarse_move(
        &mut self,
        direction: MotorDirection,
        steps: u16,
        group: MotorGroup,
        wait: bool,
    ) -> Result<(), ClientError> {
        let body = RequestBody::new()
            .u32(direction.into())
            .u16(steps)
            .u32(group.into())
            .flag(wait);
        if wait {
            self.round_trip_long("motor_start_move", &body, Some(0))?;
        } else {
            self.round_trip("motor_start_move", &body, Some(0))?;
        }
        Ok(())
    }

    /// Stop any ongoing coarse motor movement.
    pub fn coarse_stop(&mut self) -> Result<(), ClientError> {
        self.round_trip("motor_stop_move", &RequestBody::new(), Some(0))?;
        Ok(())
    }

    /// Get the motor drive settings for one axis as `(frequency in Hz,
    /// amplitude in V)`.
    pub fn get_motor_freq_amp(&mut self, axis: MotorAxis) -> Result<(f32, f32), ClientError> {
        let body = self.round_trip("motor_freq_amp_get", &RequestBody::new().u16(axis.into()), Some(8))?;
        let mut cursor = DecodeCursor::new(&body);
        let frequency = cursor.f32()?;
        let amplitude = cursor.f32()?;
        Ok((frequency, amplitude))
    }

    /// Set the motor drive frequency (Hz) and amplitude (V) for one axis.
    pub fn set_motor_freq_amp(
        &mut self,
        frequency_hz: f32,
        amplitude_v: f32,
        axis: MotorAxis,
    ) -> Result<(), ClientError> {
        let body = RequestBody::new()
            .f32(frequency_hz)
            .f32(amplitude_v)
            .u16(axis.into());
        self.round_trip("motor_freq_amp_set", &body, Some(0))?;
        Ok(())
    }
}
