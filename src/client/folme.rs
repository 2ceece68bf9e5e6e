use super::{RequestBody, Session};
use crate::error::ClientError;
use crate::protocol::DecodeCursor;
use crate::types::Position;

impl Session<'_> {
    /// Get the tip XY position in meters.
    ///
    /// With `wait` set, the first buffered value is discarded and the call
    /// returns fresh data.
    pub fn get_xy(&mut self, wait: bool) -> Result<Position, ClientError> {
        let body = self.round_trip("xy_pos_get", &RequestBody::new().flag(wait), Some(16))?;
        let mut cursor = DecodeCursor::new(&body);
        Ok(Position {
            x: cursor.f64()?,
            y: cursor.f64()?,
        })
    }

    /// Move the tip to an XY position in meters.
    ///
    /// With `wait` set, the call returns only once the move has finished.
    pub fn set_xy(&mut self, position: Position, wait: bool) -> Result<(), ClientError> {
        let body = RequestBody::new()
            .f64(position.x)
            .f64(position.y)
            .flag(wait);
        self.round_trip("xy_pos_set", &body, Some(0))?;
        Ok(())
    }

    /// Get the tip movement speed as `(speed in m/s, custom speed in use)`.
    pub fn get_speed(&mut self) -> Result<(f32, bool), ClientError> {
        let body = self.round_trip("speed_get", &RequestBody::new(), Some(8))?;
        let mut cursor = DecodeCursor::new(&body);
        let speed = cursor.f32()?;
        let custom = cursor.flag()?;
        Ok((speed, custom))
    }

    /// Set the tip movement speed in m/s. `custom` selects the custom speed
    /// instead of the scan speed.
    pub fn set_speed(&mut self, speed_m_s: f32, custom: bool) -> Result<(), ClientError> {
        let body = RequestBody::new().f32(speed_m_s).flag(custom);
        self.round_trip("speed_set", &body, Some(0))?;
        Ok(())
    }
}
