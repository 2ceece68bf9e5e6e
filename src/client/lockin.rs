use super::{RequestBody, Session};
use crate::error::ClientError;
use crate::protocol::codec;

impl Session<'_> {
    /// Switch one lock-in modulator on or off. Modulator numbering starts
    /// at 1 on the device.
    pub fn set_lockin_enabled(&mut self, modulator: i32, on: bool) -> Result<(), ClientError> {
        let body = RequestBody::new().i32(modulator).flag(on);
        self.round_trip("lockin_mod_on_off_set", &body, Some(0))?;
        Ok(())
    }

    pub fn get_lockin_enabled(&mut self, modulator: i32) -> Result<bool, ClientError> {
        let body = self.round_trip(
            "lockin_mod_on_off_get",
            &RequestBody::new().i32(modulator),
            Some(4),
        )?;
        Ok(codec::decode_u32(&body)? != 0)
    }

    /// Set the modulation amplitude in volts.
    pub fn set_lockin_amplitude(
        &mut self,
        modulator: i32,
        amplitude_v: f32,
    ) -> Result<(), ClientError> {
        let body = RequestBody::new().i32(modulator).f32(amplitude_v);
        self.round_trip("lockin_mod_amp_set", &body, Some(0))?;
        Ok(())
    }

    pub fn get_lockin_amplitude(&mut self, modulator: i32) -> Result<f32, ClientError> {
        let body = self.round_trip(
            "lockin_mod_amp_get",
            &RequestBody::new().i32(modulator),
            Some(4),
        )?;
        Ok(codec::decode_f32(&body)?)
    }

    /// Set the modulation frequency in hertz.
    pub fn set_lockin_frequency(
        &mut self,
        modulator: i32,
        frequency_hz: f64,
    ) -> Result<(), ClientError> {
        let body = RequestBody::new().i32(modulator).f64(frequency_hz);
        self.round_trip("lockin_mod_freq_set", &body, Some(0))?;
        Ok(())
    }

    pub fn get_lockin_frequency(&mut self, modulator: i32) -> Result<f64, ClientError> {
        let body = self.round_trip(
            "lockin_mod_freq_get",
            &RequestBody::new().i32(modulator),
            Some(8),
        )?;
        Ok(codec::decode_f64(&body)?)
    }
}
