use std::time::Duration;

use super::Session;
use crate::error::ClientError;
use crate::types::{GainOverride, Position, ScanBuffer, ScanFrame, ScanProps, ZGains};

/// The control surface the parameter orchestration layer works against.
///
/// Universal SPM concepts only; nothing about wire framing leaks through
/// this seam. Having the seam as a trait keeps the orchestration logic
/// testable against a mock rig, with [`Session`] as the one production
/// implementation.
pub trait SpmControl {
    fn get_bias(&mut self) -> Result<f32, ClientError>;
    fn set_bias(&mut self, voltage_v: f32) -> Result<(), ClientError>;

    fn get_z(&mut self) -> Result<f32, ClientError>;
    /// Z soft limits as `(high, low)` in meters.
    fn get_z_limits(&mut self) -> Result<(f32, f32), ClientError>;
    fn get_feedback(&mut self) -> Result<bool, ClientError>;
    fn set_feedback(&mut self, on: bool) -> Result<(), ClientError>;
    fn get_setpoint(&mut self) -> Result<f32, ClientError>;
    fn set_setpoint(&mut self, setpoint_a: f32) -> Result<(), ClientError>;
    fn get_gains(&mut self) -> Result<ZGains, ClientError>;
    fn set_gains(&mut self, update: GainOverride) -> Result<ZGains, ClientError>;
    fn withdraw(&mut self, wait: bool, timeout: Option<Duration>) -> Result<(), ClientError>;

    fn get_xy(&mut self, wait: bool) -> Result<Position, ClientError>;

    fn get_scan_frame(&mut self) -> Result<ScanFrame, ClientError>;
    fn set_scan_frame(&mut self, frame: ScanFrame) -> Result<(), ClientError>;
    fn get_scan_buffer(&mut self) -> Result<ScanBuffer, ClientError>;
    fn get_scan_props(&mut self) -> Result<ScanProps, ClientError>;

    fn get_lockin_enabled(&mut self, modulator: i32) -> Result<bool, ClientError>;
    fn set_lockin_enabled(&mut self, modulator: i32, on: bool) -> Result<(), ClientError>;
    fn get_lockin_amplitude(&mut self, modulator: i32) -> Result<f32, ClientError>;
    fn set_lockin_amplitude(&mut self, modulator: i32, amplitude_v: f32)
    -> Result<(), ClientError>;
    fn get_lockin_frequency(&mut self, modulator: i32) -> Result<f64, ClientError>;
    fn set_lockin_frequency(
        &mut self,
        modulator: i32,
        frequency_hz: f64,
    ) -> Result<(), ClientError>;

    fn auto_approach_open(&mut self) -> Result<(), ClientError>;
    fn auto_approach(&mut self, on: bool) -> Result<(), ClientError>;
    fn auto_approach_status(&mut self) -> Result<bool, ClientError>;
}

impl SpmControl for Session<'_> {
    fn get_bias(&mut self) -> Result<f32, ClientError> {
        self.get_bias()
    }

    fn set_bias(&mut self, voltage_v: f32) -> Result<(), ClientError> {
        self.set_bias(voltage_v)
    }

    fn get_z(&mut self) -> Result<f32, ClientError> {
        self.get_z()
    }

    fn get_z_limits(&mut self) -> Result<(f32, f32), ClientError> {
        self.get_z_limits()
    }

    fn get_feedback(&mut self) -> Result<bool, ClientError> {
        self.get_feedback()
    }

    fn set_feedback(&mut self, on: bool) -> Result<(), ClientError> {
        self.set_feedback(on)
    }

    fn get_setpoint(&mut self) -> Result<f32, ClientError> {
        self.get_setpoint()
    }

    fn set_setpoint(&mut self, setpoint_a: f32) -> Result<(), ClientError> {
        self.set_setpoint(setpoint_a)
    }

    fn get_gains(&mut self) -> Result<ZGains, ClientError> {
        self.get_gains()
    }

    fn set_gains(&mut self, update: GainOverride) -> Result<ZGains, ClientError> {
        self.set_gains(update)
    }

    fn withdraw(&mut self, wait: bool, timeout: Option<Duration>) -> Result<(), ClientError> {
        self.withdraw(wait, timeout)
    }

    fn get_xy(&mut self, wait: bool) -> Result<Position, ClientError> {
        self.get_xy(wait)
    }

    fn get_scan_frame(&mut self) -> Result<ScanFrame, ClientError> {
        self.get_scan_frame()
    }

    fn set_scan_frame(&mut self, frame: ScanFrame) -> Result<(), ClientError> {
        self.set_scan_frame(frame)
    }

    fn get_scan_buffer(&mut self) -> Result<ScanBuffer, ClientError> {
        self.get_scan_buffer()
    }

    fn get_scan_props(&mut self) -> Result<ScanProps, ClientError> {
        self.get_scan_props()
    }

    fn get_lockin_enabled(&mut self, modulator: i32) -> Result<bool, ClientError> {
        self.get_lockin_enabled(modulator)
    }

    fn set_lockin_enabled(&mut self, modulator: i32, on: bool) -> Result<(), ClientError> {
        self.set_lockin_enabled(modulator, on)
    }

    fn get_lockin_amplitude(&mut self, modulator: i32) -> Result<f32, ClientError> {
        self.get_lockin_amplitude(modulator)
    }

    fn set_lockin_amplitude(
        &mut self,
        modulator: i32,
        amplitude_v: f32,
    ) -> Result<(), ClientError> {
        self.set_lockin_amplitude(modulator, amplitude_v)
    }

    fn get_lockin_frequency(&mut self, modulator: i32) -> Result<f64, ClientError> {
        self.get_lockin_frequency(modulator)
    }

    fn set_lockin_frequency(
        &mut self,
        modulator: i32,
        frequency_hz: f64,
    ) -> Result<(), ClientError> {
        self.set_lockin_frequency(modulator, frequency_hz)
    }

    fn auto_approach_open(&mut self) -> Result<(), ClientError> {
        self.auto_approach_open()
    }

    fn auto_approach(&mut self, on: bool) -> Result<(), ClientError> {
        self.auto_approach(on)
    }

    fn auto_approach_status(&mut self) -> Result<bool, ClientError> {
        self.auto_approach_status()
    }
}
