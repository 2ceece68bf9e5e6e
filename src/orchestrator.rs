//! Parameter orchestration above the command client.
//!
//! Groups related verbs into one connection bracket per logical operation,
//! applies the display-unit conversions (m to nm, A to pA) that are kept out
//! of the protocol layer, derives console state (aspect ratio, withdrawn
//! inference), and publishes timestamped telemetry updates to the console.
//!
//! Failure policy: routine polls degrade to an unknown display state and log
//! the original error; commanded actions abort at the first failed step and
//! propagate it. Transport failures on read-only refreshes are retried once
//! over a fresh connection; device errors never are.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::warn;
use serde::Serialize;

use crate::client::{NanonisClient, Session, SpmControl};
use crate::error::ClientError;
use crate::types::{Position, ScanFrame};

/// How close to the upper Z limit the tip must sit, in meters, to count as
/// withdrawn while feedback is off.
pub const WITHDRAWN_EPSILON_M: f64 = 1e-11;

/// Settle time after opening the auto-approach module before it accepts
/// on/off commands.
const MODULE_STARTUP_DELAY: Duration = Duration::from_millis(500);

pub fn m_to_nm(meters: f64) -> f64 {
    meters * 1e9
}

pub fn nm_to_m(nanometers: f64) -> f64 {
    nanometers * 1e-9
}

pub fn a_to_pa(amps: f64) -> f64 {
    amps * 1e12
}

pub fn pa_to_a(picoamps: f64) -> f64 {
    picoamps * 1e-12
}

/// Tip state as shown on the console, in display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TipStatus {
    pub x_nm: f64,
    pub y_nm: f64,
    pub z_nm: f64,
    pub z_limit_low_nm: f64,
    pub z_limit_high_nm: f64,
    pub feedback: bool,
    /// Derived: feedback off and the tip parked at the upper Z limit.
    pub withdrawn: bool,
}

/// Scan-frame geometry in display units, with the derived aspect ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameStatus {
    pub x_nm: f64,
    pub y_nm: f64,
    pub width_nm: f64,
    pub height_nm: f64,
    pub angle_deg: f32,
    /// Width over height; absent for a degenerate zero-height frame.
    pub aspect_ratio: Option<f64>,
}

/// Requested scan-frame geometry, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRequest {
    pub x_nm: f64,
    pub y_nm: f64,
    pub width_nm: f64,
    pub height_nm: f64,
    pub angle_deg: f32,
}

/// Combined scan buffer and module properties for the metadata display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanMetadata {
    pub channels: Vec<i32>,
    pub pixels: i32,
    pub lines: i32,
    pub continuous: bool,
    pub bouncy: bool,
    pub series_name: String,
    pub comment: String,
}

/// State of one lock-in modulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModulatorStatus {
    pub modulator: i32,
    pub enabled: bool,
    pub amplitude_v: f32,
    pub frequency_hz: f64,
}

/// Closed set of telemetry payloads pushed toward the console. Adding a
/// variant forces every consumer match to be revisited; nothing is dropped
/// on the floor by an unknown tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterUpdate {
    Frame(FrameStatus),
    TipStatus(TipStatus),
    ScanMetadata(ScanMetadata),
    Modulators(ModulatorStatus),
}

/// One telemetry record as shipped to the console.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub update: ParameterUpdate,
}

/// Tip state for display: a routine poll that fails over the transport
/// degrades to `Unknown` instead of interrupting the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum TipStatusView {
    Known(TipStatus),
    Unknown,
}

/// Orchestrates grouped get/set operations over one shared command client.
pub struct ParameterOrchestrator {
    client: Arc<NanonisClient>,
    updates: Option<Sender<TelemetryRecord>>,
    last_tip_status: Option<TipStatus>,
}

impl ParameterOrchestrator {
    pub fn new(client: Arc<NanonisClient>) -> Self {
        Self {
            client,
            updates: None,
            last_tip_status: None,
        }
    }

    /// Open the telemetry channel. Replaces any previous subscription.
    pub fn subscribe(&mut self) -> Receiver<TelemetryRecord> {
        let (tx, rx) = unbounded();
        self.updates = Some(tx);
        rx
    }

    /// Most recent successfully read tip status, if any.
    pub fn last_tip_status(&self) -> Option<&TipStatus> {
        self.last_tip_status.as_ref()
    }

    pub(crate) fn publish(&self, update: ParameterUpdate) {
        if let Some(tx) = &self.updates {
            // A gone console is not an error; telemetry is best-effort.
            let _ = tx.send(TelemetryRecord {
                at: Utc::now(),
                update,
            });
        }
    }

    /// Read-only refresh with a single reconnect-and-retry on transport
    /// failure. Device errors are never retried.
    fn read_with_retry<T>(
        &self,
        op: impl Fn(&mut Session<'_>) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        match self.client.with_session(&op) {
            Err(e) if e.is_transport_error() => {
                warn!("transport failure, retrying once over a fresh connection: {e}");
                self.client.with_session(&op)
            }
            other => other,
        }
    }

    /// Refresh the tip status in one connection bracket.
    pub fn refresh_tip_status(&mut self) -> Result<TipStatus, ClientError> {
        let status = self.read_with_retry(|session| read_tip_status(session))?;
        self.last_tip_status = Some(status.clone());
        self.publish(ParameterUpdate::TipStatus(status.clone()));
        Ok(status)
    }

    /// Routine poll for the status display. Failures degrade to
    /// [`TipStatusView::Unknown`] with the original error logged; the
    /// operator sees "device offline", not an interruption.
    pub fn poll_tip_status(&mut self) -> TipStatusView {
        match self.refresh_tip_status() {
            Ok(status) => TipStatusView::Known(status),
            Err(e) => {
                warn!("tip status poll failed: {e}");
                TipStatusView::Unknown
            }
        }
    }

    /// Refresh the scan frame geometry.
    pub fn refresh_frame(&mut self) -> Result<FrameStatus, ClientError> {
        let frame = self.read_with_retry(|session| session.get_scan_frame())?;
        let status = frame_status(frame);
        self.publish(ParameterUpdate::Frame(status.clone()));
        Ok(status)
    }

    /// Reshape the scan frame and read back what the device settled on
    /// (it may coerce the requested geometry), in one connection bracket.
    pub fn update_frame(&mut self, request: FrameRequest) -> Result<FrameStatus, ClientError> {
        let mut session = self.client.session()?;
        session.set_scan_frame(ScanFrame {
            center_x_m: nm_to_m(request.x_nm) as f32,
            center_y_m: nm_to_m(request.y_nm) as f32,
            width_m: nm_to_m(request.width_nm) as f32,
            height_m: nm_to_m(request.height_nm) as f32,
            angle_deg: request.angle_deg,
        })?;
        let settled = frame_status(session.get_scan_frame()?);
        drop(session);
        self.publish(ParameterUpdate::Frame(settled.clone()));
        Ok(settled)
    }

    /// Refresh buffer configuration and scan properties together.
    pub fn refresh_scan_metadata(&mut self) -> Result<ScanMetadata, ClientError> {
        let metadata = self.read_with_retry(|session| {
            let buffer = session.get_scan_buffer()?;
            let props = session.get_scan_props()?;
            Ok(ScanMetadata {
                channels: buffer.channels,
                pixels: buffer.pixels,
                lines: buffer.lines,
                continuous: props.continuous,
                bouncy: props.bouncy,
                series_name: props.series_name,
                comment: props.comment,
            })
        })?;
        self.publish(ParameterUpdate::ScanMetadata(metadata.clone()));
        Ok(metadata)
    }

    /// Refresh one lock-in modulator.
    pub fn refresh_modulator(&mut self, modulator: i32) -> Result<ModulatorStatus, ClientError> {
        let status = self.read_with_retry(|session| read_modulator(session, modulator))?;
        self.publish(ParameterUpdate::Modulators(status.clone()));
        Ok(status)
    }

    /// Apply any subset of modulator settings, then read back and publish
    /// the settled state, all in one connection bracket.
    pub fn update_modulator(
        &mut self,
        modulator: i32,
        enabled: Option<bool>,
        amplitude_v: Option<f32>,
        frequency_hz: Option<f64>,
    ) -> Result<ModulatorStatus, ClientError> {
        let mut session = self.client.session()?;
        if let Some(on) = enabled {
            session.set_lockin_enabled(modulator, on)?;
        }
        if let Some(amplitude) = amplitude_v {
            session.set_lockin_amplitude(modulator, amplitude)?;
        }
        if let Some(frequency) = frequency_hz {
            session.set_lockin_frequency(modulator, frequency)?;
        }
        let status = read_modulator(&mut session, modulator)?;
        drop(session);
        self.publish(ParameterUpdate::Modulators(status.clone()));
        Ok(status)
    }

    /// Current setpoint in picoamperes.
    pub fn setpoint_pa(&mut self) -> Result<f64, ClientError> {
        let setpoint = self.read_with_retry(|session| session.get_setpoint())?;
        Ok(a_to_pa(setpoint as f64))
    }

    /// Set the setpoint from a picoampere value.
    pub fn set_setpoint_pa(&mut self, setpoint_pa: f64) -> Result<(), ClientError> {
        self.client
            .with_session(|session| session.set_setpoint(pa_to_a(setpoint_pa) as f32))
    }

    /// Ramp the bias to `target_v` in `steps` equal increments, aborting at
    /// the first failed step.
    pub fn slew_bias(&mut self, target_v: f32, steps: u32) -> Result<(), ClientError> {
        let mut session = self.client.session()?;
        slew_bias_steps(&mut session, target_v, steps)
    }

    /// Withdraw the tip, then refresh and publish the resulting status.
    pub fn withdraw_tip(
        &mut self,
        wait: bool,
        timeout: Option<Duration>,
    ) -> Result<TipStatus, ClientError> {
        let mut session = self.client.session()?;
        session.withdraw(wait, timeout)?;
        let status = read_tip_status(&mut session)?;
        drop(session);
        self.last_tip_status = Some(status.clone());
        self.publish(ParameterUpdate::TipStatus(status.clone()));
        Ok(status)
    }

    /// Run the auto-approach to completion, polling the module until it
    /// reports done or `timeout` expires.
    pub fn approach_and_wait(
        &mut self,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<(), ClientError> {
        let mut session = self.client.session()?;
        run_auto_approach(&mut session, MODULE_STARTUP_DELAY, poll_interval, timeout)
    }
}

/// Read everything the tip-status display needs over one open session.
fn read_tip_status(spm: &mut impl SpmControl) -> Result<TipStatus, ClientError> {
    let position = spm.get_xy(false)?;
    let z_m = spm.get_z()?;
    let (z_high_m, z_low_m) = spm.get_z_limits()?;
    let feedback = spm.get_feedback()?;
    Ok(derive_tip_status(
        position, z_m, z_low_m, z_high_m, feedback,
    ))
}

/// Convert raw readings into display state and infer the withdrawn flag:
/// feedback off and the tip within [`WITHDRAWN_EPSILON_M`] of the upper
/// Z limit. With feedback on the tip is tracking the surface, never
/// withdrawn, regardless of where Z sits.
fn derive_tip_status(
    position: Position,
    z_m: f32,
    z_low_m: f32,
    z_high_m: f32,
    feedback: bool,
) -> TipStatus {
    let withdrawn = !feedback && (z_high_m as f64 - z_m as f64).abs() <= WITHDRAWN_EPSILON_M;
    TipStatus {
        x_nm: m_to_nm(position.x),
        y_nm: m_to_nm(position.y),
        z_nm: m_to_nm(z_m as f64),
        z_limit_low_nm: m_to_nm(z_low_m as f64),
        z_limit_high_nm: m_to_nm(z_high_m as f64),
        feedback,
        withdrawn,
    }
}

fn frame_status(frame: ScanFrame) -> FrameStatus {
    let width_nm = m_to_nm(frame.width_m as f64);
    let height_nm = m_to_nm(frame.height_m as f64);
    let aspect_ratio = if height_nm != 0.0 {
        Some(width_nm / height_nm)
    } else {
        None
    };
    FrameStatus {
        x_nm: m_to_nm(frame.center_x_m as f64),
        y_nm: m_to_nm(frame.center_y_m as f64),
        width_nm,
        height_nm,
        angle_deg: frame.angle_deg,
        aspect_ratio,
    }
}

fn read_modulator(
    spm: &mut impl SpmControl,
    modulator: i32,
) -> Result<ModulatorStatus, ClientError> {
    Ok(ModulatorStatus {
        modulator,
        enabled: spm.get_lockin_enabled(modulator)?,
        amplitude_v: spm.get_lockin_amplitude(modulator)?,
        frequency_hz: spm.get_lockin_frequency(modulator)?,
    })
}

fn slew_bias_steps(
    spm: &mut impl SpmControl,
    target_v: f32,
    steps: u32,
) -> Result<(), ClientError> {
    let steps = steps.max(1);
    let start_v = spm.get_bias()?;
    for step in 1..=steps {
        let value = start_v + (target_v - start_v) * (step as f32 / steps as f32);
        if let Err(e) = spm.set_bias(value) {
            // Continuing the ramp after a failed step could jump the
            // junction by the whole remaining span.
            warn!("bias slew aborted at step {step}/{steps} ({value} V): {e}");
            return Err(e);
        }
    }
    Ok(())
}

fn run_auto_approach(
    spm: &mut impl SpmControl,
    startup_delay: Duration,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(), ClientError> {
    spm.auto_approach_open()?;
    std::thread::sleep(startup_delay);
    spm.auto_approach(true)?;

    let deadline = Instant::now() + timeout;
    loop {
        if !spm.auto_approach_status()? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ClientError::Timeout);
        }
        std::thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NanonisConfig, RawConfig};
    use crate::error::ProtocolError;
    use crate::types::{GainOverride, ScanBuffer, ScanProps, ZGains};

    struct MockSpm {
        bias_v: f32,
        position: Position,
        z_m: f32,
        z_low_m: f32,
        z_high_m: f32,
        feedback: bool,
        set_bias_calls: Vec<f32>,
        fail_set_bias_at_call: Option<usize>,
        approach_busy_polls: u32,
        approach_started: bool,
    }

    impl Default for MockSpm {
        fn default() -> Self {
            Self {
                bias_v: 0.0,
                position: Position::new(0.0, 0.0),
                z_m: 0.0,
                z_low_m: -100e-9,
                z_high_m: 100e-9,
                feedback: false,
                set_bias_calls: Vec::new(),
                fail_set_bias_at_call: None,
                approach_busy_polls: 0,
                approach_started: false,
            }
        }
    }

    impl SpmControl for MockSpm {
        fn get_bias(&mut self) -> Result<f32, ClientError> {
            Ok(self.bias_v)
        }

        fn set_bias(&mut self, voltage_v: f32) -> Result<(), ClientError> {
            self.set_bias_calls.push(voltage_v);
            if self.fail_set_bias_at_call == Some(self.set_bias_calls.len()) {
                return Err(ClientError::Protocol(ProtocolError::Device {
                    code: Some(-1),
                    message: "bias module fault".to_string(),
                }));
            }
            self.bias_v = voltage_v;
            Ok(())
        }

        fn get_z(&mut self) -> Result<f32, ClientError> {
            Ok(self.z_m)
        }

        fn get_z_limits(&mut self) -> Result<(f32, f32), ClientError> {
            Ok((self.z_high_m, self.z_low_m))
        }

        fn get_feedback(&mut self) -> Result<bool, ClientError> {
            Ok(self.feedback)
        }

        fn set_feedback(&mut self, on: bool) -> Result<(), ClientError> {
            self.feedback = on;
            Ok(())
        }

        fn get_setpoint(&mut self) -> Result<f32, ClientError> {
            Ok(100e-12)
        }

        fn set_setpoint(&mut self, _setpoint_a: f32) -> Result<(), ClientError> {
            Ok(())
        }

        fn get_gains(&mut self) -> Result<ZGains, ClientError> {
            Ok(ZGains {
                p_gain: 1e-12,
                time_const: 5e-6,
                i_gain: 2e-7,
            })
        }

        fn set_gains(&mut self, update: GainOverride) -> Result<ZGains, ClientError> {
            Ok(update.apply_to(self.get_gains()?))
        }

        fn withdraw(
            &mut self,
            _wait: bool,
            _timeout: Option<Duration>,
        ) -> Result<(), ClientError> {
            self.feedback = false;
            self.z_m = self.z_high_m;
            Ok(())
        }

        fn get_xy(&mut self, _wait: bool) -> Result<Position, ClientError> {
            Ok(self.position)
        }

        fn get_scan_frame(&mut self) -> Result<ScanFrame, ClientError> {
            Ok(ScanFrame {
                center_x_m: 10e-9,
                center_y_m: -5e-9,
                width_m: 200e-9,
                height_m: 100e-9,
                angle_deg: 30.0,
            })
        }

        fn set_scan_frame(&mut self, _frame: ScanFrame) -> Result<(), ClientError> {
            Ok(())
        }

        fn get_scan_buffer(&mut self) -> Result<ScanBuffer, ClientError> {
            Ok(ScanBuffer {
                channels: vec![0, 14],
                pixels: 256,
                lines: 256,
            })
        }

        fn get_scan_props(&mut self) -> Result<ScanProps, ClientError> {
            Ok(ScanProps {
                continuous: false,
                bouncy: true,
                autosave: crate::types::AutosaveMode::All,
                series_name: "test".to_string(),
                comment: String::new(),
            })
        }

        fn get_lockin_enabled(&mut self, _modulator: i32) -> Result<bool, ClientError> {
            Ok(true)
        }

        fn set_lockin_enabled(&mut self, _modulator: i32, _on: bool) -> Result<(), ClientError> {
            Ok(())
        }

        fn get_lockin_amplitude(&mut self, _modulator: i32) -> Result<f32, ClientError> {
            Ok(0.02)
        }

        fn set_lockin_amplitude(
            &mut self,
            _modulator: i32,
            _amplitude_v: f32,
        ) -> Result<(), ClientError> {
            Ok(())
        }

        fn get_lockin_frequency(&mut self, _modulator: i32) -> Result<f64, ClientError> {
            Ok(1234.5)
        }

        fn set_lockin_frequency(
            &mut self,
            _modulator: i32,
            _frequency_hz: f64,
        ) -> Result<(), ClientError> {
            Ok(())
        }

        fn auto_approach_open(&mut self) -> Result<(), ClientError> {
            Ok(())
        }

        fn auto_approach(&mut self, on: bool) -> Result<(), ClientError> {
            self.approach_started = on;
            Ok(())
        }

        fn auto_approach_status(&mut self) -> Result<bool, ClientError> {
            if self.approach_busy_polls > 0 {
                self.approach_busy_polls -= 1;
                return Ok(true);
            }
            Ok(false)
        }
    }

    fn orchestrator() -> ParameterOrchestrator {
        let raw = RawConfig {
            host: Some("127.0.0.1".to_string()),
            port: Some(6501),
            protocol_version: Some(15000),
            connect_timeout_ms: 100,
            read_timeout_ms: 100,
            write_timeout_ms: 100,
            long_timeout_ms: 100,
            reconnect_grace_ms: 0,
            bias_limit_v: 10.0,
            ..Default::default()
        };
        let config = NanonisConfig::resolve(raw).unwrap();
        ParameterOrchestrator::new(Arc::new(NanonisClient::new(&config).unwrap()))
    }

    #[test]
    fn withdrawn_requires_feedback_off_at_the_upper_limit() {
        let mut spm = MockSpm {
            z_m: 99.99999999e-9,
            feedback: false,
            ..Default::default()
        };
        let status = read_tip_status(&mut spm).unwrap();
        assert!(status.withdrawn);

        // Feedback on means tracking the surface, never withdrawn.
        spm.feedback = true;
        assert!(!read_tip_status(&mut spm).unwrap().withdrawn);

        // Feedback off but tip well below the limit.
        spm.feedback = false;
        spm.z_m = 50e-9;
        assert!(!read_tip_status(&mut spm).unwrap().withdrawn);
    }

    #[test]
    fn tip_status_is_reported_in_nanometers() {
        let mut spm = MockSpm {
            position: Position::new(12.5e-9, -3e-9),
            z_m: 1e-9,
            ..Default::default()
        };
        let status = read_tip_status(&mut spm).unwrap();
        assert!((status.x_nm - 12.5).abs() < 1e-6);
        assert!((status.y_nm + 3.0).abs() < 1e-6);
        assert!((status.z_nm - 1.0).abs() < 1e-6);
        assert!((status.z_limit_high_nm - 100.0).abs() < 1e-6);
    }

    #[test]
    fn frame_status_derives_the_aspect_ratio() {
        let status = frame_status(ScanFrame {
            center_x_m: 10e-9,
            center_y_m: -5e-9,
            width_m: 200e-9,
            height_m: 100e-9,
            angle_deg: 30.0,
        });
        assert!((status.width_nm - 200.0).abs() < 1e-4);
        assert!((status.height_nm - 100.0).abs() < 1e-4);
        assert!((status.aspect_ratio.unwrap() - 2.0).abs() < 1e-9);

        let degenerate = frame_status(ScanFrame {
            center_x_m: 0.0,
            center_y_m: 0.0,
            width_m: 100e-9,
            height_m: 0.0,
            angle_deg: 0.0,
        });
        assert_eq!(degenerate.aspect_ratio, None);
    }

    #[test]
    fn slew_reaches_the_target_in_equal_steps() {
        let mut spm = MockSpm {
            bias_v: 1.0,
            ..Default::default()
        };
        slew_bias_steps(&mut spm, 2.0, 4).unwrap();
        assert_eq!(spm.set_bias_calls, vec![1.25, 1.5, 1.75, 2.0]);
        assert_eq!(spm.bias_v, 2.0);
    }

    #[test]
    fn slew_aborts_at_the_first_failed_step() {
        let mut spm = MockSpm {
            bias_v: 0.0,
            fail_set_bias_at_call: Some(3),
            ..Default::default()
        };
        let err = slew_bias_steps(&mut spm, 1.0, 10).unwrap_err();
        assert!(err.is_device_error());
        // Exactly three attempts: the failing step is the last one.
        assert_eq!(spm.set_bias_calls.len(), 3);
        assert_eq!(spm.bias_v, 0.2);
    }

    #[test]
    fn auto_approach_polls_until_the_module_reports_done() {
        let mut spm = MockSpm {
            approach_busy_polls: 3,
            ..Default::default()
        };
        run_auto_approach(
            &mut spm,
            Duration::ZERO,
            Duration::ZERO,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(spm.approach_started);
        assert_eq!(spm.approach_busy_polls, 0);
    }

    #[test]
    fn auto_approach_times_out_when_the_module_never_finishes() {
        let mut spm = MockSpm {
            approach_busy_polls: u32::MAX,
            ..Default::default()
        };
        let err = run_auto_approach(&mut spm, Duration::ZERO, Duration::ZERO, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
    }

    #[test]
    fn telemetry_records_are_timestamped_and_tagged() {
        let mut orchestrator = orchestrator();
        let rx = orchestrator.subscribe();

        let mut spm = MockSpm::default();
        let status = read_tip_status(&mut spm).unwrap();
        orchestrator.publish(ParameterUpdate::TipStatus(status));

        let record = rx.try_recv().unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "tip_status");
        assert!(json["at"].is_string());
        assert!(record.at <= Utc::now());
    }

    #[test]
    fn unit_conversions_are_inverses() {
        assert_eq!(m_to_nm(nm_to_m(123.0)), 123.0);
        assert_eq!(a_to_pa(pa_to_a(50.0)), 50.0);
        assert_eq!(m_to_nm(1e-9), 1.0);
        assert_eq!(a_to_pa(1e-12), 1.0);
    }
}
