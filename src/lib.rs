//! STM rig control over the Nanonis-style TCP protocol.
//!
//! The core is a synchronous protocol client: a pure wire codec, a command
//! registry, a single-socket transport, a version-aware device-error
//! interpreter, and a verb-level [`Session`] API on top. Above that,
//! [`ParameterOrchestrator`] groups related verbs per console operation and
//! handles display-unit conversion and derived state.

pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod protocol;
pub mod types;

pub use client::{NanonisClient, Session, SpmControl};
pub use config::{NanonisConfig, RawConfig};
pub use error::{ClientError, ConfigError, ProtocolError};
pub use orchestrator::{
    FrameRequest, FrameStatus, ModulatorStatus, ParameterOrchestrator, ParameterUpdate,
    ScanMetadata, TelemetryRecord, TipStatus, TipStatusView,
};
pub use protocol::{CommandRegistry, CommandSpec, DecodeCursor, Transport, TransportConfig};
pub use types::{
    AutosaveMode, GainOverride, MotorAxis, MotorDirection, MotorGroup, Position, PulseMode,
    ScanAction, ScanBuffer, ScanData, ScanDirection, ScanFrame, ScanProps, SignalSlots,
    ZControllerHold, ZGains,
};
