use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// XY position of the tip in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Scan control actions, multiplexed over one wire command and
/// distinguished only by a 2-byte action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanAction {
    Start = 0,
    Stop = 1,
    Pause = 2,
    Resume = 3,
}

impl From<ScanAction> for u16 {
    fn from(action: ScanAction) -> Self {
        action as u16
    }
}

/// Slow-axis scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanDirection {
    Down = 0,
    Up = 1,
}

impl From<ScanDirection> for u32 {
    fn from(direction: ScanDirection) -> Self {
        direction as u32
    }
}

/// Scan-frame geometry in SI units: center offset, extent and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanFrame {
    pub center_x_m: f32,
    pub center_y_m: f32,
    pub width_m: f32,
    pub height_m: f32,
    pub angle_deg: f32,
}

/// Recorded-channel configuration of the scan buffer. Read-only here;
/// channel selection is done on the controller side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBuffer {
    pub channels: Vec<i32>,
    pub pixels: i32,
    pub lines: i32,
}

/// Autosave behavior of the scan module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutosaveMode {
    All = 0,
    Next = 1,
    Off = 2,
}

impl TryFrom<u32> for AutosaveMode {
    type Error = crate::error::ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AutosaveMode::All),
            1 => Ok(AutosaveMode::Next),
            2 => Ok(AutosaveMode::Off),
            _ => Err(crate::error::ProtocolError::Framing(format!(
                "invalid autosave mode {value}"
            ))),
        }
    }
}

/// Scan module properties relevant to the console's metadata display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProps {
    pub continuous: bool,
    pub bouncy: bool,
    pub autosave: AutosaveMode,
    pub series_name: String,
    pub comment: String,
}

/// One grabbed scan image: channel name, row-major pixel matrix, and the
/// slow-axis direction the frame was acquired in.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanData {
    pub channel: String,
    pub data: Array2<f32>,
    pub direction: ScanDirection,
}

/// Z-controller loop gains as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZGains {
    pub p_gain: f32,
    pub time_const: f32,
    pub i_gain: f32,
}

/// Partial gain update; unset fields keep their current device values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GainOverride {
    pub p_gain: Option<f32>,
    pub time_const: Option<f32>,
    pub i_gain: Option<f32>,
}

impl GainOverride {
    pub fn apply_to(self, current: ZGains) -> ZGains {
        ZGains {
            p_gain: self.p_gain.unwrap_or(current.p_gain),
            time_const: self.time_const.unwrap_or(current.time_const),
            i_gain: self.i_gain.unwrap_or(current.i_gain),
        }
    }
}

/// Signal slot assignment: display names and the signal indices behind
/// them, in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSlots {
    pub names: Vec<String>,
    pub indices: Vec<i32>,
}

/// Coarse-motor step directions and their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorDirection {
    XPlus = 0,
    XMinus = 1,
    YPlus = 2,
    YMinus = 3,
    ZPlus = 4,
    ZMinus = 5,
}

impl From<MotorDirection> for u32 {
    fn from(direction: MotorDirection) -> Self {
        direction as u32
    }
}

impl MotorDirection {
    /// Resolve a natural-language direction alias onto a wire code.
    ///
    /// The alias table is exhaustive and closed: anything outside it is
    /// rejected with a typed error rather than defaulting. A typo in a
    /// direction must never step the motor somewhere unintended.
    pub fn from_alias(alias: &str) -> Result<Self, ClientError> {
        let token = alias.trim().to_ascii_lowercase();
        match token.as_str() {
            "x+" | "+x" | "e" | "east" | "right" => Ok(MotorDirection::XPlus),
            "x-" | "-x" | "w" | "west" | "left" => Ok(MotorDirection::XMinus),
            "y+" | "+y" | "n" | "north" | "up" | "away" | "forward" => Ok(MotorDirection::YPlus),
            "y-" | "-y" | "s" | "south" | "down" | "toward" | "towards" | "back" => {
                Ok(MotorDirection::YMinus)
            }
            "z+" | "+z" | "retract" | "raise" | "out" => Ok(MotorDirection::ZPlus),
            "z-" | "-z" | "approach" | "lower" | "in" => Ok(MotorDirection::ZMinus),
            _ => Err(ClientError::UnknownDirection(alias.to_string())),
        }
    }
}

impl std::str::FromStr for MotorDirection {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MotorDirection::from_alias(s)
    }
}

/// Motor group selection for rigs with more than one positioner stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorGroup {
    Group1 = 0,
    Group2 = 1,
    Group3 = 2,
    Group4 = 3,
    Group5 = 4,
    Group6 = 5,
}

impl Default for MotorGroup {
    fn default() -> Self {
        MotorGroup::Group1
    }
}

impl From<MotorGroup> for u32 {
    fn from(group: MotorGroup) -> Self {
        group as u32
    }
}

/// Axis selector for motor frequency/amplitude settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorAxis {
    X = 0,
    Y = 1,
    Z = 2,
    All = 3,
}

impl From<MotorAxis> for u16 {
    fn from(axis: MotorAxis) -> Self {
        axis as u16
    }
}

/// How a pulse voltage is interpreted relative to the current bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseMode {
    Keep = 0,
    Relative = 1,
    Absolute = 2,
}

impl From<PulseMode> for u16 {
    fn from(mode: PulseMode) -> Self {
        mode as u16
    }
}

/// Z-controller behavior during a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZControllerHold {
    NoChange = 0,
    Hold = 1,
    Release = 2,
}

impl From<ZControllerHold> for u16 {
    fn from(hold: ZControllerHold) -> Self {
        hold as u16
    }
}
