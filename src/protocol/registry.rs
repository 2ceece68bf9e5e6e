//! Command registry and request-frame assembly.
//!
//! Every supported command is declared once here: its symbolic name, the
//! vendor wire string, and the exact request-body size the controller
//! expects. Call sites never repeat sizes; they hand the registry a finished
//! body and the registry refuses to frame it if the length is wrong.

use std::collections::HashMap;

use super::codec::to_hex;
use super::{COMMAND_SIZE, HEADER_SIZE};
use crate::error::ProtocolError;

/// One supported command.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Symbolic name used by the client verbs.
    pub name: &'static str,
    /// Vendor command string as it appears on the wire (zero-padded to 32
    /// bytes in the header).
    pub wire: &'static str,
    /// Exact request-body size in wire bytes.
    pub body_len: usize,
}

/// The full supported command surface. Body sizes are wire bytes: two hex
/// digits per logical byte of each field.
const COMMANDS: &[CommandSpec] = &[
    spec("bias_get", "Bias.Get", 0),
    spec("bias_set", "Bias.Set", 8),
    spec("bias_pulse", "Bias.Pulse", 32),
    spec("z_pos_get", "ZCtrl.ZPosGet", 0),
    spec("z_pos_set", "ZCtrl.ZPosSet", 8),
    spec("feedback_get", "ZCtrl.OnOffGet", 0),
    spec("feedback_set", "ZCtrl.OnOffSet", 8),
    spec("setpoint_get", "ZCtrl.SetpntGet", 0),
    spec("setpoint_set", "ZCtrl.SetpntSet", 8),
    spec("gains_get", "ZCtrl.GainGet", 0),
    spec("gains_set", "ZCtrl.GainSet", 24),
    spec("z_limits_get", "ZCtrl.LimitsGet", 0),
    spec("withdraw", "ZCtrl.Withdraw", 16),
    spec("xy_pos_get", "FolMe.XYPosGet", 8),
    spec("xy_pos_set", "FolMe.XYPosSet", 40),
    spec("speed_get", "FolMe.SpeedGet", 0),
    spec("speed_set", "FolMe.SpeedSet", 16),
    spec("scan_frame_get", "Scan.FrameGet", 0),
    spec("scan_frame_set", "Scan.FrameSet", 40),
    spec("scan_buffer_get", "Scan.BufferGet", 0),
    spec("scan_props_get", "Scan.PropsGet", 0),
    spec("scan_action", "Scan.Action", 12),
    spec("scan_status_get", "Scan.StatusGet", 0),
    spec("scan_wait_end", "Scan.WaitEndOfScan", 8),
    spec("scan_data_grab", "Scan.FrameDataGrab", 16),
    spec("motor_start_move", "Motor.StartMove", 28),
    spec("motor_stop_move", "Motor.StopMove", 0),
    spec("motor_freq_amp_get", "Motor.FreqAmpGet", 4),
    spec("motor_freq_amp_set", "Motor.FreqAmpSet", 20),
    spec("signals_names_get", "Signals.NamesGet", 0),
    spec("signals_in_slots_get", "Signals.InSlotsGet", 0),
    spec("signal_val_get", "Signals.ValGet", 16),
    spec("auto_approach_open", "AutoApproach.Open", 0),
    spec("auto_approach_set", "AutoApproach.OnOffSet", 4),
    spec("auto_approach_get", "AutoApproach.OnOffGet", 0),
    spec("lockin_mod_on_off_set", "LockIn.ModOnOffSet", 16),
    spec("lockin_mod_on_off_get", "LockIn.ModOnOffGet", 8),
    spec("lockin_mod_amp_set", "LockIn.ModAmpSet", 16),
    spec("lockin_mod_amp_get", "LockIn.ModAmpGet", 8),
    spec("lockin_mod_freq_set", "LockIn.ModPhasFreqSet", 24),
    spec("lockin_mod_freq_get", "LockIn.ModPhasFreqGet", 8),
    spec("tip_shaper_start", "TipShaper.Start", 16),
    spec("session_path_get", "Util.SessionPathGet", 0),
];

const fn spec(name: &'static str, wire: &'static str, body_len: usize) -> CommandSpec {
    CommandSpec {
        name,
        wire,
        body_len,
    }
}

/// Build the 40-byte frame header: 32-byte zero-padded command name, 4-byte
/// hex body size, 2-byte response-wanted flag, 2 reserved bytes.
///
/// Names longer than the name field are refused outright; truncating one
/// would send a different command than the caller asked for.
pub fn build_header(
    command: &str,
    body_size: usize,
    want_response: bool,
) -> Result<Vec<u8>, ProtocolError> {
    let name = command.as_bytes();
    if name.len() > COMMAND_SIZE {
        return Err(ProtocolError::NameTooLong {
            name: command.to_string(),
            len: name.len(),
        });
    }
    // Two hex digits per byte in the size field bound a request body to
    // 0xffff wire bytes; every registered command is far below that.
    if body_size > 0xffff {
        return Err(ProtocolError::Framing(format!(
            "request body of {body_size} bytes does not fit the size field"
        )));
    }

    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(name);
    header.resize(COMMAND_SIZE, 0);
    header.extend_from_slice(to_hex(body_size as i64, 2).as_bytes());
    header.extend_from_slice(to_hex(i64::from(want_response), 1).as_bytes());
    header.extend_from_slice(to_hex(0, 1).as_bytes());
    debug_assert_eq!(header.len(), HEADER_SIZE);
    Ok(header)
}

/// Symbolic-name lookup table, populated once at client construction.
pub struct CommandRegistry {
    specs: HashMap<&'static str, CommandSpec>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut specs = HashMap::with_capacity(COMMANDS.len());
        for command in COMMANDS {
            let previous = specs.insert(command.name, *command);
            debug_assert!(previous.is_none(), "duplicate command {}", command.name);
        }
        Self { specs }
    }

    pub fn lookup(&self, name: &str) -> Result<&CommandSpec, ProtocolError> {
        self.specs
            .get(name)
            .ok_or_else(|| ProtocolError::UnknownCommand(name.to_string()))
    }

    /// Assemble a complete request frame for `name`, cross-checking the
    /// built body against the declared size.
    pub fn frame(
        &self,
        name: &str,
        body: &[u8],
        want_response: bool,
    ) -> Result<Vec<u8>, ProtocolError> {
        let spec = self.lookup(name)?;
        if body.len() != spec.body_len {
            return Err(ProtocolError::BodySize {
                command: spec.name.to_string(),
                declared: spec.body_len,
                actual: body.len(),
            });
        }
        let mut frame = build_header(spec.wire, body.len(), want_response)?;
        frame.extend_from_slice(body);
        Ok(frame)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_exactly_forty_bytes() {
        for size in [0usize, 8, 40, 200, 0xffff] {
            let header = build_header("Bias.Set", size, true).unwrap();
            assert_eq!(header.len(), HEADER_SIZE);
            // The size field reads back as the hex image of the body size.
            let field = std::str::from_utf8(&header[32..36]).unwrap();
            assert_eq!(usize::from_str_radix(field, 16).unwrap(), size);
            assert_eq!(&header[36..38], b"01");
            assert_eq!(&header[38..40], b"00");
        }
    }

    #[test]
    fn name_field_is_zero_padded() {
        let header = build_header("Bias.Get", 0, true).unwrap();
        assert_eq!(&header[..8], b"Bias.Get");
        assert!(header[8..32].iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_name_is_refused_not_truncated() {
        let name = "X".repeat(33);
        match build_header(&name, 0, true) {
            Err(ProtocolError::NameTooLong { len, .. }) => assert_eq!(len, 33),
            other => panic!("expected NameTooLong, got {other:?}"),
        }
        // 32 bytes exactly still fits.
        assert!(build_header(&"Y".repeat(32), 0, true).is_ok());
    }

    #[test]
    fn oversized_body_is_refused() {
        assert!(matches!(
            build_header("Scan.FrameSet", 0x10000, true),
            Err(ProtocolError::Framing(_))
        ));
    }

    #[test]
    fn unknown_command_fails_loudly() {
        let registry = CommandRegistry::new();
        assert!(matches!(
            registry.lookup("bias_sweep"),
            Err(ProtocolError::UnknownCommand(_))
        ));
        assert!(matches!(
            registry.frame("bias_sweep", &[], true),
            Err(ProtocolError::UnknownCommand(_))
        ));
    }

    #[test]
    fn body_size_mismatch_is_refused() {
        let registry = CommandRegistry::new();
        match registry.frame("bias_set", b"3f80", true) {
            Err(ProtocolError::BodySize {
                declared, actual, ..
            }) => {
                assert_eq!(declared, 8);
                assert_eq!(actual, 4);
            }
            other => panic!("expected BodySize, got {other:?}"),
        }
    }

    #[test]
    fn frame_is_header_plus_body() {
        let registry = CommandRegistry::new();
        let frame = registry.frame("bias_set", b"3f800000", true).unwrap();
        assert_eq!(frame.len(), HEADER_SIZE + 8);
        assert_eq!(&frame[..8], b"Bias.Set");
        assert_eq!(&frame[32..36], b"0008");
        assert_eq!(&frame[HEADER_SIZE..], b"3f800000");
    }

    #[test]
    fn registry_covers_every_declared_command() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.specs.len(), COMMANDS.len());
        for command in COMMANDS {
            assert!(command.wire.len() <= COMMAND_SIZE);
            assert_eq!(command.body_len % 2, 0, "{} body is hex pairs", command.name);
            assert!(registry.lookup(command.name).is_ok());
        }
    }
}
