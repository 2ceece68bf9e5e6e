use std::time::Duration;

use ndarray::Array2;

use super::{RequestBody, Session};
use crate::error::{ClientError, ProtocolError};
use crate::protocol::{DecodeCursor, check_error};
use crate::types::{
    AutosaveMode, ScanAction, ScanBuffer, ScanData, ScanDirection, ScanFrame, ScanProps,
};

impl Session<'_> {
    /// Get the scan frame geometry.
    pub fn get_scan_frame(&mut self) -> Result<ScanFrame, ClientError> {
        let body = self.round_trip("scan_frame_get", &RequestBody::new(), Some(20))?;
        let mut cursor = DecodeCursor::new(&body);
        Ok(ScanFrame {
            center_x_m: cursor.f32()?,
            center_y_m: cursor.f32()?,
            width_m: cursor.f32()?,
            height_m: cursor.f32()?,
            angle_deg: cursor.f32()?,
        })
    }

    /// Set the scan frame geometry.
    pub fn set_scan_frame(&mut self, frame: ScanFrame) -> Result<(), ClientError> {
        let body = RequestBody::new()
            .f32(frame.center_x_m)
            .f32(frame.center_y_m)
            .f32(frame.width_m)
            .f32(frame.height_m)
            .f32(frame.angle_deg);
        self.round_trip("scan_frame_set", &body, Some(0))?;
        Ok(())
    }

    /// Get the scan buffer configuration: recorded channels and resolution.
    pub fn get_scan_buffer(&mut self) -> Result<ScanBuffer, ClientError> {
        let body = self.round_trip("scan_buffer_get", &RequestBody::new(), None)?;
        let (buffer, end) = decode_scan_buffer(&body)?;
        check_error(&body, Some(end), self.protocol_version())?;
        Ok(buffer)
    }

    /// Get the scan module properties (autosave, series name, comment).
    pub fn get_scan_props(&mut self) -> Result<ScanProps, ClientError> {
        let body = self.round_trip("scan_props_get", &RequestBody::new(), None)?;
        let (props, end) = decode_scan_props(&body)?;
        check_error(&body, Some(end), self.protocol_version())?;
        Ok(props)
    }

    /// Issue a scan control action.
    ///
    /// All four lifecycle transitions share one wire command; only the
    /// 2-byte action code and the direction flag differ.
    pub fn scan_action(
        &mut self,
        action: ScanAction,
        direction: ScanDirection,
    ) -> Result<(), ClientError> {
        let body = RequestBody::new()
            .u16(action.into())
            .u32(direction.into());
        self.round_trip("scan_action", &body, Some(0))?;
        Ok(())
    }

    /// Start a scan in the given slow-axis direction.
    pub fn start_scan(&mut self, direction: ScanDirection) -> Result<(), ClientError> {
        self.scan_action(ScanAction::Start, direction)
    }

    pub fn stop_scan(&mut self) -> Result<(), ClientError> {
        self.scan_action(ScanAction::Stop, ScanDirection::Up)
    }

    pub fn pause_scan(&mut self) -> Result<(), ClientError> {
        self.scan_action(ScanAction::Pause, ScanDirection::Up)
    }

    pub fn resume_scan(&mut self) -> Result<(), ClientError> {
        self.scan_action(ScanAction::Resume, ScanDirection::Up)
    }

    /// True while a scan is running.
    pub fn scan_status(&mut self) -> Result<bool, ClientError> {
        let body = self.round_trip("scan_status_get", &RequestBody::new(), Some(4))?;
        let mut cursor = DecodeCursor::new(&body);
        cursor.flag().map_err(Into::into)
    }

    /// Wait for the end of the current scan.
    ///
    /// Returns `(timed_out, autosave_path)`; the path is empty when
    /// autosave is off. `None` waits indefinitely.
    pub fn wait_end_of_scan(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<(bool, String), ClientError> {
        let timeout_ms = timeout.map_or(-1, |t| t.as_millis() as i32);
        let body = self.round_trip_long("scan_wait_end", &RequestBody::new().i32(timeout_ms), None)?;
        let mut cursor = DecodeCursor::new(&body);
        let timed_out = cursor.flag()?;
        let path = cursor.length_prefixed_string()?;
        check_error(&body, Some(cursor.position()), self.protocol_version())?;
        Ok((timed_out, path))
    }

    /// Grab the scan image for one recorded channel.
    ///
    /// `backward` selects the backward-sweep image instead of the forward
    /// one. The channel must be among the recorded channels of the scan
    /// buffer; anything else is refused by the device.
    pub fn get_scan_data(
        &mut self,
        channel_index: u32,
        backward: bool,
    ) -> Result<ScanData, ClientError> {
        let request = RequestBody::new()
            .u32(channel_index)
            .u32(u32::from(!backward));
        let body = self.round_trip("scan_data_grab", &request, None)?;
        decode_scan_data(&body, self.protocol_version())
    }
}

fn decode_scan_buffer(body: &[u8]) -> Result<(ScanBuffer, usize), ProtocolError> {
    let mut cursor = DecodeCursor::new(body);
    let channel_count = cursor.i32()?;
    let channel_count = usize::try_from(channel_count)
        .map_err(|_| ProtocolError::Framing(format!("negative channel count {channel_count}")))?;
    let channels = cursor.i32_array(channel_count)?;
    let pixels = cursor.i32()?;
    let lines = cursor.i32()?;
    Ok((
        ScanBuffer {
            channels,
            pixels,
            lines,
        },
        cursor.position(),
    ))
}

fn decode_scan_props(body: &[u8]) -> Result<(ScanProps, usize), ProtocolError> {
    let mut cursor = DecodeCursor::new(body);
    let continuous = cursor.flag()?;
    let bouncy = cursor.flag()?;
    let autosave = cursor.u32()?;
    let series_name = cursor.length_prefixed_string()?;
    let comment = cursor.length_prefixed_string()?;
    let autosave = AutosaveMode::try_from(autosave)?;
    Ok((
        ScanProps {
            continuous,
            bouncy,
            autosave,
            series_name,
            comment,
        },
        cursor.position(),
    ))
}

/// Decode a frame-data response: channel name, row/column counts, the
/// row-major pixel matrix, and the trailing slow-axis direction flag. Every
/// offset after the name depends on the name's length, so this is a single
/// cursor pass, with the error block checked at wherever the cursor ends up.
fn decode_scan_data(body: &[u8], protocol_version: u32) -> Result<ScanData, ClientError> {
    let mut cursor = DecodeCursor::new(body);
    let channel = cursor.length_prefixed_string()?;
    let rows = cursor.i32()?;
    let cols = cursor.i32()?;
    let (rows, cols) = (
        usize::try_from(rows)
            .map_err(|_| ProtocolError::Framing(format!("negative row count {rows}")))?,
        usize::try_from(cols)
            .map_err(|_| ProtocolError::Framing(format!("negative column count {cols}")))?,
    );
    let flat = cursor.f32_array(rows * cols)?;
    let direction = if cursor.flag()? {
        ScanDirection::Up
    } else {
        ScanDirection::Down
    };
    check_error(body, Some(cursor.position()), protocol_version)?;

    let data = Array2::from_shape_vec((rows, cols), flat)
        .map_err(|e| ProtocolError::Framing(format!("scan data shape: {e}")))?;
    Ok(ScanData {
        channel,
        data,
        direction,
    })
}
