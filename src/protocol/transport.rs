//! Single-socket TCP transport.
//!
//! The controller serializes commands internally and speaks strict
//! request/response over one stream, so the transport owns exactly one
//! socket, never pipelines, and always reads a response to completion
//! before the next command goes out.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{COMMAND_SIZE, HEADER_SIZE, MAX_RESPONSE_SIZE, codec, status};
use crate::error::{ClientError, ProtocolError};

const READ_CHUNK: usize = 4096;
/// Bound on read iterations per response; a frame that has not completed
/// after this many chunk reads is treated as desync rather than waited on
/// forever.
const MAX_READ_COUNT: usize = 100_000;

/// Timeouts for the connection lifecycle.
///
/// `long_timeout` applies to commands that block device-side until a
/// physical motion finishes (withdraw, tip shaper, waited coarse moves);
/// those responses legitimately arrive much later than an ordinary reply.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub long_timeout: Duration,
    /// Grace period after a close before the same endpoint accepts a new
    /// connection. Empirical controller behavior; do not shorten.
    pub reconnect_grace: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            long_timeout: Duration::from_secs(60),
            reconnect_grace: Duration::from_millis(50),
        }
    }
}

/// Owns the TCP stream to the controller. Exactly one of these exists per
/// client, behind the client's lock.
pub struct Transport {
    addr: SocketAddr,
    config: TransportConfig,
    stream: Option<TcpStream>,
    closed_at: Option<Instant>,
}

impl Transport {
    pub fn new(addr: SocketAddr, config: TransportConfig) -> Self {
        Self {
            addr,
            config,
            stream: None,
            closed_at: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the stream. Reconnect-safe: a pre-existing stream is closed
    /// first, never leaked, and the post-close grace window is honored
    /// before dialing the same endpoint again.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        if self.stream.is_some() {
            self.disconnect();
        }
        if let Some(closed_at) = self.closed_at {
            let since_close = closed_at.elapsed();
            if since_close < self.config.reconnect_grace {
                std::thread::sleep(self.config.reconnect_grace - since_close);
            }
        }

        debug!("connecting to {}", self.addr);
        let stream = TcpStream::connect_timeout(&self.addr, self.config.connect_timeout)
            .map_err(|e| {
                warn!("failed to connect to {}: {e}", self.addr);
                if e.kind() == ErrorKind::TimedOut {
                    ClientError::Timeout
                } else {
                    ClientError::io(e, format!("connecting to {}", self.addr))
                }
            })?;
        stream
            .set_read_timeout(Some(self.config.read_timeout))
            .map_err(|e| ClientError::io(e, "setting read timeout"))?;
        stream
            .set_write_timeout(Some(self.config.write_timeout))
            .map_err(|e| ClientError::io(e, "setting write timeout"))?;

        self.stream = Some(stream);
        debug!("connected to {}", self.addr);
        Ok(())
    }

    /// Close the stream. Idempotent; closing an already-closed transport is
    /// a no-op and never blocks.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            self.closed_at = Some(Instant::now());
            debug!("disconnected from {}", self.addr);
        }
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, ClientError> {
        self.stream.as_mut().ok_or_else(|| {
            ClientError::io(
                std::io::Error::new(ErrorKind::NotConnected, "transport is disconnected"),
                "using transport",
            )
        })
    }

    /// Write one complete request frame.
    pub fn send(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        let stream = self.stream_mut()?;
        stream
            .write_all(frame)
            .map_err(|e| ClientError::io(e, "writing command frame"))
    }

    /// Switch the read deadline between the ordinary and the long-motion
    /// timeout.
    pub fn use_long_timeout(&mut self, long: bool) -> Result<(), ClientError> {
        let timeout = if long {
            self.config.long_timeout
        } else {
            self.config.read_timeout
        };
        self.stream_mut()?
            .set_read_timeout(Some(timeout))
            .map_err(|e| ClientError::io(e, "setting read timeout"))
    }

    /// Read one complete response frame, validate the echoed command name,
    /// run the device-error check when `error_index` is given, and return
    /// the body with the header stripped.
    pub fn recv_response(
        &mut self,
        expected_command: &str,
        error_index: Option<usize>,
        protocol_version: u32,
    ) -> Result<Vec<u8>, ClientError> {
        let stream = self.stream_mut()?;
        let frame = read_frame(stream)?;
        let body = split_frame(&frame, expected_command)?;
        status::check_error(&body, error_index, protocol_version)?;
        Ok(body)
    }
}

/// Accumulate chunks until `received == declared body length + 40`.
///
/// Partial TCP reads are the normal case, not an error: chunks are
/// concatenated until the declared length is satisfied. Overshoot means the
/// stream no longer lines up with frame boundaries and is reported as
/// desync.
pub(crate) fn read_frame(reader: &mut impl Read) -> Result<Vec<u8>, ClientError> {
    let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    for _ in 0..MAX_READ_COUNT {
        if buf.len() >= HEADER_SIZE {
            // Declared body size sits right after the echoed command name.
            let declared = codec::decode_u32(&buf[COMMAND_SIZE..COMMAND_SIZE + 4])? as usize;
            if declared > MAX_RESPONSE_SIZE {
                return Err(ProtocolError::Framing(format!(
                    "declared body size {declared} exceeds the {MAX_RESPONSE_SIZE}-byte limit"
                ))
                .into());
            }
            let total = declared + HEADER_SIZE;
            if buf.len() == total {
                return Ok(buf);
            }
            if buf.len() > total {
                return Err(ProtocolError::Framing(format!(
                    "received {} bytes for a {total}-byte frame",
                    buf.len()
                ))
                .into());
            }
        }

        let n = reader
            .read(&mut chunk)
            .map_err(|e| ClientError::io(e, "reading response"))?;
        if n == 0 {
            return Err(ProtocolError::Framing(format!(
                "connection closed mid-response after {} bytes",
                buf.len()
            ))
            .into());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Err(ProtocolError::Framing("response never reached its declared length".to_string()).into())
}

fn split_frame(frame: &[u8], expected_command: &str) -> Result<Vec<u8>, ProtocolError> {
    debug_assert!(frame.len() >= HEADER_SIZE);
    let echoed = String::from_utf8_lossy(&frame[..COMMAND_SIZE]);
    let echoed = echoed.trim_end_matches('\0');
    if echoed != expected_command {
        return Err(ProtocolError::Framing(format!(
            "response for `{echoed}` while waiting for `{expected_command}`"
        )));
    }
    Ok(frame[HEADER_SIZE..].to_vec())
}
