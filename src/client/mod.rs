//! Verb-level client for the controller's TCP command surface.
//!
//! [`NanonisClient`] owns the transport behind a lock and hands out
//! [`Session`] guards. A session connects on acquisition, holds the lock
//! (serializing all callers onto the strictly request/response socket), and
//! disconnects on drop. Every protocol verb is a `Session` method, so a
//! one-verb bracket is a one-verb session and batching several verbs in one
//! connection is just a longer-lived session.

use log::debug;
use parking_lot::{Mutex, MutexGuard};

use crate::config::NanonisConfig;
use crate::error::{ClientError, ConfigError};
use crate::protocol::codec;
use crate::protocol::registry::CommandRegistry;
use crate::protocol::transport::Transport;

pub mod auto_approach;
pub mod bias;
pub mod folme;
pub mod interface;
pub mod lockin;
pub mod motor;
pub mod scan;
pub mod signals;
pub mod tip_shaper;
pub mod util;
pub mod z_ctrl;

pub use interface::SpmControl;

/// Client handle for one controller.
///
/// Construction validates the configuration and resolves the endpoint but
/// opens no connection; the first [`NanonisClient::session`] call does.
///
/// # Examples
/// ```no_run
/// use stm_bridge::{NanonisClient, NanonisConfig};
///
/// let config = NanonisConfig::load(None)?;
/// let client = NanonisClient::new(&config)?;
///
/// let mut session = client.session()?;
/// session.set_bias(1.5)?;
/// println!("bias is now {} V", session.get_bias()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct NanonisClient {
    transport: Mutex<Transport>,
    registry: CommandRegistry,
    version: u32,
    bias_limit_v: f32,
}

impl NanonisClient {
    /// Build a client from a resolved configuration.
    pub fn new(config: &NanonisConfig) -> Result<Self, ConfigError> {
        let addr = config.socket_addr()?;
        Ok(Self {
            transport: Mutex::new(Transport::new(addr, config.transport.clone())),
            registry: CommandRegistry::new(),
            version: config.protocol_version,
            bias_limit_v: config.bias_limit_v,
        })
    }

    /// Controller software version this client decodes errors for.
    pub fn protocol_version(&self) -> u32 {
        self.version
    }

    /// Open a connected session.
    ///
    /// Blocks until any other session on this client has been dropped, then
    /// connects. The returned guard disconnects when dropped.
    pub fn session(&self) -> Result<Session<'_>, ClientError> {
        let mut transport = self.transport.lock();
        transport.connect()?;
        Ok(Session {
            transport,
            registry: &self.registry,
            version: self.version,
            bias_limit_v: self.bias_limit_v,
        })
    }

    /// Run a closure inside one connect/disconnect bracket.
    pub fn with_session<T>(
        &self,
        op: impl FnOnce(&mut Session<'_>) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let mut session = self.session()?;
        op(&mut session)
    }
}

/// One connected conversation with the controller.
///
/// Holds the client's transport lock for its lifetime; dropping the session
/// closes the connection.
pub struct Session<'c> {
    transport: MutexGuard<'c, Transport>,
    registry: &'c CommandRegistry,
    version: u32,
    bias_limit_v: f32,
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.transport.disconnect();
    }
}

impl Session<'_> {
    pub(crate) fn bias_limit_v(&self) -> f32 {
        self.bias_limit_v
    }

    pub(crate) fn protocol_version(&self) -> u32 {
        self.version
    }

    /// One request/response exchange. `error_index` is the offset of the
    /// error block in the response body, or `None` for responses whose
    /// error block position depends on variable-length fields (those verbs
    /// run the check themselves after decoding).
    pub(crate) fn round_trip(
        &mut self,
        command: &str,
        body: &RequestBody,
        error_index: Option<usize>,
    ) -> Result<Vec<u8>, ClientError> {
        let spec = *self.registry.lookup(command)?;
        let frame = self.registry.frame(command, body.as_bytes(), true)?;
        debug!("-> {} ({} wire bytes)", spec.wire, frame.len());
        self.transport.send(&frame)?;
        let response = self
            .transport
            .recv_response(spec.wire, error_index, self.version)?;
        debug!("<- {} ({} byte body)", spec.wire, response.len());
        Ok(response)
    }

    /// Like [`Session::round_trip`] but with the long-motion read deadline,
    /// for commands whose response waits on physical movement.
    pub(crate) fn round_trip_long(
        &mut self,
        command: &str,
        body: &RequestBody,
        error_index: Option<usize>,
    ) -> Result<Vec<u8>, ClientError> {
        self.transport.use_long_timeout(true)?;
        let result = self.round_trip(command, body, error_index);
        if let Err(e) = self.transport.use_long_timeout(false) {
            // Keep the command's own outcome; a dead stream will surface on
            // the next use anyway.
            log::warn!("could not restore read timeout: {e}");
        }
        result
    }
}

/// Builds a request body as the concatenated hex images of its fields.
#[derive(Debug, Default)]
pub(crate) struct RequestBody(String);

impl RequestBody {
    pub fn new() -> Self {
        Self(String::new())
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.0.push_str(&codec::to_hex(value as i64, 2));
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.0.push_str(&codec::to_hex(value as i64, 4));
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.0.push_str(&codec::to_hex(value as i64, 4));
        self
    }

    pub fn f32(mut self, value: f32) -> Self {
        self.0.push_str(&codec::encode_f32(value));
        self
    }

    pub fn f64(mut self, value: f64) -> Self {
        self.0.push_str(&codec::encode_f64(value));
        self
    }

    /// A u32 on-off flag.
    pub fn flag(self, value: bool) -> Self {
        self.u32(u32::from(value))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::RawConfig;
    use crate::error::ProtocolError;
    use crate::protocol::{COMMAND_SIZE, HEADER_SIZE};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::JoinHandle;

    /// In-process stand-in for the controller: accepts one connection and
    /// plays through a script of expected commands and canned response
    /// bodies.
    pub(crate) struct MockRig {
        handle: Option<JoinHandle<()>>,
        pub addr: std::net::SocketAddr,
    }

    impl MockRig {
        pub fn serve(script: Vec<(&'static str, Vec<u8>)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            let handle = std::thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                for (wire, response_body) in script {
                    read_request(&mut stream, wire);
                    write_response(&mut stream, wire, &response_body);
                }
            });
            Self {
                handle: Some(handle),
                addr,
            }
        }

        pub fn client(&self, protocol_version: u32) -> NanonisClient {
            let raw = RawConfig {
                host: Some(self.addr.ip().to_string()),
                port: Some(self.addr.port()),
                protocol_version: Some(protocol_version),
                connect_timeout_ms: 2000,
                read_timeout_ms: 2000,
                write_timeout_ms: 2000,
                long_timeout_ms: 5000,
                reconnect_grace_ms: 0,
                bias_limit_v: 10.0,
                ..Default::default()
            };
            NanonisClient::new(&NanonisConfig::resolve(raw).unwrap()).unwrap()
        }

        pub fn join(mut self) {
            self.handle.take().unwrap().join().unwrap();
        }
    }

    fn read_request(stream: &mut TcpStream, expected_wire: &str) {
        let mut header = [0u8; HEADER_SIZE];
        stream.read_exact(&mut header).unwrap();
        let name = String::from_utf8_lossy(&header[..COMMAND_SIZE]);
        assert_eq!(name.trim_end_matches('\0'), expected_wire);

        let size_field = std::str::from_utf8(&header[32..36]).unwrap();
        let body_len = usize::from_str_radix(size_field, 16).unwrap();
        let mut body = vec![0u8; body_len];
        stream.read_exact(&mut body).unwrap();
    }

    fn write_response(stream: &mut TcpStream, wire: &str, body: &[u8]) {
        let mut frame = Vec::new();
        frame.extend_from_slice(wire.as_bytes());
        frame.resize(COMMAND_SIZE, 0);
        frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
        frame.extend_from_slice(&[0u8; 4]);
        frame.extend_from_slice(body);
        stream.write_all(&frame).unwrap();
    }

    /// Zero-status error block in the structured layout.
    pub(crate) fn ok_block() -> Vec<u8> {
        let mut block = Vec::new();
        block.extend_from_slice(&0i32.to_le_bytes());
        block.extend_from_slice(&0i32.to_le_bytes());
        block
    }

    pub(crate) fn fault_block(code: i32, message: &str) -> Vec<u8> {
        let mut block = Vec::new();
        block.extend_from_slice(&1i32.to_le_bytes());
        block.extend_from_slice(&code.to_le_bytes());
        block.extend_from_slice(&(message.len() as u32).to_le_bytes());
        block.extend_from_slice(message.as_bytes());
        block
    }

    #[test]
    fn get_bias_round_trips_through_the_wire() {
        let mut body = 1.25f32.to_le_bytes().to_vec();
        body.extend_from_slice(&ok_block());
        let rig = MockRig::serve(vec![("Bias.Get", body)]);
        let client = rig.client(15000);

        let bias = client.with_session(|s| s.get_bias()).unwrap();
        assert_eq!(bias, 1.25);
        rig.join();
    }

    #[test]
    fn legacy_versions_use_the_trailing_message_layout() {
        // Body: f32 value, u16 status 0. Nothing follows a clean status.
        let mut body = 0.5f32.to_le_bytes().to_vec();
        body.extend_from_slice(&0u16.to_le_bytes());
        let rig = MockRig::serve(vec![("Bias.Get", body)]);
        let client = rig.client(13520);

        assert_eq!(client.with_session(|s| s.get_bias()).unwrap(), 0.5);
        rig.join();
    }

    #[test]
    fn device_faults_surface_as_typed_errors() {
        let mut body = 0f32.to_le_bytes().to_vec();
        body.extend_from_slice(&fault_block(-32002, "Z controller not running"));
        let rig = MockRig::serve(vec![("Bias.Get", body)]);
        let client = rig.client(15000);

        let err = client.with_session(|s| s.get_bias()).unwrap_err();
        assert!(err.is_device_error());
        match err {
            ClientError::Protocol(ProtocolError::Device { code, message }) => {
                assert_eq!(code, Some(-32002));
                assert_eq!(message, "Z controller not running");
            }
            other => panic!("expected Device, got {other:?}"),
        }
        rig.join();
    }

    #[test]
    fn bias_limit_is_enforced_before_any_frame_is_sent() {
        // The script expects zero exchanges: a rejected set_bias must not
        // reach the wire.
        let rig = MockRig::serve(vec![]);
        let client = rig.client(15000);

        let err = client.with_session(|s| s.set_bias(15.0)).unwrap_err();
        assert!(matches!(err, ClientError::LimitExceeded { .. }));
        rig.join();
    }

    #[test]
    fn one_session_batches_multiple_verbs_on_one_connection() {
        let mut get_body = 5.0f32.to_le_bytes().to_vec();
        get_body.extend_from_slice(&ok_block());
        // A single accepted connection serves both exchanges.
        let rig = MockRig::serve(vec![("Bias.Set", ok_block()), ("Bias.Get", get_body)]);
        let client = rig.client(15000);

        let mut session = client.session().unwrap();
        session.set_bias(5.0).unwrap();
        assert_eq!(session.get_bias().unwrap(), 5.0);
        drop(session);
        rig.join();
    }

    #[test]
    fn request_body_is_the_concatenated_hex_images() {
        let body = RequestBody::new().u16(3).f32(1.0).flag(true);
        assert_eq!(body.as_bytes(), b"00033f80000000000001");
    }
}
