use thiserror::Error;

/// Failures raised while loading or validating rig configuration.
///
/// These are fatal at construction time: a client is never built from a
/// half-valid configuration, and nothing here is retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required configuration field `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),
}

/// Protocol-level failures: framing desync, registry misuse and faults
/// reported by the controller itself.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The byte stream no longer lines up with frame boundaries. The only
    /// safe recovery is to close the connection and reconnect.
    #[error("framing error: {0}")]
    Framing(String),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("command name `{name}` is {len} bytes, exceeding the 32-byte name field")]
    NameTooLong { name: String, len: usize },
    #[error("command `{command}` declares a {declared}-byte body, got {actual}")]
    BodySize {
        command: String,
        declared: usize,
        actual: usize,
    },
    /// The device reported a fault (out-of-range setpoint, mechanical
    /// limit, module not running). The numeric code is only present on
    /// controllers speaking the structured error layout.
    #[error("device error (code {code:?}): {message}")]
    Device { code: Option<i32>, message: String },
}

/// Union of everything a command verb can fail with.
///
/// Transport failures (`Io`, `Timeout`) are recoverable and may be retried
/// by the caller for idempotent reads; device errors must be surfaced to the
/// operator and never blindly retried.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("I/O error while {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },
    #[error("connection timeout")]
    Timeout,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("{what} {value} exceeds the configured limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        value: f64,
        limit: f64,
    },
    #[error("unknown motor direction `{0}`")]
    UnknownDirection(String),
}

impl ClientError {
    pub(crate) fn io(source: std::io::Error, context: impl Into<String>) -> Self {
        ClientError::Io {
            source,
            context: context.into(),
        }
    }

    /// True when the failure came from the device itself rather than the
    /// link to it. Device errors are final; retrying does not help.
    pub fn is_device_error(&self) -> bool {
        matches!(self, ClientError::Protocol(ProtocolError::Device { .. }))
    }

    /// True when the failure was on the transport path (socket, timeout).
    /// Callers may reconnect and retry idempotent reads on these.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, ClientError::Io { .. } | ClientError::Timeout)
    }
}
