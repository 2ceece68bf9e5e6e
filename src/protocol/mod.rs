//! Wire-level plumbing for the Nanonis TCP protocol: pure codec, command
//! registry and header building, the single-socket transport, and the
//! version-bifurcated device-error interpreter.

pub mod codec;
pub mod cursor;
pub mod registry;
pub mod status;
pub mod transport;

/// Width of the zero-padded command-name field.
pub const COMMAND_SIZE: usize = 32;
/// Total header size of every request and response frame.
pub const HEADER_SIZE: usize = 40;
/// Upper bound on a declared response body; anything larger is a desync.
pub const MAX_RESPONSE_SIZE: usize = 100 * 1024 * 1024;

pub use cursor::DecodeCursor;
pub use registry::{CommandRegistry, CommandSpec, build_header};
pub use status::check_error;
pub use transport::{Transport, TransportConfig};
