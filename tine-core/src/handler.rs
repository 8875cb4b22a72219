//! Capability traits for the handler families.
//!
//! Each dispatcher-based subsystem declares one capability trait here and
//! forwards calls to every active handler implementing it. Registering a
//! handler with the wrong capability is a type error, not a runtime
//! check.

use crate::Value;
use crate::encoder::EncodeArgs;
use crate::error::BoxError;
use crate::errors::Severity;

/// A handler for reported errors (logging, display, alerting).
pub trait ErrorHandler {
    /// Receives one reported error.
    fn handle(&self, severity: Severity, message: &str, file: &str, line: u32);
}

/// A handler for debugging output.
pub trait DebugHandler {
    /// Receives one debug message.
    fn log(&self, message: &str);
}

/// A handler that encodes a value into an output format.
pub trait EncoderHandler {
    /// Encodes the source value.
    fn encode(&self, source: &Value, args: &EncodeArgs) -> Result<String, BoxError>;

    /// The content-type header to send with the encoded data.
    fn header(&self) -> &'static str;
}

/// A handler that authenticates the current user.
pub trait AuthHandler {
    /// Authenticates the user by username and password.
    fn standard_auth(&self, username: &str, password: &str) -> bool;

    /// Authenticates the user by cookie.
    fn cookie_auth(&self) -> bool;

    /// Logs out the user.
    fn logout(&self) -> bool;

    /// Whether the user is authenticated.
    fn is_authenticated(&self) -> bool;

    /// The user's ID, if authenticated.
    fn user_id(&self) -> Option<u64>;

    /// The user's username, if authenticated.
    fn user_name(&self) -> Option<String>;
}
