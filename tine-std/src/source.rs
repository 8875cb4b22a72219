//! Request sources for real entry points.

use tine_core::RequestSource;

/// A request source fed by CLI arguments.
///
/// The contract matches the front controller's: `argv[1]` is the method,
/// `argv[2]` the URL and `argv[3]` a URL-encoded variable string, e.g.
/// `tine get api/encoders.json "bar=123&baz=456"`.
#[derive(Clone, Debug, Default)]
pub struct CliSource {
    argv: Vec<String>,
}

impl CliSource {
    /// Creates the source from explicit arguments.
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Creates the source from the process arguments.
    pub fn from_env() -> Self {
        Self {
            argv: std::env::args().collect(),
        }
    }
}

impl RequestSource for CliSource {
    fn is_cli(&self) -> bool {
        true
    }

    fn argv(&self) -> &[String] {
        &self.argv
    }
}
