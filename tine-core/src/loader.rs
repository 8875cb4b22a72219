//! The loader seam.
//!
//! Config data and templates come from outside the framework. The
//! [`Loader`] trait is the interface the bootstrap, the output buffer
//! and the fatal-error path consume; how names resolve to files (or
//! anything else) is the implementor's business.

use crate::Value;
use crate::config::ConfigTree;
use crate::error::BoxError;

/// Resolves named config data and templates.
pub trait Loader {
    /// Loads a named config tree, if one exists.
    fn load_config(&self, name: &str) -> Option<ConfigTree>;

    /// Returns true if a template exists under the path.
    fn is_template(&self, path: &str) -> bool;

    /// Renders the template with the variable bag passed.
    fn render_template(&self, path: &str, vars: &Value) -> Result<String, BoxError>;
}
