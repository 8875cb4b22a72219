//! Testing utilities: in-memory loaders, sinks and collecting handlers.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

use tine_core::{
    BoxError, ConfigTree, DebugHandler, ErrorHandler, Loader, Severity, Value,
};

use crate::output::Sink;

/// A loader backed by in-memory config values and template strings.
///
/// Templates substitute `{name}` markers from the top level of the
/// variable bag.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    configs: BTreeMap<String, Value>,
    templates: BTreeMap<String, String>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named config value.
    pub fn with_config(mut self, name: &str, config: Value) -> Self {
        self.configs.insert(name.to_string(), config);
        self
    }

    /// Adds a template under the path passed.
    pub fn with_template(mut self, path: &str, text: &str) -> Self {
        self.templates.insert(path.to_string(), text.to_string());
        self
    }
}

impl Loader for MemoryLoader {
    fn load_config(&self, name: &str) -> Option<ConfigTree> {
        self.configs.get(name).map(ConfigTree::from_value)
    }

    fn is_template(&self, path: &str) -> bool {
        self.templates.contains_key(path)
    }

    fn render_template(&self, path: &str, vars: &Value) -> Result<String, BoxError> {
        let template = self
            .templates
            .get(path)
            .ok_or_else(|| format!("no template at {path}"))?;

        let mut rendered = template.clone();
        if let Value::Object(map) = vars {
            for (name, value) in map {
                let text = match value {
                    Value::String(text) => text.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                rendered = rendered.replace(&format!("{{{name}}}"), &text);
            }
        }
        Ok(rendered)
    }
}

/// A clonable in-memory byte sink for capturing output.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the buffer as an output sink.
    pub fn sink(&self) -> Sink {
        Rc::new(RefCell::new(Box::new(self.clone())))
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// An error handler that collects everything it receives.
#[derive(Clone, Default)]
pub struct CollectingErrorHandler {
    seen: Rc<RefCell<Vec<(Severity, String)>>>,
}

impl CollectingErrorHandler {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reports received so far.
    pub fn seen(&self) -> Vec<(Severity, String)> {
        self.seen.borrow().clone()
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn handle(&self, severity: Severity, message: &str, _file: &str, _line: u32) {
        self.seen.borrow_mut().push((severity, message.to_string()));
    }
}

/// A debug handler that collects everything it receives.
#[derive(Clone, Default)]
pub struct CollectingDebugHandler {
    seen: Rc<RefCell<Vec<String>>>,
}

impl CollectingDebugHandler {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The messages received so far.
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl DebugHandler for CollectingDebugHandler {
    fn log(&self, message: &str) {
        self.seen.borrow_mut().push(message.to_string());
    }
}
