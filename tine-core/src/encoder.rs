//! The encoding subsystem.
//!
//! [`Encoder`] transforms a [`Value`] into another representation (JSON,
//! XML, ...) by dispatching it to one or more [`EncoderHandler`]s. At
//! least one handler must be active for any encode to run.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::Value;
use crate::dispatcher::{Dispatcher, HandlerConfig};
use crate::error::{DispatchError, TineError};
use crate::handler::EncoderHandler;

/// Formatting options passed through to encoder handlers.
///
/// Most handlers only read a subset: the JSONP handler needs `callback`,
/// the XML handler reads the node-naming options, and the JSON handler
/// honors `pretty`.
#[derive(Clone, Default)]
pub struct EncodeArgs {
    /// The XML document's root node name; `root` when empty.
    pub root_node: Option<String>,
    /// The JSONP callback name.
    pub callback: Option<String>,
    /// Whether to pretty-print.
    pub pretty: bool,
    /// Replacement node names for numerically keyed children, by parent
    /// node name.
    pub numeric_replacements: BTreeMap<String, String>,
    /// The fallback node name for numerically keyed children; `node`
    /// when empty.
    pub numeric_prefix: Option<String>,
    /// Whether replaced numeric keys are kept as a `key` attribute.
    pub include_keys: bool,
    /// A callback that can rewrite any node name given the node and its
    /// parent's name.
    pub format_node: Option<Rc<dyn Fn(&str, &str) -> String>>,
}

impl std::fmt::Debug for EncodeArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodeArgs")
            .field("root_node", &self.root_node)
            .field("callback", &self.callback)
            .field("pretty", &self.pretty)
            .field("numeric_replacements", &self.numeric_replacements)
            .field("numeric_prefix", &self.numeric_prefix)
            .field("include_keys", &self.include_keys)
            .finish_non_exhaustive()
    }
}

/// Dispatches encoding to the active encoder handlers.
pub struct Encoder {
    dispatcher: RefCell<Dispatcher<dyn EncoderHandler>>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Creates the subsystem. At least one active handler is required at
    /// encode time.
    pub fn new() -> Self {
        Self {
            dispatcher: RefCell::new(Dispatcher::new(1, None)),
        }
    }

    /// Replaces all handlers from config.
    pub fn init(
        &self,
        config: Vec<(String, HandlerConfig<dyn EncoderHandler>)>,
    ) -> Result<(usize, usize), DispatchError> {
        self.dispatcher.borrow_mut().init(config)
    }

    /// Adds a handler.
    pub fn add_handler(&self, name: &str, handler: Box<dyn EncoderHandler>, active: bool) {
        self.dispatcher.borrow_mut().add_handler(name, handler, active);
    }

    /// Activates a handler by name, building it from config if needed.
    pub fn activate(&self, name: &str) -> Result<(), DispatchError> {
        self.dispatcher.borrow_mut().activate(name)
    }

    /// Deactivates a handler by name.
    pub fn deactivate(&self, name: &str, warn: bool) -> Result<(), DispatchError> {
        self.dispatcher.borrow_mut().deactivate(name, warn)
    }

    /// Removes a handler and its config.
    pub fn remove_handler(&self, name: &str, warn: bool) -> Result<(), DispatchError> {
        self.dispatcher.borrow_mut().remove_handler(name, warn)
    }

    /// The names of all registered handlers.
    pub fn names(&self) -> Vec<String> {
        self.dispatcher.borrow().names()
    }

    /// Encodes the source with every active handler, returning the
    /// encoded text keyed by handler name.
    pub fn encode(
        &self,
        source: &Value,
        args: &EncodeArgs,
    ) -> Result<Vec<(String, String)>, TineError> {
        let results = self
            .dispatcher
            .borrow()
            .dispatch(|handler| handler.encode(source, args))?;

        let mut encoded = Vec::new();
        for (name, result) in results.into_pairs() {
            encoded.push((name, result.map_err(TineError::Custom)?));
        }
        Ok(encoded)
    }

    /// The content-type headers of every active handler, keyed by name.
    pub fn headers(&self) -> Result<Vec<(String, String)>, DispatchError> {
        let results = self
            .dispatcher
            .borrow()
            .dispatch(|handler| handler.header().to_string())?;
        Ok(results.into_pairs())
    }

    /// Activates the named handler and returns its content-type header
    /// and encoded text.
    pub fn encode_with(
        &self,
        name: &str,
        source: &Value,
        args: &EncodeArgs,
    ) -> Result<(String, String), TineError> {
        self.activate(name)?;

        let pick = |pairs: Vec<(String, String)>| {
            pairs
                .into_iter()
                .find(|(handler, _)| handler == name)
                .map(|(_, text)| text)
                .ok_or_else(|| {
                    TineError::Dispatch(DispatchError::UnknownHandler { name: name.into() })
                })
        };

        let header = pick(self.headers()?)?;
        let content = pick(self.encode(source, args)?)?;
        Ok((header, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use serde_json::json;

    struct Upper;

    impl EncoderHandler for Upper {
        fn encode(&self, source: &Value, _args: &EncodeArgs) -> Result<String, BoxError> {
            Ok(source.to_string().to_uppercase())
        }

        fn header(&self) -> &'static str {
            "Content-type: text/upper"
        }
    }

    #[test]
    fn encode_requires_an_active_handler() {
        let encoder = Encoder::new();
        assert!(matches!(
            encoder.encode(&json!({}), &EncodeArgs::default()),
            Err(TineError::Dispatch(DispatchError::HandlerCount { active: 0, .. }))
        ));
    }

    #[test]
    fn encode_returns_results_keyed_by_handler() {
        let encoder = Encoder::new();
        encoder.add_handler("upper", Box::new(Upper), true);

        let results = encoder.encode(&json!("ok"), &EncodeArgs::default()).unwrap();
        assert_eq!(results, vec![("upper".to_string(), "\"OK\"".to_string())]);

        let headers = encoder.headers().unwrap();
        assert_eq!(
            headers,
            vec![("upper".to_string(), "Content-type: text/upper".to_string())]
        );
    }

    #[test]
    fn encode_with_activates_and_picks_one_handler() {
        let encoder = Encoder::new();
        encoder.add_handler("upper", Box::new(Upper), false);

        let (header, content) = encoder
            .encode_with("upper", &json!("ok"), &EncodeArgs::default())
            .unwrap();
        assert_eq!(header, "Content-type: text/upper");
        assert_eq!(content, "\"OK\"");
    }

    #[test]
    fn handlers_can_be_deactivated_and_removed() {
        let encoder = Encoder::new();
        encoder.add_handler("upper", Box::new(Upper), true);
        assert_eq!(encoder.names(), vec!["upper"]);

        encoder.deactivate("upper", true).unwrap();
        assert!(matches!(
            encoder.encode(&json!(1), &EncodeArgs::default()),
            Err(TineError::Dispatch(DispatchError::HandlerCount { .. }))
        ));

        encoder.remove_handler("upper", true).unwrap();
        assert!(encoder.names().is_empty());
    }
}
