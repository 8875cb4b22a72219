//! The debug output subsystem.
//!
//! [`Debugger`] forwards debug messages to its active [`DebugHandler`]s.
//! With no handlers registered the messages are simply discarded, which
//! is the production configuration.

use std::cell::RefCell;

use crate::dispatcher::{Dispatcher, HandlerConfig};
use crate::error::DispatchError;
use crate::handler::DebugHandler;

/// Forwards debugging data to zero or more debug handlers.
pub struct Debugger {
    dispatcher: RefCell<Dispatcher<dyn DebugHandler>>,
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new()
    }
}

impl Debugger {
    /// Creates the subsystem with no handlers.
    pub fn new() -> Self {
        Self {
            dispatcher: RefCell::new(Dispatcher::new(0, None)),
        }
    }

    /// Replaces all handlers from config.
    pub fn init(
        &self,
        config: Vec<(String, HandlerConfig<dyn DebugHandler>)>,
    ) -> Result<(usize, usize), DispatchError> {
        self.dispatcher.borrow_mut().init(config)
    }

    /// Adds a handler.
    pub fn add_handler(&self, name: &str, handler: Box<dyn DebugHandler>, active: bool) {
        self.dispatcher.borrow_mut().add_handler(name, handler, active);
    }

    /// Activates a handler by name.
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

    /// The number of active handlers.
    pub fn active_count(&self) -> usize {
        self.dispatcher.borrow().active_count()
    }

    /// Concatenates the parts with `: ` and forwards the message to every
    /// active handler.
    pub fn log(&self, parts: &[&str]) {
        let message = parts.join(": ");
        // cardinality is [0, unbounded), so dispatch cannot fail
        let _ = self
            .dispatcher
            .borrow()
            .dispatch(|handler| handler.log(&message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct Collecting {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl DebugHandler for Collecting {
        fn log(&self, message: &str) {
            self.seen.borrow_mut().push(message.to_string());
        }
    }

    #[test]
    fn parts_are_joined_and_forwarded() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let debug = Debugger::new();
        debug.add_handler("collect", Box::new(Collecting { seen: seen.clone() }), true);

        debug.log(&["query", "took 3ms"]);
        assert_eq!(*seen.borrow(), vec!["query: took 3ms"]);
    }

    #[test]
    fn logging_without_handlers_is_discarded() {
        let debug = Debugger::new();
        debug.log(&["nobody listening"]);
        assert_eq!(debug.active_count(), 0);
    }

    #[test]
    fn init_builds_only_active_config_entries() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let debug = Debugger::new();

        let handler_seen = seen.clone();
        let (total, active) = debug
            .init(vec![(
                "collect".to_string(),
                HandlerConfig::new(true, move |_| {
                    Ok(Box::new(Collecting {
                        seen: handler_seen.clone(),
                    }) as Box<dyn DebugHandler>)
                }),
            )])
            .unwrap();
        assert_eq!((total, active), (1, 1));

        debug.log(&["built from config"]);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn deactivated_handlers_are_skipped() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let debug = Debugger::new();
        debug.add_handler("collect", Box::new(Collecting { seen: seen.clone() }), true);
        debug.deactivate("collect", true).unwrap();

        debug.log(&["skipped"]);
        assert!(seen.borrow().is_empty());
    }
}
