//! Generic active-handler dispatch.
//!
//! A [`Dispatcher`] is a registry of named handler objects that all
//! conform to one capability trait. Forwarded calls go to every *active*
//! handler in registration order and the results come back keyed by
//! handler name; a dispatcher capped at one active handler returns the
//! single result unwrapped. This is the framework's one polymorphism
//! mechanism: the error, debug, encoder and auth subsystems are all
//! dispatchers differing only in capability trait and cardinality.
//!
//! Handlers can be added up front or described by a [`HandlerConfig`]
//! and constructed lazily the first time they are activated.

use crate::Value;
use crate::error::{BoxError, DispatchError};

/// Constructs a handler from its configured params.
pub type HandlerFactory<H> = Box<dyn Fn(&Value) -> Result<Box<H>, BoxError>>;

/// The stored configuration for a handler that may not be built yet.
pub struct HandlerConfig<H: ?Sized> {
    /// Whether the handler starts active when initialized.
    pub active: bool,
    /// Params handed to the factory at construction time.
    pub params: Value,
    /// The factory that builds the handler.
    pub factory: HandlerFactory<H>,
}

impl<H: ?Sized> HandlerConfig<H> {
    /// Creates a config with null params.
    pub fn new(
        active: bool,
        factory: impl Fn(&Value) -> Result<Box<H>, BoxError> + 'static,
    ) -> Self {
        Self {
            active,
            params: Value::Null,
            factory: Box::new(factory),
        }
    }

    /// Sets the params handed to the factory.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

struct HandlerEntry<H: ?Sized> {
    name: String,
    handler: Box<H>,
    active: bool,
}

/// The result of a forwarded call.
#[derive(Debug, PartialEq)]
pub enum Dispatched<R> {
    /// The bare result from a dispatcher capped at one active handler.
    One(R),
    /// Results keyed by handler name, in registration order.
    Many(Vec<(String, R)>),
}

impl<R> Dispatched<R> {
    /// The single result, if exactly one handler ran.
    pub fn into_one(self) -> Option<R> {
        match self {
            Dispatched::One(result) => Some(result),
            Dispatched::Many(mut results) if results.len() == 1 => {
                results.pop().map(|(_, result)| result)
            }
            Dispatched::Many(_) => None,
        }
    }

    /// All results as name/result pairs. The unwrapped form loses its
    /// handler name and comes back keyed by an empty string.
    pub fn into_pairs(self) -> Vec<(String, R)> {
        match self {
            Dispatched::One(result) => vec![(String::new(), result)],
            Dispatched::Many(results) => results,
        }
    }
}

/// A registry of named, independently activatable handlers.
pub struct Dispatcher<H: ?Sized> {
    minimum: usize,
    maximum: Option<usize>,
    handlers: Vec<HandlerEntry<H>>,
    config: Vec<(String, HandlerConfig<H>)>,
}

impl<H: ?Sized> Dispatcher<H> {
    /// Creates a dispatcher with the given active-handler bounds.
    ///
    /// `maximum` of `None` means unbounded.
    pub fn new(minimum: usize, maximum: Option<usize>) -> Self {
        Self {
            minimum,
            maximum,
            handlers: Vec::new(),
            config: Vec::new(),
        }
    }

    /// Replaces all handlers and configuration. Every config entry marked
    /// active is constructed and registered immediately; the rest wait for
    /// [`Dispatcher::activate`].
    ///
    /// Returns the number of handlers initialized and the number active.
    pub fn init(
        &mut self,
        config: Vec<(String, HandlerConfig<H>)>,
    ) -> Result<(usize, usize), DispatchError> {
        self.handlers.clear();
        self.config = config;

        let pending: Vec<String> = self
            .config
            .iter()
            .filter(|(_, handler)| handler.active)
            .map(|(name, _)| name.clone())
            .collect();
        for name in pending {
            self.init_handler(&name)?;
        }

        Ok((self.handlers.len(), self.active_count()))
    }

    /// Constructs a handler from its stored config and registers it.
    pub fn init_handler(&mut self, name: &str) -> Result<(), DispatchError> {
        let (active, handler) = {
            let (_, config) = self
                .config
                .iter()
                .find(|(existing, _)| existing == name)
                .ok_or_else(|| DispatchError::Unconfigured { name: name.into() })?;
            let handler = (config.factory)(&config.params).map_err(|source| {
                DispatchError::Construct {
                    name: name.into(),
                    source,
                }
            })?;
            (config.active, handler)
        };
        self.add_handler(name, handler, active);
        Ok(())
    }

    /// Adds a handler. Active handlers do the actual processing; an
    /// existing handler under the same name is replaced in place.
    pub fn add_handler(&mut self, name: impl Into<String>, handler: Box<H>, active: bool) {
        let name = name.into();
        match self.handlers.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.handler = handler;
                entry.active = active;
            }
            None => self.handlers.push(HandlerEntry {
                name,
                handler,
                active,
            }),
        }
    }

    /// Removes a handler and its config entirely.
    ///
    /// Fails with [`DispatchError::UnknownHandler`] when `warn` is set and
    /// the name was never registered.
    pub fn remove_handler(&mut self, name: &str, warn: bool) -> Result<(), DispatchError> {
        let position = self.handlers.iter().position(|entry| entry.name == name);
        match position {
            Some(position) => {
                self.handlers.remove(position);
                self.config.retain(|(existing, _)| existing != name);
                Ok(())
            }
            None if warn => Err(DispatchError::UnknownHandler { name: name.into() }),
            None => Ok(()),
        }
    }

    /// Activates a handler by name, constructing it from its stored
    /// config if it has not been built yet.
    pub fn activate(&mut self, name: &str) -> Result<(), DispatchError> {
        if !self.handlers.iter().any(|entry| entry.name == name) {
            if self.config.iter().any(|(existing, _)| existing == name) {
                self.init_handler(name)?;
            } else {
                return Err(DispatchError::UnknownHandler { name: name.into() });
            }
        }
        if let Some(entry) = self.handlers.iter_mut().find(|entry| entry.name == name) {
            entry.active = true;
        }
        Ok(())
    }

    /// Deactivates a handler: the instance is retained but skipped by
    /// dispatch.
    ///
    /// Fails with [`DispatchError::UnknownHandler`] when `warn` is set and
    /// the name was never registered.
    pub fn deactivate(&mut self, name: &str, warn: bool) -> Result<(), DispatchError> {
        match self.handlers.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.active = false;
                Ok(())
            }
            None if warn => Err(DispatchError::UnknownHandler { name: name.into() }),
            None => Ok(()),
        }
    }

    /// The handler registered under the name, if any.
    pub fn get(&self, name: &str) -> Option<&H> {
        self.handlers
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.handler.as_ref())
    }

    /// Returns true if the named handler exists and is active.
    pub fn is_active(&self, name: &str) -> bool {
        self.handlers
            .iter()
            .any(|entry| entry.name == name && entry.active)
    }

    /// The number of active handlers.
    pub fn active_count(&self) -> usize {
        self.handlers.iter().filter(|entry| entry.active).count()
    }

    /// The number of registered handlers, active or not.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The names of all registered handlers in registration order.
    pub fn names(&self) -> Vec<String> {
        self.handlers.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Forwards a call to every active handler in registration order.
    ///
    /// Fails with [`DispatchError::HandlerCount`] if the active count
    /// falls outside the configured bounds. With a maximum of one the
    /// single result comes back unwrapped.
    pub fn dispatch<R>(
        &self,
        mut call: impl FnMut(&H) -> R,
    ) -> Result<Dispatched<R>, DispatchError> {
        let active = self.active_count();
        if active < self.minimum || self.maximum.is_some_and(|maximum| active > maximum) {
            return Err(DispatchError::HandlerCount {
                active,
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }

        let mut results = Vec::with_capacity(active);
        for entry in &self.handlers {
            if entry.active {
                results.push((entry.name.clone(), call(entry.handler.as_ref())));
            }
        }

        if self.maximum == Some(1)
            && let Some((_, result)) = results.pop()
        {
            return Ok(Dispatched::One(result));
        }
        Ok(Dispatched::Many(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter {
        fn greet(&self) -> String;
    }

    struct Plain(&'static str);

    impl Greeter for Plain {
        fn greet(&self) -> String {
            self.0.to_string()
        }
    }

    fn config(active: bool, text: &'static str) -> HandlerConfig<dyn Greeter> {
        HandlerConfig::new(active, move |_| Ok(Box::new(Plain(text)) as Box<dyn Greeter>))
    }

    #[test]
    fn dispatch_collects_results_in_registration_order() {
        let mut dispatcher: Dispatcher<dyn Greeter> = Dispatcher::new(0, None);
        dispatcher.add_handler("first", Box::new(Plain("one")), true);
        dispatcher.add_handler("second", Box::new(Plain("two")), true);
        dispatcher.add_handler("third", Box::new(Plain("three")), false);

        let results = dispatcher.dispatch(|handler| handler.greet()).unwrap();
        assert_eq!(
            results,
            Dispatched::Many(vec![
                ("first".into(), "one".into()),
                ("second".into(), "two".into()),
            ])
        );
    }

    #[test]
    fn single_handler_cap_unwraps_the_result() {
        let mut dispatcher: Dispatcher<dyn Greeter> = Dispatcher::new(1, Some(1));
        dispatcher.add_handler("only", Box::new(Plain("solo")), true);

        let result = dispatcher.dispatch(|handler| handler.greet()).unwrap();
        assert_eq!(result, Dispatched::One("solo".into()));
    }

    #[test]
    fn cardinality_is_enforced_at_dispatch_time() {
        let mut dispatcher: Dispatcher<dyn Greeter> = Dispatcher::new(1, Some(1));

        // zero active
        assert!(matches!(
            dispatcher.dispatch(|handler| handler.greet()),
            Err(DispatchError::HandlerCount { active: 0, .. })
        ));

        // two active
        dispatcher.add_handler("a", Box::new(Plain("a")), true);
        dispatcher.add_handler("b", Box::new(Plain("b")), true);
        assert!(matches!(
            dispatcher.dispatch(|handler| handler.greet()),
            Err(DispatchError::HandlerCount { active: 2, .. })
        ));

        // exactly one
        dispatcher.deactivate("b", true).unwrap();
        assert_eq!(
            dispatcher.dispatch(|handler| handler.greet()).unwrap(),
            Dispatched::One("a".into())
        );
    }

    #[test]
    fn init_builds_only_active_config_entries() {
        let mut dispatcher: Dispatcher<dyn Greeter> = Dispatcher::new(0, None);
        let (total, active) = dispatcher
            .init(vec![
                ("on".into(), config(true, "on")),
                ("off".into(), config(false, "off")),
            ])
            .unwrap();
        assert_eq!((total, active), (1, 1));
        assert!(dispatcher.get("off").is_none());
        assert_eq!(dispatcher.names(), vec!["on"]);
        assert_eq!(dispatcher.len(), 1);
        assert!(!dispatcher.is_empty());
    }

    #[test]
    fn activate_lazily_constructs_from_config() {
        let mut dispatcher: Dispatcher<dyn Greeter> = Dispatcher::new(0, None);
        dispatcher
            .init(vec![("lazy".into(), config(false, "built late"))])
            .unwrap();

        dispatcher.activate("lazy").unwrap();
        assert!(dispatcher.is_active("lazy"));
        assert_eq!(
            dispatcher.get("lazy").map(|handler| handler.greet()),
            Some("built late".into())
        );
    }

    #[test]
    fn unknown_names_warn_only_when_asked() {
        let mut dispatcher: Dispatcher<dyn Greeter> = Dispatcher::new(0, None);
        assert!(dispatcher.remove_handler("ghost", false).is_ok());
        assert!(matches!(
            dispatcher.remove_handler("ghost", true),
            Err(DispatchError::UnknownHandler { .. })
        ));
        assert!(matches!(
            dispatcher.activate("ghost"),
            Err(DispatchError::UnknownHandler { .. })
        ));
    }

    #[test]
    fn remove_forgets_handler_and_config() {
        let mut dispatcher: Dispatcher<dyn Greeter> = Dispatcher::new(0, None);
        dispatcher
            .init(vec![("gone".into(), config(true, "gone"))])
            .unwrap();
        dispatcher.remove_handler("gone", true).unwrap();

        // the config went with it, so re-activation cannot rebuild it
        assert!(matches!(
            dispatcher.activate("gone"),
            Err(DispatchError::UnknownHandler { .. })
        ));
    }
}
