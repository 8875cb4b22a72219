//! Named events with ordered listener queues.
//!
//! The [`EventBus`] maps event names to ordered queues of [`Action`]s
//! backed by [`KeyedList`]. Actions can be registered at a specific
//! position, flagged to run once, and removed by key. Triggering walks
//! a snapshot of the queue, so a callback that registers or removes
//! actions on the event being triggered affects only future triggers.
//!
//! The bus hands out `Rc` handles and takes `&self` everywhere, so a
//! running callback can re-enter it (nested triggers, registration,
//! teardown) without violating borrow rules.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::Value;
use crate::collection::KeyedList;
use crate::error::{CollectionError, EventError};

/// An event callback: bound args first, runtime args second.
pub type Callback = Rc<dyn Fn(&[Value], &[Value]) -> Value>;

/// One registered listener: a callback, its bound args and a once flag.
#[derive(Clone)]
pub struct Action {
    callback: Callback,
    args: Vec<Value>,
    once: bool,
}

impl Action {
    /// The args bound at registration time.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Whether the action is removed after its first invocation.
    pub fn once(&self) -> bool {
        self.once
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("args", &self.args)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// The registry of named events and their listener queues.
#[derive(Default)]
pub struct EventBus {
    events: RefCell<HashMap<String, KeyedList<Action>>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the named event has ever been registered (and not
    /// destroyed).
    pub fn exists(&self, name: &str) -> bool {
        self.events.borrow().contains_key(name)
    }

    /// The number of actions currently registered on the event.
    pub fn count(&self, name: &str) -> usize {
        self.events
            .borrow()
            .get(name)
            .map_or(0, |actions| actions.len())
    }

    /// Registers a callback on the named event and returns its key.
    ///
    /// The queue is created lazily the first time an event name is used.
    pub fn listen(&self, name: &str, callback: Callback, args: Vec<Value>) -> String {
        match self.listen_at(name, callback, args, None, None, false) {
            Ok(key) => key,
            // an append with no position and no validator cannot fail
            Err(_) => unreachable!(),
        }
    }

    /// Registers a callback that is removed after its first invocation.
    pub fn once(
        &self,
        name: &str,
        callback: Callback,
        args: Vec<Value>,
        position: Option<usize>,
        id: Option<String>,
    ) -> Result<String, EventError> {
        self.listen_at(name, callback, args, position, id, true)
    }

    /// Registers a callback with full control over position, key and once
    /// semantics. Inserting at a position affects only future triggers,
    /// never one already in progress.
    pub fn listen_at(
        &self,
        name: &str,
        callback: Callback,
        args: Vec<Value>,
        position: Option<usize>,
        id: Option<String>,
        once: bool,
    ) -> Result<String, EventError> {
        let mut events = self.events.borrow_mut();
        let actions = events.entry(name.to_string()).or_default();
        let action = Action {
            callback,
            args,
            once,
        };

        let result = match position {
            Some(position) => actions.insert(position, id, action),
            None => match id {
                Some(id) => actions.append_keyed(id, action),
                None => actions.append(action),
            },
        };
        result.map_err(|err| match err {
            CollectionError::OutOfBounds { position, len } => EventError::Position {
                event: name.to_string(),
                position,
                len,
            },
            // event queues have no validation hook
            CollectionError::InvalidItem => unreachable!(),
        })
    }

    /// Runs every action registered on the named event, in queue order.
    ///
    /// Each callback receives its bound args followed by `args` (or only
    /// its bound args when `args` is `None`); the results come back keyed
    /// by action key. Actions flagged once are removed after the full
    /// pass. With `flush` the event is destroyed afterward regardless.
    ///
    /// An absent event returns `Ok(None)`, or fails with
    /// [`EventError::UnknownEvent`] when `fatal` is set.
    pub fn trigger(
        &self,
        name: &str,
        args: Option<&[Value]>,
        flush: bool,
        fatal: bool,
    ) -> Result<Option<Vec<(String, Value)>>, EventError> {
        // snapshot the queue so callbacks can re-enter the bus and so
        // mid-pass registration is not visited until the next trigger
        let snapshot: Vec<(String, Action)> = {
            let mut events = self.events.borrow_mut();
            let Some(actions) = events.get_mut(name) else {
                if fatal {
                    return Err(EventError::UnknownEvent { name: name.into() });
                }
                return Ok(None);
            };
            actions.rewind();
            let mut entries = Vec::with_capacity(actions.len());
            while let Some((key, action)) = actions.each() {
                entries.push((key, action.clone()));
            }
            entries
        };

        let runtime = args.unwrap_or(&[]);
        let mut results = Vec::with_capacity(snapshot.len());
        let mut remove = Vec::new();
        for (key, action) in &snapshot {
            results.push((key.clone(), (action.callback)(&action.args, runtime)));
            if action.once {
                remove.push(key.clone());
            }
        }

        let mut events = self.events.borrow_mut();
        if let Some(actions) = events.get_mut(name) {
            for key in &remove {
                actions.key_unset(key);
            }
        }
        if flush {
            events.remove(name);
        }

        Ok(Some(results))
    }

    /// Removes a single action by key and returns it.
    pub fn remove(&self, name: &str, key: &str) -> Result<Action, EventError> {
        let mut events = self.events.borrow_mut();
        let actions = events
            .get_mut(name)
            .ok_or_else(|| EventError::UnknownEvent { name: name.into() })?;
        actions.key_unset(key).ok_or_else(|| EventError::UnknownAction {
            event: name.into(),
            key: key.into(),
        })
    }

    /// Removes the entire named event and returns its former queue,
    /// letting the caller transplant or inspect the registered actions.
    pub fn destroy(&self, name: &str) -> Option<KeyedList<Action>> {
        self.events.borrow_mut().remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(log: Rc<RefCell<Vec<String>>>, tag: &'static str) -> Callback {
        Rc::new(move |_, _| {
            log.borrow_mut().push(tag.to_string());
            Value::Null
        })
    }

    #[test]
    fn trigger_passes_bound_then_runtime_args() {
        let bus = EventBus::new();
        bus.listen(
            "combine",
            Rc::new(|bound, runtime| {
                json!({
                    "bound": bound,
                    "runtime": runtime,
                })
            }),
            vec![json!("standard")],
        );

        let results = bus
            .trigger("combine", Some(&[json!("runtime")]), false, false)
            .unwrap()
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].1,
            json!({"bound": ["standard"], "runtime": ["runtime"]})
        );
    }

    #[test]
    fn once_actions_fire_exactly_once() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.once("single", recorder(log.clone(), "fired"), vec![], None, None)
            .unwrap();

        let first = bus.trigger("single", None, false, false).unwrap().unwrap();
        assert_eq!(first.len(), 1);

        let second = bus.trigger("single", None, false, false).unwrap().unwrap();
        assert!(second.is_empty(), "a once action must not fire again");
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn positional_insert_runs_before_the_displaced_action() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.listen("ordered", recorder(log.clone(), "first"), vec![]);
        bus.listen("ordered", recorder(log.clone(), "third"), vec![]);
        bus.listen_at(
            "ordered",
            recorder(log.clone(), "second"),
            vec![],
            Some(1),
            None,
            false,
        )
        .unwrap();

        bus.trigger("ordered", None, false, false).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn positional_insert_past_the_end_fails() {
        let bus = EventBus::new();
        bus.listen("short", Rc::new(|_, _| Value::Null), vec![]);
        assert!(matches!(
            bus.listen_at("short", Rc::new(|_, _| Value::Null), vec![], Some(5), None, false),
            Err(EventError::Position { position: 5, .. })
        ));
    }

    #[test]
    fn absent_event_is_silent_unless_fatal() {
        let bus = EventBus::new();
        assert!(bus.trigger("ghost", None, false, false).unwrap().is_none());
        assert!(matches!(
            bus.trigger("ghost", None, false, true),
            Err(EventError::UnknownEvent { .. })
        ));
    }

    #[test]
    fn flush_destroys_the_event_after_the_pass() {
        let bus = EventBus::new();
        bus.listen("flushed", Rc::new(|_, _| Value::Null), vec![]);
        bus.trigger("flushed", None, true, false).unwrap();
        assert!(!bus.exists("flushed"));
    }

    #[test]
    fn remove_distinguishes_missing_event_from_missing_key() {
        let bus = EventBus::new();
        assert!(matches!(
            bus.remove("ghost", "key"),
            Err(EventError::UnknownEvent { .. })
        ));

        let key = bus.listen("real", Rc::new(|_, _| Value::Null), vec![]);
        assert!(matches!(
            bus.remove("real", "wrong"),
            Err(EventError::UnknownAction { .. })
        ));
        assert!(bus.remove("real", &key).is_ok());
        assert_eq!(bus.count("real"), 0);
    }

    #[test]
    fn destroy_returns_the_former_queue() {
        let bus = EventBus::new();
        bus.listen("doomed", Rc::new(|_, _| Value::Null), vec![json!(1)]);
        let queue = bus.destroy("doomed").unwrap();
        assert_eq!(queue.len(), 1);

        // the transplanted actions keep their bound args and once flag
        let action = queue.first().unwrap();
        assert_eq!(action.args(), &[json!(1)]);
        assert!(!action.once());

        assert!(!bus.exists("doomed"));
        assert!(bus.destroy("doomed").is_none());
    }

    #[test]
    fn listener_added_during_a_trigger_is_not_visited_in_that_pass() {
        let bus = Rc::new(EventBus::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_log = log.clone();
        let reentrant_bus = bus.clone();
        bus.listen(
            "growing",
            Rc::new(move |_, _| {
                inner_log.borrow_mut().push("outer".to_string());
                let late_log = inner_log.clone();
                reentrant_bus.listen(
                    "growing",
                    Rc::new(move |_, _| {
                        late_log.borrow_mut().push("late".to_string());
                        Value::Null
                    }),
                    vec![],
                );
                Value::Null
            }),
            vec![],
        );

        bus.trigger("growing", None, false, false).unwrap();
        assert_eq!(*log.borrow(), vec!["outer"]);

        bus.trigger("growing", None, false, false).unwrap();
        assert_eq!(*log.borrow(), vec!["outer", "outer", "late"]);
    }

    #[test]
    fn nested_trigger_on_another_event_works() {
        let bus = Rc::new(EventBus::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        bus.listen("inner", recorder(log.clone(), "inner"), vec![]);
        let nested_bus = bus.clone();
        let outer_log = log.clone();
        bus.listen(
            "outer",
            Rc::new(move |_, _| {
                outer_log.borrow_mut().push("outer".to_string());
                nested_bus.trigger("inner", None, false, false).unwrap();
                Value::Null
            }),
            vec![],
        );

        bus.trigger("outer", None, false, false).unwrap();
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }
}
