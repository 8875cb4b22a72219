//! Error types for Tine.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`TineError`] - Top-level error type for all framework operations
//! - [`CollectionError`] - Errors from the ordered keyed collection
//! - [`DispatchError`] - Errors from handler registration and dispatch
//! - [`EventError`] - Errors from the event bus
//! - [`RouteError`] - Errors from route configuration
//! - [`RegistryError`] - Errors from the bootstrap registry

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all framework operations.
#[derive(Error, Debug)]
pub enum TineError {
    /// An error occurred in an ordered keyed collection.
    #[error("collection error: {0}")]
    Collection(#[from] CollectionError),

    /// An error occurred registering or dispatching to handlers.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// An error occurred in the event bus.
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// An error occurred in route configuration.
    #[error("route error: {0}")]
    Route(#[from] RouteError),

    /// An error occurred in the bootstrap registry.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A failure that maps to a specific HTTP status code.
    #[error("{status}: {message}")]
    Status {
        /// The HTTP status code to render.
        status: u16,
        /// The failure description.
        message: String,
    },

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

impl TineError {
    /// Creates a status-carrying error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        TineError::Status {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status code this error should render as.
    ///
    /// Only [`TineError::Status`] carries its own code; everything else
    /// surfaces as an internal server error.
    pub fn status_code(&self) -> u16 {
        match self {
            TineError::Status { status, .. } => *status,
            _ => 500,
        }
    }
}

/// Errors from the ordered keyed collection.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// A value was rejected by the collection's validation hook.
    #[error("item rejected by the validation hook")]
    InvalidItem,

    /// A positional insert targeted a position past the end of the list.
    #[error("position {position} out of bounds for a list of {len}")]
    OutOfBounds {
        /// The requested position.
        position: usize,
        /// The list length at the time of the call.
        len: usize,
    },
}

/// Errors from handler registration and dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The number of active handlers fell outside the configured bounds.
    #[error("invalid number of active handlers: {active} not in [{minimum}, {}]", display_max(.maximum))]
    HandlerCount {
        /// How many handlers were active at dispatch time.
        active: usize,
        /// The configured minimum.
        minimum: usize,
        /// The configured maximum, if bounded.
        maximum: Option<usize>,
    },

    /// A named handler was looked up but never registered or configured.
    #[error("unknown handler: {name}")]
    UnknownHandler {
        /// The handler name.
        name: String,
    },

    /// A handler was asked to initialize without stored configuration.
    #[error("handler {name} must be configured before being initialized")]
    Unconfigured {
        /// The handler name.
        name: String,
    },

    /// A handler factory failed to construct its handler.
    #[error("handler {name} failed to construct")]
    Construct {
        /// The handler name.
        name: String,
        /// The factory's failure.
        #[source]
        source: BoxError,
    },
}

/// Errors from the event bus.
#[derive(Error, Debug)]
pub enum EventError {
    /// No event with the given name has been registered.
    #[error("no event named {name} has been registered")]
    UnknownEvent {
        /// The event name.
        name: String,
    },

    /// An action key was not found within an existing event.
    #[error("no action {key} registered on event {event}")]
    UnknownAction {
        /// The event name.
        event: String,
        /// The action key.
        key: String,
    },

    /// A positional listener registration targeted an invalid position.
    #[error("position {position} out of bounds for event {event} with {len} actions")]
    Position {
        /// The event name.
        event: String,
        /// The requested position.
        position: usize,
        /// The action count at the time of the call.
        len: usize,
    },
}

/// Errors from route configuration.
#[derive(Error, Debug)]
pub enum RouteError {
    /// A rewrite rule's pattern failed to compile.
    #[error("malformed route pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors from the bootstrap registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An object was registered under a name with no declared slot.
    #[error("invalid registration ({name})")]
    InvalidRegistration {
        /// The rejected name.
        name: String,
    },

    /// A registry slot was read before anything was registered in it.
    #[error("invalid registry object: {name}")]
    Unregistered {
        /// The empty slot's name.
        name: String,
    },
}

impl From<BoxError> for TineError {
    fn from(err: BoxError) -> Self {
        TineError::Custom(err)
    }
}

fn display_max(maximum: &Option<usize>) -> String {
    match maximum {
        Some(maximum) => maximum.to_string(),
        None => "unbounded".to_string(),
    }
}
