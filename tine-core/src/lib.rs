//! # tine-core
//!
//! Core contracts for the Tine request and dispatch framework.
//!
//! This crate has minimal dependencies and holds the pieces everything
//! else builds on:
//!
//! - [`KeyedList`] - an insertion-ordered keyed collection with a
//!   traversal cursor, backing the event queues and the error log
//! - [`Dispatcher`] - the generic active-handler registry used by the
//!   error, debug, encoder and auth subsystems
//! - [`Router`] - request parsing, regex route rewriting and
//!   segment/filter extraction over an injected [`RequestSource`]
//! - [`EventBus`] - named events with ordered, keyed listener queues
//! - [`ConfigTree`] - the recursive configuration store
//! - the capability traits ([`ErrorHandler`], [`DebugHandler`],
//!   [`EncoderHandler`], [`AuthHandler`]) and the seams for external
//!   collaborators ([`Loader`], [`Language`])
//!
//! Everything here is synchronous and request-scoped: one router, one
//! event bus and one bootstrap serve one in-flight request, and shared
//! handles are `Rc` with interior mutability rather than anything
//! thread-aware.
//!
//! # Error Types
//!
//! - [`TineError`] - Top-level error type
//! - [`DispatchError`], [`EventError`], [`RouteError`],
//!   [`CollectionError`], [`RegistryError`] - per-subsystem errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod collection;
mod config;
mod debug;
mod dispatcher;
mod encoder;
mod error;
mod errors;
mod event;
mod handler;
mod lang;
mod loader;
mod router;

/// The framework's dynamic value type: event args, handler params,
/// template variable bags and API payloads are all values.
pub use serde_json::Value;

// Re-exports
pub use collection::KeyedList;
pub use config::{ConfigNode, ConfigTree};
pub use debug::Debugger;
pub use dispatcher::{Dispatched, Dispatcher, HandlerConfig, HandlerFactory};
pub use encoder::{EncodeArgs, Encoder};
pub use error::{
    BoxError, CollectionError, DispatchError, EventError, RegistryError, RouteError, TineError,
};
pub use errors::{ErrorDetail, Errors, Severity};
pub use event::{Action, Callback, EventBus};
pub use handler::{AuthHandler, DebugHandler, EncoderHandler, ErrorHandler};
pub use lang::{Language, Passthrough};
pub use loader::Loader;
pub use router::{
    FILTER_DELIMITER, FilterValue, RequestSource, Router, StaticSource, Variables, build_query,
    parse_query_str,
};
