//! # tine - a request-routing and dispatch micro-framework
//!
//! Tine maps a raw request to a controller and renders a templated or
//! encoded response, wired together from a few small pieces:
//!
//! - a [`Router`] that parses the URL (or CLI args) into segments,
//!   filters and variables, after applying regex rewrite rules
//! - an [`EventBus`] of named, ordered listener queues that carries the
//!   lifecycle hooks and the buffered output
//! - a [`Dispatcher`] pattern that gives the error, debug, encoder and
//!   auth subsystems their pluggable handlers
//! - a [`Bootstrap`] that constructs everything in order, dispatches
//!   the controller and tears down deterministically
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use tine::{ApiController, Bootstrap, CliSource};
//!
//! let mut app = Bootstrap::new(Rc::new(MyLoader), Rc::new(CliSource::from_env()));
//! app.register_controller("api", Box::new(|| Rc::new(ApiController::new())));
//! app.execute("prod")?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod api;
mod bootstrap;
mod controller;
mod registry;

pub use tine_core::{
    // Collection
    Action,
    // Auth capability
    AuthHandler,
    // Errors
    BoxError,
    Callback,
    CollectionError,
    ConfigNode,
    // Config
    ConfigTree,
    DebugHandler,
    // Subsystems
    Debugger,
    DispatchError,
    // Dispatch
    Dispatched,
    Dispatcher,
    EncodeArgs,
    Encoder,
    EncoderHandler,
    ErrorDetail,
    ErrorHandler,
    Errors,
    // Events
    EventBus,
    EventError,
    FilterValue,
    HandlerConfig,
    KeyedList,
    // Seams
    Language,
    Loader,
    Passthrough,
    RegistryError,
    // Router
    RequestSource,
    RouteError,
    Router,
    Severity,
    StaticSource,
    TineError,
    Value,
    Variables,
};

pub use tine_std::{Auth, CliSource, Output, OutputError, Sink, Spoofed, status_string};

/// Standard encoder handlers.
pub mod encoders {
    pub use tine_std::encoders::{Json, Jsonp, Xml, standard_config};
}

/// Standard error and debug handlers.
pub mod handlers {
    pub use tine_std::debug_handlers;
    pub use tine_std::error_handlers;
}

/// Testing utilities.
pub mod testing {
    pub use tine_std::testing::{
        CollectingDebugHandler, CollectingErrorHandler, MemoryLoader, SharedBuffer,
    };
}

pub use api::{Api, ApiDelegate, ApiDelegateFactory, ApiResponse, internal};
pub use bootstrap::{Bootstrap, Phase};
pub use controller::{ApiController, Controller, ControllerFactory};

/// Prelude module - common imports for Tine applications.
///
/// # Usage
///
/// ```rust,ignore
/// use tine::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Api,
        ApiController,
        Bootstrap,
        Controller,
        // Events
        EventBus,
        // Seams
        Loader,
        Phase,
        RequestSource,
        // Router
        Router,
        // Errors
        TineError,
        Value,
    };
}
