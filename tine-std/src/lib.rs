//! # tine-std
//!
//! Standard implementations for the Tine framework.
//!
//! This crate provides:
//! - **Encoders**: [`encoders::Json`], [`encoders::Jsonp`],
//!   [`encoders::Xml`]
//! - **Error handlers**: [`error_handlers::Log`] (tracing-backed)
//! - **Debug handlers**: [`debug_handlers::Log`],
//!   [`debug_handlers::Display`]
//! - **Auth**: the single-handler [`Auth`] dispatcher and the
//!   [`Spoofed`] handler
//! - **Output**: the buffered [`Output`] queue and the status-code table
//! - **Sources**: [`CliSource`] for command-line entry points
//! - **Testing utilities**: in-memory loaders, sinks and collectors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use tine_core;

// Modules
pub mod debug_handlers;
pub mod encoders;
pub mod error_handlers;
pub mod testing;

mod auth;
mod output;
mod source;

pub use auth::{Auth, Spoofed};
pub use output::{CONTENT_EVENT, HEADERS_EVENT, Output, OutputError, Sink, status_string};
pub use source::CliSource;
