//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use tine::testing::{MemoryLoader, SharedBuffer};
use tine::{Bootstrap, Controller, StaticSource, TineError, Variables};

/// A loader with the standard config and a catch-all error template.
pub fn loader() -> MemoryLoader {
    MemoryLoader::new()
        .with_config(
            "global",
            json!({
                "env": null,
                "error": {"verbose": false},
                "router": {
                    "defaults": {"controller": "home"},
                    "urls": {"base": ""},
                    "routes": [["^/error/([0-9]{3}/?)", "/home/fatal/$1"]],
                },
                "encoder": {"handlers": {"json": {}, "jsonp": {}, "xml": {}}},
                "interfaces": {"api": {"defaults": {"encoder": "json"}}},
            }),
        )
        .with_config("environments/dev", json!({"env": "dev"}))
        .with_template("errors/catchall", "Fatal {statusCode}: {statusString}")
}

/// A GET request source for the URI passed.
pub fn get_source(uri: &str) -> StaticSource {
    StaticSource {
        method: Some("GET".into()),
        request_uri: Some(uri.into()),
        ..StaticSource::default()
    }
}

/// A GET request source with preset query variables.
pub fn get_source_with(uri: &str, variables: Variables) -> StaticSource {
    StaticSource {
        get: variables,
        ..get_source(uri)
    }
}

/// A bootstrap over the standard loader, capturing output in a shared
/// buffer.
pub fn app_for(source: StaticSource) -> (Bootstrap, SharedBuffer) {
    app_with(loader(), source)
}

/// A bootstrap over a custom loader, capturing output in a shared
/// buffer.
pub fn app_with(loader: MemoryLoader, source: StaticSource) -> (Bootstrap, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let app = Bootstrap::with_sink(Rc::new(loader), Rc::new(source), buffer.sink());
    (app, buffer)
}

/// A controller that records the segments it was dispatched with.
pub struct RecordingController {
    pub segments: Rc<RefCell<Vec<String>>>,
}

impl Controller for RecordingController {
    fn run(&self, app: &Bootstrap) -> Result<(), TineError> {
        *self.segments.borrow_mut() = app.registry().router()?.segments();
        Ok(())
    }
}

/// A controller that fails with the status passed.
pub struct FailingController {
    pub status: u16,
}

impl Controller for FailingController {
    fn run(&self, _app: &Bootstrap) -> Result<(), TineError> {
        Err(TineError::status(self.status, "controller gave up"))
    }
}
