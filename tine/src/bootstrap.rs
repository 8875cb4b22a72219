//! The bootstrap lifecycle.
//!
//! [`Bootstrap`] is the composition root: it constructs each subsystem
//! once (in a fixed order, skipping any slot the caller pre-filled),
//! resolves the controller from the first URL segment, runs it, and
//! tears everything down in a deterministic order. Lifecycle events
//! fire at each boundary so applications can hook buffering, teardown
//! and instrumentation without subclassing anything.
//!
//! ```text
//! Uninitialized -> Initialized -> Running -> ShutDown
//! ```
//!
//! Unrecoverable failures render through [`Bootstrap::fatal`]: a
//! status-specific template when one exists, the catch-all template
//! otherwise. [`Bootstrap::execute`] is the single outermost recovery
//! seam; nothing below it attempts its own top-level recovery.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::json;

use tine_core::{
    Debugger, Errors, EventBus, Loader, Passthrough, RequestSource, Router, TineError, Value,
};
use tine_std::{Auth, Output, Sink, status_string};

use crate::api::ApiDelegateFactory;
use crate::controller::{Controller, ControllerFactory};
use crate::registry::Registry;

/// Where the app is in its lifecycle. `ShutDown` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet initialized.
    Uninitialized,
    /// Subsystems constructed and registered.
    Initialized,
    /// A controller has been (or is being) dispatched.
    Running,
    /// Torn down; only the error subsystem survives.
    ShutDown,
}

/// The application bootstrap.
pub struct Bootstrap {
    registry: Registry,
    source: Rc<dyn RequestSource>,
    sink: Option<Sink>,
    controllers: BTreeMap<String, ControllerFactory>,
    api_delegates: BTreeMap<String, ApiDelegateFactory>,
    phase: Phase,
}

impl Bootstrap {
    /// Creates the bootstrap with the loader and request source it will
    /// build everything else from. The event bus exists immediately so
    /// listeners can be registered before [`Bootstrap::init`].
    pub fn new(loader: Rc<dyn Loader>, source: Rc<dyn RequestSource>) -> Self {
        let mut registry = Registry::new();
        registry.set_loader(loader);
        registry.set_event(Rc::new(EventBus::new()));

        Self {
            registry,
            source,
            sink: None,
            controllers: BTreeMap::new(),
            api_delegates: BTreeMap::new(),
            phase: Phase::Uninitialized,
        }
    }

    /// Creates the bootstrap writing output to the sink passed instead
    /// of stdout.
    pub fn with_sink(
        loader: Rc<dyn Loader>,
        source: Rc<dyn RequestSource>,
        sink: Sink,
    ) -> Self {
        let mut bootstrap = Self::new(loader, source);
        bootstrap.sink = Some(sink);
        bootstrap
    }

    /// The registry of live subsystems.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The registry, mutably, for pre-filling or replacing slots.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Where the app is in its lifecycle.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Maps a first URL segment to a controller factory.
    pub fn register_controller(&mut self, name: &str, factory: ControllerFactory) {
        self.controllers.insert(name.to_string(), factory);
    }

    /// Maps a second URL segment to an API delegate factory.
    pub fn register_api_delegate(&mut self, name: &str, factory: ApiDelegateFactory) {
        self.api_delegates.insert(name.to_string(), factory);
    }

    /// The API delegate factory registered under the name, if any.
    pub fn api_delegate(&self, name: &str) -> Option<&ApiDelegateFactory> {
        self.api_delegates.get(name)
    }

    /// The auth package, if one was registered.
    pub fn auth(&self) -> Option<Rc<Auth>> {
        self.registry.object("auth").ok()?.downcast::<Auth>().ok()
    }

    /// Whether the current user is authenticated. False without an auth
    /// package.
    pub fn authenticated(&self) -> bool {
        self.auth()
            .map(|auth| auth.is_authenticated().unwrap_or(false))
            .unwrap_or(false)
    }

    /// Constructs the subsystems that have not been registered yet, in
    /// fixed order: config, error, debug, language, router, output.
    ///
    /// Emits `bootstrap.init.before` and `bootstrap.init.after`.
    pub fn init(&mut self, env: &str) -> Result<(), TineError> {
        let event = self.registry.event()?;
        event.trigger("bootstrap.init.before", None, false, false)?;

        if !self.registry.has("config") {
            self.init_config(env)?;
        }
        if !self.registry.has("error") {
            self.init_error()?;
        }
        if !self.registry.has("debug") {
            self.registry.set_debug(Rc::new(Debugger::new()));
        }
        if !self.registry.has("language") {
            self.registry.set_language(Rc::new(Passthrough));
        }
        if !self.registry.has("router") {
            self.init_router()?;
        }
        if !self.registry.has("output") {
            self.init_output()?;
        }

        event.trigger("bootstrap.init.after", None, false, false)?;
        self.phase = Phase::Initialized;
        Ok(())
    }

    /// Loads the global config and layers the environment config over
    /// it.
    fn init_config(&mut self, env: &str) -> Result<(), TineError> {
        let loader = self.registry.loader()?;
        let mut config = loader.load_config("global").unwrap_or_default();
        if let Some(overlay) = loader.load_config(&format!("environments/{env}")) {
            config.import(&overlay.export());
        }
        self.registry.set_config(Rc::new(config));
        Ok(())
    }

    fn init_error(&mut self) -> Result<(), TineError> {
        let verbose = self.registry.config()?.path_bool("error.verbose", false);
        self.registry.set_error(Rc::new(Errors::new(verbose)));
        Ok(())
    }

    /// Builds the router from config, installs the rewrite table and
    /// parses the current request. The router is not shared between
    /// requests because it can be useful to parse routes other than the
    /// current one (see the internal API).
    fn init_router(&mut self) -> Result<(), TineError> {
        let config = self.registry.config()?;
        let router = Router::new(
            self.source.clone(),
            config.path_str("router.urls.base", "").to_string(),
            config.path_bool("router.defaults.endslash", false),
            config.path_bool("router.defaults.mixedpost", false),
        );

        if let Some(Value::Array(rules)) = config.get_path("router.routes") {
            let pairs: Vec<(&str, &str)> = rules
                .iter()
                .filter_map(|rule| match rule.as_array()?.as_slice() {
                    [pattern, replacement] => Some((pattern.as_str()?, replacement.as_str()?)),
                    _ => None,
                })
                .collect();
            router.set_routes(pairs)?;
        }

        router.detect_cli();
        router.init(None, None, None);
        self.registry.set_router(Rc::new(router));
        Ok(())
    }

    /// Builds the output buffer and registers the teardown listener
    /// that flushes it on `shutdown.run.before`.
    fn init_output(&mut self) -> Result<(), TineError> {
        let event = self.registry.event()?;
        let loader = self.registry.loader()?;
        let output = Rc::new(match &self.sink {
            Some(sink) => Output::with_sink(event.clone(), loader, sink.clone()),
            None => Output::new(event.clone(), loader),
        });
        self.registry.set_output(output.clone());

        event.listen(
            "shutdown.run.before",
            Rc::new(move |_bound, _runtime| {
                output.flush();
                Value::Null
            }),
            vec![],
        );
        Ok(())
    }

    /// Resolves the controller from the first URL segment (falling back
    /// to the configured default) and dispatches to it. A segment with
    /// no registered controller renders a 404 through the fatal path.
    ///
    /// Emits `bootstrap.run.before` and `bootstrap.run.after`.
    pub fn run(&mut self) -> Result<(), TineError> {
        self.phase = Phase::Running;
        let event = self.registry.event()?;
        event.trigger("bootstrap.run.before", None, false, false)?;

        let fallback = self
            .registry
            .config()?
            .path_str("router.defaults.controller", "home")
            .to_string();
        let segment = self
            .registry
            .router()?
            .segment(0)
            .unwrap_or(fallback);

        let controller = self.controllers.get(&segment).map(|factory| factory());
        match controller {
            Some(controller) => {
                tracing::debug!(target: "tine::bootstrap", controller = %segment, "dispatching");
                self.registry.set_controller(controller.clone());
                controller.run(self)?;
            }
            None => {
                tracing::debug!(
                    target: "tine::bootstrap",
                    controller = %segment,
                    "no controller registered"
                );
                self.fatal(404, None, None)?;
            }
        }

        self.registry
            .event()?
            .trigger("bootstrap.run.after", None, false, false)?;
        Ok(())
    }

    /// Drops the registry references in teardown order. The error
    /// subsystem is deliberately retained because later code may still
    /// need it.
    ///
    /// Emits `shutdown.run.before`, which flushes the output buffer.
    pub fn shutdown(&mut self) {
        if let Ok(event) = self.registry.event() {
            // cannot fail without the fatal flag
            let _ = event.trigger("shutdown.run.before", None, false, false);
        }

        for name in [
            "controller",
            "output",
            "loader",
            "router",
            "debug",
            "event",
            "config",
            "language",
        ] {
            self.registry.remove(name);
        }
        self.phase = Phase::ShutDown;
    }

    /// Renders a fatal error: the `errors/<statusCode>` template when
    /// one exists, `errors/catchall` otherwise, with any buffered
    /// output cleared first. This is the single unified path for routed
    /// 404s and uncaught failures alike.
    pub fn fatal(
        &self,
        status: u16,
        reason: Option<&str>,
        exception: Option<&TineError>,
    ) -> Result<(), TineError> {
        let loader = self.registry.loader()?;
        let output = self.registry.output()?;

        let mut template = format!("errors/{status}");
        if !loader.is_template(&template) {
            template = "errors/catchall".to_string();
        }

        let reason = reason
            .map(str::to_string)
            .or_else(|| status_string(status).map(str::to_string))
            .unwrap_or_default();

        output.clear();
        output.set_status_code(status);
        output.add_template(
            &template,
            &json!({
                "statusCode": status,
                "statusString": reason,
                "exception": exception.map(|err| err.to_string()),
            }),
            None,
        )?;
        Ok(())
    }

    /// Initializes, runs and shuts down in one call, catching any
    /// failure at this outermost boundary and rendering it through
    /// [`Bootstrap::fatal`] with the failure's status code.
    pub fn execute(&mut self, env: &str) -> Result<(), TineError> {
        if let Err(err) = self.init(env).and_then(|()| self.run()) {
            tracing::error!(target: "tine::bootstrap", "unhandled failure: {err}");
            if let Ok(errors) = self.registry.error() {
                errors.error(&err.to_string());
            }
            self.fatal(err.status_code(), None, Some(&err))?;
        }
        self.shutdown();
        Ok(())
    }
}
