//! The bootstrap registry.
//!
//! A fixed set of named slots, one per subsystem, each holding at most
//! one live instance behind an `Rc`. The slots are typed fields with
//! typed accessors; arbitrary extension objects (like the auth package)
//! go through [`Registry::register_object`], which requires explicit
//! create permission for names outside the declared set.
//!
//! Removing an entry only drops the registry's reference; anything else
//! holding the `Rc` keeps the instance alive.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use tine_core::{
    ConfigTree, Debugger, Errors, EventBus, Language, Loader, RegistryError, Router,
};
use tine_std::Output;

use crate::controller::Controller;

/// The slot names the registry declares up front.
const DECLARED: [&str; 9] = [
    "loader",
    "event",
    "config",
    "error",
    "debug",
    "language",
    "router",
    "output",
    "controller",
];

/// The named-slot object lookup table behind the bootstrap.
#[derive(Default)]
pub struct Registry {
    loader: Option<Rc<dyn Loader>>,
    event: Option<Rc<EventBus>>,
    config: Option<Rc<ConfigTree>>,
    error: Option<Rc<Errors>>,
    debug: Option<Rc<Debugger>>,
    language: Option<Rc<dyn Language>>,
    router: Option<Rc<Router>>,
    output: Option<Rc<Output>>,
    controller: Option<Rc<dyn Controller>>,
    objects: BTreeMap<String, Rc<dyn Any>>,
}

fn filled<T: Clone>(slot: &Option<T>, name: &str) -> Result<T, RegistryError> {
    slot.clone()
        .ok_or_else(|| RegistryError::Unregistered { name: name.into() })
}

impl Registry {
    /// Creates a registry with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// The loader seam.
    pub fn loader(&self) -> Result<Rc<dyn Loader>, RegistryError> {
        filled(&self.loader, "loader")
    }

    /// The event bus.
    pub fn event(&self) -> Result<Rc<EventBus>, RegistryError> {
        filled(&self.event, "event")
    }

    /// The config tree.
    pub fn config(&self) -> Result<Rc<ConfigTree>, RegistryError> {
        filled(&self.config, "config")
    }

    /// The error log subsystem.
    pub fn error(&self) -> Result<Rc<Errors>, RegistryError> {
        filled(&self.error, "error")
    }

    /// The debug subsystem.
    pub fn debug(&self) -> Result<Rc<Debugger>, RegistryError> {
        filled(&self.debug, "debug")
    }

    /// The language translator.
    pub fn language(&self) -> Result<Rc<dyn Language>, RegistryError> {
        filled(&self.language, "language")
    }

    /// The router.
    pub fn router(&self) -> Result<Rc<Router>, RegistryError> {
        filled(&self.router, "router")
    }

    /// The output buffer.
    pub fn output(&self) -> Result<Rc<Output>, RegistryError> {
        filled(&self.output, "output")
    }

    /// The controller serving the current request.
    pub fn controller(&self) -> Result<Rc<dyn Controller>, RegistryError> {
        filled(&self.controller, "controller")
    }

    /// Fills the loader slot.
    pub fn set_loader(&mut self, loader: Rc<dyn Loader>) {
        self.loader = Some(loader);
    }

    /// Fills the event slot.
    pub fn set_event(&mut self, event: Rc<EventBus>) {
        self.event = Some(event);
    }

    /// Fills the config slot.
    pub fn set_config(&mut self, config: Rc<ConfigTree>) {
        self.config = Some(config);
    }

    /// Fills the error slot.
    pub fn set_error(&mut self, error: Rc<Errors>) {
        self.error = Some(error);
    }

    /// Fills the debug slot.
    pub fn set_debug(&mut self, debug: Rc<Debugger>) {
        self.debug = Some(debug);
    }

    /// Fills the language slot.
    pub fn set_language(&mut self, language: Rc<dyn Language>) {
        self.language = Some(language);
    }

    /// Fills the router slot.
    pub fn set_router(&mut self, router: Rc<Router>) {
        self.router = Some(router);
    }

    /// Fills the output slot.
    pub fn set_output(&mut self, output: Rc<Output>) {
        self.output = Some(output);
    }

    /// Fills the controller slot.
    pub fn set_controller(&mut self, controller: Rc<dyn Controller>) {
        self.controller = Some(controller);
    }

    /// Registers an extension object under a name outside the declared
    /// slots. Without `create` permission an undeclared name fails with
    /// [`RegistryError::InvalidRegistration`]; so does a declared name,
    /// which must go through its typed setter.
    pub fn register_object(
        &mut self,
        name: &str,
        object: Rc<dyn Any>,
        create: bool,
    ) -> Result<(), RegistryError> {
        if DECLARED.contains(&name) || (!create && !self.objects.contains_key(name)) {
            return Err(RegistryError::InvalidRegistration { name: name.into() });
        }
        self.objects.insert(name.to_string(), object);
        Ok(())
    }

    /// An extension object by name.
    pub fn object(&self, name: &str) -> Result<Rc<dyn Any>, RegistryError> {
        self.objects
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::Unregistered { name: name.into() })
    }

    /// Returns true if the named slot or extension object is filled.
    pub fn has(&self, name: &str) -> bool {
        match name {
            "loader" => self.loader.is_some(),
            "event" => self.event.is_some(),
            "config" => self.config.is_some(),
            "error" => self.error.is_some(),
            "debug" => self.debug.is_some(),
            "language" => self.language.is_some(),
            "router" => self.router.is_some(),
            "output" => self.output.is_some(),
            "controller" => self.controller.is_some(),
            other => self.objects.contains_key(other),
        }
    }

    /// Drops the registry's reference to the named slot or extension
    /// object.
    pub fn remove(&mut self, name: &str) {
        match name {
            "loader" => self.loader = None,
            "event" => self.event = None,
            "config" => self.config = None,
            "error" => self.error = None,
            "debug" => self.debug = None,
            "language" => self.language = None,
            "router" => self.router = None,
            "output" => self.output = None,
            "controller" => self.controller = None,
            other => {
                self.objects.remove(other);
            }
        }
    }
}
