//! The authentication package.
//!
//! [`Auth`] delegates every call to exactly one active [`AuthHandler`];
//! having zero or several active handlers is a dispatch error, not a
//! silent pick.

use std::cell::RefCell;

use tine_core::{AuthHandler, DispatchError, Dispatched, Dispatcher, HandlerConfig, Value};

/// Loads an authentication system and delegates processing to it.
pub struct Auth {
    dispatcher: RefCell<Dispatcher<dyn AuthHandler>>,
}

impl Default for Auth {
    fn default() -> Self {
        Self::new()
    }
}

impl Auth {
    /// Creates the subsystem. Exactly one handler must be active.
    pub fn new() -> Self {
        Self {
            dispatcher: RefCell::new(Dispatcher::new(1, Some(1))),
        }
    }

    /// Replaces all handlers from config.
    pub fn init(
        &self,
        config: Vec<(String, HandlerConfig<dyn AuthHandler>)>,
    ) -> Result<(usize, usize), DispatchError> {
        self.dispatcher.borrow_mut().init(config)
    }

    /// Adds a handler.
    pub fn add_handler(&self, name: &str, handler: Box<dyn AuthHandler>, active: bool) {
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

    fn one<R>(result: Dispatched<R>) -> R {
        match result.into_one() {
            Some(result) => result,
            // minimum and maximum are both 1, so exactly one handler ran
            None => unreachable!(),
        }
    }

    /// Authenticates by username and password.
    pub fn standard_auth(&self, username: &str, password: &str) -> Result<bool, DispatchError> {
        self.dispatcher
            .borrow()
            .dispatch(|handler| handler.standard_auth(username, password))
            .map(Self::one)
    }

    /// Authenticates by cookie.
    pub fn cookie_auth(&self) -> Result<bool, DispatchError> {
        self.dispatcher
            .borrow()
            .dispatch(|handler| handler.cookie_auth())
            .map(Self::one)
    }

    /// Logs the user out.
    pub fn logout(&self) -> Result<bool, DispatchError> {
        self.dispatcher
            .borrow()
            .dispatch(|handler| handler.logout())
            .map(Self::one)
    }

    /// Whether the user is authenticated.
    pub fn is_authenticated(&self) -> Result<bool, DispatchError> {
        self.dispatcher
            .borrow()
            .dispatch(|handler| handler.is_authenticated())
            .map(Self::one)
    }

    /// The user's ID, if authenticated.
    pub fn user_id(&self) -> Result<Option<u64>, DispatchError> {
        self.dispatcher
            .borrow()
            .dispatch(|handler| handler.user_id())
            .map(Self::one)
    }

    /// The user's username, if authenticated.
    pub fn user_name(&self) -> Result<Option<String>, DispatchError> {
        self.dispatcher
            .borrow()
            .dispatch(|handler| handler.user_name())
            .map(Self::one)
    }
}

/// Answers authentication with hard-coded account data.
#[derive(Clone, Debug, Default)]
pub struct Spoofed {
    authenticated: bool,
    user_id: Option<u64>,
    user_name: Option<String>,
}

impl Spoofed {
    /// Creates the handler with fixed account data.
    pub fn new(authenticated: bool, user_id: Option<u64>, user_name: Option<String>) -> Self {
        Self {
            authenticated,
            user_id,
            user_name,
        }
    }

    /// Creates the handler from config params
    /// (`{"authenticated": bool, "userid": int, "username": str}`).
    pub fn from_params(params: &Value) -> Self {
        Self {
            authenticated: params
                .get("authenticated")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            user_id: params.get("userid").and_then(Value::as_u64),
            user_name: params
                .get("username")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

impl AuthHandler for Spoofed {
    fn standard_auth(&self, _username: &str, _password: &str) -> bool {
        true
    }

    fn cookie_auth(&self) -> bool {
        true
    }

    fn logout(&self) -> bool {
        true
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn user_id(&self) -> Option<u64> {
        self.user_id
    }

    fn user_name(&self) -> Option<String> {
        self.user_name.clone()
    }
}
