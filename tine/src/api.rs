//! The API layer.
//!
//! [`Api`] is the base handler for API calls. It works nearly the same
//! as a controller except it returns its results in an envelope instead
//! of queuing output, which lets the API controller encode them and
//! lets [`internal`] consume them without an HTTP round trip.
//!
//! URLs with more than two segments delegate to a registered
//! [`ApiDelegate`] named by the second segment; otherwise the second
//! segment (minus the extension) names a built-in operation: `batch`
//! runs several spoofed sub-requests in one call, `encoders` lists the
//! available output formats.

use std::rc::Rc;

use tine_core::{Router, TineError, Value, parse_query_str};

use crate::bootstrap::Bootstrap;

/// An API result: status code, success flag and result data.
pub type ApiResponse = (u16, bool, Value);

/// A registered sub-handler for one API namespace.
pub trait ApiDelegate {
    /// Processes the API call and returns its envelope.
    fn run(&self, app: &Bootstrap) -> Result<ApiResponse, TineError>;
}

/// Builds a delegate for one request: router, authenticated, internal.
pub type ApiDelegateFactory = Box<dyn Fn(Rc<Router>, bool, bool) -> Rc<dyn ApiDelegate>>;

/// The base handler for API calls.
pub struct Api {
    router: Rc<Router>,
    authenticated: bool,
    internal: bool,
}

impl Api {
    /// Creates the handler. The router carries the URL of the API
    /// request; `internal` grants access to the internal-only methods.
    pub fn new(router: Rc<Router>, authenticated: bool, internal: bool) -> Self {
        Self {
            router,
            authenticated,
            internal,
        }
    }

    /// Whether the calling user is authenticated.
    pub fn authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether this is an internal call with extra permissions.
    pub fn internal(&self) -> bool {
        self.internal
    }

    /// Dispatches to a delegate or a built-in operation and returns the
    /// result envelope.
    pub fn run(&self, app: &Bootstrap) -> Result<ApiResponse, TineError> {
        let segments = self.router.segments();
        if segments.len() > 2 {
            let name = segments[1].clone();
            return match app.api_delegate(&name) {
                Some(factory) => {
                    let delegate =
                        factory(self.router.clone(), self.authenticated, self.internal);
                    delegate.run(app)
                }
                None => {
                    let language = app.registry().language()?;
                    app.registry()
                        .error()?
                        .error(&language.translate("Invalid API class"));
                    Ok(self.error_response(app, 404))
                }
            };
        }

        self.handle(app)
    }

    /// Maps the second URL segment to a built-in operation.
    fn handle(&self, app: &Bootstrap) -> Result<ApiResponse, TineError> {
        let format = self.router.extension().unwrap_or_default();
        let segment = self
            .router
            .segment(1)
            .unwrap_or_default()
            .replace(&format!(".{format}"), "");

        match segment.as_str() {
            "batch" => self.get_batch(app),
            "encoders" => self.get_encoders(app),
            _ => {
                let language = app.registry().language()?;
                app.registry()
                    .error()?
                    .error(&language.translate("Invalid API method"));
                Ok(self.error_response(app, 404))
            }
        }
    }

    /// Verifies the actual request method matches the one required.
    fn validate(&self, app: &Bootstrap, method: &str) -> Result<bool, TineError> {
        let matched = self.router.method() == method.to_lowercase();
        if !matched {
            let language = app.registry().language()?;
            app.registry().error()?.error(
                &language.translate(&format!("Invalid request method - {method} required")),
            );
        }
        Ok(matched)
    }

    /// Builds an error envelope carrying any collected error messages.
    fn error_response(&self, app: &Bootstrap, status: u16) -> ApiResponse {
        let mut result = serde_json::Map::new();
        if let Ok(errors) = app.registry().error() {
            let messages = errors.messages();
            if !messages.is_empty() {
                result.insert("errors".to_string(), Value::from(messages));
            }
        }
        (status, false, Value::Object(result))
    }

    /// Runs several API calls in one request. The `requests` variable
    /// must be a JSON list of `{key?, method, url, args?}` entries.
    /// Batched calls never get the internal flag.
    fn get_batch(&self, app: &Bootstrap) -> Result<ApiResponse, TineError> {
        let language = app.registry().language()?;
        let Some(requests) = self.router.variable("requests") else {
            app.registry()
                .error()?
                .error(&language.translate("Missing batch definitions"));
            return Ok(self.error_response(app, 400));
        };

        let Ok(Value::Array(requests)) = serde_json::from_str::<Value>(&requests) else {
            app.registry()
                .error()?
                .error(&language.translate("Invalid batch definitions"));
            return Ok(self.error_response(app, 400));
        };

        let mut batched = serde_json::Map::new();
        for (index, request) in requests.iter().enumerate() {
            let key = request
                .get("key")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| index.to_string());
            let method = request.get("method").and_then(Value::as_str);
            let url = request.get("url").and_then(Value::as_str);

            let (Some(method), Some(url)) = (method, url) else {
                app.registry()
                    .error()?
                    .error(&language.translate("Missing request type and/or URL"));
                return Ok(self.error_response(app, 400));
            };

            let response = match method.to_lowercase().as_str() {
                "get" => Some(internal::get(app, url, false)?),
                "post" => {
                    let mut variables = tine_core::Variables::new();
                    if let Some(Value::Object(args)) = request.get("args") {
                        for (name, value) in args {
                            let text = match value {
                                Value::String(text) => text.clone(),
                                other => other.to_string(),
                            };
                            variables.insert(name.clone(), text);
                        }
                    }
                    Some(internal::post(app, url, variables, false)?)
                }
                "put" => Some(internal::put(app, url, false)?),
                "delete" => Some(internal::delete(app, url, false)?),
                _ => None,
            };

            if let Some((status, success, data)) = response {
                batched.insert(
                    key,
                    serde_json::json!({
                        "status": status,
                        "success": success,
                        "data": data,
                    }),
                );
            }
        }

        Ok((
            200,
            true,
            serde_json::json!({ "batched": Value::Object(batched) }),
        ))
    }

    /// Lists the encoders available to format results.
    fn get_encoders(&self, app: &Bootstrap) -> Result<ApiResponse, TineError> {
        if !self.validate(app, "GET")? {
            return Ok(self.error_response(app, 400));
        }

        let configured: Vec<String> = app
            .registry()
            .config()
            .ok()
            .and_then(|config| {
                config.get_tree("encoder").and_then(|encoder| {
                    encoder.get_tree("handlers").map(|handlers| {
                        match handlers.export() {
                            Value::Object(map) => map.keys().cloned().collect(),
                            _ => Vec::new(),
                        }
                    })
                })
            })
            .filter(|names: &Vec<String>| !names.is_empty())
            .unwrap_or_else(|| vec!["json".into(), "jsonp".into(), "xml".into()]);

        Ok((
            200,
            true,
            serde_json::json!({ "encoders": configured }),
        ))
    }
}

/// Spoofed internal API calls.
///
/// These call local API methods by URL without an actual HTTP request,
/// by cloning the app's router (the clone never inherits the CLI flag)
/// and re-initializing it with the spoofed method and URL.
pub mod internal {
    use super::{Api, ApiResponse, Bootstrap, Rc, TineError, parse_query_str};
    use tine_core::Variables;

    /// Spoofs an API GET. A query string on the URL becomes the request
    /// variables.
    pub fn get(app: &Bootstrap, url: &str, internal: bool) -> Result<ApiResponse, TineError> {
        let (url, variables) = match url.split_once('?') {
            Some((path, query)) => (path, parse_query_str(query)),
            None => (url, Variables::new()),
        };
        request(app, "GET", url, variables, internal)
    }

    /// Spoofs an API POST with the data passed.
    pub fn post(
        app: &Bootstrap,
        url: &str,
        variables: Variables,
        internal: bool,
    ) -> Result<ApiResponse, TineError> {
        request(app, "POST", url, variables, internal)
    }

    /// Spoofs an API PUT.
    pub fn put(app: &Bootstrap, url: &str, internal: bool) -> Result<ApiResponse, TineError> {
        request(app, "PUT", url, Variables::new(), internal)
    }

    /// Spoofs an API DELETE.
    pub fn delete(app: &Bootstrap, url: &str, internal: bool) -> Result<ApiResponse, TineError> {
        request(app, "DELETE", url, Variables::new(), internal)
    }

    /// Spoofs a request and retrieves the result. If the status code is
    /// in the error range but no new errors were collected, a generic
    /// error is reported so the caller always has something to show.
    fn request(
        app: &Bootstrap,
        method: &str,
        url: &str,
        variables: Variables,
        internal: bool,
    ) -> Result<ApiResponse, TineError> {
        let router = Rc::new(app.registry().router()?.as_ref().clone());
        router.init(Some(method), Some(url), Some(variables));

        let errors = app.registry().error()?;
        let errors_before = errors.count();

        let api = Api::new(router, app.authenticated(), internal);
        let (status, success, result) = api.run(app)?;

        if status >= 400 && errors.count() <= errors_before {
            let language = app.registry().language()?;
            errors.error(&language.translate("Undefined error"));
        }

        Ok((status, success, result))
    }
}
