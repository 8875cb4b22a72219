//! The controller seam and the built-in API controller.

use std::rc::Rc;

use tine_core::{EncodeArgs, Encoder, TineError, Value};
use tine_std::encoders;

use crate::api::Api;
use crate::bootstrap::Bootstrap;

/// Handles one routed request and queues the response.
///
/// The bootstrap resolves a controller from the first URL segment,
/// registers it, and calls [`Controller::run`] exactly once.
pub trait Controller {
    /// Processes the request using the app's subsystems.
    fn run(&self, app: &Bootstrap) -> Result<(), TineError>;
}

/// Builds a controller instance for one request.
pub type ControllerFactory = Box<dyn Fn() -> Rc<dyn Controller>>;

/// The default API controller.
///
/// Dispatches to the [`Api`] layer and encodes the resulting
/// `(statusCode, success, result)` envelope into the format named by the
/// URL extension (falling back to the configured default encoder), then
/// queues the status line, content-type header and encoded body.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApiController;

impl ApiController {
    /// Creates the controller.
    pub fn new() -> Self {
        Self
    }

    fn encode(
        &self,
        app: &Bootstrap,
        format: &str,
        success: bool,
        result: &Value,
    ) -> Result<(String, String), TineError> {
        let encoder = Encoder::new();
        encoder.init(encoders::standard_config())?;

        let mut envelope = serde_json::Map::new();
        envelope.insert("success".to_string(), Value::Bool(success));
        if let Value::Object(map) = result {
            for (key, value) in map {
                envelope.insert(key.clone(), value.clone());
            }
        }
        let envelope = Value::Object(envelope);

        let args = match format {
            "xml" => EncodeArgs {
                format_node: Some(Rc::new(|node: &str, parent: &str| {
                    match parent {
                        "errors" => "error".to_string(),
                        "batched" => "result".to_string(),
                        "encoders" => "ext".to_string(),
                        _ => node.to_string(),
                    }
                })),
                ..EncodeArgs::default()
            },
            "jsonp" => EncodeArgs {
                callback: app.registry().router()?.variable("callback"),
                ..EncodeArgs::default()
            },
            "json" => EncodeArgs::default(),
            other => {
                let language = app.registry().language()?;
                return Err(TineError::Custom(
                    language
                        .translate(&format!("Invalid encoder: {other}"))
                        .into(),
                ));
            }
        };

        encoder.encode_with(format, &envelope, &args)
    }
}

impl Controller for ApiController {
    fn run(&self, app: &Bootstrap) -> Result<(), TineError> {
        let event = app.registry().event()?;
        event.trigger("controller.run.before", None, true, false)?;

        let router = app.registry().router()?;
        let api = Api::new(router.clone(), app.authenticated(), false);
        let format = router.extension().unwrap_or_else(|| {
            app.registry()
                .config()
                .map(|config| {
                    config
                        .path_str("interfaces.api.defaults.encoder", "json")
                        .to_string()
                })
                .unwrap_or_else(|_| "json".to_string())
        });

        let (status, success, result) = api.run(app)?;
        let (header, content) = self.encode(app, &format, success, &result)?;

        let output = app.registry().output()?;
        output.set_status_code(if status == 0 { 200 } else { status });
        output.add_header(&header);
        output.add_content(&content);

        event.trigger("controller.run.after", None, true, false)?;
        Ok(())
    }
}
