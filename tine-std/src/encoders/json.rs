//! JSON encoding.

use tine_core::{BoxError, EncodeArgs, EncoderHandler, Value};

/// Encodes a value to JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct Json;

impl EncoderHandler for Json {
    fn encode(&self, source: &Value, args: &EncodeArgs) -> Result<String, BoxError> {
        let encoded = if args.pretty {
            serde_json::to_string_pretty(source)?
        } else {
            serde_json::to_string(source)?
        };
        Ok(encoded)
    }

    fn header(&self) -> &'static str {
        "Content-type: application/json"
    }
}
