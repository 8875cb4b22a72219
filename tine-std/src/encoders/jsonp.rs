//! JSONP encoding: JSON wrapped in a script-safe callback invocation.

use tine_core::{BoxError, EncodeArgs, EncoderHandler, Value};

/// Encodes a value to JSON and wraps it in the caller-named callback.
///
/// The callback name is sanitized to `[a-zA-Z0-9_.]` so a hostile
/// `callback` variable cannot inject script.
#[derive(Clone, Copy, Debug, Default)]
pub struct Jsonp;

impl EncoderHandler for Jsonp {
    fn encode(&self, source: &Value, args: &EncodeArgs) -> Result<String, BoxError> {
        let callback: String = args
            .callback
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
            .collect();
        if callback.is_empty() {
            return Err("jsonp encoding requires a callback name".into());
        }

        let json = serde_json::to_string(source)?;
        Ok(format!("{callback}({json})"))
    }

    fn header(&self) -> &'static str {
        "Content-type: application/javascript"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wraps_json_in_the_callback() {
        let args = EncodeArgs {
            callback: Some("handle.result".into()),
            ..EncodeArgs::default()
        };
        let encoded = Jsonp.encode(&json!({"ok": true}), &args).unwrap();
        assert_eq!(encoded, r#"handle.result({"ok":true})"#);
    }

    #[test]
    fn hostile_callback_names_are_sanitized() {
        let args = EncodeArgs {
            callback: Some("evil();alert".into()),
            ..EncodeArgs::default()
        };
        let encoded = Jsonp.encode(&json!(1), &args).unwrap();
        assert_eq!(encoded, "evilalert(1)");
    }

    #[test]
    fn a_missing_callback_is_an_error() {
        assert!(Jsonp.encode(&json!(1), &EncodeArgs::default()).is_err());
    }
}
