//! Standard encoder handlers: JSON, JSONP and XML.

mod json;
mod jsonp;
mod xml;

pub use json::Json;
pub use jsonp::Jsonp;
pub use xml::Xml;

use tine_core::{EncoderHandler, HandlerConfig};

/// The standard encoder handler config: `json`, `jsonp` and `xml`, none
/// active until one is selected by extension.
pub fn standard_config() -> Vec<(String, HandlerConfig<dyn EncoderHandler>)> {
    vec![
        (
            "xml".to_string(),
            HandlerConfig::new(false, |_| Ok(Box::new(Xml) as Box<dyn EncoderHandler>)),
        ),
        (
            "json".to_string(),
            HandlerConfig::new(false, |_| Ok(Box::new(Json) as Box<dyn EncoderHandler>)),
        ),
        (
            "jsonp".to_string(),
            HandlerConfig::new(false, |_| Ok(Box::new(Jsonp) as Box<dyn EncoderHandler>)),
        ),
    ]
}
