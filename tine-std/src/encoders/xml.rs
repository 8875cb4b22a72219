//! XML encoding.
//!
//! Builds an XML document from a value tree. Object keys become element
//! names; array elements get a name from the per-parent replacement map
//! (falling back to the numeric prefix), optionally keeping the original
//! index as a `key` attribute.

use tine_core::{BoxError, EncodeArgs, EncoderHandler, Value};

/// Encodes a value to a formatted XML document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xml;

impl EncoderHandler for Xml {
    fn encode(&self, source: &Value, args: &EncodeArgs) -> Result<String, BoxError> {
        let root = args.root_node.as_deref().unwrap_or("root");
        let mut out = String::from("<?xml version=\"1.0\"?>\n");

        if children_of(source).is_empty() && scalar_text(source).is_empty() {
            out.push_str(&format!("<{root}/>\n"));
            return Ok(out);
        }

        out.push_str(&format!("<{root}>\n"));
        build(source, root, args, 1, &mut out);
        out.push_str(&format!("</{root}>\n"));
        Ok(out)
    }

    fn header(&self) -> &'static str {
        "Content-type: text/xml"
    }
}

/// The child entries of an object or array, with stringified keys and a
/// numeric-key flag.
fn children_of(value: &Value) -> Vec<(String, bool, &Value)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| (key.clone(), false, child))
            .collect(),
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(index, child)| (index.to_string(), true, child))
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Picks the element name for a child. Numeric keys take the parent's
/// replacement name or the generic prefix; the format callback gets the
/// final say for every name.
fn node_name(key: &str, numeric: bool, parent: &str, args: &EncodeArgs) -> String {
    let mut name = if !numeric {
        key.to_string()
    } else if let Some(replacement) = args.numeric_replacements.get(parent) {
        replacement.clone()
    } else {
        args.numeric_prefix.as_deref().unwrap_or("node").to_string()
    };

    if let Some(format) = &args.format_node {
        name = format(&name, parent);
    }
    name
}

fn build(value: &Value, parent: &str, args: &EncodeArgs, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (key, numeric, child) in children_of(value) {
        let name = node_name(&key, numeric, parent, args);
        let key_attr = if args.include_keys && name != key {
            format!(" key=\"{}\"", escape(&key))
        } else {
            String::new()
        };

        if child.is_object() || child.is_array() {
            out.push_str(&format!("{indent}<{name}{key_attr}>\n"));
            build(child, &name, args, depth + 1, out);
            out.push_str(&format!("{indent}</{name}>\n"));
        } else {
            out.push_str(&format!(
                "{indent}<{name}{key_attr}>{}</{name}>\n",
                escape(&scalar_text(child))
            ));
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
