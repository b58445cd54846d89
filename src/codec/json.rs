//! JSON rendering options shared by the JSON based codecs.

use super::Codec;
use crate::error::{ReportError, Result};
use crate::options::{OptionSpec, ResolvedOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    pub pretty: bool,
    pub escape_slash: bool,
    pub escape_unicode: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            pretty: false,
            escape_slash: true,
            escape_unicode: true,
        }
    }
}

impl JsonOptions {
    pub fn specs() -> Vec<OptionSpec> {
        vec![
            OptionSpec::flag("pretty", "Pretty print the JSON output", false),
            OptionSpec::flag("escape-slash", "Escape '/' as '\\/'", true),
            OptionSpec::flag("escape-unicode", "Escape non-ASCII characters as \\uXXXX", true),
        ]
    }

    pub fn from_resolved(options: &ResolvedOptions) -> Result<Self> {
        Ok(JsonOptions {
            pretty: options.flag("pretty")?,
            escape_slash: options.flag("escape-slash")?,
            escape_unicode: options.flag("escape-unicode")?,
        })
    }
}

/// Serialize `value` honoring the escaping and layout options.
///
/// `/` and non-ASCII characters can only occur inside JSON strings, so the
/// escapes are applied on the serialized text.
pub fn render_json<T: Serialize + ?Sized>(value: &T, options: &JsonOptions) -> Result<String> {
    let text = if options.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| ReportError::format("json", e.to_string()))?;

    if !options.escape_slash && !options.escape_unicode {
        return Ok(text);
    }
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut units = [0u16; 2];
    for c in text.chars() {
        if c == '/' && options.escape_slash {
            out.push_str("\\/");
        } else if !c.is_ascii() && options.escape_unicode {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Deserialize a codec's input, mapping syntax errors to a format error.
pub fn parse_json<T: DeserializeOwned>(codec: &dyn Codec, input: &str) -> Result<T> {
    serde_json::from_str(input).map_err(|e| ReportError::format(codec.name(), e.to_string()))
}
