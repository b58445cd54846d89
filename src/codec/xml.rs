//! XML building and reading shared by the XML based codecs.
//!
//! Documents are assembled as a small element tree and written out by hand;
//! reading goes through `roxmltree`.

use super::Codec;
use crate::error::{ReportError, Result};
use crate::options::{OptionSpec, ResolvedOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmlOptions {
    pub pretty: bool,
}

impl XmlOptions {
    pub fn specs() -> Vec<OptionSpec> {
        vec![OptionSpec::flag("pretty", "Indent the XML output", false)]
    }

    pub fn from_resolved(options: &ResolvedOptions) -> Result<Self> {
        Ok(XmlOptions {
            pretty: options.flag("pretty")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        XmlElement {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.attrs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }
}

/// Escape text for element content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

/// Write `root` as a complete UTF-8 document.
pub fn render_xml(root: &XmlElement, options: &XmlOptions) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root, 0, options.pretty);
    out.push('\n');
    out
}

fn write_element(out: &mut String, el: &XmlElement, depth: usize, pretty: bool) {
    let indent = |out: &mut String, depth: usize| {
        if pretty {
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        }
    };
    out.push('<');
    out.push_str(&el.name);
    for (k, v) in &el.attrs {
        out.push_str(&format!(" {}=\"{}\"", k, escape_xml(v)));
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    let has_text = el.children.iter().any(|c| matches!(c, XmlNode::Text(_)));
    for child in &el.children {
        match child {
            XmlNode::Text(t) => out.push_str(&escape_xml(t)),
            XmlNode::Element(e) => {
                if !has_text {
                    indent(out, depth + 1);
                }
                write_element(out, e, depth + 1, pretty && !has_text);
            }
        }
    }
    if !has_text {
        indent(out, depth);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

/// Parse a document, mapping syntax errors to a format error.
pub fn parse_xml<'a>(codec: &dyn Codec, input: &'a str) -> Result<roxmltree::Document<'a>> {
    roxmltree::Document::parse(input)
        .map_err(|e| ReportError::format(codec.name(), format!("failed to parse XML: {e}")))
}

/// Element children of `node` with the given tag name.
pub fn children_named<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

pub fn first_child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> Option<roxmltree::Node<'a, 'input>> {
    children_named(node, name).next()
}

/// Numeric attribute; absent or malformed values read as `0`.
pub fn attr_u32(node: roxmltree::Node<'_, '_>, name: &str) -> u32 {
    node.attribute(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
