//! Output Tree
//!
//! What a render pass produces. Hosts can walk it, serialize it as JSON, or
//! turn it into markup with [`Element::to_html`].

use serde::Serialize;
use serde_json::Value;

use crate::coerce::to_js_string;
use crate::document::{Props, SvgTag};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// SVG attributes whose canonical spelling is camelCase.
const CAMEL_CASE_SVG_ATTRS: &[&str] = &[
    "attributeName", "attributeType", "baseFrequency", "calcMode", "clipPathUnits",
    "diffuseConstant", "edgeMode", "filterUnits", "gradientTransform", "gradientUnits",
    "kernelMatrix", "kernelUnitLength", "keyPoints", "keySplines", "keyTimes", "lengthAdjust",
    "limitingConeAngle", "markerHeight", "markerUnits", "markerWidth", "maskContentUnits",
    "maskUnits", "numOctaves", "pathLength", "patternContentUnits", "patternTransform",
    "patternUnits", "pointsAtX", "pointsAtY", "pointsAtZ", "preserveAlpha",
    "preserveAspectRatio", "primitiveUnits", "refX", "refY", "repeatCount", "repeatDur",
    "requiredExtensions", "specularConstant", "specularExponent", "spreadMethod",
    "startOffset", "stdDeviation", "stitchTiles", "surfaceScale", "systemLanguage",
    "tableValues", "targetX", "targetY", "textLength", "viewBox", "xChannelSelector",
    "yChannelSelector",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Text {
        content: String,
    },
    /// Native SVG root; props exactly as authored.
    Svg {
        key: String,
        props: Props,
        children: Vec<Element>,
    },
    /// Native host element: an SVG primitive or generic markup.
    Native {
        tag: String,
        key: String,
        props: Props,
        children: Vec<Element>,
    },
    /// Output of a registered capability that renders as an opaque component.
    Component {
        name: String,
        key: String,
        props: Props,
        children: Vec<Element>,
    },
    /// Visible placeholder for a component type nobody registered.
    Missing {
        type_name: String,
        key: String,
    },
    /// Top-level wrapper exposing the source document.
    SourceView {
        document_id: String,
        fingerprint: String,
        source: String,
        child: Option<Box<Element>>,
    },
}

impl Element {
    pub fn text(content: impl Into<String>) -> Self {
        Element::Text {
            content: content.into(),
        }
    }

    pub fn component(name: impl Into<String>, props: Props, children: Vec<Element>) -> Self {
        Element::Component {
            name: name.into(),
            key: String::new(),
            props,
            children,
        }
    }

    pub fn native(tag: impl Into<String>, props: Props, children: Vec<Element>) -> Self {
        Element::Native {
            tag: tag.into(),
            key: String::new(),
            props,
            children,
        }
    }

    /// Fill in the list key unless the element already carries one.
    pub fn with_key(mut self, new_key: impl Into<String>) -> Self {
        match &mut self {
            Element::Svg { key, .. }
            | Element::Native { key, .. }
            | Element::Component { key, .. }
            | Element::Missing { key, .. } => {
                if key.is_empty() {
                    *key = new_key.into();
                }
            }
            Element::Text { .. } | Element::SourceView { .. } => {}
        }
        self
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Element::Svg { key, .. }
            | Element::Native { key, .. }
            | Element::Component { key, .. }
            | Element::Missing { key, .. } => Some(key),
            Element::Text { .. } | Element::SourceView { .. } => None,
        }
    }

    pub fn props(&self) -> Option<&Props> {
        match self {
            Element::Svg { props, .. }
            | Element::Native { props, .. }
            | Element::Component { props, .. } => Some(props),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Svg { children, .. }
            | Element::Native { children, .. }
            | Element::Component { children, .. } => children,
            Element::SourceView { child: Some(child), .. } => std::slice::from_ref(&**child),
            _ => &[],
        }
    }

    /// All visible text in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Element::Text { content } => out.push_str(content),
            Element::Missing { type_name, .. } => {
                out.push_str("Unknown component: ");
                out.push_str(type_name);
            }
            _ => self.children().iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Depth-first search for the first element matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(predicate))
    }

    pub fn find_component(&self, name: &str) -> Option<&Element> {
        self.find(&|e| matches!(e, Element::Component { name: n, .. } if n == name))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Element::Text { content } => out.push_str(&htmlize::escape_text(content.as_str())),
            Element::Svg { props, children, .. } => write_tag(out, "svg", props, children),
            Element::Native { tag, props, children, .. } => write_tag(out, tag, props, children),
            Element::Component { name, props, children, .. } => {
                out.push_str("<div data-component=\"");
                out.push_str(&htmlize::escape_attribute(name.as_str()));
                out.push('"');
                write_attrs(out, props, false);
                out.push('>');
                children.iter().for_each(|c| c.write_html(out));
                out.push_str("</div>");
            }
            Element::Missing { type_name, .. } => {
                out.push_str("<span class=\"forgeui-missing\" data-missing-type=\"");
                out.push_str(&htmlize::escape_attribute(type_name.as_str()));
                out.push_str("\">Unknown component: ");
                out.push_str(&htmlize::escape_text(type_name.as_str()));
                out.push_str("</span>");
            }
            Element::SourceView { document_id, fingerprint, source, child } => {
                out.push_str("<div class=\"forgeui-source-view\" data-layout-id=\"");
                out.push_str(&htmlize::escape_attribute(document_id.as_str()));
                out.push_str("\" data-fingerprint=\"");
                out.push_str(fingerprint);
                out.push_str("\">");
                if let Some(child) = child {
                    child.write_html(out);
                }
                out.push_str("<button type=\"button\" class=\"forgeui-source-button\" data-layout-source=\"");
                out.push_str(&htmlize::escape_attribute(source.as_str()));
                out.push_str("\">View source</button></div>");
            }
        }
    }
}

fn write_tag(out: &mut String, tag: &str, props: &Props, children: &[Element]) {
    if !is_valid_name(tag) {
        log::warn!("Skipping element with invalid tag name '{}'", tag);
        return;
    }
    out.push('<');
    out.push_str(tag);
    write_attrs(out, props, tag == "svg" || tag.parse::<SvgTag>().is_ok());
    out.push('>');
    if VOID_TAGS.contains(&tag) {
        return;
    }
    children.iter().for_each(|c| c.write_html(out));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_attrs(out: &mut String, props: &Props, svg: bool) {
    for (name, value) in props {
        if name == "children" || name == "key" || !is_valid_name(name) || is_event_handler(name) {
            continue;
        }
        let attr = attribute_name(name, svg);
        let text = match value {
            Value::Null | Value::Bool(false) => continue,
            Value::Bool(true) => {
                out.push(' ');
                out.push_str(&attr);
                continue;
            }
            Value::Object(decls) if name == "style" => inline_css(decls),
            Value::String(s) => s.clone(),
            Value::Number(_) => to_js_string(value),
            other => other.to_string(),
        };
        out.push(' ');
        out.push_str(&attr);
        out.push_str("=\"");
        out.push_str(&htmlize::escape_attribute(text.as_str()));
        out.push('"');
    }
}

/// Markup attribute for a prop name. On SVG elements, camelCase presentation
/// props (`strokeWidth`) become their hyphenated attributes (`stroke-width`).
fn attribute_name(name: &str, svg: bool) -> String {
    if name == "className" {
        return "class".to_string();
    }
    if !svg || CAMEL_CASE_SVG_ATTRS.contains(&name) {
        return name.to_string();
    }
    for (prefix, namespace) in [("xlink", "xlink:"), ("xmlns", "xmlns:"), ("xml", "xml:")] {
        if let Some(rest) = name.strip_prefix(prefix) {
            if rest.starts_with(|c: char| c.is_ascii_uppercase()) {
                return format!("{}{}", namespace, rest.to_ascii_lowercase());
            }
        }
    }
    kebab_case(name)
}

fn inline_css(decls: &Props) -> String {
    decls
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| format!("{}:{}", kebab_case(k), to_js_string(v)))
        .collect::<Vec<_>>()
        .join(";")
}

fn kebab_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2 && name.get(..2).map_or(false, |p| p.eq_ignore_ascii_case("on"))
}
