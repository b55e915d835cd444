//! Layout Documents - The Catalog Wire Format
//!
//! A document pairs a flat data bag with a single root node. Node kinds are
//! classified once, at deserialization, into the closed [`Node`] enum.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::coerce::to_js_string;

pub type LayoutId = String;

/// Values available to `{{path}}` placeholders and `$data.path` props.
pub type DataBag = Map<String, Value>;

/// Open string-keyed prop bag; values are the closed JSON variant set.
pub type Props = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct LayoutDocument {
    pub id: LayoutId,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Raw stylesheet text, injected verbatim while the document is mounted.
    pub styles: Option<String>,
    pub data: DataBag,
    pub root: Node,
    authored: Option<Authored>,
}

/// JSON a document was parsed from, next to the canonical shape it parsed to.
#[derive(Debug, Clone)]
struct Authored {
    raw: Value,
    parsed: Value,
}

#[derive(Deserialize)]
struct DocumentWire {
    id: LayoutId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    styles: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    data: DataBag,
    root: Node,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<DataBag, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DataBag>::deserialize(deserializer)?.unwrap_or_default())
}

impl LayoutDocument {
    pub fn new(id: impl Into<LayoutId>, root: Node) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            styles: None,
            data: DataBag::new(),
            root,
            authored: None,
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The document as JSON. A parsed document that has not been modified
    /// since comes back exactly as authored, unknown fields included.
    pub fn source_value(&self) -> Value {
        let canonical = self.canonical_value();
        match &self.authored {
            Some(authored) if authored.parsed == canonical => authored.raw.clone(),
            _ => canonical,
        }
    }

    fn canonical_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".into(), Value::String(self.id.clone()));
        for (name, field) in [
            ("title", &self.title),
            ("description", &self.description),
            ("styles", &self.styles),
        ] {
            if let Some(text) = field {
                obj.insert(name.into(), Value::String(text.clone()));
            }
        }
        if !self.data.is_empty() {
            obj.insert("data".into(), Value::Object(self.data.clone()));
        }
        obj.insert("root".into(), self.root.to_value());
        Value::Object(obj)
    }

    /// Stylesheet text worth injecting, if any.
    pub fn stylesheet(&self) -> Option<&str> {
        self.styles.as_deref().filter(|css| !css.trim().is_empty())
    }
}

impl PartialEq for LayoutDocument {
    fn eq(&self, other: &Self) -> bool {
        self.source_value() == other.source_value()
    }
}

impl Serialize for LayoutDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.source_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LayoutDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let wire = DocumentWire::deserialize(&raw).map_err(serde::de::Error::custom)?;
        let mut document = LayoutDocument {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            styles: wire.styles,
            data: wire.data,
            root: wire.root,
            authored: None,
        };
        let parsed = document.canonical_value();
        document.authored = Some(Authored { raw, parsed });
        Ok(document)
    }
}

/// Closed set of SVG primitive tag names rendered as native SVG elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SvgTag {
    Path,
    Circle,
    Rect,
    G,
    Defs,
    Mask,
    LinearGradient,
    RadialGradient,
    Stop,
    Filter,
    FeDropShadow,
    Marker,
    Animate,
    Text,
    Line,
    Polygon,
    Polyline,
    Ellipse,
}

impl SvgTag {
    pub const ALL: [SvgTag; 18] = [
        SvgTag::Path,
        SvgTag::Circle,
        SvgTag::Rect,
        SvgTag::G,
        SvgTag::Defs,
        SvgTag::Mask,
        SvgTag::LinearGradient,
        SvgTag::RadialGradient,
        SvgTag::Stop,
        SvgTag::Filter,
        SvgTag::FeDropShadow,
        SvgTag::Marker,
        SvgTag::Animate,
        SvgTag::Text,
        SvgTag::Line,
        SvgTag::Polygon,
        SvgTag::Polyline,
        SvgTag::Ellipse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SvgTag::Path => "path",
            SvgTag::Circle => "circle",
            SvgTag::Rect => "rect",
            SvgTag::G => "g",
            SvgTag::Defs => "defs",
            SvgTag::Mask => "mask",
            SvgTag::LinearGradient => "linearGradient",
            SvgTag::RadialGradient => "radialGradient",
            SvgTag::Stop => "stop",
            SvgTag::Filter => "filter",
            SvgTag::FeDropShadow => "feDropShadow",
            SvgTag::Marker => "marker",
            SvgTag::Animate => "animate",
            SvgTag::Text => "text",
            SvgTag::Line => "line",
            SvgTag::Polygon => "polygon",
            SvgTag::Polyline => "polyline",
            SvgTag::Ellipse => "ellipse",
        }
    }
}

impl FromStr for SvgTag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SvgTag::ALL.into_iter().find(|tag| tag.as_str() == s).ok_or(())
    }
}

impl fmt::Display for SvgTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a layout tree.
///
/// Classification is first-match: `text`, then `type: "style"`, then
/// `type: "svg"`, then an SVG primitive `tag`, then any other `type`
/// (component), then any other `tag` (markup). Anything else is kept as
/// [`Node::Malformed`] and renders to nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text {
        text: String,
        key: Option<String>,
    },
    /// Inert marker; document styles are injected out of band. The raw object is kept for source views.
    Style {
        body: Map<String, Value>,
    },
    SvgContainer {
        props: Props,
        children: Vec<Node>,
        key: Option<String>,
    },
    SvgPrimitive {
        tag: SvgTag,
        props: Props,
        children: Vec<Node>,
        key: Option<String>,
    },
    Component {
        type_name: String,
        props: Props,
        children: Vec<Node>,
        key: Option<String>,
    },
    Markup {
        tag: String,
        props: Props,
        children: Vec<Node>,
        key: Option<String>,
    },
    Malformed(Value),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into(), key: None }
    }

    pub fn component(type_name: impl Into<String>, props: Props) -> Self {
        Node::Component {
            type_name: type_name.into(),
            props,
            children: Vec::new(),
            key: None,
        }
    }

    pub fn markup(tag: impl Into<String>, props: Props, children: Vec<Node>) -> Self {
        Node::Markup {
            tag: tag.into(),
            props,
            children,
            key: None,
        }
    }

    /// Classify a raw JSON value. Never fails: unclassifiable input becomes `Malformed`.
    pub fn from_value(value: Value) -> Self {
        let mut obj = match value {
            Value::Object(obj) => obj,
            Value::String(text) => return Node::Text { text, key: None },
            other => return Node::Malformed(other),
        };

        let key = obj.get("key").and_then(key_string);

        if let Some(text) = obj.remove("text") {
            let text = match text {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => to_js_string(&other),
            };
            return Node::Text { text, key };
        }

        let type_name = obj.get("type").and_then(Value::as_str).map(str::to_owned);
        match type_name.as_deref() {
            Some("style") => return Node::Style { body: obj },
            Some("svg") => {
                return Node::SvgContainer {
                    props: take_props(&mut obj),
                    children: take_children(&mut obj),
                    key,
                }
            }
            _ => {}
        }

        let tag = obj.get("tag").and_then(Value::as_str).map(str::to_owned);
        if let Some(svg_tag) = tag.as_deref().and_then(|t| t.parse::<SvgTag>().ok()) {
            return Node::SvgPrimitive {
                tag: svg_tag,
                props: take_props(&mut obj),
                children: take_children(&mut obj),
                key,
            };
        }

        if let Some(type_name) = type_name {
            return Node::Component {
                type_name,
                props: take_props(&mut obj),
                children: take_children(&mut obj),
                key,
            };
        }

        if let Some(tag) = tag {
            return Node::Markup {
                tag,
                props: take_props(&mut obj),
                children: take_children(&mut obj),
                key,
            };
        }

        Node::Malformed(Value::Object(obj))
    }

    /// Canonical wire shape. Fields the node kind does not read are not kept;
    /// [`LayoutDocument::source_value`] has the authored form.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Text { text, key } => {
                let mut obj = Map::new();
                obj.insert("text".into(), Value::String(text.clone()));
                insert_key(&mut obj, key);
                Value::Object(obj)
            }
            Node::Style { body } => Value::Object(body.clone()),
            Node::SvgContainer { props, children, key } => {
                element_value("type", "svg", props, children, key)
            }
            Node::SvgPrimitive { tag, props, children, key } => {
                element_value("tag", tag.as_str(), props, children, key)
            }
            Node::Component { type_name, props, children, key } => {
                element_value("type", type_name, props, children, key)
            }
            Node::Markup { tag, props, children, key } => {
                element_value("tag", tag, props, children, key)
            }
            Node::Malformed(raw) => raw.clone(),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Node::Text { key, .. }
            | Node::SvgContainer { key, .. }
            | Node::SvgPrimitive { key, .. }
            | Node::Component { key, .. }
            | Node::Markup { key, .. } => key.as_deref(),
            Node::Style { body } => body.get("key").and_then(Value::as_str),
            Node::Malformed(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::SvgContainer { children, .. }
            | Node::SvgPrimitive { children, .. }
            | Node::Component { children, .. }
            | Node::Markup { children, .. } => children,
            Node::Text { .. } | Node::Style { .. } | Node::Malformed(_) => &[],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Text { .. } => "text",
            Node::Style { .. } => "style",
            Node::SvgContainer { .. } => "svg",
            Node::SvgPrimitive { .. } => "svg-primitive",
            Node::Component { .. } => "component",
            Node::Markup { .. } => "markup",
            Node::Malformed(_) => "malformed",
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from_value(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from_value)
    }
}

fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn take_props(obj: &mut Map<String, Value>) -> Props {
    match obj.remove("props") {
        Some(Value::Object(props)) => props,
        _ => Props::new(),
    }
}

fn take_children(obj: &mut Map<String, Value>) -> Vec<Node> {
    match obj.remove("children") {
        Some(Value::Array(items)) => items.into_iter().map(Node::from_value).collect(),
        _ => Vec::new(),
    }
}

fn insert_key(obj: &mut Map<String, Value>, key: &Option<String>) {
    if let Some(key) = key {
        obj.insert("key".into(), Value::String(key.clone()));
    }
}

fn element_value(
    discriminant: &str,
    name: &str,
    props: &Props,
    children: &[Node],
    key: &Option<String>,
) -> Value {
    let mut obj = Map::new();
    obj.insert(discriminant.into(), Value::String(name.to_string()));
    insert_key(&mut obj, key);
    if !props.is_empty() {
        obj.insert("props".into(), Value::Object(props.clone()));
    }
    if !children.is_empty() {
        obj.insert(
            "children".into(),
            Value::Array(children.iter().map(Node::to_value).collect()),
        );
    }
    Value::Object(obj)
}
