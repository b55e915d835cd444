//! Prop Schemas - Permissive Per-Component Contracts
//!
//! A schema entry lists the props a component accepts and a coarse shape for
//! each. Types without an entry accept everything.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schema table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Any,
    String,
    Number,
    Boolean,
}

/// Rule for one prop: a primitive kind, or a list of allowed literal values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropRule {
    Kind(PrimitiveKind),
    OneOf(Vec<Value>),
}

impl PropRule {
    pub const ANY: PropRule = PropRule::Kind(PrimitiveKind::Any);
    pub const STRING: PropRule = PropRule::Kind(PrimitiveKind::String);
    pub const NUMBER: PropRule = PropRule::Kind(PrimitiveKind::Number);
    pub const BOOLEAN: PropRule = PropRule::Kind(PrimitiveKind::Boolean);

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        PropRule::OneOf(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SchemaEntry {
    rules: HashMap<String, PropRule>,
}

impl SchemaEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, prop: impl Into<String>, rule: PropRule) -> Self {
        self.rules.insert(prop.into(), rule);
        self
    }

    pub fn rule(&self, prop: &str) -> Option<&PropRule> {
        self.rules.get(prop)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Component type name to schema entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PropSchemaTable {
    entries: HashMap<String, SchemaEntry>,
}

impl PropSchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(source: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn get_schema(&self, type_name: &str) -> Option<&SchemaEntry> {
        self.entries.get(type_name)
    }

    pub fn insert(&mut self, type_name: impl Into<String>, entry: SchemaEntry) {
        self.entries.insert(type_name.into(), entry);
    }

    pub fn with(mut self, type_name: impl Into<String>, entry: SchemaEntry) -> Self {
        self.insert(type_name, entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schemas for the built-in component set.
    pub fn builtin() -> Self {
        let chart = SchemaEntry::new()
            .with("data", PropRule::ANY)
            .with("config", PropRule::ANY)
            .with("xKey", PropRule::STRING)
            .with("yKeys", PropRule::ANY)
            .with("height", PropRule::NUMBER)
            .with("showGrid", PropRule::BOOLEAN)
            .with("showLegend", PropRule::BOOLEAN)
            .with("showTooltip", PropRule::BOOLEAN);

        Self::new()
            .with(
                "Card",
                SchemaEntry::new()
                    .with("title", PropRule::STRING)
                    .with("description", PropRule::STRING)
                    .with("footer", PropRule::STRING)
                    .with("variant", PropRule::one_of(["default", "outline", "ghost"])),
            )
            .with(
                "Badge",
                SchemaEntry::new()
                    .with("label", PropRule::STRING)
                    .with("variant", PropRule::one_of(["default", "secondary", "destructive", "outline"])),
            )
            .with(
                "AreaChart",
                chart.clone().with("stacked", PropRule::BOOLEAN).with(
                    "curve",
                    PropRule::one_of(["linear", "natural", "step", "monotone"]),
                ),
            )
            .with(
                "BarChart",
                chart
                    .clone()
                    .with("stacked", PropRule::BOOLEAN)
                    .with("layout", PropRule::one_of(["horizontal", "vertical"])),
            )
            .with(
                "LineChart",
                chart.clone().with("curve", PropRule::one_of(["linear", "natural", "step", "monotone"])),
            )
            .with(
                "ChartRadialBase",
                SchemaEntry::new()
                    .with("data", PropRule::ANY)
                    .with("config", PropRule::ANY)
                    .with("value", PropRule::ANY)
                    .with("label", PropRule::STRING)
                    .with("startAngle", PropRule::NUMBER)
                    .with("endAngle", PropRule::NUMBER)
                    .with("innerRadius", PropRule::NUMBER)
                    .with("outerRadius", PropRule::NUMBER),
            )
            .with(
                "PieChart",
                chart.with("donut", PropRule::BOOLEAN).with("nameKey", PropRule::STRING),
            )
            .with(
                "Icon",
                SchemaEntry::new()
                    .with("name", PropRule::STRING)
                    .with("size", PropRule::NUMBER),
            )
            .with(
                "Carousel",
                SchemaEntry::new()
                    .with("loop", PropRule::BOOLEAN)
                    .with("autoplay", PropRule::BOOLEAN)
                    .with("orientation", PropRule::one_of(["horizontal", "vertical"])),
            )
    }
}
