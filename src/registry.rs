//! Component Registry - String Keys to Capabilities
//!
//! The renderer only knows the [`Capability`] trait. Concrete components
//! (charts, cards, carousels) live behind it.

use std::collections::HashMap;
use thiserror::Error;

use crate::document::Props;
use crate::element::Element;

/// A failure raised by a capability while instantiating. Not recovered by the renderer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CapabilityError {
    message: String,
}

impl CapabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Anything that can be instantiated from validated props and rendered children.
pub trait Capability: Send + Sync {
    fn instantiate(&self, props: Props, children: Vec<Element>) -> Result<Element, CapabilityError>;
}

impl<F> Capability for F
where
    F: Fn(Props, Vec<Element>) -> Result<Element, CapabilityError> + Send + Sync,
{
    fn instantiate(&self, props: Props, children: Vec<Element>) -> Result<Element, CapabilityError> {
        self(props, children)
    }
}

/// Emits an opaque [`Element::Component`] named after the registry key; the host draws it.
#[derive(Debug, Clone)]
pub struct HostComponent {
    name: String,
}

impl HostComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Capability for HostComponent {
    fn instantiate(&self, props: Props, children: Vec<Element>) -> Result<Element, CapabilityError> {
        Ok(Element::component(self.name.clone(), props, children))
    }
}

/// Component names the built-in registry maps to host components.
pub const BUILTIN_COMPONENTS: &[&str] = &[
    "Card",
    "CardHeader",
    "CardTitle",
    "CardDescription",
    "CardContent",
    "CardFooter",
    "Badge",
    "Icon",
    "AreaChart",
    "BarChart",
    "LineChart",
    "PieChart",
    "RadarChart",
    "ChartRadialBase",
    "ChartContainer",
    "ChartTooltip",
    "ChartLegend",
    "Carousel",
    "CarouselItem",
];

#[derive(Default)]
pub struct ComponentRegistry {
    capabilities: HashMap<String, Box<dyn Capability>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_COMPONENTS {
            registry.register_host(*name);
        }
        registry
    }

    /// Register a capability, replacing any previous one under the same name.
    pub fn register(&mut self, name: impl Into<String>, capability: impl Capability + 'static) {
        let name = name.into();
        if self.capabilities.insert(name.clone(), Box::new(capability)).is_some() {
            log::debug!("Replaced capability '{}'", name);
        }
    }

    pub fn register_host(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.register(name.clone(), HostComponent::new(name));
    }

    pub fn with(mut self, name: impl Into<String>, capability: impl Capability + 'static) -> Self {
        self.register(name, capability);
        self
    }

    pub fn lookup(&self, type_name: &str) -> Option<&dyn Capability> {
        self.capabilities.get(type_name).map(Box::as_ref)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.capabilities.contains_key(type_name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("capabilities", &self.names())
            .finish()
    }
}
