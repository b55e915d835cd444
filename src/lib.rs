//! ForgeUI Core - Declarative Layout Renderer
//!
//! Layout documents are static JSON: a flat data bag plus a node tree.
//! The renderer walks the tree, fills `{{path}}` placeholders and
//! `$data.path` props from the data bag, narrows component props against
//! a schema table, and hands each component node to a registered capability.
//!
//! # Guarantees
//! 1. Catalog mistakes degrade, they do not abort: unknown types render a
//!    visible placeholder, unresolved paths keep their literal text.
//! 2. A capability that fails surfaces its error to the caller.
//! 3. The data bag is never modified by a render.
//! 4. At most one stylesheet is live per layout id.

pub mod catalog;
pub mod coerce;
pub mod diagnostics;
pub mod document;
pub mod element;
pub mod hashing;
pub mod interpolation;
pub mod registry;
pub mod render;
pub mod schema;
pub mod styles;
pub mod validation;

pub use catalog::{CatalogError, LayoutCatalog};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use document::{DataBag, LayoutDocument, LayoutId, Node, Props, SvgTag};
pub use element::Element;
pub use hashing::{canonical_json, document_fingerprint};
pub use interpolation::{inject_data_refs, interpolate_props, interpolate_text, resolve_path};
pub use registry::{Capability, CapabilityError, ComponentRegistry, HostComponent};
pub use render::{MountedLayout, RenderError, RenderManifest, RenderOptions, Renderer};
pub use schema::{PrimitiveKind, PropRule, PropSchemaTable, SchemaEntry};
pub use styles::{StyleGuard, StyleHost};
pub use validation::{PropValidation, PropValidator};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
