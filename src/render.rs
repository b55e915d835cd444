//! Render Pipeline - Single Entry Point
//!
//! Walks a layout document's node tree and produces an [`Element`] tree.
//!
//! Interpreter-owned problems (unknown component types, unresolved data
//! paths, malformed nodes) degrade in place and are recorded as diagnostics.
//! The one hard failure is a capability refusing its props: that error is
//! returned to the caller untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::{DataBag, LayoutDocument, Node};
use crate::element::Element;
use crate::hashing::document_fingerprint;
use crate::interpolation::{interpolate_props_with, interpolate_text_with, resolve_component_props_with};
use crate::registry::{CapabilityError, ComponentRegistry};
use crate::schema::PropSchemaTable;
use crate::styles::{StyleGuard, StyleHost};
use crate::validation::PropValidator;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Layout document not found: {0}")]
    DocumentNotFound(String),

    #[error("Component '{type_name}' failed at {node_path}: {source}")]
    CapabilityFailed {
        type_name: String,
        node_path: String,
        #[source]
        source: CapabilityError,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Wrap the output with a view-source affordance.
    pub show_source: bool,
    /// False when this document is itself rendered inside another layout.
    pub is_top_level: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_source: false,
            is_top_level: true,
        }
    }
}

impl RenderOptions {
    pub fn with_source(mut self) -> Self {
        self.show_source = true;
        self
    }

    pub fn nested(mut self) -> Self {
        self.is_top_level = false;
        self
    }
}

/// Everything one render pass produced, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RenderManifest {
    pub document_id: String,
    pub fingerprint: String,
    pub rendered_at: DateTime<Utc>,
    pub tree: Option<Element>,
    pub diagnostics: Diagnostics,
}

/// A rendered layout whose stylesheet stays attached until it is dropped.
#[derive(Debug)]
pub struct MountedLayout {
    tree: Option<Element>,
    styles: Option<StyleGuard>,
}

impl MountedLayout {
    pub fn tree(&self) -> Option<&Element> {
        self.tree.as_ref()
    }

    pub fn has_styles(&self) -> bool {
        self.styles.is_some()
    }

    pub fn unmount(self) {}
}

/// The tree interpreter.
pub struct Renderer {
    registry: ComponentRegistry,
    validator: PropValidator,
}

impl Renderer {
    pub fn new(registry: ComponentRegistry, schemas: PropSchemaTable) -> Self {
        Self {
            registry,
            validator: PropValidator::new(schemas),
        }
    }

    pub fn builtin() -> Self {
        Self::new(ComponentRegistry::builtin(), PropSchemaTable::builtin())
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn validator(&self) -> &PropValidator {
        &self.validator
    }

    /// Render a document. `Ok(None)` means the root contributed nothing.
    pub fn render(
        &self,
        document: &LayoutDocument,
        options: &RenderOptions,
    ) -> Result<Option<Element>, RenderError> {
        let mut diagnostics = Diagnostics::new();
        self.render_document(document, options, &mut diagnostics)
    }

    pub fn render_with_diagnostics(
        &self,
        document: &LayoutDocument,
        options: &RenderOptions,
    ) -> Result<(Option<Element>, Diagnostics), RenderError> {
        let mut diagnostics = Diagnostics::new();
        let tree = self.render_document(document, options, &mut diagnostics)?;
        Ok((tree, diagnostics))
    }

    pub fn render_manifest(
        &self,
        document: &LayoutDocument,
        options: &RenderOptions,
    ) -> Result<RenderManifest, RenderError> {
        let (tree, diagnostics) = self.render_with_diagnostics(document, options)?;
        Ok(RenderManifest {
            document_id: document.id.clone(),
            fingerprint: document_fingerprint(document)?,
            rendered_at: Utc::now(),
            tree,
            diagnostics,
        })
    }

    /// Inject the document's stylesheet, then render. A failed render releases the stylesheet.
    pub fn mount(
        &self,
        document: &LayoutDocument,
        options: &RenderOptions,
        host: &StyleHost,
    ) -> Result<MountedLayout, RenderError> {
        let styles = document.stylesheet().map(|css| host.inject(&document.id, css));
        let tree = self.render(document, options)?;
        Ok(MountedLayout { tree, styles })
    }

    /// Render a single node against `data`. Diagnostics are logged only.
    pub fn render_node(
        &self,
        node: &Node,
        index: usize,
        depth: usize,
        data: &DataBag,
    ) -> Result<Option<Element>, RenderError> {
        let mut diagnostics = Diagnostics::new();
        self.walk(node, index, depth, "root", data, &mut diagnostics)
    }

    fn render_document(
        &self,
        document: &LayoutDocument,
        options: &RenderOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Element>, RenderError> {
        log::debug!("Rendering layout '{}'", document.id);
        let tree = self.walk(&document.root, 0, 0, "root", &document.data, diagnostics)?;

        if options.show_source && options.is_top_level {
            return Ok(Some(Element::SourceView {
                document_id: document.id.clone(),
                fingerprint: document_fingerprint(document)?,
                source: document.to_json_pretty()?,
                child: tree.map(Box::new),
            }));
        }
        Ok(tree)
    }

    fn walk(
        &self,
        node: &Node,
        index: usize,
        depth: usize,
        path: &str,
        data: &DataBag,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Element>, RenderError> {
        log::trace!("{} node at {} (depth {})", node.kind_name(), path, depth);
        let key = node.key().map_or_else(|| index.to_string(), str::to_owned);
        let mut report_unresolved =
            |data_path: &str| diagnostics.push(Diagnostic::unresolved_data_path(path, data_path));

        match node {
            Node::Text { text, .. } => Ok(Some(Element::text(interpolate_text_with(
                text,
                data,
                &mut report_unresolved,
            )))),

            Node::Style { .. } => Ok(None),

            Node::SvgContainer { props, children, .. } => {
                let children = self.walk_children(children, depth, path, data, diagnostics)?;
                Ok(Some(Element::Svg {
                    key,
                    props: props.clone(),
                    children,
                }))
            }

            Node::SvgPrimitive { tag, props, children, .. } => {
                let props = interpolate_props_with(props, data, &mut report_unresolved);
                let children = self.walk_children(children, depth, path, data, diagnostics)?;
                Ok(Some(Element::Native {
                    tag: tag.as_str().to_string(),
                    key,
                    props,
                    children,
                }))
            }

            Node::Component { type_name, props, children, .. } => {
                let Some(capability) = self.registry.lookup(type_name) else {
                    diagnostics.push(Diagnostic::unknown_capability(path, type_name));
                    return Ok(Some(Element::Missing {
                        type_name: type_name.clone(),
                        key,
                    }));
                };

                let validation = self.validator.validate_with_report(type_name, props);
                for dropped in &validation.dropped {
                    diagnostics.push(Diagnostic::dropped_prop(
                        path,
                        type_name,
                        &dropped.prop,
                        dropped.reason.describe(),
                    ));
                }
                let props = resolve_component_props_with(validation.props, data, &mut |data_path: &str| {
                    diagnostics.push(Diagnostic::unresolved_data_path(path, data_path))
                });
                let children = self.walk_children(children, depth, path, data, diagnostics)?;

                let element = capability.instantiate(props, children).map_err(|source| {
                    RenderError::CapabilityFailed {
                        type_name: type_name.clone(),
                        node_path: path.to_string(),
                        source,
                    }
                })?;
                Ok(Some(element.with_key(key)))
            }

            Node::Markup { tag, props, children, .. } => {
                let props = interpolate_props_with(props, data, &mut report_unresolved);
                let children = self.walk_children(children, depth, path, data, diagnostics)?;
                Ok(Some(Element::Native {
                    tag: tag.clone(),
                    key,
                    props,
                    children,
                }))
            }

            Node::Malformed(_) => {
                diagnostics.push(Diagnostic::malformed_node(path));
                Ok(None)
            }
        }
    }

    fn walk_children(
        &self,
        children: &[Node],
        depth: usize,
        path: &str,
        data: &DataBag,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Element>, RenderError> {
        let mut rendered = Vec::with_capacity(children.len());
        for (index, child) in children.iter().enumerate() {
            let child_path = format!("{}/{}", path, index);
            if let Some(element) = self.walk(child, index, depth + 1, &child_path, data, diagnostics)? {
                rendered.push(element);
            }
        }
        Ok(rendered)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> LayoutDocument {
        LayoutDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_text_root_interpolates() {
        let tree = Renderer::builtin()
            .render(
                &doc(json!({"id": "t1", "data": {"name": "Ada"}, "root": {"text": "Hello {{name}}"}})),
                &RenderOptions::default(),
            )
            .unwrap();
        assert_eq!(tree, Some(Element::text("Hello Ada")));
    }

    #[test]
    fn test_keys_default_to_position() {
        let tree = Renderer::builtin()
            .render(
                &doc(json!({"id": "k", "root": {"tag": "ul", "children": [
                    {"tag": "li"}, {"tag": "li", "key": "second"}, {"type": "style"}, {"tag": "li"}
                ]}})),
                &RenderOptions::default(),
            )
            .unwrap()
            .unwrap();
        let keys: Vec<_> = tree.children().iter().filter_map(Element::key).collect();
        assert_eq!(keys, vec!["0", "second", "3"]);
    }

    #[test]
    fn test_svg_container_props_untouched() {
        let tree = Renderer::builtin()
            .render(
                &doc(json!({"id": "s", "data": {"w": 10}, "root": {"type": "svg",
                    "props": {"width": "{{w}}"},
                    "children": [{"tag": "rect", "props": {"width": "{{w}}"}}]}})),
                &RenderOptions::default(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(tree.props().unwrap()["width"], json!("{{w}}"));
        assert_eq!(tree.children()[0].props().unwrap()["width"], json!("10"));
    }

    #[test]
    fn test_diagnostics_carry_node_paths() {
        let (_, diagnostics) = Renderer::builtin()
            .render_with_diagnostics(
                &doc(json!({"id": "d", "root": {"tag": "div", "children": [
                    {"text": "{{missing}}"},
                    {"props": {}},
                    {"type": "Gizmo"},
                    {"type": "Card", "props": {"bogus": 1}}
                ]}})),
                &RenderOptions::default(),
            )
            .unwrap();

        let found: Vec<_> = diagnostics.iter().map(|d| (d.kind, d.node_path.as_str())).collect();
        assert_eq!(
            found,
            vec![
                (DiagnosticKind::UnresolvedDataPath, "root/0"),
                (DiagnosticKind::MalformedNode, "root/1"),
                (DiagnosticKind::UnknownCapability, "root/2"),
                (DiagnosticKind::DroppedProp, "root/3"),
            ]
        );
    }

    #[test]
    fn test_source_view_only_at_top_level() {
        let renderer = Renderer::builtin();
        let document = doc(json!({"id": "src", "root": {"text": "x"}}));

        let wrapped = renderer.render(&document, &RenderOptions::default().with_source()).unwrap();
        match wrapped {
            Some(Element::SourceView { document_id, source, child, .. }) => {
                assert_eq!(document_id, "src");
                assert!(source.contains("\"id\": \"src\""));
                assert_eq!(child.as_deref(), Some(&Element::text("x")));
            }
            other => panic!("expected source view, got {:?}", other),
        }

        let nested = renderer
            .render(&document, &RenderOptions::default().with_source().nested())
            .unwrap();
        assert_eq!(nested, Some(Element::text("x")));
    }

    #[test]
    fn test_manifest_fingerprint_matches_document() {
        let document = doc(json!({"id": "m", "root": {"text": "x"}}));
        let manifest = Renderer::builtin()
            .render_manifest(&document, &RenderOptions::default())
            .unwrap();
        assert_eq!(manifest.fingerprint, document_fingerprint(&document).unwrap());
        assert!(manifest.diagnostics.is_empty());
    }
}
