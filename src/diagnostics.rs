//! Render Diagnostics
//!
//! Recoverable problems found while rendering. They never abort a render;
//! each one is logged when recorded and kept for callers that want a report.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A component `type` with no registered capability.
    UnknownCapability,
    /// A `{{path}}` placeholder or `$data.path` prop with nothing behind it.
    UnresolvedDataPath,
    /// A node matching none of the classification rules.
    MalformedNode,
    /// A component prop removed by its schema.
    DroppedProp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Position in the layout tree, e.g. `root/2/0`.
    pub node_path: String,
    /// What the diagnostic is about: a type name, data path or prop name.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn unknown_capability(node_path: &str, type_name: &str) -> Self {
        Self {
            kind: DiagnosticKind::UnknownCapability,
            node_path: node_path.to_string(),
            subject: type_name.to_string(),
            message: format!("No component registered for type '{}'", type_name),
        }
    }

    pub fn unresolved_data_path(node_path: &str, data_path: &str) -> Self {
        Self {
            kind: DiagnosticKind::UnresolvedDataPath,
            node_path: node_path.to_string(),
            subject: data_path.to_string(),
            message: format!("Data path '{}' did not resolve; literal kept", data_path),
        }
    }

    pub fn malformed_node(node_path: &str) -> Self {
        Self {
            kind: DiagnosticKind::MalformedNode,
            node_path: node_path.to_string(),
            subject: String::new(),
            message: "Node has no text, type or tag; skipped".to_string(),
        }
    }

    pub fn dropped_prop(node_path: &str, type_name: &str, prop: &str, reason: &str) -> Self {
        Self {
            kind: DiagnosticKind::DroppedProp,
            node_path: node_path.to_string(),
            subject: prop.to_string(),
            message: format!("Prop '{}' dropped from '{}': {}", prop, type_name, reason),
        }
    }
}

/// Ordered collection of diagnostics for one render pass.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::DroppedProp => {
                log::debug!("{} ({})", diagnostic.message, diagnostic.node_path)
            }
            _ => log::warn!("{} ({})", diagnostic.message, diagnostic.node_path),
        }
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::malformed_node("root/1"));
        diagnostics.push(Diagnostic::unknown_capability("root/0", "Gizmo"));
        diagnostics.push(Diagnostic::unresolved_data_path("root/2", "series"));

        let paths: Vec<_> = diagnostics.iter().map(|d| d.node_path.as_str()).collect();
        assert_eq!(paths, vec!["root/1", "root/0", "root/2"]);
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_count_filters_by_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::dropped_prop("root", "Card", "variant", "not allowed"));
        diagnostics.push(Diagnostic::dropped_prop("root", "Card", "tone", "no rule"));
        diagnostics.push(Diagnostic::unknown_capability("root/0", "Gizmo"));

        assert_eq!(diagnostics.count(DiagnosticKind::DroppedProp), 2);
        assert_eq!(diagnostics.count(DiagnosticKind::UnknownCapability), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::MalformedNode), 0);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::unknown_capability("root", "Gizmo"));
        let value = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(value[0]["kind"], "unknown_capability");
        assert_eq!(value[0]["subject"], "Gizmo");
    }
}
