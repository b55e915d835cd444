//! Prop Validation - Narrowing, Not Rejecting
//!
//! Schemas narrow the props a component receives. Unknown or disallowed props
//! are dropped, primitive rules coerce. Validation never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{to_js_boolean, to_js_number, to_js_string};
use crate::document::Props;
use crate::schema::{PrimitiveKind, PropRule, PropSchemaTable};

/// Props every component accepts regardless of its schema.
pub const UNIVERSAL_PROPS: &[&str] = &[
    "className",
    "class",
    "style",
    "children",
    "key",
    "id",
    "animate",
    "transition",
    "initial",
    "whileHover",
    "whileTap",
];

/// Prop name prefixes that always pass through.
pub const RESERVED_PREFIXES: &[&str] = &["data-", "aria-"];

pub fn is_universal_prop(name: &str) -> bool {
    UNIVERSAL_PROPS.contains(&name) || RESERVED_PREFIXES.iter().any(|p| name.starts_with(p))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The schema has no rule for the prop.
    NoRule,
    /// The value is not one of the rule's allowed literals.
    NotAllowed,
}

impl DropReason {
    pub fn describe(self) -> &'static str {
        match self {
            DropReason::NoRule => "no schema rule",
            DropReason::NotAllowed => "value not in allowed set",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DroppedProp {
    pub prop: String,
    pub value: Value,
    pub reason: DropReason,
}

/// Outcome of validating one component's props.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropValidation {
    pub props: Props,
    pub dropped: Vec<DroppedProp>,
    /// Props whose value changed under a primitive coercion.
    pub coerced: Vec<String>,
}

/// Result of checking one value against one rule.
enum RuleOutcome {
    Keep(Value),
    Drop(DropReason),
}

fn apply_rule(rule: &PropRule, value: &Value) -> RuleOutcome {
    match rule {
        PropRule::Kind(PrimitiveKind::Any) => RuleOutcome::Keep(value.clone()),
        PropRule::Kind(PrimitiveKind::String) => RuleOutcome::Keep(Value::String(to_js_string(value))),
        PropRule::Kind(PrimitiveKind::Number) => RuleOutcome::Keep(to_js_number(value)),
        PropRule::Kind(PrimitiveKind::Boolean) => RuleOutcome::Keep(Value::Bool(to_js_boolean(value))),
        PropRule::OneOf(allowed) if allowed.contains(value) => RuleOutcome::Keep(value.clone()),
        PropRule::OneOf(_) => RuleOutcome::Drop(DropReason::NotAllowed),
    }
}

/// Validator over a prop schema table.
#[derive(Debug, Clone, Default)]
pub struct PropValidator {
    schemas: PropSchemaTable,
}

impl PropValidator {
    pub fn new(schemas: PropSchemaTable) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &PropSchemaTable {
        &self.schemas
    }

    pub fn validate(&self, component_type: &str, raw_props: &Props) -> Props {
        self.validate_with_report(component_type, raw_props).props
    }

    pub fn validate_with_report(&self, component_type: &str, raw_props: &Props) -> PropValidation {
        let Some(schema) = self.schemas.get_schema(component_type) else {
            return PropValidation {
                props: raw_props.clone(),
                ..Default::default()
            };
        };

        let mut result = PropValidation::default();
        for (name, value) in raw_props {
            if is_universal_prop(name) {
                result.props.insert(name.clone(), value.clone());
                continue;
            }

            let outcome = match schema.rule(name) {
                Some(rule) => apply_rule(rule, value),
                None => RuleOutcome::Drop(DropReason::NoRule),
            };

            match outcome {
                RuleOutcome::Keep(kept) => {
                    if &kept != value {
                        result.coerced.push(name.clone());
                    }
                    result.props.insert(name.clone(), kept);
                }
                RuleOutcome::Drop(reason) => result.dropped.push(DroppedProp {
                    prop: name.clone(),
                    value: value.clone(),
                    reason,
                }),
            }
        }
        result
    }
}
