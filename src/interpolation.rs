//! Interpolation - Data Bag Substitution
//!
//! Two independent, side-effect-free transforms:
//! - `{{a.b.c}}` placeholders inside strings are replaced by the resolved value's text.
//! - A prop whose whole value starts with `$data.` is replaced by the resolved value itself.
//!
//! Anything that fails to resolve is left exactly as written.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

use crate::coerce::to_js_string;
use crate::document::{DataBag, Props};

pub const DATA_REF_PREFIX: &str = "$data.";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}.\s]+(?:\.[^{}.\s]+)*)\s*\}\}").unwrap()
});

/// Walk a dotted path through the data bag. Numeric segments index arrays.
///
/// Returns `None` only when a key or index is missing; a stored `null` resolves.
pub fn resolve_path<'a>(data: &'a DataBag, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// The path named by a `$data.` reference, if `value` is one.
pub fn data_ref_path(value: &Value) -> Option<&str> {
    value.as_str()?.strip_prefix(DATA_REF_PREFIX)
}

pub fn interpolate_text(text: &str, data: &DataBag) -> String {
    interpolate_text_with(text, data, &mut |path: &str| {
        log::warn!("Unresolved placeholder '{{{{{}}}}}' left in place", path)
    })
}

/// Apply [`interpolate_text`] to every string prop containing `{{`. Nested values are not visited.
pub fn interpolate_props(props: &Props, data: &DataBag) -> Props {
    interpolate_props_with(props, data, &mut |path: &str| {
        log::warn!("Unresolved placeholder '{{{{{}}}}}' left in place", path)
    })
}

pub fn inject_data_refs(props: &Props, data: &DataBag) -> Props {
    props
        .iter()
        .map(|(name, value)| {
            let value = match data_ref_path(value) {
                Some(path) => inject_one(value, path, data, &mut |path: &str| {
                    log::warn!("Unresolved data reference '{}{}' kept as literal", DATA_REF_PREFIX, path)
                }),
                None => value.clone(),
            };
            (name.clone(), value)
        })
        .collect()
}

/// Component prop resolution: `$data.` references are injected, other
/// strings are interpolated. No value goes through both.
pub(crate) fn resolve_component_props_with(
    props: Props,
    data: &DataBag,
    on_unresolved: &mut dyn FnMut(&str),
) -> Props {
    props
        .into_iter()
        .map(|(name, value)| {
            let value = if let Some(path) = data_ref_path(&value) {
                inject_one(&value, path, data, on_unresolved)
            } else {
                interpolate_value(value, data, on_unresolved)
            };
            (name, value)
        })
        .collect()
}

pub(crate) fn interpolate_props_with(
    props: &Props,
    data: &DataBag,
    on_unresolved: &mut dyn FnMut(&str),
) -> Props {
    props
        .iter()
        .map(|(name, value)| (name.clone(), interpolate_value(value.clone(), data, on_unresolved)))
        .collect()
}

pub(crate) fn interpolate_text_with(
    text: &str,
    data: &DataBag,
    on_unresolved: &mut dyn FnMut(&str),
) -> String {
    if !text.contains("{{") {
        return text.to_owned();
    }

    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| match resolve_path(data, &caps[1]) {
            Some(value) => to_js_string(value),
            None => {
                on_unresolved(&caps[1]);
                caps[0].to_owned()
            }
        })
        .into_owned()
}

fn interpolate_value(value: Value, data: &DataBag, on_unresolved: &mut dyn FnMut(&str)) -> Value {
    match value {
        Value::String(s) if s.contains("{{") => {
            Value::String(interpolate_text_with(&s, data, on_unresolved))
        }
        other => other,
    }
}

fn inject_one(
    original: &Value,
    path: &str,
    data: &DataBag,
    on_unresolved: &mut dyn FnMut(&str),
) -> Value {
    match resolve_path(data, path) {
        Some(resolved) => resolved.clone(),
        None => {
            on_unresolved(path);
            original.clone()
        }
    }
}
