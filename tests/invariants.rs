//! Contract Invariant Tests
//!
//! These tests verify the renderer's guarantees end to end.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use forgeui_core::{
    document_fingerprint, inject_data_refs, interpolate_text, CapabilityError, ComponentRegistry,
    DiagnosticKind, Element, LayoutCatalog, LayoutDocument, PropRule, PropSchemaTable,
    PropValidator, Props, RenderError, RenderOptions, Renderer, SchemaEntry, StyleHost,
};

fn object(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

fn document(value: Value) -> LayoutDocument {
    LayoutDocument::from_value(value).unwrap()
}

/// Registry whose "Chart" capability records the props it was instantiated with.
fn recording_registry(seen: Arc<Mutex<Option<Props>>>) -> ComponentRegistry {
    ComponentRegistry::new().with(
        "Chart",
        move |props: Props, children: Vec<Element>| -> Result<Element, CapabilityError> {
            *seen.lock().unwrap() = Some(props.clone());
            Ok(Element::component("Chart", props, children))
        },
    )
}

#[test]
fn invariant_text_root_renders_interpolated_leaf() {
    let doc = document(json!({"id": "t1", "data": {"name": "Ada"}, "root": {"text": "Hello {{name}}"}}));
    let tree = Renderer::builtin().render(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(tree, Some(Element::text("Hello Ada")));
}

#[test]
fn invariant_unknown_component_degrades_visibly() {
    let doc = document(json!({"id": "t2", "root": {"type": "UnknownWidget", "props": {}}}));
    let (tree, diagnostics) = Renderer::builtin()
        .render_with_diagnostics(&doc, &RenderOptions::default())
        .unwrap();

    let tree = tree.unwrap();
    assert!(tree.to_html().contains("UnknownWidget"));
    assert!(tree.text_content().contains("UnknownWidget"));
    assert!(serde_json::to_string(&tree).unwrap().contains("UnknownWidget"));
    assert_eq!(diagnostics.count(DiagnosticKind::UnknownCapability), 1);
}

#[test]
fn invariant_data_ref_resolved_before_instantiation() {
    let seen = Arc::new(Mutex::new(None));
    let renderer = Renderer::new(
        recording_registry(Arc::clone(&seen)),
        PropSchemaTable::new().with("Chart", SchemaEntry::new().with("data", PropRule::ANY)),
    );
    let doc = document(json!({
        "id": "t3",
        "data": {"series": [1, 2, 3]},
        "root": {"type": "Chart", "props": {"data": "$data.series"}}
    }));

    renderer.render(&doc, &RenderOptions::default()).unwrap();
    let props = seen.lock().unwrap().clone().unwrap();
    assert_eq!(props["data"], json!([1, 2, 3]));
}

#[test]
fn invariant_one_stylesheet_per_layout_id() {
    let renderer = Renderer::builtin();
    let host = StyleHost::new();
    let doc = document(json!({"id": "t4", "styles": ".x { color: red }", "root": {"tag": "div"}}));

    let first = renderer.mount(&doc, &RenderOptions::default(), &host).unwrap();
    assert!(first.has_styles());
    assert_eq!(host.live_count(), 1);
    assert_eq!(host.live_ids(), vec!["t4".to_string()]);

    let second = renderer.mount(&doc, &RenderOptions::default(), &host).unwrap();
    assert_eq!(host.live_count(), 1);

    first.unmount();
    assert_eq!(host.live_count(), 1);
    second.unmount();
    assert_eq!(host.live_count(), 0);
}

#[test]
fn invariant_document_without_styles_injects_nothing() {
    let host = StyleHost::new();
    let doc = document(json!({"id": "plain", "root": {"text": "x"}}));
    let mounted = Renderer::builtin().mount(&doc, &RenderOptions::default(), &host).unwrap();
    assert!(!mounted.has_styles());
    assert_eq!(host.live_count(), 0);
}

#[test]
fn invariant_enum_rule_drops_unlisted_literal() {
    let seen = Arc::new(Mutex::new(None));
    let renderer = Renderer::new(
        recording_registry(Arc::clone(&seen)),
        PropSchemaTable::new().with("Chart", SchemaEntry::new().with("variant", PropRule::one_of(["a", "b"]))),
    );

    let rejected = document(json!({"id": "t5", "root": {"type": "Chart", "props": {"variant": "c"}}}));
    renderer.render(&rejected, &RenderOptions::default()).unwrap();
    assert!(seen.lock().unwrap().as_ref().unwrap().get("variant").is_none());

    let accepted = document(json!({"id": "t5", "root": {"type": "Chart", "props": {"variant": "a"}}}));
    renderer.render(&accepted, &RenderOptions::default()).unwrap();
    assert_eq!(seen.lock().unwrap().as_ref().unwrap()["variant"], json!("a"));
}

#[test]
fn invariant_capability_failure_propagates() {
    let registry = ComponentRegistry::new().with(
        "Fragile",
        |_: Props, _: Vec<Element>| -> Result<Element, CapabilityError> {
            Err(CapabilityError::new("expected an array of points"))
        },
    );
    let renderer = Renderer::new(registry, PropSchemaTable::new());
    let host = StyleHost::new();
    let doc = document(json!({
        "id": "fragile",
        "styles": "svg { overflow: visible }",
        "root": {"tag": "div", "children": [{"type": "Fragile"}]}
    }));

    let err = renderer.mount(&doc, &RenderOptions::default(), &host).unwrap_err();
    match err {
        RenderError::CapabilityFailed { type_name, node_path, source } => {
            assert_eq!(type_name, "Fragile");
            assert_eq!(node_path, "root/0");
            assert_eq!(source.message(), "expected an array of points");
        }
        other => panic!("unexpected error: {other}"),
    }
    // The failed mount must not leave its stylesheet behind.
    assert_eq!(host.live_count(), 0);
}

#[test]
fn invariant_render_leaves_data_untouched() {
    let doc = document(json!({
        "id": "ro",
        "data": {"rows": [{"v": 1}], "label": "L"},
        "root": {"tag": "div", "props": {"title": "{{label}}"}, "children": [
            {"type": "Card", "props": {"title": "$data.label"}}
        ]}
    }));
    let before = doc.data.clone();
    Renderer::builtin().render(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(doc.data, before);
}

#[test]
fn invariant_schema_permissive_without_entry() {
    let validator = PropValidator::new(PropSchemaTable::builtin());
    let raw = object(json!({"whatever": {"deep": [1, 2]}, "n": 3, "flag": "yes"}));
    assert_eq!(validator.validate("NotInTable", &raw), raw);
}

#[test]
fn invariant_universal_props_always_pass() {
    let validator = PropValidator::new(PropSchemaTable::new().with("Strict", SchemaEntry::new()));
    let raw = object(json!({
        "className": "a", "class": "b", "style": {"top": 0}, "children": "c", "key": "k",
        "id": "i", "animate": {"opacity": 1}, "transition": {"duration": 0.2},
        "initial": false, "whileHover": {"y": -2}, "whileTap": {"scale": 0.9},
        "data-state": "open", "aria-hidden": "true"
    }));
    assert_eq!(validator.validate("Strict", &raw), raw);
}

#[test]
fn invariant_unresolved_placeholder_untouched() {
    let data = object(json!({"x": {"z": 1}}));
    let s = "before {{x.y}} after";
    assert_eq!(interpolate_text(s, &data), s);
}

#[test]
fn invariant_data_ref_round_trip() {
    let data = object(json!({"a": {"b": 42}}));
    let props = object(json!({"value": "$data.a.b"}));
    assert_eq!(inject_data_refs(&props, &data)["value"], json!(42));
}

#[test]
fn invariant_unresolved_data_ref_keeps_literal_in_component_props() {
    let seen = Arc::new(Mutex::new(None));
    let renderer = Renderer::new(recording_registry(Arc::clone(&seen)), PropSchemaTable::new());
    let doc = document(json!({"id": "lit", "root": {"type": "Chart", "props": {"data": "$data.absent.path"}}}));

    let (_, diagnostics) = renderer.render_with_diagnostics(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(seen.lock().unwrap().as_ref().unwrap()["data"], json!("$data.absent.path"));
    assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedDataPath), 1);
}

#[test]
fn invariant_primitive_rules_coerce_rather_than_reject() {
    let validator = PropValidator::new(
        PropSchemaTable::new().with(
            "Gauge",
            SchemaEntry::new()
                .with("max", PropRule::NUMBER)
                .with("animated", PropRule::BOOLEAN)
                .with("label", PropRule::STRING),
        ),
    );
    let out = validator.validate("Gauge", &object(json!({"max": "100", "animated": 0, "label": 12})));
    assert_eq!(out["max"], json!(100));
    assert_eq!(out["animated"], json!(false));
    assert_eq!(out["label"], json!("12"));
}

#[test]
fn invariant_malformed_siblings_do_not_block_others() {
    let doc = document(json!({"id": "m", "root": {"tag": "div", "children": [
        {"props": {"orphan": true}},
        {"text": "still here"},
        7
    ]}}));
    let (tree, diagnostics) = Renderer::builtin()
        .render_with_diagnostics(&doc, &RenderOptions::default())
        .unwrap();
    let tree = tree.unwrap();
    assert_eq!(tree.children(), &[Element::text("still here")]);
    assert_eq!(diagnostics.count(DiagnosticKind::MalformedNode), 2);
}

#[test]
fn invariant_source_view_wraps_only_once() {
    let doc = document(json!({"id": "sv", "root": {"tag": "div", "children": [{"type": "Card"}]}}));
    let tree = Renderer::builtin()
        .render(&doc, &RenderOptions::default().with_source())
        .unwrap()
        .unwrap();

    let source_views = count(&tree, &|e| matches!(e, Element::SourceView { .. }));
    assert_eq!(source_views, 1);
    assert!(tree.to_html().contains("data-layout-source"));
}

#[test]
fn invariant_source_view_carries_authored_document() {
    let raw = json!({
        "id": "authored",
        "root": {"tag": "div", "key": 7, "children": [
            {"text": "hi", "className": "lead"},
            {"type": "Card", "props": "oops", "note": "kept"}
        ]}
    });
    let doc = document(raw.clone());
    let tree = Renderer::builtin()
        .render(&doc, &RenderOptions::default().with_source())
        .unwrap()
        .unwrap();

    let Element::SourceView { source, fingerprint, .. } = &tree else {
        panic!("expected a source view at the top level");
    };
    assert_eq!(serde_json::from_str::<Value>(source).unwrap(), raw);

    let trimmed = document(json!({
        "id": "authored",
        "root": {"tag": "div", "key": "7", "children": [{"text": "hi"}, {"type": "Card"}]}
    }));
    assert_ne!(fingerprint, &document_fingerprint(&trimmed).unwrap());
    assert_eq!(fingerprint, &document_fingerprint(&doc).unwrap());
}

fn count(element: &Element, predicate: &dyn Fn(&Element) -> bool) -> usize {
    usize::from(predicate(element))
        + element.children().iter().map(|c| count(c, predicate)).sum::<usize>()
}

#[test]
fn invariant_shipped_catalog_renders_cleanly() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("catalog");
    let catalog = LayoutCatalog::load_from_dir(&dir).unwrap();
    assert_eq!(catalog.len(), 4);

    let renderer = Renderer::builtin();
    for doc in catalog.list() {
        let (tree, diagnostics) = renderer
            .render_with_diagnostics(doc, &RenderOptions::default())
            .unwrap();
        assert!(tree.is_some(), "{} rendered nothing", doc.id);
        assert!(diagnostics.is_empty(), "{}: {:?}", doc.id, diagnostics);
    }
}

#[test]
fn invariant_catalog_chart_receives_dataset() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("catalog");
    let catalog = LayoutCatalog::load_from_dir(&dir).unwrap();
    let doc = catalog.get("revenue-area-chart").unwrap();

    let tree = Renderer::builtin().render(doc, &RenderOptions::default()).unwrap().unwrap();
    let chart = tree.find_component("AreaChart").unwrap();
    let props = chart.props().unwrap();
    assert_eq!(props["data"].as_array().map(Vec::len), Some(6));
    assert_eq!(props["height"], json!(240));
    assert_eq!(props["config"]["online"]["label"], json!("Online"));
    assert!(tree.text_content().contains("Trending up by 5.2% this month"));
}

#[test]
fn invariant_catalog_diagram_renders_svg() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("catalog");
    let catalog = LayoutCatalog::load_from_dir(&dir).unwrap();
    let doc = catalog.get("pipeline-diagram").unwrap();

    let host = StyleHost::new();
    let mounted = Renderer::builtin().mount(doc, &RenderOptions::default(), &host).unwrap();
    let html = mounted.tree().unwrap().to_html();
    assert!(html.starts_with("<figure class=\"pipeline\"><svg viewBox=\"0 0 360 80\""));
    assert!(html.contains("<stop offset=\"0%\" stop-color=\"#6366f1\"></stop>"));
    assert!(html.contains("<marker id=\"arrow\" markerWidth=\"8\" markerHeight=\"8\" refX=\"6\""));
    assert!(html.contains("marker-end=\"url(#arrow)\""));
    assert!(html.contains("text-anchor=\"middle\""));
    assert!(!html.contains("stopColor"));
    assert!(html.contains("Ingest → Transform → Publish"));
    assert!(host.to_html().contains("forgeui-styles-pipeline-diagram"));
}
