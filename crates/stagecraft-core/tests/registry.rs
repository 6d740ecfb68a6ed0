//! Node Type Registry Tests
//!
//! Tests for factory registration, lookup across the two namespaces, and
//! lenient parameter coercion in the built-in behavior composites.

use glam::Vec2;
use stagecraft_core::node::Rectangle;
use stagecraft_core::{Color, Node, NodeParams, NodeTypeRegistry, Resolved, SceneError};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn builtins_are_registered() {
    let registry = NodeTypeRegistry::with_builtins();
    assert_eq!(
        registry.type_names(),
        vec![
            "OscillatingRectangle",
            "PulsingTriangle",
            "Rectangle",
            "RotatingTriangle",
            "Sprite2D",
            "Triangle",
        ]
    );
    assert!(registry.has_node_type("Sprite2D"));
    assert!(!registry.has_node_type("RotatingTriangle"));
    assert!(registry.has_behavior_type("RotatingTriangle"));
}

/// Validates:
/// - resolve reports which namespace matched, or NotFound
#[test]
fn resolve_reports_namespace() {
    let registry = NodeTypeRegistry::with_builtins();
    assert!(matches!(registry.resolve("Triangle"), Resolved::Node(_)));
    assert!(matches!(
        registry.resolve("PulsingTriangle"),
        Resolved::Behavior(_)
    ));
    let missing = registry.resolve("Hexagon");
    assert!(matches!(missing, Resolved::NotFound));
    assert!(!missing.is_found());
    assert!(missing.build(&NodeParams::default(), &[]).is_none());

    // Lookups are case-sensitive.
    assert!(!registry.resolve("triangle").is_found());
}

#[test]
fn node_namespace_wins_on_conflict() {
    let mut registry = NodeTypeRegistry::new();
    registry.register_behavior_factory("Thing", |p, _| {
        Node::new(&p.name, "behavior", Box::new(Rectangle::new(p.transform(), p.color)))
    });
    registry.register_node_factory("Thing", |p| {
        Node::new(&p.name, "plain", Box::new(Rectangle::new(p.transform(), p.color)))
    });

    let node = registry.create("Thing", &NodeParams::named("t"), &[]).unwrap();
    assert_eq!(node.type_name(), "plain");
    assert_eq!(registry.type_names(), vec!["Thing"]);
}

#[test]
fn create_unknown_type_fails() {
    let registry = NodeTypeRegistry::new();
    let err = registry
        .create("Nope", &NodeParams::default(), &[])
        .unwrap_err();
    assert!(matches!(err, SceneError::UnknownType(ref t) if t == "Nope"));
    assert_eq!(err.to_string(), "unknown node type 'Nope'");
}

/// Validates:
/// - common parameters reach the constructed element
#[test]
fn common_params_are_applied() {
    let registry = NodeTypeRegistry::with_builtins();
    let params = NodeParams {
        name: "box".to_string(),
        position: Vec2::new(3.0, 4.0),
        scale: Vec2::new(2.0, 2.0),
        color: Color::ORANGE,
    };
    let node = registry.create("Rectangle", &params, &[]).unwrap();
    assert_eq!(node.name(), "box");
    assert_eq!(node.type_name(), "Rectangle");
    let t = node.element().transform().unwrap();
    assert_eq!(t.position, Vec2::new(3.0, 4.0));
    assert_eq!(t.scale, Vec2::new(2.0, 2.0));
    assert_eq!(node.element().color(), Some(Color::ORANGE));
    assert!(node.behaviors().is_empty());
}

#[test]
fn default_params() {
    let params = NodeParams::default();
    assert_eq!(params.name, "Default");
    assert_eq!(params.position, Vec2::ZERO);
    assert_eq!(params.scale, Vec2::ONE);
    assert_eq!(params.color, Color::WHITE);
}

/// Validates:
/// - behavior composites read their parameters in order
/// - a missing or non-numeric parameter keeps its default
#[test]
fn behavior_params_fall_back_to_defaults() {
    let registry = NodeTypeRegistry::with_builtins();
    let params = NodeParams::named("b");

    let spinner = registry
        .create("RotatingTriangle", &params, &strings(&["fast"]))
        .unwrap();
    assert_eq!(spinner.behaviors()[0].params(), strings(&["90"]));

    let spinner = registry
        .create("RotatingTriangle", &params, &strings(&["45"]))
        .unwrap();
    assert_eq!(spinner.behaviors()[0].params(), strings(&["45"]));

    let osc = registry
        .create("OscillatingRectangle", &params, &strings(&["0.5", "abc"]))
        .unwrap();
    assert_eq!(osc.behaviors()[0].params(), strings(&["0.5", "2"]));

    let pulse = registry.create("PulsingTriangle", &params, &[]).unwrap();
    assert_eq!(pulse.behaviors()[0].params(), strings(&["1", "0.2", "3"]));
    assert_eq!(pulse.behaviors()[0].name(), "pulse");
}

#[test]
fn oscillation_centers_on_construction_position() {
    let registry = NodeTypeRegistry::with_builtins();
    let params = NodeParams {
        position: Vec2::new(5.0, 1.0),
        ..NodeParams::named("osc")
    };
    let mut node = registry
        .create("OscillatingRectangle", &params, &strings(&["1", "1"]))
        .unwrap();

    let quarter = std::f32::consts::FRAC_PI_2;
    node.update_recursive(quarter);
    let x = node.element().transform().unwrap().position.x;
    assert!((x - 6.0).abs() < 1e-5);

    node.update_recursive(2.0 * quarter);
    let x = node.element().transform().unwrap().position.x;
    assert!((x - 4.0).abs() < 1e-5);
}

#[test]
fn custom_factories_can_be_added() {
    let mut registry = NodeTypeRegistry::with_builtins();
    registry.register_node_factory("Wall", |p| {
        Node::new(
            &p.name,
            "Wall",
            Box::new(Rectangle::new(p.transform(), Color::BLACK).with_size(10.0, 1.0)),
        )
    });
    assert!(registry.has_node_type("Wall"));

    let wall = registry.create("Wall", &NodeParams::named("w"), &[]).unwrap();
    assert_eq!(wall.element().color(), Some(Color::BLACK));
    assert_eq!(registry.type_names().len(), 7);
}
