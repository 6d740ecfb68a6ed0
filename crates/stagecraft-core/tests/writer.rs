//! Scene Writer Tests
//!
//! Saving a scene and loading the result back.

use glam::Vec2;
use stagecraft_core::{AnimationFrame, Color, SceneDescriptionLoader, SceneWriter};

const SOURCE: &str = "\
scene:
  name: Round Trip
nodes:
  - type: Sprite2D
    name: Hero
    position: [160, -90.5]
    scale: [2, 2]
    color: [1, 1, 1, 0.5]
    hframes: 6
    vframes: 4
    frame: 3
    animations:
      IDLE:
        start_frame: 1
        frame_count: 2
        frame_rate: 8
      COMBO:
        frames:
          - [0, 2]
          - [10, 3]
        frame_rate: 4.5
        loop: false
  - type: OscillatingRectangle
    name: \"Pad: left\"
    params: [0.5, 3]
    color: [0, 0, 1]
    children:
      - type: RotatingTriangle
        name: spinner
        params: [45]
";

/// Validates:
/// - names, types, transforms, behavior params, sprite fields, clips and
///   children survive save then load
#[test]
fn save_and_reload_preserves_scene() {
    let loader = SceneDescriptionLoader::default();
    let original = loader.load_str(SOURCE);
    assert_eq!(original.total_node_count(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.yaml");
    SceneWriter::save(&original, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Scene: Round Trip\n"));

    let reloaded = loader.load(&path);
    assert_eq!(reloaded.name(), "Round Trip");
    assert_eq!(reloaded.total_node_count(), 3);

    let hero = reloaded.find("Hero").unwrap();
    assert_eq!(hero.type_name(), "Sprite2D");
    let t = hero.element().transform().unwrap();
    assert_eq!(t.position, Vec2::new(160.0, -90.5));
    assert_eq!(t.scale, Vec2::new(2.0, 2.0));
    assert_eq!(hero.element().color(), Some(Color::new(1.0, 1.0, 1.0, 0.5)));

    let sprite = hero.element().as_sprite().unwrap();
    assert_eq!((sprite.hframes(), sprite.vframes(), sprite.frame()), (6, 4, 3));

    let idle = sprite.animator().clip("IDLE").unwrap();
    assert_eq!(idle.frames, vec![AnimationFrame::new(1, 2)]);
    assert_eq!(idle.frame_rate, 8.0);
    assert!(idle.looping);

    let combo = sprite.animator().clip("COMBO").unwrap();
    assert_eq!(
        combo.frames,
        vec![AnimationFrame::new(0, 2), AnimationFrame::new(10, 3)]
    );
    assert_eq!(combo.frame_rate, 4.5);
    assert!(!combo.looping);

    let pad = reloaded.find("Pad: left").unwrap();
    assert_eq!(pad.type_name(), "OscillatingRectangle");
    assert_eq!(pad.behaviors()[0].params(), vec!["0.5", "3"]);
    assert_eq!(pad.element().color(), Some(Color::rgb(0.0, 0.0, 1.0)));

    let spinner = reloaded.find("spinner").unwrap();
    assert_eq!(spinner.parent(), Some(pad.id()));
    assert_eq!(spinner.behaviors()[0].params(), vec!["45"]);
}

/// Validates:
/// - motion applied by behaviors is not written; authored values are
#[test]
fn saving_after_updates_keeps_authored_transform() {
    let source = "\
scene:
  name: Moving
nodes:
  - type: OscillatingRectangle
    name: paddle
    position: [100, 20]
    scale: [2, 1]
    params: [12, 2]
  - type: PulsingTriangle
    name: marker
    position: [5, 5]
    scale: [3, 3]
    params: [1, 0.25, 4]
";
    let loader = SceneDescriptionLoader::default();
    let mut scene = loader.load_str(source);
    for _ in 0..5 {
        scene.update(0.1);
    }
    let live = scene.find("paddle").unwrap().element().transform().unwrap();
    assert_ne!(live.position.x, 100.0);
    let live = scene.find("marker").unwrap().element().transform().unwrap();
    assert_ne!(live.scale, Vec2::new(3.0, 3.0));

    let reloaded = loader.load_str(&SceneWriter::to_text(&scene));
    let paddle = reloaded.find("paddle").unwrap().element().transform().unwrap();
    assert_eq!(paddle.position, Vec2::new(100.0, 20.0));
    assert_eq!(paddle.scale, Vec2::new(2.0, 1.0));
    let marker = reloaded.find("marker").unwrap().element().transform().unwrap();
    assert_eq!(marker.position, Vec2::new(5.0, 5.0));
    assert_eq!(marker.scale, Vec2::new(3.0, 3.0));
}

#[test]
fn text_output_is_stable() {
    let loader = SceneDescriptionLoader::default();
    let scene = loader.load_str(SOURCE);
    let first = SceneWriter::to_text(&scene);
    let second = SceneWriter::to_text(&loader.load_str(&first));
    assert_eq!(first, second);
}

#[test]
fn empty_scene_writes_name_only() {
    let scene = stagecraft_core::Scene::new("Blank");
    let reloaded = SceneDescriptionLoader::default().load_str(&SceneWriter::to_text(&scene));
    assert_eq!(reloaded.name(), "Blank");
    assert_eq!(reloaded.node_count(), 0);
}

#[test]
fn save_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let scene = stagecraft_core::Scene::new("x");
    let result = SceneWriter::save(&scene, dir.path().join("no/such/dir.yaml"));
    assert!(result.is_err());
}
