//! Scene Loader Tests
//!
//! Tests for building scenes from documents: node construction through the
//! registry, sprite-sheet fields, animation clips, nesting, asset decoding,
//! and fail-soft recovery from bad files, entries and values.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use glam::Vec2;
use stagecraft_core::render::{Rect, TextureId};
use stagecraft_core::systems::{DEFAULT_SCENE_NAME, ERROR_SCENE_NAME};
use stagecraft_core::{
    AnimationFrame, AssetLoader, Color, DrawCommand, NodeTypeRegistry, PlaybackState,
    RecordingContext, Scene, SceneDescriptionLoader, SceneError,
};

const DEMO: &str = r#"
# Demo scene
scene:
  name: "Demo"
nodes:
  - type: Sprite2D
    name: Hero
    position: [160, 90]
    scale: [1, 1]
    image_path: assets/hero.png
    hframes: 6
    vframes: 4
    animations:
      IDLE:
        start_frame: 1
        frame_count: 2
        frame_rate: 8
        loop: true
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("stagecraft_core=debug")
        .with_test_writer()
        .try_init();
}

/// Serves assets from memory.
#[derive(Default)]
struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    fn with_png(mut self, path: &str, width: u32, height: u32) -> Self {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        self.files.insert(path.to_string(), bytes);
        self
    }
}

impl AssetLoader for MemoryAssets {
    fn load_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Asset not found: {path}"))
    }
}

fn loader() -> SceneDescriptionLoader {
    init_tracing();
    SceneDescriptionLoader::new(
        NodeTypeRegistry::with_builtins(),
        Arc::new(MemoryAssets::default()),
    )
}

fn names(scene: &Scene) -> Vec<&str> {
    scene.nodes().iter().map(|n| n.name()).collect()
}

/// Validates:
/// - the demo document yields one sprite with its sheet layout and clip
/// - playing the clip drives the sprite frame
#[test]
fn demo_scene_loads_and_animates() {
    let mut scene = loader().load_str(DEMO);
    assert_eq!(scene.name(), "Demo");
    assert_eq!(names(&scene), vec!["Hero"]);

    let hero = scene.find("Hero").unwrap();
    assert_eq!(hero.type_name(), "Sprite2D");
    let t = hero.element().transform().unwrap();
    assert_eq!(t.position, Vec2::new(160.0, 90.0));
    assert_eq!(t.scale, Vec2::ONE);

    let sprite = hero.element().as_sprite().unwrap();
    assert_eq!(sprite.hframes(), 6);
    assert_eq!(sprite.vframes(), 4);
    assert_eq!(sprite.image_path(), "assets/hero.png");
    // The image is not in the asset store.
    assert!(!sprite.has_pending_texture());

    let idle = sprite.animator().clip("IDLE").unwrap();
    assert_eq!(idle.frames, vec![AnimationFrame::new(1, 2)]);
    assert_eq!(idle.frame_rate, 8.0);
    assert!(idle.looping);

    let hero = scene.find_mut("Hero").unwrap();
    let sprite = hero.element_mut().as_sprite_mut().unwrap();
    sprite.play_animation("IDLE").unwrap();
    assert_eq!(sprite.current_animation(), Some("IDLE"));

    scene.update(0.125);
    assert_eq!(scene.find("Hero").unwrap().element().as_sprite().unwrap().frame(), 2);
    scene.update(0.125);
    let sprite = scene.find("Hero").unwrap().element().as_sprite().unwrap();
    assert_eq!(sprite.animator().current_frame_index(), 1);
    assert_eq!(sprite.frame(), 1);
}

#[test]
fn load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.yaml");
    std::fs::write(&path, DEMO).unwrap();

    let scene = loader().load(&path);
    assert_eq!(scene.name(), "Demo");
    assert_eq!(scene.node_count(), 1);
}

#[test]
fn missing_file_yields_error_scene() {
    let dir = tempfile::tempdir().unwrap();
    let scene = loader().load(dir.path().join("nope.yaml"));
    assert_eq!(scene.name(), ERROR_SCENE_NAME);
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn empty_documents_yield_error_scene() {
    for text in ["", "\n\n", "# nothing here\n"] {
        let scene = loader().load_str(text);
        assert_eq!(scene.name(), ERROR_SCENE_NAME, "text {text:?}");
        assert_eq!(scene.node_count(), 0);
    }
}

#[test]
fn scene_name_defaults() {
    let scene = loader().load_str("nodes:\n  - type: Triangle\n");
    assert_eq!(scene.name(), DEFAULT_SCENE_NAME);
    assert_eq!(scene.nodes()[0].name(), "Default");
}

/// Validates:
/// - unknown or missing types skip only that entry
#[test]
fn bad_entries_are_skipped() {
    let text = "\
nodes:
  - type: Hexagon
    name: bad
  - name: untyped
  - type: Triangle
    name: good
  - type: Rectangle
    name: also_good
";
    let scene = loader().load_str(text);
    assert_eq!(names(&scene), vec!["good", "also_good"]);
}

#[test]
fn only_unknown_types_yield_empty_scene() {
    let scene = loader().load_str("scene:\n  name: Empty\nnodes:\n  - type: Nonexistent\n");
    assert_eq!(scene.name(), "Empty");
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn nodes_must_be_a_sequence() {
    let scene = loader().load_str("scene:\n  name: S\nnodes:\n  type: Triangle\n");
    assert_eq!(scene.name(), "S");
    assert_eq!(scene.node_count(), 0);
}

/// Validates:
/// - an invalid field keeps its default while the rest of the entry loads
#[test]
fn invalid_values_keep_defaults() {
    let text = "\
nodes:
  - type: Sprite2D
    name: s
    position: [abc, 1]
    scale: [2]
    hframes: 0
    vframes: -2
    frame: x
    animations:
      RUN:
        start_frame: abc
        frame_count: 0
        frame_rate: -3
";
    let scene = loader().load_str(text);
    let node = scene.find("s").unwrap();
    let t = node.element().transform().unwrap();
    assert_eq!(t.position, Vec2::ZERO);
    assert_eq!(t.scale, Vec2::ONE);

    let sprite = node.element().as_sprite().unwrap();
    assert_eq!(sprite.hframes(), 1);
    assert_eq!(sprite.vframes(), 1);
    assert_eq!(sprite.frame(), 0);

    let run = sprite.animator().clip("RUN").unwrap();
    assert_eq!(run.frames, vec![AnimationFrame::new(0, 1)]);
    assert_eq!(run.frame_rate, 12.0);
    assert!(run.looping);
}

/// Validates:
/// - oversized sheets, frame runs and frame rates load without aborting
/// - a clip whose runs overflow the frame count is skipped
/// - updating a clip at an extreme frame rate returns
#[test]
fn extreme_values_do_not_abort_loading() {
    init_tracing();
    let text = "\
nodes:
  - type: Sprite2D
    name: Big
    hframes: 70000
    vframes: 70000
    frame: 2000000000
    animations:
      HUGE:
        frames:
          - [0, 2000000000]
          - [0, 2000000000]
          - [0, 2000000000]
      FAST:
        frame_count: 4
        frame_rate: 1e10
  - type: Triangle
    name: after
";
    let mut scene = loader().load_str(text);
    assert_eq!(scene.node_count(), 2);
    assert!(scene.find("after").is_some());

    let sprite = scene.find("Big").unwrap().element().as_sprite().unwrap();
    assert_eq!(sprite.hframes(), 70000);
    assert_eq!(sprite.vframes(), 70000);
    assert_eq!(sprite.total_frames(), u32::MAX);
    assert_eq!(sprite.frame(), 2_000_000_000);
    assert!(!sprite.animator().has_clip("HUGE"));
    assert_eq!(sprite.animator().clip("FAST").unwrap().frame_rate, 1e10);

    scene
        .find_mut("Big")
        .unwrap()
        .element_mut()
        .animator_mut()
        .unwrap()
        .play("FAST")
        .unwrap();
    scene.update(1.0 / 60.0);
    let sprite = scene.find("Big").unwrap().element().as_sprite().unwrap();
    assert!(sprite.animator().is_playing());
    assert!(sprite.frame() < 4);
}

/// Validates:
/// - `loop` is true only for the exact literal, and true when absent
#[test]
fn loop_flag_literal() {
    let text = "\
nodes:
  - type: Sprite2D
    name: s
    animations:
      absent:
        frame_count: 2
      exact:
        loop: true
      quoted:
        loop: \"true\"
      capital:
        loop: True
      other:
        loop: yes
      off:
        loop: false
";
    let scene = loader().load_str(text);
    let track = scene.find("s").unwrap().element().animator().unwrap();
    let looping = |name: &str| track.clip(name).unwrap().looping;
    assert!(looping("absent"));
    assert!(looping("exact"));
    assert!(looping("quoted"));
    assert!(!looping("capital"));
    assert!(!looping("other"));
    assert!(!looping("off"));
    assert_eq!(track.clips().count(), 6);
}

#[test]
fn frame_runs_build_multi_run_clips() {
    let text = "\
nodes:
  - type: Sprite2D
    name: s
    hframes: 4
    vframes: 4
    animations:
      COMBO:
        frames:
          - [0, 2]
          - [10, 2]
          - start_frame: 4
            frame_count: 1
          - [7]
        frame_rate: 4
        loop: false
";
    let mut scene = loader().load_str(text);
    let sprite = scene
        .find_mut("s")
        .unwrap()
        .element_mut()
        .as_sprite_mut()
        .unwrap();
    let combo = sprite.animator().clip("COMBO").unwrap();
    assert_eq!(
        combo.frames,
        vec![
            AnimationFrame::new(0, 2),
            AnimationFrame::new(10, 2),
            AnimationFrame::new(4, 1),
        ]
    );
    assert!(!combo.looping);

    sprite.play_animation("COMBO").unwrap();
    scene.update(0.5);
    assert_eq!(scene.find("s").unwrap().element().as_sprite().unwrap().frame(), 10);
    scene.update(10.0);
    let sprite = scene.find("s").unwrap().element().as_sprite().unwrap();
    assert_eq!(sprite.frame(), 4);
    assert_eq!(sprite.animator().state(), PlaybackState::Finished);
}

#[test]
fn behavior_params_accept_arrays_and_comma_lists() {
    let text = "\
nodes:
  - type: RotatingTriangle
    name: inline
    params: [45]
  - type: PulsingTriangle
    name: comma
    params: \"2, 0.5, 1\"
  - type: OscillatingRectangle
    name: none
";
    let scene = loader().load_str(text);
    let params = |name: &str| scene.find(name).unwrap().behaviors()[0].params();
    assert_eq!(params("inline"), vec!["45"]);
    assert_eq!(params("comma"), vec!["2", "0.5", "1"]);
    assert_eq!(params("none"), vec!["0.1", "2"]);
}

#[test]
fn colors_and_tints() {
    let text = "\
nodes:
  - type: Triangle
    name: t
    color: [1, 0.5, 0]
  - type: Rectangle
    name: r
    color: [0, 0, 1, 0.5]
  - type: Sprite2D
    name: tinted
    color: [0, 1, 0]
  - type: Sprite2D
    name: plain
";
    let scene = loader().load_str(text);
    let color = |name: &str| scene.find(name).unwrap().element().color();
    assert_eq!(color("t"), Some(Color::ORANGE));
    assert_eq!(color("r"), Some(Color::new(0.0, 0.0, 1.0, 0.5)));
    assert_eq!(color("tinted"), Some(Color::GREEN));
    assert_eq!(color("plain"), None);
}

/// Validates:
/// - `children` entries nest under their parent, recursively
#[test]
fn children_are_nested() {
    let text = "\
nodes:
  - type: Rectangle
    name: body
    children:
      - type: Triangle
        name: arm
        children:
          - type: Triangle
            name: hand
      - type: Bogus
        name: skipped
  - type: Triangle
    name: other
";
    let scene = loader().load_str(text);
    assert_eq!(names(&scene), vec!["body", "other"]);
    assert_eq!(scene.total_node_count(), 4);

    let body = scene.find("body").unwrap();
    let arm = scene.find("arm").unwrap();
    let hand = scene.find("hand").unwrap();
    assert_eq!(body.parent(), Some(scene.root().id()));
    assert_eq!(arm.parent(), Some(body.id()));
    assert_eq!(hand.parent(), Some(arm.id()));
    assert!(scene.find("skipped").is_none());
}

#[test]
fn animations_on_shapes_are_ignored() {
    let text = "\
nodes:
  - type: Triangle
    name: t
    animations:
      SPIN:
        frame_count: 4
";
    let scene = loader().load_str(text);
    let node = scene.find("t").unwrap();
    assert!(node.element().animator().is_none());
}

/// Validates:
/// - images are decoded at load time through the asset loader
/// - upload_resources hands them to the draw context
#[test]
fn sprite_textures_decode_and_upload() {
    init_tracing();
    let assets = MemoryAssets::default().with_png("sheet.png", 8, 4);
    let loader = SceneDescriptionLoader::new(NodeTypeRegistry::with_builtins(), Arc::new(assets))
        .with_linear_filtering(true);

    let text = "\
nodes:
  - type: Sprite2D
    name: s
    image_path: sheet.png
    hframes: 2
    vframes: 2
  - type: Sprite2D
    name: broken
    image_path: missing.png
";
    let mut scene = loader.load_str(text);
    assert!(scene.find("s").unwrap().element().as_sprite().unwrap().has_pending_texture());
    assert!(!scene.find("broken").unwrap().element().as_sprite().unwrap().has_pending_texture());

    let mut ctx = RecordingContext::new();
    scene.upload_resources(&mut ctx).unwrap();
    assert_eq!(ctx.textures().get(&TextureId(1)), Some(&(8, 4)));
    assert_eq!(ctx.textures().len(), 1);

    ctx.take();
    scene.render(&mut ctx).unwrap();
    assert!(ctx.commands().iter().any(|c| matches!(
        c,
        DrawCommand::Sprite { texture: TextureId(1), dest, .. } if *dest == Rect::new(-2.0, -1.0, 4.0, 2.0)
    )));
    // The broken sprite still draws its placeholder.
    assert!(ctx
        .commands()
        .contains(&DrawCommand::Rectangle(Rect::new(-0.5, -0.5, 1.0, 1.0))));
}

#[test]
fn custom_types_load_through_registry() {
    use stagecraft_core::node::Rectangle;
    use stagecraft_core::Node;

    let mut loader = loader();
    loader.registry_mut().register_node_factory("Floor", |p| {
        Node::new(&p.name, "Floor", Box::new(Rectangle::new(p.transform(), Color::BLACK)))
    });
    let scene = loader.load_str("nodes:\n  - type: Floor\n    name: ground\n");
    assert_eq!(scene.find("ground").unwrap().type_name(), "Floor");
}

#[test]
fn available_scenes_are_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.yaml", "a.yml", "notes.txt", "c.YAML"] {
        std::fs::write(dir.path().join(name), "nodes:\n").unwrap();
    }
    std::fs::create_dir(dir.path().join("d.yaml")).unwrap();

    let scenes = SceneDescriptionLoader::available_scenes(dir.path()).unwrap();
    let files: Vec<String> = scenes
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["a.yml", "b.yaml", "c.YAML"]);

    let missing = SceneDescriptionLoader::available_scenes(dir.path().join("none"));
    assert!(matches!(missing, Err(SceneError::Io { .. })));
}
