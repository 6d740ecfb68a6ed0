use anyhow::Context;
use clap::{Parser, ValueEnum};
use stagecraft_core::{
    Camera, DrawContext, GameSettings, InputState, Node, RecordingContext, SceneDescriptionLoader,
    SceneWriter,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scene file to run, or a directory to list the scenes in it
    #[arg(value_name = "SCENE")]
    scene: PathBuf,

    /// Number of frames to step
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// JSON settings file
    #[arg(long, value_name = "JSON")]
    settings: Option<PathBuf>,

    /// Clip to play on every node that has it (repeatable)
    #[arg(long = "play", value_name = "CLIP")]
    play: Vec<String>,

    /// Print the scene as re-serialized after loading
    #[arg(long)]
    dump: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

/// Starts `clip` on every animatable node under `node` that defines it.
fn play_everywhere(node: &mut Node, clip: &str) -> usize {
    let mut started = 0;
    if let Some(track) = node.element_mut().animator_mut() {
        if track.has_clip(clip) && track.play(clip).is_ok() {
            debug!(node = node.name(), clip, "clip started");
            started += 1;
        }
    }
    for child in node.children_mut() {
        started += play_everywhere(child, clip);
    }
    started
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.to_string().parse()?)
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }

    if cli.scene.is_dir() {
        for path in SceneDescriptionLoader::available_scenes(&cli.scene)? {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let settings = match &cli.settings {
        Some(path) => GameSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => GameSettings::default(),
    };

    info!("Scene: {:?}", cli.scene);
    let loader = SceneDescriptionLoader::default().with_linear_filtering(settings.linear_filtering());
    let mut scene = loader.load(&cli.scene);

    for clip in &cli.play {
        if play_everywhere(scene.root_mut(), clip) == 0 {
            warn!(clip = clip.as_str(), "no node has this clip");
        }
    }

    if cli.dump {
        print!("{}", SceneWriter::to_text(&scene));
    }

    let camera = Camera::from_settings(&settings);
    debug!(
        left = camera.left(),
        right = camera.right(),
        top = camera.top(),
        bottom = camera.bottom(),
        "camera bounds"
    );

    let mut ctx = RecordingContext::new();
    scene
        .upload_resources(&mut ctx)
        .context("texture upload failed")?;

    // Headless: no device feeds the input state, but nodes still see it.
    let mut input = InputState::new();
    let dt = settings.frame_time();
    let mut primitives = 0;
    for frame in 0..cli.frames {
        scene.handle_input(&input);
        scene.update(dt);

        ctx.clear(settings.graphics.clear_color);
        camera.apply(&mut ctx);
        scene
            .render(&mut ctx)
            .with_context(|| format!("render failed on frame {frame}"))?;
        primitives += ctx.primitive_count();
        ctx.take();
        input.end_frame();
    }

    info!(
        scene = scene.name(),
        nodes = scene.total_node_count(),
        frames = cli.frames,
        primitives,
        textures = ctx.textures().len(),
        "run complete"
    );
    println!(
        "{}: {} nodes, {} frames, {} primitives drawn",
        scene.name(),
        scene.total_node_count(),
        cli.frames,
        primitives
    );
    Ok(())
}
