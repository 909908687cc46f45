use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "turnabout", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the video and soundtrack (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the expanded timeline steps and sound events as JSON.
    Plan(ScriptArgs),
}

#[derive(Args, Debug)]
struct ScriptArgs {
    /// Input scene script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Asset catalog JSON. Defaults to the standard bundle layout.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory asset paths are resolved against. Defaults to the script's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Frames a finished line is held.
    #[arg(long, default_value_t = 25)]
    lag_frames: u64,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Output MP4 path (silent).
    #[arg(long)]
    video: PathBuf,

    /// Output audio path; the codec follows the extension.
    #[arg(long)]
    audio: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 18)]
    fps: u32,

    /// Seed for shake jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Fail instead of overwriting existing outputs.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Seed for shake jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

struct Loaded {
    script: turnabout::SceneScript,
    catalog: turnabout::AssetCatalog,
    assets_root: PathBuf,
    expander: turnabout::ExpanderOpts,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn load(args: &ScriptArgs) -> anyhow::Result<Loaded> {
    let script = turnabout::SceneScript::from_path(&args.in_path)
        .with_context(|| format!("load scene script '{}'", args.in_path.display()))?;
    let catalog = match args.catalog.as_deref() {
        Some(path) => turnabout::AssetCatalog::from_path(path)
            .with_context(|| format!("load asset catalog '{}'", path.display()))?,
        None => turnabout::AssetCatalog::standard(),
    };
    let assets_root = match args.assets.clone() {
        Some(root) => root,
        None => args
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let expander = turnabout::ExpanderOpts {
        lag_frames: args.lag_frames,
        ..turnabout::ExpanderOpts::default()
    };
    Ok(Loaded {
        script,
        catalog,
        assets_root,
        expander,
    })
}

fn expand(loaded: &Loaded) -> anyhow::Result<turnabout::Timeline> {
    let source = turnabout::FsAssetSource::new(&loaded.assets_root);
    let mut expander =
        turnabout::Expander::new(&loaded.catalog, &source, loaded.expander.clone())?;
    Ok(expander.expand(&loaded.script)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let loaded = load(&args.script)?;
    let opts = turnabout::RenderJobOpts {
        fps: turnabout::Fps::whole(args.fps)?,
        seed: args.seed,
        overwrite: !args.no_overwrite,
        expander: loaded.expander.clone(),
        ..turnabout::RenderJobOpts::default()
    };
    let stats = turnabout::render_job(
        &loaded.script,
        &loaded.catalog,
        &loaded.assets_root,
        &args.video,
        &args.audio,
        &opts,
    )?;

    eprintln!(
        "wrote {} and {} ({} frames, {:.2}s)",
        args.video.display(),
        args.audio.display(),
        stats.frames,
        stats.duration_secs
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let loaded = load(&args.script)?;
    let timeline = expand(&loaded)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let frame = turnabout::render_frame(&timeline, turnabout::FrameIndex(args.frame), &mut rng)?;

    turnabout::ensure_parent_dir(&args.out)?;
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: ScriptArgs) -> anyhow::Result<()> {
    let loaded = load(&args)?;
    let timeline = expand(&loaded)?;
    let plan = serde_json::json!({
        "total_frames": timeline.total_frames(),
        "steps": timeline.steps(),
        "sound_events": timeline.sound_events(),
    });
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
