use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "typemotion", version)]
struct Cli {
    /// Engine configuration JSON (defaults plus environment overrides when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a video (requires `ffmpeg`).
    Render(RenderArgs),
    /// Compile a timeline and print its size.
    Compile(CompileArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// List easing curve names.
    Easings,
}

#[derive(clap::Args, Debug)]
struct Inputs {
    /// Transcript JSON.
    #[arg(long)]
    transcript: PathBuf,

    /// Style JSON.
    #[arg(long)]
    styles: PathBuf,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    inputs: Inputs,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Background video or image composited under the text.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Disable periodic progress lines.
    #[arg(long)]
    no_progress: bool,
}

#[derive(clap::Args, Debug)]
struct CompileArgs {
    #[command(flatten)]
    inputs: Inputs,

    /// Print the compiled timeline as JSON.
    #[arg(long)]
    dump: bool,
}

#[derive(clap::Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    inputs: Inputs,

    /// Frame index (0-based).
    #[arg(long)]
    index: usize,

    /// Background video or image composited under the text.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Compile(args) => cmd_compile(config, args),
        Command::Frame(args) => cmd_frame(config, args),
        Command::Easings => {
            for ease in typemotion::Ease::ALL {
                println!("{}", ease.name());
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<typemotion::EngineConfig> {
    let config = match path {
        Some(p) => typemotion::EngineConfig::from_json_file(p)?,
        None => typemotion::EngineConfig::from_env(),
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn compile(
    engine: &typemotion::Engine,
    inputs: &Inputs,
) -> anyhow::Result<typemotion::Timeline> {
    let transcript = typemotion::parse_transcript(&inputs.transcript)
        .with_context(|| format!("load transcript '{}'", inputs.transcript.display()))?;
    let styles = typemotion::parse_styles(&inputs.styles)
        .with_context(|| format!("load styles '{}'", inputs.styles.display()))?;
    tracing::debug!(
        segments = transcript.segments.len(),
        words = transcript.word_count(),
        "inputs loaded"
    );
    Ok(engine.compile(&transcript, &styles)?)
}

fn cmd_render(config: typemotion::EngineConfig, args: RenderArgs) -> anyhow::Result<()> {
    let engine = typemotion::Engine::new(config)?;
    let timeline = compile(&engine, &args.inputs)?;
    let opts = typemotion::RenderOptions {
        background: args.background,
        progress: !args.no_progress,
    };
    let report = engine.render(&timeline, &args.out, &opts)?;

    eprintln!(
        "wrote {} ({} frames, {} fallback, {} effect failures, {:.1}s)",
        args.out.display(),
        report.frames_written,
        report.fallback_frames,
        report.effect_failures,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

fn cmd_compile(config: typemotion::EngineConfig, args: CompileArgs) -> anyhow::Result<()> {
    let engine = typemotion::Engine::new(config)?;
    let timeline = compile(&engine, &args.inputs)?;
    if args.dump {
        let json = serde_json::to_string_pretty(&timeline).context("serialize timeline")?;
        println!("{json}");
    } else {
        println!(
            "frames: {}\nelements: {}\nduration: {:.3}s\nfps: {}\nresolution: {}x{}",
            timeline.frame_count(),
            timeline.element_count(),
            timeline.duration,
            timeline.fps,
            timeline.resolution.width,
            timeline.resolution.height
        );
    }
    Ok(())
}

fn cmd_frame(config: typemotion::EngineConfig, args: FrameArgs) -> anyhow::Result<()> {
    let engine = typemotion::Engine::new(config)?;
    let timeline = compile(&engine, &args.inputs)?;
    let mut background = args
        .background
        .as_deref()
        .map(|p| typemotion::open_background(p, engine.config()))
        .transpose()
        .context("open background")?;
    let background: Option<&mut dyn typemotion::BackgroundSource> = match background.as_mut() {
        Some(bg) => Some(bg.as_mut() as &mut dyn typemotion::BackgroundSource),
        None => None,
    };
    let frame = engine.render_frame_image(&timeline, args.index, background)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        frame.as_bytes(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
