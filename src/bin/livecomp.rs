use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use livecomp::{
    Canvas, ExportOpts, FontSource, FrameIndex, FrameRange, LiveSession, MediaTime, PatternAsset,
    PngSequenceSink, SessionOpts, TextOverlayParams,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "livecomp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a single frame of a synthetic source as a PNG.
    Frame(FrameArgs),
    /// Compose a range of frames as a numbered PNG sequence.
    Frames(FramesArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Session options JSON; command-line sizes override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width.
    #[arg(long)]
    width: Option<u32>,

    /// Output height.
    #[arg(long)]
    height: Option<u32>,

    /// Effect canvas scale.
    #[arg(long)]
    scale: Option<f32>,

    /// Source duration in seconds.
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Overlay text; omitted means passthrough.
    #[arg(long)]
    text: Option<String>,

    /// Overlay color (`#RRGGBB`, `#RRGGBBAA` or a CSS name).
    #[arg(long, default_value = "white")]
    color: String,

    /// Overlay font size in pixels.
    #[arg(long, default_value_t = 48.0)]
    font_size: f32,

    /// System font family.
    #[arg(long, conflicts_with = "font_file")]
    font_family: Option<String>,

    /// Font file (TTF/OTF).
    #[arg(long)]
    font_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output time in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// First frame index.
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Frame index past the last one; defaults to the end of the source.
    #[arg(long)]
    end: Option<u64>,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Compose frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per batch.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
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
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let session = open_session(&args.source)?;
    let frame = session
        .render_frame(MediaTime::from_secs_f64(args.time))
        .with_context(|| format!("compose frame at {}s", args.time))?;
    livecomp::write_png(&frame, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let session = open_session(&args.source)?;
    let snapshot = session.snapshot();
    let total = snapshot.config().fps.frames_in(snapshot.duration());
    let range = FrameRange::new(FrameIndex(args.start), FrameIndex(args.end.unwrap_or(total)))?;
    let opts = ExportOpts {
        parallel: args.parallel,
        threads: args.threads,
        chunk_size: args.chunk_size,
    };
    let mut sink = PngSequenceSink::new(&args.out_dir);
    let stats = session
        .render_range(range, &opts, &mut sink)
        .context("export frames")?;
    eprintln!("wrote {} frames to {}", stats.frames, args.out_dir.display());
    Ok(())
}

fn open_session(args: &SourceArgs) -> anyhow::Result<LiveSession> {
    let mut opts = match &args.config {
        Some(path) => SessionOpts::from_path(path)?,
        None => SessionOpts::default(),
    };
    if let Some(width) = args.width {
        opts.render_size.width = width;
    }
    if let Some(height) = args.height {
        opts.render_size.height = height;
    }
    if let Some(scale) = args.scale {
        opts.render_scale = scale;
    }
    let opts = opts.with_env_overrides()?;

    let size: Canvas = opts.render_size;
    let mut session = LiveSession::new(opts).context("start session")?;
    let asset = PatternAsset::new(size, MediaTime::from_secs_f64(args.duration));
    pollster::block_on(session.set_main_track(&asset)).context("set main track")?;

    if let Some(text) = &args.text {
        let font = match (&args.font_file, &args.font_family) {
            (Some(path), _) => FontSource::File { path: path.clone() },
            (None, Some(family)) => FontSource::System {
                family: family.clone(),
            },
            (None, None) => FontSource::default(),
        };
        let params = TextOverlayParams::new(text.clone(), args.font_size, args.color.clone())
            .with_font(font);
        session.set_overlay_instruction(params)?;
    }
    Ok(session)
}
