use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "strata", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a time range to a video (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Export the audio mix as raw interleaved stereo f32le at 44.1 kHz.
    Audio(AudioArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Composition time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Preview downscale factor (overrides the scene's `preview_level`).
    #[arg(long)]
    preview: Option<u32>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video path, or directory with `--png-sequence`.
    #[arg(long)]
    out: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Window start in seconds.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Window end in seconds (defaults to the scene duration).
    #[arg(long)]
    end: Option<f64>,

    /// Preview downscale factor (overrides the scene's `preview_level`).
    #[arg(long)]
    preview: Option<u32>,

    /// Render frames on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker thread count for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Write numbered PNGs into `--out` instead of encoding a video.
    #[arg(long)]
    png_sequence: bool,

    /// Encode without the audio track.
    #[arg(long)]
    no_audio: bool,
}

#[derive(Parser, Debug)]
struct AudioArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output `.f32le` path.
    #[arg(long)]
    out: PathBuf,

    /// Window start in seconds.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Window end in seconds (defaults to the scene duration).
    #[arg(long)]
    end: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Audio(args) => cmd_audio(args),
    }
}

fn load_scene(path: &Path) -> anyhow::Result<strata::Composition> {
    let def = strata::SceneDef::from_path(path)
        .with_context(|| format!("load scene '{}'", path.display()))?;
    let assets_root = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(def.build(assets_root)?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut comp = load_scene(&args.in_path)?;
    if let Some(level) = args.preview {
        comp.set_preview_level(level)?;
    }
    let frame = strata::render_frame_or_blank(&comp, args.time)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    strata::save_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut comp = load_scene(&args.in_path)?;
    if let Some(level) = args.preview {
        comp.set_preview_level(level)?;
    }

    let mut range = strata::RenderRangeOpts {
        start: args.start,
        end: args.end,
        fps: strata::Fps::new(args.fps, 1)?,
        ..strata::RenderRangeOpts::default()
    };
    if args.parallel {
        range = range.with_parallel(args.threads);
    }

    let stats = if args.png_sequence {
        let mut sink = strata::PngSequenceSink::new(&args.out);
        strata::render_range(&comp, &range, &mut sink)?
    } else {
        let opts = strata::WriteVideoOpts {
            range,
            ffmpeg: strata::FfmpegSinkOpts::new(&args.out),
            audio: !args.no_audio,
        };
        strata::write_video(&comp, opts)?
    };

    eprintln!(
        "wrote {} ({} frames, {} cache hits)",
        args.out.display(),
        stats.frames_total,
        stats.cache_hits
    );
    Ok(())
}

fn cmd_audio(args: AudioArgs) -> anyhow::Result<()> {
    let comp = load_scene(&args.in_path)?;
    if strata::write_audio_f32le(&comp, &args.out, args.start, args.end)? {
        eprintln!("wrote {}", args.out.display());
    } else {
        eprintln!("no audio in scene; nothing written");
    }
    Ok(())
}
