use crate::audio::buffer::{AUDIO_CHANNELS, AUDIO_SAMPLE_RATE};
use crate::audio::mix::write_f32le_file;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::frame::FrameRGBA;
use crate::scene::composition::Composition;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Time window, frame rate and threading for [`render_range`].
#[derive(Clone, Debug)]
pub struct RenderRangeOpts {
    /// First sample time in seconds.
    pub start: f64,
    /// Exclusive end in seconds; the composition duration when absent.
    pub end: Option<f64>,
    /// Sampling rate of the output.
    pub fps: Fps,
    /// Render chunks on a worker pool.
    pub parallel: bool,
    /// Worker count; rayon's default when absent.
    pub threads: Option<usize>,
    /// Frames scheduled per parallel batch.
    pub chunk_size: usize,
}

impl Default for RenderRangeOpts {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: None,
            fps: Fps { num: 30, den: 1 },
            parallel: false,
            threads: None,
            chunk_size: 64,
        }
    }
}

impl RenderRangeOpts {
    /// Sample `[start, end)`.
    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.start = start;
        self.end = Some(end);
        self
    }

    /// Set the output frame rate.
    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = fps;
        self
    }

    /// Render on a worker pool with `threads` workers (rayon's default when `None`).
    pub fn with_parallel(mut self, threads: Option<usize>) -> Self {
        self.parallel = true;
        self.threads = threads;
        self
    }
}

/// Counters from one range render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames delivered to the sink.
    pub frames_total: u64,
    /// Frames inside the composition's duration.
    pub frames_rendered: u64,
    /// Frames outside the duration, delivered as transparent canvases.
    pub frames_blank: u64,
    /// Frames answered by the composition cache.
    pub cache_hits: u64,
}

/// Options for [`write_video`].
#[derive(Clone, Debug)]
pub struct WriteVideoOpts {
    /// Sampling window and threading.
    pub range: RenderRangeOpts,
    /// Encoder settings.
    pub ffmpeg: FfmpegSinkOpts,
    /// Mux the composition's audio mix when it has any.
    pub audio: bool,
}

impl WriteVideoOpts {
    /// Encode to `out_path` with default range settings and audio enabled.
    pub fn new(out_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            range: RenderRangeOpts::default(),
            ffmpeg: FfmpegSinkOpts::new(out_path),
            audio: true,
        }
    }
}

/// Render frames at `start + i / fps` for every sample time before `end`, in order, into `sink`.
///
/// Times outside the composition's duration yield transparent canvases so the output stays
/// evenly spaced.
pub fn render_range(
    comp: &Composition,
    opts: &RenderRangeOpts,
    sink: &mut dyn FrameSink,
) -> StrataResult<RenderStats> {
    render_into(comp, opts, sink, None)
}

#[tracing::instrument(level = "info", skip_all, fields(start = opts.start, end = ?opts.end, parallel = opts.parallel))]
fn render_into(
    comp: &Composition,
    opts: &RenderRangeOpts,
    sink: &mut dyn FrameSink,
    audio: Option<AudioInputConfig>,
) -> StrataResult<RenderStats> {
    let range = frame_window(comp, opts)?;
    let (width, height) = comp.target_size();
    let hits_before = comp.cache_stats().hits;
    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    sink.begin(SinkConfig {
        width,
        height,
        fps: opts.fps,
        audio,
    })?;

    let mut stats = RenderStats::default();
    for chunk in range.chunks(opts.chunk_size as u64) {
        let render = |idx: FrameIndex| comp.render_at(sample_time(opts, idx));
        let frames = match pool.as_ref() {
            Some(pool) => pool.install(|| {
                (chunk.start.0..chunk.end.0)
                    .into_par_iter()
                    .map(|i| render(FrameIndex(i)))
                    .collect::<Vec<_>>()
            }),
            None => chunk.iter().map(render).collect(),
        };

        for (idx, frame) in chunk.iter().zip(frames) {
            match frame? {
                Some(frame) => {
                    sink.push_frame(idx, &frame)?;
                    stats.frames_rendered += 1;
                }
                None => {
                    sink.push_frame(idx, &FrameRGBA::transparent(width, height))?;
                    stats.frames_blank += 1;
                }
            }
            stats.frames_total += 1;
        }
    }
    sink.end()?;

    stats.cache_hits = comp.cache_stats().hits.saturating_sub(hits_before);
    tracing::info!(
        frames = stats.frames_total,
        blank = stats.frames_blank,
        cache_hits = stats.cache_hits,
        "range rendered"
    );
    Ok(stats)
}

/// Render to a video file through `ffmpeg`, muxing the audio mix when present.
///
/// The composition's frame cache is cleared afterwards, whether or not encoding succeeded.
pub fn write_video(comp: &Composition, opts: WriteVideoOpts) -> StrataResult<RenderStats> {
    let mut audio_tmp = TempFileGuard(None);
    let res = encode_video(comp, opts, &mut audio_tmp);
    comp.clear_cache();
    drop(audio_tmp);
    res
}

fn encode_video(
    comp: &Composition,
    opts: WriteVideoOpts,
    audio_tmp: &mut TempFileGuard,
) -> StrataResult<RenderStats> {
    let audio = if opts.audio {
        let start = opts.range.start.max(0.0);
        let end = opts.range.end.unwrap_or(comp.duration());
        match comp.get_audio(start, Some(end))? {
            Some(mix) => {
                let path = std::env::temp_dir().join(format!(
                    "strata_audio_{}_{}.f32le",
                    std::process::id(),
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_nanos())
                        .unwrap_or(0)
                ));
                audio_tmp.0 = Some(path.clone());
                write_f32le_file(&mix, &path)?;
                Some(AudioInputConfig {
                    path,
                    sample_rate: AUDIO_SAMPLE_RATE,
                    channels: AUDIO_CHANNELS,
                })
            }
            None => None,
        }
    } else {
        None
    };

    let mut sink = FfmpegSink::new(opts.ffmpeg);
    render_into(comp, &opts.range, &mut sink, audio)
}

/// Write the composition's audio mix over `[start, end)` as raw interleaved stereo `f32le`.
///
/// Returns `false` (and writes nothing) when no layer contributes audio.
pub fn write_audio_f32le(
    comp: &Composition,
    out_path: &Path,
    start: f64,
    end: Option<f64>,
) -> StrataResult<bool> {
    match comp.get_audio(start, end)? {
        Some(mix) => {
            write_f32le_file(&mix, out_path)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Render a single frame, substituting a transparent canvas outside the duration.
pub fn render_frame_or_blank(comp: &Composition, time: f64) -> StrataResult<Arc<FrameRGBA>> {
    match comp.render_at(time)? {
        Some(frame) => Ok(frame),
        None => {
            let (w, h) = comp.target_size();
            Ok(Arc::new(FrameRGBA::transparent(w, h)))
        }
    }
}

/// Frame indices sampled from the render window, starting at 0 for `opts.start`.
fn frame_window(comp: &Composition, opts: &RenderRangeOpts) -> StrataResult<FrameRange> {
    let end = opts.end.unwrap_or(comp.duration());
    if !opts.start.is_finite() || !end.is_finite() {
        return Err(StrataError::invalid("render window must be finite"));
    }
    if opts.fps.num == 0 || opts.fps.den == 0 {
        return Err(StrataError::invalid("fps must be non-zero"));
    }
    let range = FrameRange::new(
        FrameIndex(0),
        FrameIndex(opts.fps.frames_in_span(opts.start, end)),
    )?;
    if range.is_empty() {
        return Err(StrataError::invalid(format!(
            "render window [{}, {end}) contains no frames",
            opts.start
        )));
    }
    Ok(range)
}

fn sample_time(opts: &RenderRangeOpts, idx: FrameIndex) -> f64 {
    opts.start + opts.fps.frames_to_secs(idx.0)
}

fn build_thread_pool(threads: Option<usize>) -> StrataResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(StrataError::invalid("threads must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StrataError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

struct TempFileGuard(Option<std::path::PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
