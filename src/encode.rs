/// `ffmpeg` subprocess sink.
pub mod ffmpeg;
/// Frame sink contract and in-process sinks.
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use sink::{AudioInputConfig, FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
