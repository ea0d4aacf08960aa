//! Strata is a layered scene compositor.
//!
//! A [`Composition`] holds an ordered stack of named layers. Each layer renders an RGBA image
//! for a local time, gets placed on the canvas by an affine transform (position, scale,
//! rotation, anchor and origin point) and is blended onto the layers below it.
//!
//! - Frames are memoized per composition by a structural [`CacheKey`]; unchanged scenes do not
//!   re-render.
//! - Compositions are layers themselves and nest freely.
//! - Audio from layers is mixed additively over a time window with [`Composition::get_audio`].
//! - [`render_range`] streams evenly spaced frames into a [`FrameSink`], optionally on a rayon
//!   worker pool; [`write_video`] drives `ffmpeg`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod audio;
mod foundation;
mod layers;
mod scene;
mod transform;

/// Encoding sinks.
pub mod encode;
mod render;

pub use audio::buffer::{AUDIO_CHANNELS, AUDIO_SAMPLE_RATE, AudioBuffer, secs_to_audio_frames};
pub use audio::mix::{read_f32le_file, write_f32le_file};
pub use encode::{
    AudioInputConfig, FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, PngSequenceSink,
    SinkConfig, is_ffmpeg_on_path, sink::save_png,
};
pub use foundation::core::{Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Vec2};
pub use foundation::error::{StrataError, StrataResult};
pub use layers::image::ImageLayer;
pub use layers::pcm::PcmLayer;
pub use layers::solid::SolidLayer;
pub use render::composite::{BlendMode, alpha_composite};
pub use render::frame::FrameRGBA;
pub use render::pipeline::{
    RenderRangeOpts, RenderStats, WriteVideoOpts, render_frame_or_blank, render_range,
    write_audio_f32le, write_video,
};
pub use scene::cache::{CacheStats, DEFAULT_CACHE_MAX_BYTES};
pub use scene::composition::{Composition, PreviewGuard};
pub use scene::def::{LayerDef, SceneDef, SourceDef};
pub use scene::item::{DEFAULT_END_TIME, LayerItem};
pub use scene::key::{CacheKey, ContentKey, FrameFingerprint, LayerKey};
pub use scene::layer::{Capabilities, CompositionId, Effect, Layer};
pub use scene::opts::{CACHE_MAX_BYTES_ENV, CompositionOpts, LayerOpts};
pub use transform::affine::{Placement, fixed_affine_matrix, layer_matrix};
pub use transform::direction::Direction;
pub use transform::value::{FnTransform, Transform, TransformKey, TransformValue};
