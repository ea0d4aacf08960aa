use crate::audio::buffer::{AudioBuffer, secs_to_audio_frames};
use crate::audio::mix::read_f32le_file;
use crate::foundation::core::ensure_finite;
use crate::foundation::error::StrataResult;
use crate::render::frame::FrameRGBA;
use crate::scene::key::ContentKey;
use crate::scene::layer::{Capabilities, Layer};
use std::path::Path;

/// Audio-only layer playing a fixed stereo buffer from local time 0.
#[derive(Clone, Debug)]
pub struct PcmLayer {
    buffer: AudioBuffer,
}

impl PcmLayer {
    /// Play `buffer` (44.1 kHz interleaved stereo).
    pub fn new(buffer: AudioBuffer) -> Self {
        Self { buffer }
    }

    /// Load a raw interleaved stereo `.f32le` file.
    pub fn open(path: &Path) -> StrataResult<Self> {
        Ok(Self::new(read_f32le_file(path)?))
    }

    /// Constant `value` on both channels for `secs` seconds.
    pub fn constant(value: f32, secs: f64) -> StrataResult<Self> {
        ensure_finite(secs, "pcm length")?;
        let mut buffer = AudioBuffer::silence(secs_to_audio_frames(secs))?;
        buffer.samples_mut().fill(value);
        Ok(Self { buffer })
    }
}

impl Layer for PcmLayer {
    fn render(&self, _time: f64) -> StrataResult<Option<FrameRGBA>> {
        Ok(None)
    }

    fn duration(&self) -> Option<f64> {
        Some(self.buffer.duration_secs())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::keyed().with_audio()
    }

    fn content_key(&self, _time: f64) -> ContentKey {
        ContentKey::Value(0)
    }

    fn audio(&self, start: f64, end: f64) -> StrataResult<Option<AudioBuffer>> {
        let chunk = self
            .buffer
            .slice_frames(secs_to_audio_frames(start), secs_to_audio_frames(end));
        Ok((!chunk.is_empty()).then_some(chunk))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/pcm.rs"]
mod tests;
