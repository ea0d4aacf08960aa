use crate::foundation::error::{StrataError, StrataResult};

/// Fixed sampling rate of every audio buffer exchanged with layers.
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;
/// Channel count of every audio buffer (interleaved stereo).
pub const AUDIO_CHANNELS: u16 = 2;

/// Interleaved stereo `f32` PCM at [`AUDIO_SAMPLE_RATE`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// `frames` stereo frames of silence.
    pub fn silence(frames: usize) -> StrataResult<Self> {
        let len = frames
            .checked_mul(usize::from(AUDIO_CHANNELS))
            .ok_or_else(|| StrataError::invalid(format!("audio buffer of {frames} frames")))?;
        Ok(Self {
            samples: vec![0.0; len],
        })
    }

    /// Wrap interleaved `[l0, r0, l1, r1, ...]` samples.
    pub fn from_interleaved(samples: Vec<f32>) -> StrataResult<Self> {
        if !samples.len().is_multiple_of(usize::from(AUDIO_CHANNELS)) {
            return Err(StrataError::invalid(format!(
                "interleaved stereo buffer needs an even sample count, got {}",
                samples.len()
            )));
        }
        Ok(Self { samples })
    }

    /// Build from separate left/right channels of equal length.
    pub fn from_channels(left: &[f32], right: &[f32]) -> StrataResult<Self> {
        if left.len() != right.len() {
            return Err(StrataError::invalid(format!(
                "channel length mismatch: left={} right={}",
                left.len(),
                right.len()
            )));
        }
        let mut samples = Vec::with_capacity(left.len() * 2);
        for (l, r) in left.iter().zip(right) {
            samples.push(*l);
            samples.push(*r);
        }
        Ok(Self { samples })
    }

    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(AUDIO_CHANNELS)
    }

    /// Return `true` when the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(AUDIO_SAMPLE_RATE)
    }

    /// `(left, right)` at frame `i`.
    pub fn frame(&self, i: usize) -> Option<(f32, f32)> {
        let idx = i.checked_mul(usize::from(AUDIO_CHANNELS))?;
        Some((*self.samples.get(idx)?, *self.samples.get(idx + 1)?))
    }

    /// Borrow the interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Copy of frames `[start, end)`, clipped to the buffer.
    pub fn slice_frames(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.frames());
        let start = start.min(end);
        let ch = usize::from(AUDIO_CHANNELS);
        Self {
            samples: self.samples[start * ch..end * ch].to_vec(),
        }
    }

    /// Consume into interleaved samples.
    pub fn into_interleaved(self) -> Vec<f32> {
        self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }
}

/// Truncating conversion from seconds to a frame count at [`AUDIO_SAMPLE_RATE`].
pub fn secs_to_audio_frames(secs: f64) -> usize {
    (secs * f64::from(AUDIO_SAMPLE_RATE)).max(0.0) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/audio/buffer.rs"]
mod tests;
