use crate::audio::buffer::{AUDIO_CHANNELS, AudioBuffer};
use crate::foundation::error::{StrataError, StrataResult};
use std::path::Path;

/// Add `src` into `out` starting at stereo frame `frame_offset`.
///
/// Samples past the end of `out` are dropped. Returns the number of frames mixed.
pub(crate) fn mix_at(out: &mut AudioBuffer, frame_offset: usize, src: &AudioBuffer) -> usize {
    let available = out.frames().saturating_sub(frame_offset);
    let frames = src.frames().min(available);
    if frames == 0 {
        return 0;
    }

    let ch = usize::from(AUDIO_CHANNELS);
    let dst = &mut out.samples_mut()[frame_offset * ch..(frame_offset + frames) * ch];
    for (d, s) in dst.iter_mut().zip(src.samples()) {
        *d += *s;
    }
    frames
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
///
/// Samples are clamped to `[-1, 1]` on the way out; the in-memory mix keeps the raw sum.
pub fn write_f32le_file(audio: &AudioBuffer, out_path: &Path) -> StrataResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            StrataError::evaluation(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(audio.samples().len() * 4);
    for &sample in audio.samples() {
        bytes.extend_from_slice(&sample.clamp(-1.0, 1.0).to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        StrataError::evaluation(format!(
            "failed to write audio file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Read a raw little-endian `.f32le` file of interleaved stereo samples.
pub fn read_f32le_file(path: &Path) -> StrataResult<AudioBuffer> {
    let bytes = std::fs::read(path).map_err(|e| {
        StrataError::evaluation(format!("failed to read audio file '{}': {e}", path.display()))
    })?;
    let frame_bytes = 4 * usize::from(AUDIO_CHANNELS);
    if !bytes.len().is_multiple_of(frame_bytes) {
        return Err(StrataError::invalid(format!(
            "audio file '{}' is {} bytes, not a whole number of stereo f32 frames",
            path.display(),
            bytes.len()
        )));
    }
    let samples = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    AudioBuffer::from_interleaved(samples)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
