use crate::foundation::error::{StrataError, StrataResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index in a rendered range.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> StrataResult<Self> {
        if start.0 > end.0 {
            return Err(StrataError::invalid("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Split into consecutive sub-ranges of at most `size` frames (`size` 0 is treated as 1).
    pub fn chunks(self, size: u64) -> impl Iterator<Item = FrameRange> {
        let size = size.max(1);
        let end = self.end.0;
        (self.start.0..end).step_by(size as usize).map(move |s| FrameRange {
            start: FrameIndex(s),
            end: FrameIndex(s.saturating_add(size).min(end)),
        })
    }

    /// Iterate the indices in the range.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> StrataResult<Self> {
        if den == 0 {
            return Err(StrataError::invalid("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StrataError::invalid("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Number of frame timestamps `start + i / fps` strictly below `end`.
    pub fn frames_in_span(self, start: f64, end: f64) -> u64 {
        if end <= start {
            return 0;
        }
        ((end - start) * self.as_f64()).ceil().max(0.0) as u64
    }
}

/// Composition canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas; both dimensions must be positive.
    pub fn new(width: u32, height: u32) -> StrataResult<Self> {
        if width == 0 || height == 0 {
            return Err(StrataError::invalid(format!(
                "canvas size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Canvas center in pixel space.
    pub fn center(self) -> Vec2 {
        Vec2::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Output resolution after integer preview downscale.
    ///
    /// Dimensions may reach zero when `level` exceeds the canvas size.
    pub fn downscaled(self, level: u32) -> (u32, u32) {
        let level = level.max(1);
        (self.width / level, self.height / level)
    }
}

/// Validate that `v` is finite; `what` names the offending field in the error.
pub(crate) fn ensure_finite(v: f64, what: &str) -> StrataResult<()> {
    if !v.is_finite() {
        return Err(StrataError::invalid(format!("{what} must be finite, got {v}")));
    }
    Ok(())
}

/// Validate that both components of `v` are finite.
pub(crate) fn ensure_finite_vec2(v: Vec2, what: &str) -> StrataResult<()> {
    if !v.x.is_finite() || !v.y.is_finite() {
        return Err(StrataError::invalid(format!(
            "{what} must be a finite 2D vector, got ({}, {})",
            v.x, v.y
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
