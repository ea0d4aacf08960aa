use crate::foundation::core::{Vec2, ensure_finite, ensure_finite_vec2};
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::composite::BlendMode;
use crate::transform::direction::Direction;

/// Snapshot of a layer's placement at one local time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformValue {
    /// Placement of the layer origin in parent pixel space.
    pub position: Vec2,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Offset added to the resolved origin point.
    pub anchor_point: Vec2,
    /// Reference point on the layer box; constant-valued.
    pub origin_point: Direction,
    /// Blending mode; constant-valued.
    pub blend_mode: BlendMode,
}

impl Default for TransformValue {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            opacity: 1.0,
            anchor_point: Vec2::ZERO,
            origin_point: Direction::Center,
            blend_mode: BlendMode::Normal,
        }
    }
}

impl TransformValue {
    /// Reject non-finite geometry and opacity outside `[0, 1]`.
    pub fn validate(&self) -> StrataResult<()> {
        ensure_finite_vec2(self.position, "position")?;
        ensure_finite_vec2(self.scale, "scale")?;
        ensure_finite_vec2(self.anchor_point, "anchor_point")?;
        ensure_finite(self.rotation, "rotation")?;
        ensure_finite(self.opacity, "opacity")?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(StrataError::invalid(format!(
                "opacity must be within [0, 1], got {}",
                self.opacity
            )));
        }
        Ok(())
    }

    /// Hashable fingerprint of every field that affects pixels.
    pub fn key(&self) -> TransformKey {
        TransformKey {
            bits: [
                self.position.x.to_bits(),
                self.position.y.to_bits(),
                self.scale.x.to_bits(),
                self.scale.y.to_bits(),
                self.rotation.to_bits(),
                self.opacity.to_bits(),
                self.anchor_point.x.to_bits(),
                self.anchor_point.y.to_bits(),
            ],
            origin_point: self.origin_point,
            blend_mode: self.blend_mode,
        }
    }
}

/// Bitwise snapshot key of a [`TransformValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransformKey {
    pub(crate) bits: [u64; 8],
    pub(crate) origin_point: Direction,
    pub(crate) blend_mode: BlendMode,
}

/// Time-varying placement of a layer.
///
/// Implementations evaluate to a [`TransformValue`] at a layer-local time. The default
/// snapshot key is derived from the evaluated value, so two times that place the layer
/// identically share a key.
pub trait Transform: Send + Sync {
    /// Evaluate the placement at `time` (layer-local seconds).
    fn evaluate(&self, time: f64) -> TransformValue;

    /// Cache key for the placement at `time`.
    fn snapshot_key(&self, time: f64) -> TransformKey {
        self.evaluate(time).key()
    }
}

impl Transform for TransformValue {
    fn evaluate(&self, _time: f64) -> TransformValue {
        *self
    }
}

/// [`Transform`] backed by a closure, for procedural animation.
pub struct FnTransform<F> {
    f: F,
}

impl<F> FnTransform<F>
where
    F: Fn(f64) -> TransformValue + Send + Sync,
{
    /// Wrap `f`, which maps layer-local time to a placement.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(f64) -> TransformValue + Send + Sync,
{
    fn evaluate(&self, time: f64) -> TransformValue {
        (self.f)(time)
    }
}

impl<F> std::fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransform").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/value.rs"]
mod tests;
