use crate::foundation::core::{Vec2, ensure_finite};
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::composite::BlendMode;
use crate::scene::cache::DEFAULT_CACHE_MAX_BYTES;
use crate::transform::direction::Direction;
use crate::transform::value::{Transform, TransformValue};

/// Environment variable overriding [`CompositionOpts::cache_max_bytes`].
pub const CACHE_MAX_BYTES_ENV: &str = "STRATA_CACHE_MAX_BYTES";

/// Construction options for a [`Composition`](crate::Composition).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositionOpts {
    /// Byte budget of the frame cache.
    pub cache_max_bytes: usize,
}

impl Default for CompositionOpts {
    /// 1 GiB cache, overridable through `STRATA_CACHE_MAX_BYTES`.
    fn default() -> Self {
        let cache_max_bytes = std::env::var(CACHE_MAX_BYTES_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CACHE_MAX_BYTES);
        Self { cache_max_bytes }
    }
}

impl CompositionOpts {
    /// Set the frame cache byte budget. Zero disables retention.
    pub fn with_cache_max_bytes(mut self, bytes: usize) -> Self {
        self.cache_max_bytes = bytes;
        self
    }
}

/// Options for [`Composition::add_layer`](crate::Composition::add_layer).
///
/// Scalar placement fields build a constant [`TransformValue`]; supplying
/// [`LayerOpts::transform`] replaces them entirely.
pub struct LayerOpts {
    /// Unique layer name; auto-generated as `layer_<n>` when absent.
    pub name: Option<String>,
    /// Placement in composition pixels; the composition center when absent.
    pub position: Option<Vec2>,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Blending mode.
    pub blend_mode: BlendMode,
    /// Offset added to the origin point.
    pub anchor_point: Vec2,
    /// Reference point on the layer box.
    pub origin_point: Direction,
    /// Time-varying placement; overrides the scalar fields above.
    pub transform: Option<Box<dyn Transform>>,
    /// Composition time at which layer-local time 0 occurs.
    pub offset: f64,
    /// Start of the active window, layer-local seconds.
    pub start_time: f64,
    /// End of the active window; the layer's duration when absent.
    pub end_time: Option<f64>,
    /// Whether the layer is drawn.
    pub visible: bool,
}

impl Default for LayerOpts {
    fn default() -> Self {
        Self {
            name: None,
            position: None,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            anchor_point: Vec2::ZERO,
            origin_point: Direction::Center,
            transform: None,
            offset: 0.0,
            start_time: 0.0,
            end_time: None,
            visible: true,
        }
    }
}

impl std::fmt::Debug for LayerOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerOpts")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("scale", &self.scale)
            .field("rotation", &self.rotation)
            .field("opacity", &self.opacity)
            .field("blend_mode", &self.blend_mode)
            .field("origin_point", &self.origin_point)
            .field("custom_transform", &self.transform.is_some())
            .field("offset", &self.offset)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl LayerOpts {
    /// Set the layer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the constant position.
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Vec2::new(x, y));
        self
    }

    /// Set the per-axis scale.
    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }

    /// Set the clockwise rotation in degrees.
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the blending mode.
    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    /// Set the anchor offset.
    pub fn with_anchor_point(mut self, x: f64, y: f64) -> Self {
        self.anchor_point = Vec2::new(x, y);
        self
    }

    /// Set the reference point on the layer box.
    pub fn with_origin_point(mut self, origin: Direction) -> Self {
        self.origin_point = origin;
        self
    }

    /// Use a time-varying transform instead of the scalar fields.
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Set the composition time of layer-local time 0.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the active window `[start, end)` in layer-local seconds.
    pub fn with_time_range(mut self, start: f64, end: f64) -> Self {
        self.start_time = start;
        self.end_time = Some(end);
        self
    }

    /// Show or hide the layer.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Constant placement assembled from the scalar fields.
    pub(crate) fn transform_value(&self, default_position: Vec2) -> TransformValue {
        TransformValue {
            position: self.position.unwrap_or(default_position),
            scale: self.scale,
            rotation: self.rotation,
            opacity: self.opacity,
            anchor_point: self.anchor_point,
            origin_point: self.origin_point,
            blend_mode: self.blend_mode,
        }
    }

    pub(crate) fn validate_timing(&self) -> StrataResult<()> {
        ensure_finite(self.offset, "offset")?;
        ensure_finite(self.start_time, "start_time")?;
        if let Some(end) = self.end_time
            && !(end > self.start_time)
        {
            return Err(StrataError::invalid(format!(
                "end_time ({end}) must be greater than start_time ({})",
                self.start_time
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/opts.rs"]
mod tests;
