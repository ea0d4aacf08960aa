//! Layer placement geometry.
//!
//! Maps a layer's local pixel space into its parent canvas and derives the tight integer
//! destination box, so each layer is warped into a buffer no larger than its footprint.

use crate::foundation::core::{Affine, Point, Vec2};
use crate::transform::value::TransformValue;

/// Pixel-aligned placement of a warped layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Maps layer-local pixels into the `width x height` destination buffer.
    pub matrix: Affine,
    /// Destination buffer width.
    pub width: u32,
    /// Destination buffer height.
    pub height: u32,
    /// Top-left of the destination buffer in parent pixel space.
    pub offset: (i32, i32),
}

/// Full layer matrix `T1 * SR * T2` for a layer of `size` pixels.
///
/// `SR` is built directly from the per-axis scaled rotation coefficients; composing separate
/// scale and rotation matrices would shear non-uniformly scaled layers.
pub fn layer_matrix(size: (u32, u32), p: &TransformValue) -> Affine {
    let t1 = Affine::translate(p.position + p.anchor_point);

    let theta = (2.0 * std::f64::consts::PI * p.rotation) / 360.0;
    let (sin_t, cos_t) = theta.sin_cos();
    let sr = Affine::new([
        p.scale.x * cos_t,
        p.scale.y * sin_t,
        -p.scale.x * sin_t,
        p.scale.y * cos_t,
        0.0,
        0.0,
    ]);

    let origin = p
        .origin_point
        .to_vector((f64::from(size.0), f64::from(size.1)));
    let t2 = Affine::translate(-p.anchor_point - origin);

    t1 * sr * t2
}

/// Run the placement pipeline for a layer of `size` pixels.
///
/// Returns `None` when the transformed box has no pixel area, which means nothing is drawn.
pub fn fixed_affine_matrix(
    size: (u32, u32),
    p: &TransformValue,
    preview_level: u32,
) -> Option<Placement> {
    let (w, h) = (f64::from(size.0), f64::from(size.1));
    let m = layer_matrix(size, p);
    let preview = Affine::scale(1.0 / f64::from(preview_level.max(1)));
    let affine = preview * m;

    let corners = [
        Point::new(0.0, 0.0),
        Point::new(0.0, h),
        Point::new(w, 0.0),
        Point::new(w, h),
    ]
    .map(|c| affine * c);

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for c in corners {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return None;
    }

    let (min_x, min_y) = (min_x.ceil(), min_y.ceil());
    let (max_x, max_y) = (max_x.floor(), max_y.floor());
    let width = max_x - min_x;
    let height = max_y - min_y;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    let offset = (min_x as i32, min_y as i32);
    let matrix = Affine::translate(Vec2::new(-min_x, -min_y)) * affine;
    Some(Placement {
        matrix,
        width: width as u32,
        height: height as u32,
        offset,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
