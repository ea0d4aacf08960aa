use crate::foundation::core::Vec2;
use crate::foundation::error::StrataError;
use std::str::FromStr;

/// Named reference point on a layer's bounding box.
///
/// The layer origin is `origin_point` resolved against the layer size, plus the anchor point.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `(0, 0)`
    TopLeft,
    /// `(w / 2, 0)`
    TopCenter,
    /// `(w, 0)`
    TopRight,
    /// `(0, h / 2)`
    CenterLeft,
    /// `(w / 2, h / 2)`
    #[default]
    Center,
    /// `(w, h / 2)`
    CenterRight,
    /// `(0, h)`
    BottomLeft,
    /// `(w / 2, h)`
    BottomCenter,
    /// `(w, h)`
    BottomRight,
}

impl Direction {
    /// Resolve the direction to a point in `[0, w] x [0, h]`.
    pub fn to_vector(self, size: (f64, f64)) -> Vec2 {
        let (w, h) = size;
        let (fx, fy) = match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::CenterLeft => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::CenterRight => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomCenter => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Vec2::new(w * fx, h * fy)
    }

    pub(crate) fn tag(self) -> u8 {
        self as u8
    }
}

impl FromStr for Direction {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "top_left" => Self::TopLeft,
            "top_center" => Self::TopCenter,
            "top_right" => Self::TopRight,
            "center_left" => Self::CenterLeft,
            "center" => Self::Center,
            "center_right" => Self::CenterRight,
            "bottom_left" => Self::BottomLeft,
            "bottom_center" => Self::BottomCenter,
            "bottom_right" => Self::BottomRight,
            other => return Err(StrataError::invalid(format!("unknown direction '{other}'"))),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/direction.rs"]
mod tests;
