use crate::foundation::error::{StrataError, StrataResult};
use crate::render::frame::FrameRGBA;
use crate::scene::key::ContentKey;
use crate::scene::layer::{Capabilities, Layer};

/// Uniform rectangle of one straight-alpha color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolidLayer {
    width: u32,
    height: u32,
    color: [u8; 4],
}

impl SolidLayer {
    /// `width`x`height` rectangle of `color` (straight RGBA).
    pub fn new(width: u32, height: u32, color: [u8; 4]) -> StrataResult<Self> {
        if width == 0 || height == 0 {
            return Err(StrataError::invalid(format!(
                "solid layer size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            color,
        })
    }

    /// Fill color, straight RGBA.
    pub fn color(&self) -> [u8; 4] {
        self.color
    }
}

impl Layer for SolidLayer {
    fn render(&self, _time: f64) -> StrataResult<Option<FrameRGBA>> {
        Ok(Some(FrameRGBA::solid(self.width, self.height, self.color)))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::keyed()
    }

    fn content_key(&self, _time: f64) -> ContentKey {
        ContentKey::of(&(self.width, self.height, self.color))
    }
}
