use crate::foundation::error::{StrataError, StrataResult};
use crate::render::frame::FrameRGBA;
use crate::scene::key::ContentKey;
use crate::scene::layer::{Capabilities, Layer};
use std::path::Path;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

/// Still image decoded once and premultiplied on load.
#[derive(Clone, Debug)]
pub struct ImageLayer {
    frame: Arc<FrameRGBA>,
    digest: u64,
}

impl ImageLayer {
    /// Decode an image file (any format the `image` crate understands).
    pub fn open(path: &Path) -> StrataResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StrataError::evaluation(format!("failed to read image '{}': {e}", path.display()))
        })?;
        Self::decode(&bytes).map_err(|e| {
            StrataError::evaluation(format!("failed to decode image '{}': {e}", path.display()))
        })
    }

    /// Decode an encoded image from memory.
    pub fn decode(bytes: &[u8]) -> StrataResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| StrataError::evaluation(format!("image decode failed: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_frame(FrameRGBA::from_straight(width, height, rgba.into_raw())?)
    }

    /// Wrap an already decoded frame.
    pub fn from_frame(frame: FrameRGBA) -> StrataResult<Self> {
        frame.validate()?;
        let frame = frame.into_premultiplied();
        let digest = xxh3_64(&frame.data);
        Ok(Self {
            frame: Arc::new(frame),
            digest,
        })
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.frame.size()
    }
}

impl Layer for ImageLayer {
    fn render(&self, _time: f64) -> StrataResult<Option<FrameRGBA>> {
        Ok(Some(self.frame.as_ref().clone()))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::keyed()
    }

    fn content_key(&self, _time: f64) -> ContentKey {
        ContentKey::of(&(self.frame.width, self.frame.height, self.digest))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/image.rs"]
mod tests;
