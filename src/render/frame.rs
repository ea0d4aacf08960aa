use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// A rendered frame as RGBA8 pixels.
///
/// Compositing works on **premultiplied alpha**; the `premultiplied` flag makes this explicit at
/// layer boundaries so straight-alpha sources can be converted once on entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; byte_len(width, height)],
            premultiplied: true,
        }
    }

    /// Wrap premultiplied RGBA8 bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> StrataResult<Self> {
        let frame = Self {
            width,
            height,
            data,
            premultiplied: true,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Wrap straight-alpha RGBA8 bytes, converting them to premultiplied alpha.
    pub fn from_straight(width: u32, height: u32, mut data: Vec<u8>) -> StrataResult<Self> {
        if data.len() != byte_len(width, height) {
            return Err(StrataError::invalid(format!(
                "rgba8 buffer of {} bytes does not match {width}x{height}",
                data.len()
            )));
        }
        premultiply_rgba8_in_place(&mut data);
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Frame filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut px = rgba;
        premultiply_rgba8_in_place(&mut px);
        let mut data = vec![0u8; byte_len(width, height)];
        for c in data.chunks_exact_mut(4) {
            c.copy_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    /// `(width, height)` of the frame.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return `true` when the frame covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Check that `data` holds exactly `width * height` RGBA8 pixels.
    ///
    /// Layer output failing this check is a [`StrataError::ContractViolation`].
    pub fn validate(&self) -> StrataResult<()> {
        let expected = byte_len(self.width, self.height);
        if self.data.len() != expected {
            return Err(StrataError::contract(format!(
                "layer frame must be 4-channel 8-bit RGBA: {}x{} needs {expected} bytes, got {}",
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Straight-alpha copy of the pixels, for image export.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Convert in place to premultiplied alpha if needed.
    pub(crate) fn into_premultiplied(mut self) -> Self {
        if !self.premultiplied {
            premultiply_rgba8_in_place(&mut self.data);
            self.premultiplied = true;
        }
        self
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
