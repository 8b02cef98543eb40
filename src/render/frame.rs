use crate::foundation::core::Canvas;
use crate::foundation::error::{LivecompError, LivecompResult};

/// A frame as RGBA8 pixels.
///
/// Composed frames and effect bitmaps are **premultiplied alpha** in device RGB. The
/// `premultiplied` flag makes this explicit at API boundaries.
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
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba8_len()],
            premultiplied: true,
        }
    }

    /// Wrap premultiplied RGBA8 bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> LivecompResult<Self> {
        if data.len() != Canvas::new(width, height).rgba8_len() {
            return Err(LivecompError::validation(format!(
                "frame byte len {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Wrap straight-alpha RGBA8 bytes and premultiply them.
    pub fn from_straight_rgba(width: u32, height: u32, mut data: Vec<u8>) -> LivecompResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Pixel at `(x, y)` as stored, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Return a premultiplied copy (no-op clone when already premultiplied).
    pub fn into_premultiplied(mut self) -> Self {
        if !self.premultiplied {
            premultiply_rgba8_in_place(&mut self.data);
            self.premultiplied = true;
        }
        self
    }

    /// Convert to a straight-alpha `image` buffer, e.g. for PNG output.
    pub fn to_straight_image(&self) -> LivecompResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| LivecompError::validation("frame buffer does not match its dimensions"))
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
