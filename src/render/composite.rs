use crate::foundation::core::Canvas;
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::frame::FrameRGBA;

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over-destination for a single pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Composite `src` over `dst` in place. Both buffers must be equal-length premultiplied RGBA8.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> LivecompResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LivecompError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Return `frame` at `target` size.
///
/// Frames already at the target size are returned untouched; others are resampled with a
/// triangle filter, which is correct on premultiplied data.
pub fn fit_to_canvas(frame: FrameRGBA, target: Canvas) -> LivecompResult<FrameRGBA> {
    if frame.canvas() == target {
        return Ok(frame);
    }
    if target.is_empty() || frame.canvas().is_empty() {
        return Ok(FrameRGBA::transparent(target));
    }
    let premultiplied = frame.premultiplied;
    let src = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
        .ok_or_else(|| LivecompError::validation("frame buffer does not match its dimensions"))?;
    let resized = image::imageops::resize(
        &src,
        target.width,
        target.height,
        image::imageops::FilterType::Triangle,
    );
    Ok(FrameRGBA {
        width: target.width,
        height: target.height,
        data: resized.into_raw(),
        premultiplied,
    })
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
