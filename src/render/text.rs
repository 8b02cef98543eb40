//! Text overlay rasterization.
//!
//! Text is shaped with Parley and filled with `vello_cpu`. The bitmap covers the whole effect
//! canvas; the text is centered in a box of half the canvas width and height, itself centered on
//! the canvas, and clipped to it. Everything outside the glyphs stays transparent.

use crate::assets::color::resolve_color;
use crate::assets::font::{FontResolver, ResolvedFont};
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::frame::FrameRGBA;
use crate::timeline::instruction::TextOverlayParams;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Logical box the text is centered in.
pub fn overlay_box(canvas: Canvas) -> Rect {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    Rect::new(w * 0.25, h * 0.25, w * 0.75, h * 0.75)
}

/// Builds text overlay bitmaps. Performs no caching of bitmaps.
#[derive(Default)]
pub struct TextOverlayRenderer {
    fonts: FontResolver,
}

impl TextOverlayRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterize `params` onto a transparent premultiplied bitmap of `canvas` size.
    ///
    /// Identical inputs produce byte-identical output. Unresolvable fonts or colors fail with
    /// [`LivecompError::RenderResource`].
    pub fn build_text_image(
        &self,
        params: &TextOverlayParams,
        canvas: Canvas,
    ) -> LivecompResult<FrameRGBA> {
        let (w, h) = canvas_u16(canvas)?;
        if !params.font_size.is_finite() || params.font_size <= 0.0 {
            return Err(LivecompError::render_resource(
                "text font_size must be finite and > 0",
            ));
        }
        let [r, g, b, a] = resolve_color(&params.color)?.to_rgba8_straight();
        let brush = TextBrushRgba8 { r, g, b, a };
        let font = self.fonts.resolve(&params.font)?;

        let bounds = overlay_box(canvas);
        let layout = layout_text(&params.text, &font, params.font_size, brush, bounds.width())?;

        let x = bounds.x0 + (bounds.width() - f64::from(layout.width())) / 2.0;
        let y = bounds.y0 + (bounds.height() - f64::from(layout.height())) / 2.0;

        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            font.index,
        );

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let clip = vello_cpu::kurbo::Rect::new(bounds.x0, bounds.y0, bounds.x1, bounds.y1);
        ctx.push_clip_layer(&vello_cpu::kurbo::Shape::to_path(&clip, 0.1));
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x.round(), y.round())));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.pop_layer();
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA::from_premul(canvas.width, canvas.height, pixmap.data_as_u8_slice().to_vec())
    }
}

fn canvas_u16(canvas: Canvas) -> LivecompResult<(u16, u16)> {
    if canvas.is_empty() {
        return Err(LivecompError::render_resource("text canvas must be non-empty"));
    }
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| LivecompError::render_resource("text canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| LivecompError::render_resource("text canvas height exceeds u16"))?;
    Ok((w, h))
}

fn layout_text(
    text: &str,
    font: &ResolvedFont,
    size_px: f32,
    brush: TextBrushRgba8,
    max_width_px: f64,
) -> LivecompResult<parley::Layout<TextBrushRgba8>> {
    let mut font_ctx = parley::FontContext::default();
    let mut layout_ctx = parley::LayoutContext::<TextBrushRgba8>::new();

    let families = font_ctx.collection.register_fonts(
        parley::fontique::Blob::from(font.bytes.as_ref().clone()),
        None,
    );
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| LivecompError::render_resource("no font families registered from font data"))?;
    let family_name = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| LivecompError::render_resource("registered font family has no name"))?
        .to_string();

    let mut builder = layout_ctx.ranged_builder(&mut font_ctx, text, 1.0, true);
    builder.push_default(parley::style::StyleProperty::FontStack(
        parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
    ));
    builder.push_default(parley::style::StyleProperty::FontSize(size_px));
    builder.push_default(parley::style::StyleProperty::Brush(brush));

    let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
    let max_width = max_width_px as f32;
    layout.break_all_lines(Some(max_width));
    layout.align(
        Some(max_width),
        parley::Alignment::Start,
        parley::AlignmentOptions::default(),
    );
    Ok(layout)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
