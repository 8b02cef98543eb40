use smallvec::SmallVec;

use crate::assets::source::SourceFrameProvider;
use crate::foundation::core::{Canvas, MediaTime};
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::composite::{fit_to_canvas, over_in_place};
use crate::render::context::RenderContext;
use crate::render::frame::FrameRGBA;
use crate::render::text::TextOverlayRenderer;
use crate::timeline::config::CompositionSnapshot;
use crate::timeline::instruction::{InstructionKind, TextOverlay, find_active};

/// Produces composed frames from a published snapshot.
///
/// Each call is independent: nothing carries over between frames except the write-once effect
/// bitmaps cached on instructions. A compositor can be shared across threads.
#[derive(Default)]
pub struct Compositor {
    text: TextOverlayRenderer,
}

impl Compositor {
    /// Create a compositor with its own text renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text renderer used for overlay bitmaps.
    pub fn text_renderer(&self) -> &TextOverlayRenderer {
        &self.text
    }

    /// Compose the frame at `time`, sampling sources from the snapshot's own track table.
    pub fn compose(
        &self,
        snapshot: &CompositionSnapshot,
        time: MediaTime,
        ctx: &dyn RenderContext,
    ) -> LivecompResult<FrameRGBA> {
        self.compose_with(snapshot, snapshot, time, ctx)
    }

    /// Compose the frame at `time`, sampling sources from `frames`.
    pub fn compose_with(
        &self,
        snapshot: &CompositionSnapshot,
        frames: &dyn SourceFrameProvider,
        time: MediaTime,
        ctx: &dyn RenderContext,
    ) -> LivecompResult<FrameRGBA> {
        let Some(instruction) = find_active(snapshot.instructions(), time) else {
            tracing::error!(
                %time,
                generation = snapshot.generation(),
                "no instruction covers requested time"
            );
            return Err(LivecompError::NoActiveInstruction { time });
        };

        let sample_tracks = &snapshot.config().sample_tracks;
        let mut sources = SmallVec::<[FrameRGBA; 2]>::new();
        for track in instruction.required_source_tracks() {
            let frame = sample_tracks
                .contains(&track)
                .then(|| frames.frame(track, time))
                .flatten()
                .ok_or(LivecompError::MissingSourceFrame { track, time })?;
            sources.push(frame);
        }

        let render_size = ctx.render_size();
        let base = match (sources.into_iter().next(), instruction.kind()) {
            (Some(frame), _) => Some(frame),
            (None, InstructionKind::Passthrough { track }) if sample_tracks.contains(track) => {
                let frame = frames
                    .frame(*track, time)
                    .ok_or(LivecompError::MissingSourceFrame {
                        track: *track,
                        time,
                    })?;
                Some(frame)
            }
            (None, _) => None,
        };
        let mut image = match base {
            Some(frame) => fit_to_canvas(frame.into_premultiplied(), render_size)?,
            None => FrameRGBA::transparent(render_size),
        };

        match instruction.kind() {
            InstructionKind::Passthrough { .. } => {}
            InstructionKind::TextOverlay(overlay) => {
                let effect_canvas = render_size.scaled_down(ctx.render_scale());
                self.apply_text_overlay(overlay, effect_canvas, &mut image, time)?;
            }
        }

        let mut dst = ctx.allocate_output_buffer()?;
        if dst.canvas() != render_size || dst.data.len() != image.data.len() {
            return Err(LivecompError::buffer_allocation(format!(
                "render context returned a {}x{} buffer for a {}x{} render",
                dst.width, dst.height, render_size.width, render_size.height
            )));
        }
        dst.data.copy_from_slice(&image.data);
        dst.premultiplied = true;
        Ok(dst)
    }

    fn apply_text_overlay(
        &self,
        overlay: &TextOverlay,
        effect_canvas: Canvas,
        image: &mut FrameRGBA,
        time: MediaTime,
    ) -> LivecompResult<()> {
        let cached = match overlay
            .bitmap_or_build(effect_canvas, |params, canvas| {
                self.text.build_text_image(params, canvas)
            }) {
            Ok(cached) => cached,
            Err(LivecompError::RenderResource(msg)) => {
                tracing::warn!(%time, %msg, "text overlay unavailable, emitting source frame");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if cached.bitmap.canvas() == image.canvas() {
            over_in_place(&mut image.data, &cached.bitmap.data, 1.0)
        } else {
            let scaled = fit_to_canvas(cached.bitmap.clone(), image.canvas())?;
            over_in_place(&mut image.data, &scaled.data, 1.0)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
