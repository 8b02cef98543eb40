use std::sync::Arc;

use super::*;
use crate::foundation::core::{Fps, TimeRange, TrackId};
use crate::render::context::{BufferPoolOpts, PooledRenderContext};
use crate::timeline::config::CompositionConfig;
use crate::timeline::instruction::{Instruction, TextOverlayParams};
use crate::timeline::track::TrackTable;

const SIZE: Canvas = Canvas {
    width: 8,
    height: 4,
};

struct Frames(Option<FrameRGBA>);

impl SourceFrameProvider for Frames {
    fn frame(&self, _track: TrackId, _time: MediaTime) -> Option<FrameRGBA> {
        self.0.clone()
    }
}

struct NoBuffers;

impl RenderContext for NoBuffers {
    fn render_size(&self) -> Canvas {
        SIZE
    }

    fn render_scale(&self) -> f32 {
        1.0
    }

    fn allocate_output_buffer(&self) -> LivecompResult<FrameRGBA> {
        Err(LivecompError::buffer_allocation("out of buffers"))
    }
}

fn full() -> TimeRange {
    TimeRange::from_zero(MediaTime::from_secs(10))
}

fn snapshot(instructions: Vec<Instruction>, sample: &[TrackId]) -> CompositionSnapshot {
    let mut config = CompositionConfig::new(SIZE, 1.0, Fps::default());
    config.sample_tracks = sample.iter().copied().collect();
    config.instructions = instructions.into_iter().map(Arc::new).collect();
    CompositionSnapshot::new(1, config, TrackTable::default(), MediaTime::from_secs(10))
}

fn ctx() -> PooledRenderContext {
    PooledRenderContext::new(SIZE, 1.0, BufferPoolOpts::default()).unwrap()
}

fn source(canvas: Canvas) -> FrameRGBA {
    let data = (0..canvas.rgba8_len())
        .map(|i| if i % 4 == 3 { 255 } else { (i * 7 % 251) as u8 })
        .collect();
    FrameRGBA::from_premul(canvas.width, canvas.height, data).unwrap()
}

#[test]
fn time_outside_every_instruction_fails() {
    let snap = snapshot(
        vec![Instruction::passthrough(
            TimeRange::from_zero(MediaTime::from_secs(5)),
            TrackId(1),
        )],
        &[TrackId(1)],
    );
    let r = Compositor::new().compose_with(
        &snap,
        &Frames(Some(source(SIZE))),
        MediaTime::from_secs(6),
        &ctx(),
    );
    assert!(matches!(r, Err(LivecompError::NoActiveInstruction { .. })));
}

#[test]
fn passthrough_returns_source_unmodified() {
    let snap = snapshot(vec![Instruction::passthrough(full(), TrackId(1))], &[TrackId(1)]);
    let src = source(SIZE);
    let out = Compositor::new()
        .compose_with(&snap, &Frames(Some(src.clone())), MediaTime::from_secs(5), &ctx())
        .unwrap();
    assert_eq!(out, src);
}

#[test]
fn passthrough_of_unsampled_track_is_transparent() {
    let snap = snapshot(vec![Instruction::passthrough(full(), TrackId(1))], &[]);
    let out = Compositor::new()
        .compose_with(&snap, &Frames(Some(source(SIZE))), MediaTime::ZERO, &ctx())
        .unwrap();
    assert_eq!(out, FrameRGBA::transparent(SIZE));
}

#[test]
fn missing_required_frame_fails_for_that_request_only() {
    let params = TextOverlayParams::new("x", 10.0, "green");
    let snap = snapshot(
        vec![Instruction::text_overlay(full(), TrackId(1), params)],
        &[TrackId(1)],
    );
    let comp = Compositor::new();
    let ctx = ctx();

    let r = comp.compose_with(&snap, &Frames(None), MediaTime::from_secs(1), &ctx);
    assert!(matches!(
        r,
        Err(LivecompError::MissingSourceFrame { track: TrackId(1), .. })
    ));

    let snap = snapshot(vec![Instruction::passthrough(full(), TrackId(1))], &[TrackId(1)]);
    assert!(
        comp.compose_with(&snap, &Frames(Some(source(SIZE))), MediaTime::from_secs(1), &ctx)
            .is_ok()
    );
}

#[test]
fn required_track_outside_sample_set_is_missing() {
    let params = TextOverlayParams::new("x", 10.0, "green");
    let snap = snapshot(
        vec![Instruction::text_overlay(full(), TrackId(1), params)],
        &[TrackId(2)],
    );
    let r = Compositor::new().compose_with(
        &snap,
        &Frames(Some(source(SIZE))),
        MediaTime::from_secs(1),
        &ctx(),
    );
    assert!(matches!(r, Err(LivecompError::MissingSourceFrame { .. })));
}

#[test]
fn failed_overlay_build_falls_back_to_source() {
    let params = TextOverlayParams::new("Hello World", 10.0, "no-such-color");
    let snap = snapshot(
        vec![Instruction::text_overlay(full(), TrackId(1), params)],
        &[TrackId(1)],
    );
    let src = source(SIZE);
    let out = Compositor::new()
        .compose_with(&snap, &Frames(Some(src.clone())), MediaTime::from_secs(2), &ctx())
        .unwrap();
    assert_eq!(out.data, src.data);
}

#[test]
fn off_size_sources_are_scaled_to_render_size() {
    let snap = snapshot(vec![Instruction::passthrough(full(), TrackId(1))], &[TrackId(1)]);
    let out = Compositor::new()
        .compose_with(
            &snap,
            &Frames(Some(source(Canvas::new(16, 8)))),
            MediaTime::ZERO,
            &ctx(),
        )
        .unwrap();
    assert_eq!(out.canvas(), SIZE);
    assert!(out.premultiplied);
}

#[test]
fn buffer_allocation_failure_is_reported() {
    let snap = snapshot(vec![Instruction::passthrough(full(), TrackId(1))], &[TrackId(1)]);
    let r = Compositor::new().compose_with(
        &snap,
        &Frames(Some(source(SIZE))),
        MediaTime::ZERO,
        &NoBuffers,
    );
    assert!(matches!(r, Err(LivecompError::BufferAllocation(_))));
}
