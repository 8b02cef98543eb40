use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn secs(s: u64) -> MediaTime {
    MediaTime::from_secs(s)
}

fn range(start: u64, dur: u64) -> TimeRange {
    TimeRange::new(secs(start), secs(dur))
}

fn solid(canvas: Canvas) -> FrameRGBA {
    let px = (canvas.width * canvas.height) as usize;
    FrameRGBA::from_premul(canvas.width, canvas.height, [9, 9, 9, 9].repeat(px)).unwrap()
}

#[test]
fn passthrough_declares_no_required_tracks() {
    let ins = Instruction::passthrough(range(0, 10), TrackId(1));
    assert!(ins.required_source_tracks().is_empty());
    assert!(matches!(
        ins.kind(),
        InstructionKind::Passthrough { track } if *track == TrackId(1)
    ));
}

#[test]
fn text_overlay_requires_its_source_track() {
    let ins = Instruction::text_overlay(
        range(0, 10),
        TrackId(1),
        TextOverlayParams::new("hi", 32.0, "green"),
    );
    assert_eq!(ins.required_source_tracks().as_slice(), &[TrackId(1)]);
}

#[test]
fn validate_accepts_contiguous_cover() {
    let list = vec![
        Arc::new(Instruction::passthrough(range(0, 4), TrackId(1))),
        Arc::new(Instruction::passthrough(range(4, 6), TrackId(1))),
    ];
    assert!(validate_instruction_list(&list, secs(10)).is_ok());
}

#[test]
fn validate_rejects_gaps_overlaps_and_short_cover() {
    let gap = vec![
        Arc::new(Instruction::passthrough(range(0, 4), TrackId(1))),
        Arc::new(Instruction::passthrough(range(5, 5), TrackId(1))),
    ];
    assert!(validate_instruction_list(&gap, secs(10)).is_err());

    let overlap = vec![
        Arc::new(Instruction::passthrough(range(0, 6), TrackId(1))),
        Arc::new(Instruction::passthrough(range(5, 5), TrackId(1))),
    ];
    assert!(validate_instruction_list(&overlap, secs(10)).is_err());

    let short = vec![Arc::new(Instruction::passthrough(range(0, 9), TrackId(1)))];
    assert!(validate_instruction_list(&short, secs(10)).is_err());

    assert!(validate_instruction_list(&[], secs(10)).is_err());
    assert!(validate_instruction_list(&[], MediaTime::ZERO).is_ok());
}

#[test]
fn find_active_picks_the_covering_instruction() {
    let list = vec![
        Arc::new(Instruction::passthrough(range(0, 4), TrackId(1))),
        Arc::new(Instruction::passthrough(range(4, 6), TrackId(2))),
    ];
    let at = |t: MediaTime| match find_active(&list, t).map(|i| i.kind()) {
        Some(InstructionKind::Passthrough { track }) => Some(track.0),
        _ => None,
    };
    assert_eq!(at(secs(0)), Some(1));
    assert_eq!(at(MediaTime(3_999_999)), Some(1));
    assert_eq!(at(secs(4)), Some(2));
    assert_eq!(at(MediaTime(9_999_999)), Some(2));
    assert_eq!(at(secs(10)), None);
}

#[test]
fn bitmap_cache_builds_once() {
    let overlay = TextOverlay::new(TextOverlayParams::new("x", 10.0, "red"), TrackId(1));
    let calls = AtomicUsize::new(0);
    let canvas = Canvas::new(4, 4);
    let build = |_: &TextOverlayParams, c: Canvas| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(solid(c))
    };

    let a = overlay.bitmap_or_build(canvas, build).unwrap();
    let b = overlay.bitmap_or_build(canvas, build).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn bitmap_cache_is_invalidated_only_by_param_changes() {
    let params = TextOverlayParams::new("x", 10.0, "red");
    let mut overlay = TextOverlay::new(params.clone(), TrackId(1));
    let canvas = Canvas::new(2, 2);
    overlay
        .bitmap_or_build(canvas, |_, c| Ok(solid(c)))
        .unwrap();

    overlay.set_params(params);
    assert!(overlay.cached().is_some());

    overlay.set_params(TextOverlayParams::new("y", 10.0, "red"));
    assert!(overlay.cached().is_none());
}

#[test]
fn bitmap_build_errors_leave_cache_empty() {
    let overlay = TextOverlay::new(TextOverlayParams::new("x", 10.0, "red"), TrackId(1));
    let r = overlay.bitmap_or_build(Canvas::new(2, 2), |_, _| {
        Err(LivecompError::render_resource("no font"))
    });
    assert!(r.is_err());
    assert!(overlay.cached().is_none());
}

#[test]
fn concurrent_first_builds_agree_on_one_bitmap() {
    let overlay = TextOverlay::new(TextOverlayParams::new("x", 10.0, "red"), TrackId(1));
    let canvas = Canvas::new(3, 3);
    let results: Vec<Arc<CachedBitmap>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| overlay.bitmap_or_build(canvas, |_, c| Ok(solid(c))).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let stored = overlay.cached().unwrap();
    for r in &results {
        assert!(Arc::ptr_eq(r, stored));
    }
}

#[test]
fn params_reject_bad_font_size() {
    assert!(TextOverlayParams::new("x", 0.0, "red").validate().is_err());
    assert!(TextOverlayParams::new("x", f32::NAN, "red").validate().is_err());
    assert!(TextOverlayParams::new("x", 12.0, "red").validate().is_ok());
}
