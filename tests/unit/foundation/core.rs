use super::*;

#[test]
fn time_range_is_half_open() {
    let r = TimeRange::new(MediaTime::from_secs(2), MediaTime::from_secs(3));
    assert!(!r.contains(MediaTime::from_millis(1999)));
    assert!(r.contains(MediaTime::from_secs(2)));
    assert!(r.contains(MediaTime(4_999_999)));
    assert!(!r.contains(MediaTime::from_secs(5)));
    assert_eq!(r.end(), MediaTime::from_secs(5));
}

#[test]
fn time_range_overlap_excludes_touching_ranges() {
    let a = TimeRange::from_zero(MediaTime::from_secs(5));
    let b = TimeRange::new(MediaTime::from_secs(5), MediaTime::from_secs(5));
    let c = TimeRange::new(MediaTime::from_secs(4), MediaTime::from_secs(2));
    assert!(!a.overlaps(b));
    assert!(a.overlaps(c));
    assert!(b.overlaps(c));
}

#[test]
fn media_time_from_secs_f64_clamps_negative() {
    assert_eq!(MediaTime::from_secs_f64(-1.0), MediaTime::ZERO);
    assert_eq!(MediaTime::from_secs_f64(f64::NAN), MediaTime::ZERO);
    assert_eq!(MediaTime::from_secs_f64(1.5), MediaTime::from_millis(1500));
}

#[test]
fn fps_frame_time_and_count() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frame_time(FrameIndex(0)), MediaTime::ZERO);
    assert_eq!(fps.frame_time(FrameIndex(30)), MediaTime::from_secs(1));
    assert_eq!(fps.frames_in(MediaTime::from_secs(10)), 300);
    assert_eq!(fps.frames_in(MediaTime(1)), 1);

    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(ntsc.frame_duration(), MediaTime(33_366));
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn frame_range_iterates_in_order() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    let v: Vec<u64> = r.iter().map(|f| f.0).collect();
    assert_eq!(v, vec![2, 3, 4]);
    assert_eq!(r.len_frames(), 3);
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn canvas_scaled_down_rounds_and_ignores_bad_scale() {
    let c = Canvas::new(1920, 1080);
    assert_eq!(c.scaled_down(2.0), Canvas::new(960, 540));
    assert_eq!(c.scaled_down(0.0), c);
    assert_eq!(Canvas::new(1, 1).scaled_down(4.0), Canvas::new(1, 1));
}

#[test]
fn premul_from_straight_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
}
