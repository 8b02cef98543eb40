use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_half_alpha_blends_with_dst() {
    let dst = [0, 0, 255, 255];
    let src = [0, 128, 0, 128];
    assert_eq!(over(dst, src, 1.0), [0, 128, 127, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    assert!(over_in_place(&mut dst, &[0u8; 8], 1.0).is_ok());
}

#[test]
fn fit_to_canvas_keeps_same_size_frames_identical() {
    let data: Vec<u8> = (0..16u8).collect();
    let f = FrameRGBA::from_premul(2, 2, data.clone()).unwrap();
    let out = fit_to_canvas(f, Canvas::new(2, 2)).unwrap();
    assert_eq!(out.data, data);
}

#[test]
fn fit_to_canvas_resamples_uniform_frames() {
    let f = FrameRGBA::from_premul(2, 2, [40u8, 80, 120, 255].repeat(4)).unwrap();
    let out = fit_to_canvas(f, Canvas::new(4, 3)).unwrap();
    assert_eq!(out.canvas(), Canvas::new(4, 3));
    for px in out.data.chunks_exact(4) {
        assert_eq!(px, [40, 80, 120, 255]);
    }
}
