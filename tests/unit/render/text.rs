use std::path::PathBuf;
use std::sync::Arc;

use super::*;
use crate::assets::font::FontSource;

const FIXTURE_FONT: &str = "tests/data/fonts/DejaVuSans.ttf";

fn fixture_font() -> FontSource {
    FontSource::File {
        path: PathBuf::from(FIXTURE_FONT),
    }
}

fn painted_pixels(img: &FrameRGBA) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for y in 0..img.height {
        for x in 0..img.width {
            if img.pixel(x, y).is_some_and(|px| px[3] != 0) {
                out.push((x, y));
            }
        }
    }
    out
}

#[test]
fn overlay_box_is_centered_half_canvas() {
    let b = overlay_box(Canvas::new(200, 100));
    assert_eq!(b, Rect::new(50.0, 25.0, 150.0, 75.0));
}

#[test]
fn unknown_color_fails_with_render_resource() {
    let params = TextOverlayParams::new("Hello", 16.0, "chartreuse-ish");
    let r = TextOverlayRenderer::new().build_text_image(&params, Canvas::new(64, 64));
    assert!(matches!(r, Err(LivecompError::RenderResource(_))));
}

#[test]
fn garbage_font_bytes_fail_with_render_resource() {
    let params = TextOverlayParams::new("Hello", 16.0, "green")
        .with_font(FontSource::Bytes(Arc::from(&[0u8, 1, 2, 3][..])));
    let r = TextOverlayRenderer::new().build_text_image(&params, Canvas::new(64, 64));
    assert!(matches!(r, Err(LivecompError::RenderResource(_))));
}

#[test]
fn empty_canvas_is_rejected() {
    let params = TextOverlayParams::new("Hello", 16.0, "green");
    let r = TextOverlayRenderer::new().build_text_image(&params, Canvas::new(0, 10));
    assert!(r.is_err());
}

#[test]
fn build_is_byte_identical_across_calls() {
    let params = TextOverlayParams::new("Hello World", 18.0, "green").with_font(fixture_font());
    let canvas = Canvas::new(256, 128);

    let a = TextOverlayRenderer::new()
        .build_text_image(&params, canvas)
        .unwrap();
    let b = TextOverlayRenderer::new()
        .build_text_image(&params, canvas)
        .unwrap();
    assert_eq!(a, b);
    assert!(!painted_pixels(&a).is_empty());
}

#[test]
fn file_and_byte_sources_render_identically() {
    let bytes = std::fs::read(FIXTURE_FONT).unwrap();
    let canvas = Canvas::new(128, 64);
    let from_file = TextOverlayParams::new("Hi", 14.0, "white").with_font(fixture_font());
    let from_bytes = TextOverlayParams::new("Hi", 14.0, "white")
        .with_font(FontSource::Bytes(Arc::from(bytes.as_slice())));

    let renderer = TextOverlayRenderer::new();
    assert_eq!(
        renderer.build_text_image(&from_file, canvas).unwrap(),
        renderer.build_text_image(&from_bytes, canvas).unwrap()
    );
}

#[test]
fn glyph_pixels_stay_inside_the_overlay_box() {
    let params = TextOverlayParams::new("Hello World", 16.0, "#00ff00").with_font(fixture_font());
    let canvas = Canvas::new(256, 128);
    let img = TextOverlayRenderer::new()
        .build_text_image(&params, canvas)
        .unwrap();
    assert!(img.premultiplied);

    let bounds = overlay_box(canvas).inflate(1.0, 1.0);
    let painted = painted_pixels(&img);
    assert!(!painted.is_empty());
    for (x, y) in painted {
        let [r, g, b, a] = img.pixel(x, y).unwrap();
        assert!(bounds.contains(kurbo::Point::new(f64::from(x), f64::from(y))));
        assert_eq!(r, 0);
        assert_eq!(b, 0);
        assert!(g <= a);
    }
}

#[test]
fn long_text_is_clipped_to_the_overlay_box() {
    let text = "Hello World ".repeat(12);
    let params = TextOverlayParams::new(text, 40.0, "green").with_font(fixture_font());
    let canvas = Canvas::new(320, 180);
    let img = TextOverlayRenderer::new()
        .build_text_image(&params, canvas)
        .unwrap();

    let bounds = overlay_box(canvas);
    let painted = painted_pixels(&img);
    assert!(!painted.is_empty());
    for (x, y) in painted {
        let (fx, fy) = (f64::from(x), f64::from(y));
        assert!(
            fx >= bounds.x0 && fx < bounds.x1 && fy >= bounds.y0 && fy < bounds.y1,
            "({x}, {y}) painted outside {bounds:?}"
        );
    }
}

#[test]
fn default_font_paints_when_any_system_face_is_installed() {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if db.is_empty() {
        // Resolution of the generic family is covered against the fixture font in assets::font.
        return;
    }
    let params = TextOverlayParams::new("Hello World", 48.0, "green");
    let img = TextOverlayRenderer::new()
        .build_text_image(&params, Canvas::new(640, 360))
        .unwrap();
    assert!(!painted_pixels(&img).is_empty());
}
