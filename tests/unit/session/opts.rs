use super::*;

#[test]
fn defaults_are_valid() {
    let opts = SessionOpts::default();
    opts.validate().unwrap();
    assert_eq!(opts.render_size, Canvas::new(1280, 720));
    assert_eq!(opts.fps, Fps { num: 30, den: 1 });
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let opts = SessionOpts::from_json_str(
        r#"{ "render_size": { "width": 640, "height": 360 }, "pool": { "max_buffers_per_bucket": 2 } }"#,
    )
    .unwrap();
    assert_eq!(opts.render_size, Canvas::new(640, 360));
    assert_eq!(opts.render_scale, 1.0);
    assert_eq!(opts.pool.max_buffers_per_bucket, 2);
    assert_eq!(
        opts.pool.max_pool_bytes,
        BufferPoolOpts::default().max_pool_bytes
    );
}

#[test]
fn json_rejects_unknown_fields_and_bad_values() {
    assert!(matches!(
        SessionOpts::from_json_str(r#"{ "render_sise": null }"#),
        Err(LivecompError::Validation(_))
    ));
    assert!(matches!(
        SessionOpts::from_json_str(r#"{ "render_scale": 0.0 }"#),
        Err(LivecompError::Validation(_))
    ));
    assert!(matches!(
        SessionOpts::from_json_str(r#"{ "fps": { "num": 30, "den": 0 } }"#),
        Err(LivecompError::Validation(_))
    ));
}

#[test]
fn overrides_replace_pool_limits() {
    let opts = SessionOpts::default()
        .with_overrides(|key| match key {
            "LIVECOMP_POOL_MAX_BYTES" => Some("4096".to_owned()),
            "LIVECOMP_POOL_MAX_PER_BUCKET" => Some(" 3 ".to_owned()),
            _ => None,
        })
        .unwrap();
    assert_eq!(opts.pool.max_pool_bytes, 4096);
    assert_eq!(opts.pool.max_buffers_per_bucket, 3);

    let err = SessionOpts::default()
        .with_overrides(|key| (key == "LIVECOMP_POOL_MAX_BYTES").then(|| "lots".to_owned()))
        .unwrap_err();
    assert!(err.to_string().contains("LIVECOMP_POOL_MAX_BYTES"));
}
