use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LivecompError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        LivecompError::render_resource("x")
            .to_string()
            .contains("render resource error:")
    );
    assert!(
        LivecompError::buffer_allocation("x")
            .to_string()
            .contains("buffer allocation failed:")
    );
}

#[test]
fn frame_errors_name_track_and_time() {
    let err = LivecompError::MissingSourceFrame {
        track: TrackId(1),
        time: MediaTime::from_millis(2500),
    };
    let msg = err.to_string();
    assert!(msg.contains("track 1"));
    assert!(msg.contains("2.500000s"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LivecompError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
