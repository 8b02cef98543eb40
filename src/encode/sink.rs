use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::LivecompResult;
use crate::render::frame::FrameRGBA;

/// Parameters handed to a [`FrameSink`] before the first frame of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
}

/// Consumer of exported frames.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order, whatever order the frames
/// were composed in.
pub trait FrameSink: Send {
    /// Called once before any frame.
    fn begin(&mut self, cfg: SinkConfig) -> LivecompResult<()>;
    /// Receive the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LivecompResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> LivecompResult<()>;
}

/// Sink that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration received in `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in delivery order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Return `true` once `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LivecompResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LivecompResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> LivecompResult<()> {
        self.finished = true;
        Ok(())
    }
}
