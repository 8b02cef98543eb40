use std::path::{Path, PathBuf};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::frame::FrameRGBA;

/// Write a frame as a straight-alpha PNG.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> LivecompResult<()> {
    let image = frame.to_straight_image()?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| {
            LivecompError::Other(anyhow::anyhow!("failed to write '{}': {e}", path.display()))
        })
}

/// Sink writing `frame_NNNNNN.png` files into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, created on `begin` if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    /// Path a given frame is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }

    /// Frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> LivecompResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            LivecompError::Other(anyhow::anyhow!(
                "failed to create '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.written = 0;
        tracing::debug!(
            dir = %self.dir.display(),
            width = cfg.width,
            height = cfg.height,
            "png sequence started"
        );
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LivecompResult<()> {
        write_png(frame, &self.frame_path(idx))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> LivecompResult<()> {
        tracing::info!(frames = self.written, dir = %self.dir.display(), "png sequence written");
        Ok(())
    }
}
