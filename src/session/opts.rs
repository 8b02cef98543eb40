use std::path::Path;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::context::BufferPoolOpts;

const ENV_POOL_MAX_BYTES: &str = "LIVECOMP_POOL_MAX_BYTES";
const ENV_POOL_MAX_PER_BUCKET: &str = "LIVECOMP_POOL_MAX_PER_BUCKET";

/// Options of a [`LiveSession`](crate::session::live_session::LiveSession).
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOpts {
    /// Output resolution.
    pub render_size: Canvas,
    /// Effect canvas scale; effect bitmaps are built at `render_size / render_scale`.
    pub render_scale: f32,
    /// Frame rate used for export.
    pub fps: Fps,
    /// Output buffer pool limits.
    pub pool: BufferPoolOpts,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            render_size: Canvas::new(1280, 720),
            render_scale: 1.0,
            fps: Fps::default(),
            pool: BufferPoolOpts::default(),
        }
    }
}

impl SessionOpts {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> LivecompResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| LivecompError::validation(format!("invalid session options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read options from a JSON file.
    pub fn from_path(path: &Path) -> LivecompResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LivecompError::Other(anyhow::anyhow!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Apply `LIVECOMP_POOL_MAX_BYTES` and `LIVECOMP_POOL_MAX_PER_BUCKET` from the environment.
    pub fn with_env_overrides(self) -> LivecompResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LivecompResult<Self> {
        if let Some(v) = lookup(ENV_POOL_MAX_BYTES) {
            self.pool.max_pool_bytes = parse_usize(ENV_POOL_MAX_BYTES, &v)?;
        }
        if let Some(v) = lookup(ENV_POOL_MAX_PER_BUCKET) {
            self.pool.max_buffers_per_bucket = parse_usize(ENV_POOL_MAX_PER_BUCKET, &v)?;
        }
        Ok(self)
    }

    /// Check the options describe a renderable session.
    pub fn validate(&self) -> LivecompResult<()> {
        if self.render_size.is_empty() {
            return Err(LivecompError::validation("render_size must be non-zero"));
        }
        if !self.render_scale.is_finite() || self.render_scale <= 0.0 {
            return Err(LivecompError::validation(
                "render_scale must be finite and > 0",
            ));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        Ok(())
    }
}

fn parse_usize(key: &str, value: &str) -> LivecompResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| LivecompError::validation(format!("{key}='{value}' is not a count: {e}")))
}

/// Options of a range export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOpts {
    /// Compose frames on a rayon pool.
    pub parallel: bool,
    /// Worker thread count; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Frames composed per batch before they are handed to the sink.
    pub chunk_size: usize,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 64,
        }
    }
}

/// Counters of a finished export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames handed to the sink.
    pub frames: u64,
    /// Generation of the snapshot the export used.
    pub generation: u64,
}

#[cfg(test)]
#[path = "../../tests/unit/session/opts.rs"]
mod tests;
