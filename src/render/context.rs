use std::collections::HashMap;
use std::sync::Mutex;

use crate::foundation::core::Canvas;
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::frame::FrameRGBA;

/// Destination-buffer provider and render-resolution parameters for the compositor.
///
/// A render context is an explicit session-owned handle; nothing about it is global.
pub trait RenderContext: Send + Sync {
    /// Full output resolution.
    fn render_size(&self) -> Canvas;

    /// Ratio between output pixels and effect-canvas pixels.
    fn render_scale(&self) -> f32;

    /// Obtain a destination buffer of `render_size()`. Contents are unspecified.
    fn allocate_output_buffer(&self) -> LivecompResult<FrameRGBA>;
}

/// Pool configuration for recycled output buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct BufferPoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained buffers per size bucket.
    pub max_buffers_per_bucket: usize,
}

impl Default for BufferPoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 128 * 1024 * 1024,
            max_buffers_per_bucket: 8,
        }
    }
}

/// Allocation counters of a [`BufferPool`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferPoolStats {
    /// Buffers currently held by the pool.
    pub retained_buffers: usize,
    /// Bytes currently held by the pool.
    pub retained_bytes: usize,
    /// Fresh allocations made because no pooled buffer fit.
    pub alloc_buffers: u64,
    /// Bytes of fresh allocations.
    pub alloc_bytes: u64,
    /// Buffers served from the pool.
    pub reused_buffers: u64,
    /// Released buffers dropped because a cap was reached.
    pub dropped_on_release: u64,
}

/// Bounded pool of RGBA8 byte buffers keyed by canvas size.
pub(crate) struct BufferPool {
    opts: BufferPoolOpts,
    stats: BufferPoolStats,
    buckets: HashMap<Canvas, Vec<Vec<u8>>>,
}

impl BufferPool {
    pub(crate) fn new(opts: BufferPoolOpts) -> Self {
        Self {
            opts,
            stats: BufferPoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> BufferPoolStats {
        self.stats.clone()
    }

    pub(crate) fn borrow(&mut self, canvas: Canvas) -> LivecompResult<Vec<u8>> {
        let bytes = canvas.rgba8_len();
        if let Some(buf) = self.buckets.get_mut(&canvas).and_then(Vec::pop) {
            self.stats.retained_buffers = self.stats.retained_buffers.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(bytes);
            self.stats.reused_buffers = self.stats.reused_buffers.saturating_add(1);
            return Ok(buf);
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes).map_err(|e| {
            LivecompError::buffer_allocation(format!(
                "{}x{} output buffer: {e}",
                canvas.width, canvas.height
            ))
        })?;
        buf.resize(bytes, 0);
        self.stats.alloc_buffers = self.stats.alloc_buffers.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(bytes as u64);
        Ok(buf)
    }

    pub(crate) fn release(&mut self, canvas: Canvas, buf: Vec<u8>) {
        let bytes = canvas.rgba8_len();
        if self.opts.max_pool_bytes == 0
            || self.opts.max_buffers_per_bucket == 0
            || buf.len() != bytes
            || self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(canvas).or_default();
        if bucket.len() >= self.opts.max_buffers_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(buf);
        self.stats.retained_buffers = self.stats.retained_buffers.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

/// [`RenderContext`] that recycles output buffers through a bounded [`BufferPool`].
pub struct PooledRenderContext {
    render_size: Canvas,
    render_scale: f32,
    pool: Mutex<BufferPool>,
}

impl PooledRenderContext {
    /// Create a context rendering at `render_size` with the given effect scale.
    pub fn new(render_size: Canvas, render_scale: f32, pool: BufferPoolOpts) -> LivecompResult<Self> {
        if render_size.is_empty() {
            return Err(LivecompError::validation("render size must be non-zero"));
        }
        if !render_scale.is_finite() || render_scale <= 0.0 {
            return Err(LivecompError::validation(
                "render scale must be finite and > 0",
            ));
        }
        Ok(Self {
            render_size,
            render_scale,
            pool: Mutex::new(BufferPool::new(pool)),
        })
    }

    /// Hand a consumed output frame back for reuse.
    pub fn recycle(&self, frame: FrameRGBA) {
        let canvas = frame.canvas();
        if let Ok(mut pool) = self.pool.lock() {
            pool.release(canvas, frame.data);
        }
    }

    /// Snapshot of the pool counters.
    pub fn pool_stats(&self) -> BufferPoolStats {
        self.pool
            .lock()
            .map(|p| p.stats())
            .unwrap_or_default()
    }
}

impl RenderContext for PooledRenderContext {
    fn render_size(&self) -> Canvas {
        self.render_size
    }

    fn render_scale(&self) -> f32 {
        self.render_scale
    }

    fn allocate_output_buffer(&self) -> LivecompResult<FrameRGBA> {
        let data = self
            .pool
            .lock()
            .map_err(|_| LivecompError::buffer_allocation("buffer pool lock poisoned"))?
            .borrow(self.render_size)?;
        Ok(FrameRGBA {
            width: self.render_size.width,
            height: self.render_size.height,
            data,
            premultiplied: true,
        })
    }
}
