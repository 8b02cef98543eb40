use std::sync::Arc;

use crate::assets::source::AssetSource;
use crate::encode::sink::FrameSink;
use crate::foundation::core::{FrameRange, MediaTime, TrackId};
use crate::foundation::error::LivecompResult;
use crate::render::compositor::Compositor;
use crate::render::context::{BufferPoolStats, PooledRenderContext, RenderContext};
use crate::render::frame::FrameRGBA;
use crate::render::queue::{FrameTicket, RenderQueue, RenderQueueStats};
use crate::session::export;
use crate::session::opts::{ExportOpts, ExportStats, SessionOpts};
use crate::timeline::config::{CompositionConfig, CompositionSnapshot};
use crate::timeline::instruction::TextOverlayParams;
use crate::timeline::manager::Timeline;

/// A running compositing pipeline: one timeline, one render thread, one render context.
///
/// Every mutation publishes a new snapshot and drains the render queue before returning, so once
/// it returns no request is still composing against the superseded snapshot.
pub struct LiveSession {
    timeline: Timeline,
    compositor: Arc<Compositor>,
    ctx: Arc<PooledRenderContext>,
    queue: RenderQueue,
    opts: SessionOpts,
}

impl LiveSession {
    /// Start a session with no main track.
    pub fn new(opts: SessionOpts) -> LivecompResult<Self> {
        opts.validate()?;
        let ctx = Arc::new(PooledRenderContext::new(
            opts.render_size,
            opts.render_scale,
            opts.pool,
        )?);
        let timeline = Timeline::new(CompositionConfig::new(
            opts.render_size,
            opts.render_scale,
            opts.fps,
        ));
        let compositor = Arc::new(Compositor::new());
        let render_ctx: Arc<dyn RenderContext> = ctx.clone();
        let queue = RenderQueue::spawn(timeline.snapshots(), compositor.clone(), render_ctx)?;
        tracing::debug!(
            width = opts.render_size.width,
            height = opts.render_size.height,
            scale = opts.render_scale,
            "session started"
        );
        Ok(Self {
            timeline,
            compositor,
            ctx,
            queue,
            opts,
        })
    }

    /// Session options.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// The timeline behind this session.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Currently published snapshot.
    pub fn snapshot(&self) -> Arc<CompositionSnapshot> {
        self.timeline.snapshots().load()
    }

    /// Replace the main track with `asset`'s first playable video track.
    #[tracing::instrument(skip(self, asset))]
    pub async fn set_main_track<A: AssetSource>(&mut self, asset: &A) -> LivecompResult<TrackId> {
        let id = self.timeline.set_main_track(asset).await?;
        self.refresh()?;
        Ok(id)
    }

    /// Show a text overlay over the whole main track.
    #[tracing::instrument(skip(self, params), fields(text = %params.text))]
    pub fn set_overlay_instruction(&mut self, params: TextOverlayParams) -> LivecompResult<()> {
        self.timeline.set_overlay_instruction(params)?;
        self.refresh()
    }

    /// Remove the overlay, returning to a plain passthrough.
    #[tracing::instrument(skip(self))]
    pub fn clear_overlay_instructions(&mut self) -> LivecompResult<()> {
        self.timeline.clear_overlay_instructions()?;
        self.refresh()
    }

    /// Enqueue a frame request on the render thread.
    pub fn submit(&self, time: MediaTime) -> LivecompResult<FrameTicket> {
        self.queue.submit(time)
    }

    /// Compose the frame at `time` on the render thread and wait for it.
    pub fn render_frame(&self, time: MediaTime) -> LivecompResult<FrameRGBA> {
        self.queue.render(time)
    }

    /// Wait until every submitted request has completed.
    pub fn drain(&self) -> LivecompResult<()> {
        self.queue.drain()
    }

    /// Return a consumed frame's buffer to the pool.
    pub fn recycle(&self, frame: FrameRGBA) {
        self.ctx.recycle(frame);
    }

    /// Render queue counters.
    pub fn queue_stats(&self) -> RenderQueueStats {
        self.queue.stats()
    }

    /// Buffer pool counters.
    pub fn pool_stats(&self) -> BufferPoolStats {
        self.ctx.pool_stats()
    }

    /// Export `range` of the published snapshot into `sink`.
    #[tracing::instrument(skip(self, opts, sink))]
    pub fn render_range(
        &self,
        range: FrameRange,
        opts: &ExportOpts,
        sink: &mut dyn FrameSink,
    ) -> LivecompResult<ExportStats> {
        let snapshot = self.snapshot();
        export::render_range(&snapshot, &self.compositor, &self.ctx, range, opts, sink)
    }

    fn refresh(&mut self) -> LivecompResult<()> {
        let generation = self.timeline.publish()?;
        self.queue.drain()?;
        tracing::debug!(generation, "session refreshed");
        Ok(())
    }
}
