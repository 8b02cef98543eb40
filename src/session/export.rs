use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::compositor::Compositor;
use crate::render::context::PooledRenderContext;
use crate::render::frame::FrameRGBA;
use crate::session::opts::{ExportOpts, ExportStats};
use crate::timeline::config::CompositionSnapshot;

/// Compose every frame of `range` against one snapshot and hand them to `sink` in index order.
///
/// Frames are sampled at `fps.frame_time(idx)`; the range must lie within the snapshot's
/// duration. Any failed frame aborts the export.
pub fn render_range(
    snapshot: &CompositionSnapshot,
    compositor: &Compositor,
    ctx: &PooledRenderContext,
    range: FrameRange,
    opts: &ExportOpts,
    sink: &mut dyn FrameSink,
) -> LivecompResult<ExportStats> {
    let config = snapshot.config();
    let total = config.fps.frames_in(snapshot.duration());
    if range.end.0 > total {
        return Err(LivecompError::validation(format!(
            "frame range {}..{} exceeds the {total} frames of the composition",
            range.start.0, range.end.0
        )));
    }
    if opts.chunk_size == 0 {
        return Err(LivecompError::validation("export chunk_size must be >= 1"));
    }
    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    sink.begin(SinkConfig {
        width: config.render_size.width,
        height: config.render_size.height,
        fps: config.fps,
    })?;

    let compose = |idx: u64| -> LivecompResult<FrameRGBA> {
        compositor.compose(snapshot, config.fps.frame_time(FrameIndex(idx)), ctx)
    };

    let chunk_size = opts.chunk_size as u64;
    let mut stats = ExportStats {
        frames: 0,
        generation: snapshot.generation(),
    };
    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = chunk_start.saturating_add(chunk_size).min(range.end.0);
        let frames: Vec<FrameRGBA> = match pool.as_ref() {
            Some(pool) => {
                let len = (chunk_end - chunk_start) as usize;
                pool.install(|| {
                    (0..len)
                        .into_par_iter()
                        .map(|i| compose(chunk_start + i as u64))
                        .collect::<LivecompResult<Vec<_>>>()
                })?
            }
            None => (chunk_start..chunk_end)
                .map(compose)
                .collect::<LivecompResult<Vec<_>>>()?,
        };
        for (idx, frame) in (chunk_start..chunk_end).zip(frames) {
            sink.push_frame(FrameIndex(idx), &frame)?;
            ctx.recycle(frame);
            stats.frames += 1;
        }
        chunk_start = chunk_end;
    }

    sink.end()?;
    tracing::debug!(
        frames = stats.frames,
        generation = stats.generation,
        parallel = opts.parallel,
        "range exported"
    );
    Ok(stats)
}

fn build_thread_pool(threads: Option<usize>) -> LivecompResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(LivecompError::validation(
            "export 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LivecompError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}
