use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

use crate::foundation::core::MediaTime;
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::compositor::Compositor;
use crate::render::context::RenderContext;
use crate::render::frame::FrameRGBA;
use crate::timeline::config::SnapshotCell;

enum Job {
    Render {
        time: MediaTime,
        reply: mpsc::Sender<LivecompResult<FrameRGBA>>,
    },
    Barrier {
        ack: mpsc::Sender<()>,
    },
}

/// Counters of a [`RenderQueue`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderQueueStats {
    /// Requests that produced a frame.
    pub completed: u64,
    /// Requests that failed.
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Pending result of a submitted frame request.
pub struct FrameTicket {
    time: MediaTime,
    rx: mpsc::Receiver<LivecompResult<FrameRGBA>>,
}

impl FrameTicket {
    /// Requested output time.
    pub fn time(&self) -> MediaTime {
        self.time
    }

    /// Block until the frame is composed.
    pub fn wait(self) -> LivecompResult<FrameRGBA> {
        self.rx.recv().map_err(|_| LivecompError::QueueClosed)?
    }
}

/// Single-consumer frame queue serviced by a dedicated render thread.
///
/// Requests are composed in submission order, each against the snapshot published when the
/// worker picks it up. A failed request only fails its own ticket.
pub struct RenderQueue {
    tx: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl RenderQueue {
    /// Start the render thread.
    pub fn spawn(
        snapshots: SnapshotCell,
        compositor: Arc<Compositor>,
        ctx: Arc<dyn RenderContext>,
    ) -> LivecompResult<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let counters = Arc::new(Counters::default());
        let worker_counters = counters.clone();
        let worker = std::thread::Builder::new()
            .name("livecomp-render".to_owned())
            .spawn(move || run_worker(rx, &snapshots, &compositor, ctx.as_ref(), &worker_counters))
            .map_err(|e| LivecompError::Other(anyhow::anyhow!("failed to spawn render thread: {e}")))?;
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            counters,
        })
    }

    /// Enqueue a request for the frame at `time`.
    pub fn submit(&self, time: MediaTime) -> LivecompResult<FrameTicket> {
        let (reply, rx) = mpsc::channel();
        self.send(Job::Render { time, reply })?;
        Ok(FrameTicket { time, rx })
    }

    /// Enqueue a request and block for its result.
    pub fn render(&self, time: MediaTime) -> LivecompResult<FrameRGBA> {
        self.submit(time)?.wait()
    }

    /// Block until every request submitted before this call has completed.
    pub fn drain(&self) -> LivecompResult<()> {
        let (ack, rx) = mpsc::channel();
        self.send(Job::Barrier { ack })?;
        rx.recv().map_err(|_| LivecompError::QueueClosed)
    }

    /// Request counters.
    pub fn stats(&self) -> RenderQueueStats {
        RenderQueueStats {
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    fn send(&self, job: Job) -> LivecompResult<()> {
        self.tx
            .as_ref()
            .ok_or(LivecompError::QueueClosed)?
            .send(job)
            .map_err(|_| LivecompError::QueueClosed)
    }
}

impl Drop for RenderQueue {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once queued jobs are done.
        self.tx.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("render thread panicked");
        }
    }
}

fn run_worker(
    rx: mpsc::Receiver<Job>,
    snapshots: &SnapshotCell,
    compositor: &Compositor,
    ctx: &dyn RenderContext,
    counters: &Counters,
) {
    tracing::debug!("render thread started");
    for job in rx {
        match job {
            Job::Render { time, reply } => {
                let snapshot = snapshots.load();
                let result = compositor.compose(&snapshot, time, ctx);
                match &result {
                    Ok(_) => {
                        counters.completed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(
                            %time,
                            generation = snapshot.generation(),
                            error = %e,
                            "frame request failed"
                        );
                    }
                }
                let _ = reply.send(result);
            }
            Job::Barrier { ack } => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("render thread stopped");
}
