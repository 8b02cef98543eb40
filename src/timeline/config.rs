use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::assets::source::SourceFrameProvider;
use crate::foundation::core::{Canvas, Fps, MediaTime, TrackId};
use crate::render::frame::FrameRGBA;
use crate::timeline::instruction::Instruction;
use crate::timeline::track::TrackTable;

/// Render parameters and the instruction list of a composition.
#[derive(Clone, Debug)]
pub struct CompositionConfig {
    /// Full output resolution.
    pub render_size: Canvas,
    /// Ratio between output pixels and effect-canvas pixels.
    pub render_scale: f32,
    /// Sampling rate; one frame lasts `fps.frame_duration()`.
    pub fps: Fps,
    /// Tracks allowed to supply raw frames to the compositor.
    pub sample_tracks: BTreeSet<TrackId>,
    /// Instructions ordered by start time.
    pub instructions: Vec<Arc<Instruction>>,
}

impl CompositionConfig {
    /// Empty configuration with the given render parameters.
    pub fn new(render_size: Canvas, render_scale: f32, fps: Fps) -> Self {
        Self {
            render_size,
            render_scale,
            fps,
            sample_tracks: BTreeSet::new(),
            instructions: Vec::new(),
        }
    }

    /// Canvas effect bitmaps are built at.
    pub fn effect_canvas(&self) -> Canvas {
        self.render_size.scaled_down(self.render_scale)
    }
}

/// Immutable published state consumed by the compositor.
///
/// Carries the tracks its instructions refer to, so a snapshot stays self-consistent after later
/// swaps remove or replace those tracks.
#[derive(Clone, Debug)]
pub struct CompositionSnapshot {
    generation: u64,
    config: CompositionConfig,
    tracks: TrackTable,
    duration: MediaTime,
}

impl CompositionSnapshot {
    pub(crate) fn new(
        generation: u64,
        config: CompositionConfig,
        tracks: TrackTable,
        duration: MediaTime,
    ) -> Self {
        Self {
            generation,
            config,
            tracks,
            duration,
        }
    }

    /// Snapshot published before any mutation: no tracks, no instructions.
    pub fn empty(config: CompositionConfig) -> Self {
        Self::new(0, config, TrackTable::default(), MediaTime::ZERO)
    }

    /// Publish counter; 0 for the initial empty snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Render configuration and instruction list.
    pub fn config(&self) -> &CompositionConfig {
        &self.config
    }

    /// Track table.
    pub fn tracks(&self) -> &TrackTable {
        &self.tracks
    }

    /// Main-track duration.
    pub fn duration(&self) -> MediaTime {
        self.duration
    }

    /// Instructions ordered by start time.
    pub fn instructions(&self) -> &[Arc<Instruction>] {
        &self.config.instructions
    }
}

impl SourceFrameProvider for CompositionSnapshot {
    fn frame(&self, track: TrackId, time: MediaTime) -> Option<FrameRGBA> {
        self.tracks.get(track)?.frame_at(time)
    }
}

/// Shared slot holding the currently published snapshot.
///
/// Writers replace the snapshot wholesale; readers clone the `Arc` under a short read lock and
/// never observe a partially updated snapshot.
#[derive(Clone, Debug)]
pub struct SnapshotCell {
    inner: Arc<RwLock<Arc<CompositionSnapshot>>>,
}

impl SnapshotCell {
    /// Cell initially holding `snapshot`.
    pub fn new(snapshot: CompositionSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<CompositionSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn store(&self, snapshot: Arc<CompositionSnapshot>) -> Arc<CompositionSnapshot> {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, snapshot)
    }
}
