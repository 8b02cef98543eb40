use std::collections::BTreeSet;
use std::sync::Arc;

use crate::assets::source::{AssetSource, MediaType};
use crate::foundation::core::{MediaTime, TimeRange, TrackId};
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::timeline::config::{CompositionConfig, CompositionSnapshot, SnapshotCell};
use crate::timeline::instruction::{
    Instruction, InstructionKind, TextOverlayParams, validate_instruction_list,
};
use crate::timeline::track::{MAIN_TRACK_ID, Track, TrackTable};

/// Lifecycle state of the instruction list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionState {
    /// No main track yet; the instruction list is empty.
    Uninitialized,
    /// A single passthrough covers the main track.
    PassthroughOnly,
    /// A single text overlay covers the main track.
    OverlayActive,
}

/// Owner of the track table and instruction list.
///
/// Mutations edit a private working copy; [`Timeline::publish`] makes it visible to renderers as
/// one immutable snapshot.
pub struct Timeline {
    config: CompositionConfig,
    tracks: TrackTable,
    duration: MediaTime,
    generation: u64,
    dirty: bool,
    published: SnapshotCell,
}

impl Timeline {
    /// Create a timeline with the given render parameters and no tracks.
    pub fn new(mut config: CompositionConfig) -> Self {
        config.instructions.clear();
        config.sample_tracks.clear();
        let published = SnapshotCell::new(CompositionSnapshot::empty(config.clone()));
        Self {
            config,
            tracks: TrackTable::default(),
            duration: MediaTime::ZERO,
            generation: 0,
            dirty: false,
            published,
        }
    }

    /// Handle to the published snapshot, for renderers.
    pub fn snapshots(&self) -> SnapshotCell {
        self.published.clone()
    }

    /// Working configuration (may be ahead of the published snapshot).
    pub fn config(&self) -> &CompositionConfig {
        &self.config
    }

    /// Working instruction list.
    pub fn instructions(&self) -> &[Arc<Instruction>] {
        &self.config.instructions
    }

    /// Current main track.
    pub fn main_track(&self) -> Option<&Track> {
        self.tracks.get(MAIN_TRACK_ID)
    }

    /// Duration of the main track, zero before the first swap.
    pub fn duration(&self) -> MediaTime {
        self.duration
    }

    /// Return `true` when the working copy has changes not yet published.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Lifecycle state derived from the working instruction list.
    pub fn state(&self) -> InstructionState {
        match self.config.instructions.first().map(|i| i.kind()) {
            None => InstructionState::Uninitialized,
            Some(InstructionKind::Passthrough { .. }) => InstructionState::PassthroughOnly,
            Some(InstructionKind::TextOverlay(_)) => InstructionState::OverlayActive,
        }
    }

    /// Bind `asset`'s first playable video track to the main track id.
    ///
    /// Reentrant: each call replaces the previous main track under the same [`MAIN_TRACK_ID`] and
    /// resets the instructions to one passthrough over the new duration. On failure the timeline
    /// is left untouched.
    #[tracing::instrument(skip(self, asset))]
    pub async fn set_main_track<A: AssetSource>(&mut self, asset: &A) -> LivecompResult<TrackId> {
        let video = asset.load_tracks(MediaType::Video).await?;
        let Some(descriptor) = video.into_iter().find(|t| t.is_playable_video()) else {
            tracing::warn!("asset has no playable video track");
            return Err(LivecompError::NoPlayableTrack);
        };
        let duration = asset.load_duration().await?;
        if duration == MediaTime::ZERO {
            tracing::warn!("asset video track has zero duration");
            return Err(LivecompError::NoPlayableTrack);
        }

        let decoder = asset.decoder(&descriptor);
        let range = TimeRange::from_zero(duration);
        let replaced = self.tracks.remove(MAIN_TRACK_ID);
        self.tracks
            .insert(Track::new(MAIN_TRACK_ID, descriptor, range, decoder));
        self.duration = duration;
        self.config.sample_tracks = BTreeSet::from([MAIN_TRACK_ID]);
        self.config.instructions = vec![Arc::new(Instruction::passthrough(range, MAIN_TRACK_ID))];
        self.dirty = true;

        tracing::debug!(
            track = %MAIN_TRACK_ID,
            %duration,
            replaced = replaced.is_some(),
            "main track set"
        );
        Ok(MAIN_TRACK_ID)
    }

    /// Replace all instructions with one text overlay spanning the main track.
    ///
    /// An overlay already spanning the main track is updated in place: its cached bitmap survives
    /// when `params` are unchanged. Published snapshots keep their own copy.
    pub fn set_overlay_instruction(&mut self, params: TextOverlayParams) -> LivecompResult<()> {
        params.validate()?;
        let range = self.main_range()?;
        let current = match self.config.instructions.as_mut_slice() {
            [only]
                if only.time_range() == range
                    && matches!(only.kind(), InstructionKind::TextOverlay(_)) =>
            {
                Some(only)
            }
            _ => None,
        };
        if let Some(only) = current {
            if let InstructionKind::TextOverlay(overlay) = Arc::make_mut(only).kind_mut() {
                overlay.set_params(params);
            }
        } else {
            self.config.instructions = vec![Arc::new(Instruction::text_overlay(
                range,
                MAIN_TRACK_ID,
                params,
            ))];
        }
        self.dirty = true;
        tracing::debug!("overlay instruction set");
        Ok(())
    }

    /// Replace all instructions with one passthrough spanning the main track.
    pub fn clear_overlay_instructions(&mut self) -> LivecompResult<()> {
        let range = self.main_range()?;
        self.config.instructions = vec![Arc::new(Instruction::passthrough(range, MAIN_TRACK_ID))];
        self.dirty = true;
        tracing::debug!("overlay instructions cleared");
        Ok(())
    }

    /// Validate the working copy and swap it in as the published snapshot.
    ///
    /// Returns the generation of the new snapshot.
    pub fn publish(&mut self) -> LivecompResult<u64> {
        validate_instruction_list(&self.config.instructions, self.duration)?;
        self.generation = self.generation.saturating_add(1);
        let snapshot = CompositionSnapshot::new(
            self.generation,
            self.config.clone(),
            self.tracks.clone(),
            self.duration,
        );
        self.published.store(Arc::new(snapshot));
        self.dirty = false;
        tracing::debug!(
            generation = self.generation,
            instructions = self.config.instructions.len(),
            "published composition snapshot"
        );
        Ok(self.generation)
    }

    fn main_range(&self) -> LivecompResult<TimeRange> {
        if self.main_track().is_none() {
            return Err(LivecompError::validation(
                "a main track must be set before editing instructions",
            ));
        }
        Ok(TimeRange::from_zero(self.duration))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/manager.rs"]
mod tests;
