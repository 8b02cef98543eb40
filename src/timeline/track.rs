use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::source::{FrameDecoder, TrackDescriptor};
use crate::foundation::core::{MediaTime, TimeRange, TrackId};
use crate::render::frame::FrameRGBA;

/// Well-known id of the main video track. Every main-track swap reuses it.
pub const MAIN_TRACK_ID: TrackId = TrackId(1);

/// A composition track: raw frames of one asset track placed on the timeline.
#[derive(Clone)]
pub struct Track {
    id: TrackId,
    descriptor: TrackDescriptor,
    range: TimeRange,
    decoder: Arc<dyn FrameDecoder>,
}

impl std::fmt::Debug for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Track")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

impl Track {
    pub(crate) fn new(
        id: TrackId,
        descriptor: TrackDescriptor,
        range: TimeRange,
        decoder: Arc<dyn FrameDecoder>,
    ) -> Self {
        Self {
            id,
            descriptor,
            range,
            decoder,
        }
    }

    /// Track id.
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Asset track the frames come from.
    pub fn descriptor(&self) -> &TrackDescriptor {
        &self.descriptor
    }

    /// Timeline range the asset was inserted at.
    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    /// Raw frame at timeline time `t`, or `None` outside the track range.
    pub fn frame_at(&self, t: MediaTime) -> Option<FrameRGBA> {
        if !self.range.contains(t) {
            return None;
        }
        self.decoder.frame_at(t.saturating_sub(self.range.start))
    }
}

/// Tracks of a composition keyed by id.
#[derive(Clone, Debug, Default)]
pub struct TrackTable {
    tracks: BTreeMap<TrackId, Track>,
}

impl TrackTable {
    /// Insert `track`, returning the track it replaced.
    pub fn insert(&mut self, track: Track) -> Option<Track> {
        self.tracks.insert(track.id(), track)
    }

    /// Remove the track bound to `id`.
    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        self.tracks.remove(&id)
    }

    /// Track bound to `id`.
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks.keys().copied()
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Return `true` when no track is present.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
