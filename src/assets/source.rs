use std::future::Future;
use std::sync::Arc;

use crate::foundation::core::{Canvas, MediaTime, TrackId};
use crate::foundation::error::LivecompResult;
use crate::render::frame::FrameRGBA;

/// Kind of media carried by an asset track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// Picture frames.
    Video,
    /// Sound samples. Listed by assets, never composited.
    Audio,
}

/// Metadata of one track inside an asset, as reported by the asset source.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackDescriptor {
    /// Index of the track inside its asset.
    pub index: u32,
    /// Media kind.
    pub media_type: MediaType,
    /// Natural frame size (video tracks only; zero for audio).
    pub natural_size: Canvas,
    /// Whether the decoder can produce frames for this track.
    pub decodable: bool,
}

impl TrackDescriptor {
    /// A decodable video track descriptor.
    pub fn video(index: u32, natural_size: Canvas) -> Self {
        Self {
            index,
            media_type: MediaType::Video,
            natural_size,
            decodable: true,
        }
    }

    /// Return `true` when the track can back a composition video track.
    pub fn is_playable_video(&self) -> bool {
        self.media_type == MediaType::Video && self.decodable && !self.natural_size.is_empty()
    }
}

/// Produces raw frames of one asset track.
///
/// `time` is track-local: zero is the first frame of the asset.
pub trait FrameDecoder: Send + Sync {
    /// Decode the frame presented at `time`, or `None` when the decoder cannot produce one.
    fn frame_at(&self, time: MediaTime) -> Option<FrameRGBA>;
}

/// External asset collaborator.
///
/// Loading metadata may suspend on IO; it never runs on the render thread.
pub trait AssetSource {
    /// List the asset's tracks of the given media kind.
    fn load_tracks(
        &self,
        media_type: MediaType,
    ) -> impl Future<Output = LivecompResult<Vec<TrackDescriptor>>> + Send;

    /// Load the asset's total duration.
    fn load_duration(&self) -> impl Future<Output = LivecompResult<MediaTime>> + Send;

    /// Decoder yielding raw frames of `track`.
    fn decoder(&self, track: &TrackDescriptor) -> Arc<dyn FrameDecoder>;
}

/// Supplies raw source frames to the compositor.
pub trait SourceFrameProvider {
    /// Raw frame of `track` at timeline time `time`, or `None` when unavailable.
    fn frame(&self, track: TrackId, time: MediaTime) -> Option<FrameRGBA>;
}
