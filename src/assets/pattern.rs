use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use crate::assets::source::{AssetSource, FrameDecoder, MediaType, TrackDescriptor};
use crate::foundation::core::{Canvas, MediaTime};
use crate::foundation::error::LivecompResult;
use crate::render::frame::FrameRGBA;

/// Deterministic synthetic asset: an RGB gradient with a white bar sweeping left to right.
///
/// Stands in for a decoded movie in demos and tests.
#[derive(Clone, Debug)]
pub struct PatternAsset {
    size: Canvas,
    duration: MediaTime,
    tint: u8,
    has_video: bool,
    dropped: BTreeSet<MediaTime>,
}

impl PatternAsset {
    /// Video asset of `size` lasting `duration`.
    pub fn new(size: Canvas, duration: MediaTime) -> Self {
        Self {
            size,
            duration,
            tint: 96,
            has_video: true,
            dropped: BTreeSet::new(),
        }
    }

    /// Asset carrying only an audio track.
    pub fn audio_only(duration: MediaTime) -> Self {
        Self {
            has_video: false,
            ..Self::new(Canvas::new(0, 0), duration)
        }
    }

    /// Set the constant blue channel, to tell assets apart.
    pub fn with_tint(mut self, tint: u8) -> Self {
        self.tint = tint;
        self
    }

    /// Make the decoder fail to produce the frame at track-local time `t`.
    pub fn with_dropped_frame(mut self, t: MediaTime) -> Self {
        self.dropped.insert(t);
        self
    }

    /// Frame size.
    pub fn size(&self) -> Canvas {
        self.size
    }

    /// Asset duration.
    pub fn duration(&self) -> MediaTime {
        self.duration
    }

    fn pattern_decoder(&self) -> PatternDecoder {
        PatternDecoder {
            size: self.size,
            duration: self.duration,
            tint: self.tint,
            dropped: self.dropped.clone(),
        }
    }

    /// The frame this asset decodes at track-local time `t`.
    pub fn frame_at(&self, t: MediaTime) -> Option<FrameRGBA> {
        self.pattern_decoder().frame_at(t)
    }
}

impl AssetSource for PatternAsset {
    fn load_tracks(
        &self,
        media_type: MediaType,
    ) -> impl Future<Output = LivecompResult<Vec<TrackDescriptor>>> + Send {
        let tracks = match media_type {
            MediaType::Video if self.has_video => vec![TrackDescriptor::video(0, self.size)],
            MediaType::Video => Vec::new(),
            MediaType::Audio => vec![TrackDescriptor {
                index: u32::from(self.has_video),
                media_type: MediaType::Audio,
                natural_size: Canvas::new(0, 0),
                decodable: true,
            }],
        };
        async move { Ok(tracks) }
    }

    fn load_duration(&self) -> impl Future<Output = LivecompResult<MediaTime>> + Send {
        let duration = self.duration;
        async move { Ok(duration) }
    }

    fn decoder(&self, _track: &TrackDescriptor) -> Arc<dyn FrameDecoder> {
        Arc::new(self.pattern_decoder())
    }
}

struct PatternDecoder {
    size: Canvas,
    duration: MediaTime,
    tint: u8,
    dropped: BTreeSet<MediaTime>,
}

impl FrameDecoder for PatternDecoder {
    fn frame_at(&self, t: MediaTime) -> Option<FrameRGBA> {
        if t >= self.duration || self.size.is_empty() || self.dropped.contains(&t) {
            return None;
        }
        let Canvas { width, height } = self.size;
        let progress = (t.as_micros() as f64) / (self.duration.as_micros() as f64);
        let bar_x = ((progress * f64::from(width)).floor() as u32).min(width - 1);

        let ramp = |v: u32, len: u32| -> u8 {
            if len <= 1 {
                0
            } else {
                ((v * 255) / (len - 1)) as u8
            }
        };

        let mut data = Vec::with_capacity(self.size.rgba8_len());
        for y in 0..height {
            for x in 0..width {
                if x == bar_x {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[ramp(x, width), ramp(y, height), self.tint, 255]);
                }
            }
        }
        FrameRGBA::from_premul(width, height, data).ok()
    }
}
