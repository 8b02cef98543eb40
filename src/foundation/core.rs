use crate::foundation::error::{LivecompError, LivecompResult};

pub use kurbo::{Rect, Vec2};

const MICROS_PER_SEC: u64 = 1_000_000;

/// Stable identifier of a composition track.
///
/// A `TrackId` keeps its role for the whole session: swapping the main source reuses the same id.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TrackId(pub u32);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timeline time in microseconds since composition start.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct MediaTime(pub u64);

impl MediaTime {
    /// Time zero.
    pub const ZERO: Self = Self(0);

    /// Build from whole milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(1000))
    }

    /// Build from whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(MICROS_PER_SEC))
    }

    /// Build from fractional seconds. Negative and non-finite inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * MICROS_PER_SEC as f64).round() as u64)
    }

    /// Microsecond count.
    pub fn as_micros(self) -> u64 {
        self.0
    }

    /// Fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        (self.0 as f64) / (MICROS_PER_SEC as f64)
    }

    /// Saturating difference `self - rhs`.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Saturating sum `self + rhs`.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::fmt::Display for MediaTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}s", self.as_secs_f64())
    }
}

/// Half-open time range `[start, start + duration)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: MediaTime,
    /// Length of the range.
    pub duration: MediaTime,
}

impl TimeRange {
    /// Range starting at `start` lasting `duration`.
    pub fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    /// Range `[0, duration)`.
    pub fn from_zero(duration: MediaTime) -> Self {
        Self::new(MediaTime::ZERO, duration)
    }

    /// Exclusive end.
    pub fn end(self) -> MediaTime {
        self.start.saturating_add(self.duration)
    }

    /// Return `true` when the range covers no time.
    pub fn is_empty(self) -> bool {
        self.duration.0 == 0
    }

    /// Return `true` when `t` is inside `[start, end)`.
    pub fn contains(self, t: MediaTime) -> bool {
        self.start <= t && t < self.end()
    }

    /// Return `true` when both ranges share at least one instant.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Absolute 0-based frame index in composition timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> LivecompResult<Self> {
        if start.0 > end.0 {
            return Err(LivecompError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Iterate frame indices in increasing order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
///
/// Governs the sampling rate: one frame lasts `den/num` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> LivecompResult<Self> {
        if den == 0 {
            return Err(LivecompError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(LivecompError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame.
    pub fn frame_duration(self) -> MediaTime {
        self.frame_time(FrameIndex(1))
    }

    /// Presentation time of frame `idx`.
    pub fn frame_time(self, idx: FrameIndex) -> MediaTime {
        let micros = u128::from(idx.0) * u128::from(self.den) * u128::from(MICROS_PER_SEC)
            / u128::from(self.num.max(1));
        MediaTime(u64::try_from(micros).unwrap_or(u64::MAX))
    }

    /// Number of whole frames that start inside `[0, duration)`.
    pub fn frames_in(self, duration: MediaTime) -> u64 {
        let num = u128::from(duration.0) * u128::from(self.num);
        let den = u128::from(self.den.max(1)) * u128::from(MICROS_PER_SEC);
        let frames = num.div_ceil(den);
        u64::try_from(frames).unwrap_or(u64::MAX)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bytes of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Divide both dimensions by `scale`, rounding to the nearest pixel (at least 1).
    pub fn scaled_down(self, scale: f32) -> Self {
        if !scale.is_finite() || scale <= 0.0 {
            return self;
        }
        let f = |v: u32| ((v as f32) / scale).round().max(1.0) as u32;
        Self {
            width: f(self.width),
            height: f(self.height),
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as a `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
