use std::sync::{Arc, OnceLock};

use smallvec::{SmallVec, smallvec};

use crate::assets::font::FontSource;
use crate::foundation::core::{Canvas, MediaTime, TimeRange, TrackId};
use crate::foundation::error::{LivecompError, LivecompResult};
use crate::render::frame::FrameRGBA;

/// Track ids an instruction needs frames from.
pub type RequiredTracks = SmallVec<[TrackId; 2]>;

/// Parameters of a text overlay effect.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextOverlayParams {
    /// Text to draw.
    pub text: String,
    /// Font size in canvas pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// `#RRGGBB`, `#RRGGBBAA` or a CSS basic color name.
    #[serde(default = "default_color")]
    pub color: String,
    /// Font used to shape the text.
    #[serde(default)]
    pub font: FontSource,
}

fn default_font_size() -> f32 {
    48.0
}

fn default_color() -> String {
    "white".to_owned()
}

impl TextOverlayParams {
    /// Overlay with the default font.
    pub fn new(text: impl Into<String>, font_size: f32, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size,
            color: color.into(),
            font: FontSource::default(),
        }
    }

    /// Replace the font source.
    pub fn with_font(mut self, font: FontSource) -> Self {
        self.font = font;
        self
    }

    pub(crate) fn validate(&self) -> LivecompResult<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(LivecompError::validation(
                "overlay font_size must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Rendered text bitmap together with the canvas it was built for.
pub struct CachedBitmap {
    /// Canvas passed to the builder.
    pub canvas: Canvas,
    /// Premultiplied bitmap of `canvas` size.
    pub bitmap: FrameRGBA,
}

impl std::fmt::Debug for CachedBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedBitmap")
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

/// Text overlay payload: parameters, the source track and a write-once bitmap cache.
///
/// Clones share the cached bitmap.
#[derive(Clone, Debug)]
pub struct TextOverlay {
    params: TextOverlayParams,
    source_track: TrackId,
    cache: OnceLock<Arc<CachedBitmap>>,
}

impl TextOverlay {
    /// Overlay drawing over frames of `source_track`.
    pub fn new(params: TextOverlayParams, source_track: TrackId) -> Self {
        Self {
            params,
            source_track,
            cache: OnceLock::new(),
        }
    }

    /// Effect parameters.
    pub fn params(&self) -> &TextOverlayParams {
        &self.params
    }

    /// Track the base video is drawn from.
    pub fn source_track(&self) -> TrackId {
        self.source_track
    }

    /// Replace the parameters. A change empties the cached bitmap.
    pub fn set_params(&mut self, params: TextOverlayParams) {
        if params != self.params {
            self.params = params;
            self.cache = OnceLock::new();
        }
    }

    /// Cached bitmap, if one was built.
    pub fn cached(&self) -> Option<&Arc<CachedBitmap>> {
        self.cache.get()
    }

    /// Return the cached bitmap for `canvas`, building it with `build` when absent.
    ///
    /// Concurrent first callers may each run `build`; the first stored result wins and every
    /// caller returns the stored bitmap. A cached bitmap for a different canvas is left in place
    /// and a fresh, uncached bitmap is returned instead.
    pub fn bitmap_or_build(
        &self,
        canvas: Canvas,
        build: impl FnOnce(&TextOverlayParams, Canvas) -> LivecompResult<FrameRGBA>,
    ) -> LivecompResult<Arc<CachedBitmap>> {
        if let Some(hit) = self.cache.get() {
            if hit.canvas == canvas {
                return Ok(hit.clone());
            }
            let bitmap = build(&self.params, canvas)?;
            return Ok(Arc::new(CachedBitmap { canvas, bitmap }));
        }

        let bitmap = build(&self.params, canvas)?;
        let built = Arc::new(CachedBitmap { canvas, bitmap });
        let stored = self.cache.get_or_init(|| built.clone());
        if stored.canvas == canvas {
            Ok(stored.clone())
        } else {
            Ok(built)
        }
    }
}

/// Effect payload of an instruction.
#[derive(Clone, Debug)]
pub enum InstructionKind {
    /// Unmodified source output. `track` is a reference only; it is not declared as required.
    Passthrough {
        /// Track the instruction was created for.
        track: TrackId,
    },
    /// Text composited over the source track.
    TextOverlay(TextOverlay),
}

/// What the compositor does during a time range.
#[derive(Clone, Debug)]
pub struct Instruction {
    range: TimeRange,
    kind: InstructionKind,
}

impl Instruction {
    /// Passthrough instruction over `range`.
    pub fn passthrough(range: TimeRange, track: TrackId) -> Self {
        Self {
            range,
            kind: InstructionKind::Passthrough { track },
        }
    }

    /// Text overlay instruction over `range` drawing over `source_track`.
    pub fn text_overlay(range: TimeRange, source_track: TrackId, params: TextOverlayParams) -> Self {
        Self {
            range,
            kind: InstructionKind::TextOverlay(TextOverlay::new(params, source_track)),
        }
    }

    /// Time range the instruction covers.
    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    /// Tracks whose frames must be available for this instruction. Empty for global instructions.
    pub fn required_source_tracks(&self) -> RequiredTracks {
        match &self.kind {
            InstructionKind::Passthrough { .. } => SmallVec::new(),
            InstructionKind::TextOverlay(o) => smallvec![o.source_track()],
        }
    }

    /// Effect payload.
    pub fn kind(&self) -> &InstructionKind {
        &self.kind
    }

    /// Mutable effect payload.
    pub fn kind_mut(&mut self) -> &mut InstructionKind {
        &mut self.kind
    }

    /// Return `true` when `t` falls inside the instruction range.
    pub fn is_active_at(&self, t: MediaTime) -> bool {
        self.range.contains(t)
    }
}

/// Check that `list` is sorted, non-overlapping and covers `[0, duration)` without gaps.
pub fn validate_instruction_list(list: &[Arc<Instruction>], duration: MediaTime) -> LivecompResult<()> {
    if duration.0 == 0 {
        return if list.is_empty() {
            Ok(())
        } else {
            Err(LivecompError::validation(
                "instructions present without a main track",
            ))
        };
    }

    let mut cursor = MediaTime::ZERO;
    for ins in list {
        let r = ins.time_range();
        if r.is_empty() {
            return Err(LivecompError::validation("instruction range must be non-empty"));
        }
        if r.start < cursor {
            return Err(LivecompError::validation(format!(
                "instruction at {} overlaps its predecessor",
                r.start
            )));
        }
        if r.start > cursor {
            return Err(LivecompError::validation(format!(
                "no instruction covers [{cursor}, {})",
                r.start
            )));
        }
        cursor = r.end();
    }
    if cursor < duration {
        return Err(LivecompError::validation(format!(
            "no instruction covers [{cursor}, {duration})"
        )));
    }
    Ok(())
}

/// Find the instruction active at `t` in a sorted, non-overlapping list.
pub fn find_active(list: &[Arc<Instruction>], t: MediaTime) -> Option<&Arc<Instruction>> {
    let idx = list.partition_point(|ins| ins.time_range().end() <= t);
    list.get(idx).filter(|ins| ins.is_active_at(t))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/instruction.rs"]
mod tests;
