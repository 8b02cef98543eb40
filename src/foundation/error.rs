use crate::foundation::core::{MediaTime, TrackId};

/// Convenience result type used across livecomp.
pub type LivecompResult<T> = Result<T, LivecompError>;

/// Top-level error taxonomy used by the timeline, compositor and render queue.
#[derive(thiserror::Error, Debug)]
pub enum LivecompError {
    /// Invalid user-provided data or a broken timeline invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// The asset has no usable video track.
    #[error("no playable video track in asset")]
    NoPlayableTrack,

    /// No instruction covers the requested time.
    #[error("no active instruction at {time}")]
    NoActiveInstruction {
        /// Requested output time.
        time: MediaTime,
    },

    /// A required source track could not produce a frame.
    #[error("missing source frame for track {track} at {time}")]
    MissingSourceFrame {
        /// Track the frame was requested from.
        track: TrackId,
        /// Requested output time.
        time: MediaTime,
    },

    /// An effect asset (font, color) could not be resolved.
    #[error("render resource error: {0}")]
    RenderResource(String),

    /// The render context could not provide an output buffer.
    #[error("buffer allocation failed: {0}")]
    BufferAllocation(String),

    /// The render worker is no longer running.
    #[error("render queue closed")]
    QueueClosed,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LivecompError {
    /// Build a [`LivecompError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LivecompError::RenderResource`] value.
    pub fn render_resource(msg: impl Into<String>) -> Self {
        Self::RenderResource(msg.into())
    }

    /// Build a [`LivecompError::BufferAllocation`] value.
    pub fn buffer_allocation(msg: impl Into<String>) -> Self {
        Self::BufferAllocation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
