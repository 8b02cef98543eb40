//! Real-time compositing of a main video track with an optional text overlay.
//!
//! A [`Timeline`] owns the track table and instruction list and publishes immutable
//! [`CompositionSnapshot`]s; a [`Compositor`] turns a snapshot and a time into an output frame.
//! [`LiveSession`] ties both to a dedicated render thread.
#![forbid(unsafe_code)]

pub mod assets;
pub mod encode;
pub mod foundation;
pub mod render;
pub mod session;
pub mod timeline;

pub use assets::font::FontSource;
pub use assets::pattern::PatternAsset;
pub use assets::source::{
    AssetSource, FrameDecoder, MediaType, SourceFrameProvider, TrackDescriptor,
};
pub use encode::png::{PngSequenceSink, write_png};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{
    Canvas, Fps, FrameIndex, FrameRange, MediaTime, Rect, Rgba8Premul, TimeRange, TrackId, Vec2,
};
pub use foundation::error::{LivecompError, LivecompResult};
pub use render::compositor::Compositor;
pub use render::context::{BufferPoolOpts, BufferPoolStats, PooledRenderContext, RenderContext};
pub use render::frame::FrameRGBA;
pub use render::queue::{FrameTicket, RenderQueue, RenderQueueStats};
pub use render::text::{TextOverlayRenderer, overlay_box};
pub use session::live_session::LiveSession;
pub use session::opts::{ExportOpts, ExportStats, SessionOpts};
pub use timeline::config::{CompositionConfig, CompositionSnapshot, SnapshotCell};
pub use timeline::instruction::{Instruction, InstructionKind, TextOverlay, TextOverlayParams};
pub use timeline::manager::{InstructionState, Timeline};
pub use timeline::track::{MAIN_TRACK_ID, Track, TrackTable};
