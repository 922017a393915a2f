use thiserror::Error;

mod model;
pub use model::*;
mod geometry;
pub use geometry::*;
mod snap;
pub use snap::*;
mod neighbors;
pub use neighbors::*;
mod session;
pub use session::*;
mod split;
pub use split::*;
mod commands;
pub use commands::*;
mod config;
pub use config::*;
pub mod markers;
pub use markers::{Marker, MarkerCollection, MarkerId, MarkerKind};

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid operation: {0}")]
    InvalidOp(String),
    #[error("clip already exists: {0}")]
    ClipExists(ClipId),
    #[error("clip not found: {0}")]
    ClipNotFound(ClipId),
    #[error("track already exists: {0}")]
    TrackExists(TrackId),
    #[error("track not found: {0}")]
    TrackNotFound(TrackId),
    #[error("split point {at_ms}ms is not strictly inside clip {clip}")]
    SplitOutsideClip { clip: ClipId, at_ms: Ms },
    #[error("history empty: {0}")]
    HistoryEmpty(&'static str),
    #[error("invalid config: {0}")]
    Config(String),
}

/// Timeline time in milliseconds.
pub type Ms = f64;

/// Shortest clip a trim may produce unless configured otherwise.
pub const DEFAULT_MIN_DURATION_MS: Ms = 50.0;
