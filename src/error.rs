//! Error types for the WebM muxer.

use std::time::Duration;

use crate::track::TrackKind;

/// Errors surfaced by [`Muxer`](crate::Muxer) to its caller.
///
/// Contract violations (registering a track twice, more than two audio
/// channels, switching video codec mid-stream) are not represented here:
/// they panic, because continuing would corrupt the container.
///
/// None of these errors poison the muxer. A later call may succeed; the
/// caller decides whether to abandon the recording.
#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    /// The segment writer refused to start a segment on the delegate.
    #[error("segment writer failed to open a segment")]
    SegmentOpen,

    /// The segment writer returned no handle for a new track.
    #[error("segment writer rejected the {0} track")]
    TrackRejected(TrackKind),

    /// The first video frame handed to the muxer was not a keyframe.
    #[error("first video frame must be a keyframe")]
    MissingKeyframe,

    /// The segment writer failed to write a block.
    #[error("failed to write {kind} block at {timestamp:?}")]
    WriteFailed { kind: TrackKind, timestamp: Duration },

    /// The segment writer could not finalize the container.
    #[error("segment writer failed to finalize the segment")]
    FinalizeFailed,

    /// A frame or flush arrived after [`Muxer::flush`](crate::Muxer::flush).
    #[error("muxer already finalized")]
    Finalized,

    /// The readiness buffer reached its configured capacity.
    #[error("pending frame buffer full ({capacity} frames)")]
    BufferOverflow { capacity: usize },
}

/// Convenience alias for `Result<T, MuxError>`.
pub type Result<T> = std::result::Result<T, MuxError>;
