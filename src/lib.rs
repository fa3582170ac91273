//! Live WebM muxer.
//!
//! Interleaves frames from independently running audio and video encoders
//! into one WebM segment, written progressively to a file or a live
//! transport. Byte-level EBML framing is delegated to a [`SegmentWriter`];
//! this crate decides track setup, codec metadata, frame ordering and
//! cluster cuts.
//!
//! ```text
//! video encoder ─┐                      ┌─ SegmentWriter ─ Delegate ─ Sink
//!                ├─ Muxer::put_frame ───┤
//! audio encoder ─┘   (readiness buffer) └─ ClusterPolicy (delegate idle time)
//! ```

pub mod buffer;
pub mod cluster;
pub mod codec;
pub mod color;
pub mod delegate;
pub mod error;
pub mod frame;
pub mod muxer;
pub mod segment;
mod sequence;
pub mod track;

pub use codec::{AudioCodec, VideoCodec};
pub use color::{ColorSpace, Colour};
pub use delegate::{Delegate, FileSink, LiveSink, SharedDelegate, Sink};
pub use error::{MuxError, Result};
pub use frame::{AudioParameters, EncodedFrame, FrameParams, Size, VideoParameters};
pub use muxer::{Muxer, MuxerConfig, MuxerPhase};
pub use segment::{SegmentWriter, TrackHandle};
pub use track::TrackKind;
