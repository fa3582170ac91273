//! The container segment writer seam.
//!
//! The muxer decides *what* goes into the container and in which order;
//! byte-exact EBML framing (segment and track headers, cluster and block
//! elements, cues, final size back-patching) belongs to a [`SegmentWriter`].
//! A libwebm binding, a pure-Rust EBML writer or a test double can all sit
//! behind it.
//!
//! ## Timestamps
//!
//! Block timestamps are passed in nanoseconds. WebM segments use a
//! `TimecodeScale` of 1 000 000 (millisecond ticks); the writer does the
//! conversion.

use std::fmt;
use std::num::NonZeroU64;

use crate::color::Colour;
use crate::delegate::SharedDelegate;

/// `BlockAddID` used for the alpha plane in `BlockAdditional`.
///
/// Follows the WebM alpha-channel convention: the opaque frame goes in the
/// `Block`, the alpha frame in `BlockAdditional` with ID 1.
pub const ALPHA_BLOCK_ADD_ID: u64 = 1;

/// Track number assigned by the segment writer.
///
/// Matroska track numbers start at 1, so a handle is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackHandle(NonZeroU64);

impl TrackHandle {
    /// Wrap a raw track number. Returns `None` for 0, which writers use to
    /// signal failure.
    pub fn new(number: u64) -> Option<Self> {
        NonZeroU64::new(number).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte-level WebM segment writer driven by [`Muxer`](crate::Muxer).
///
/// Every byte range the writer produces must go through the delegate handed
/// to [`open_segment`](Self::open_segment), so that
/// [`Delegate::last_write_time`](crate::Delegate::last_write_time) reflects
/// real output.
///
/// Writers may require track headers to exist before any block referencing
/// them; the muxer guarantees that ordering.
pub trait SegmentWriter {
    /// Start a segment that emits its bytes into `delegate`.
    fn open_segment(&mut self, delegate: SharedDelegate) -> bool;

    /// `WritingApp` in the segment info.
    fn set_writing_app(&mut self, name: &str);

    /// `MuxingApp` in the segment info.
    fn set_muxing_app(&mut self, name: &str);

    /// Add a video track. `None` means the writer could not create it.
    fn add_video_track(&mut self, width: u32, height: u32) -> Option<TrackHandle>;

    /// Add an audio track. `None` means the writer could not create it.
    fn add_audio_track(&mut self, sample_rate: u32, channels: u8) -> Option<TrackHandle>;

    fn set_codec_id(&mut self, track: TrackHandle, codec_id: &str);

    /// Attach `CodecPrivate` bytes. Returns `false` if the writer refused them.
    fn set_codec_private(&mut self, track: TrackHandle, data: &[u8]) -> bool;

    fn set_colour(&mut self, track: TrackHandle, colour: Colour);

    /// Mark the video track as carrying alpha in `BlockAdditional`
    /// ([`ALPHA_BLOCK_ADD_ID`]).
    fn set_alpha_mode(&mut self, track: TrackHandle);

    fn set_bit_depth(&mut self, track: TrackHandle, bit_depth: u64);

    /// Write one `SimpleBlock`.
    fn write_block(
        &mut self,
        track: TrackHandle,
        payload: &[u8],
        timestamp_ns: u64,
        is_keyframe: bool,
    ) -> bool;

    /// Write a `BlockGroup` carrying `additional` in `BlockAdditional`.
    fn write_block_with_additional(
        &mut self,
        track: TrackHandle,
        payload: &[u8],
        additional: &[u8],
        add_id: u64,
        timestamp_ns: u64,
        is_keyframe: bool,
    ) -> bool;

    /// Close the current cluster before the next block is written.
    fn force_new_cluster_on_next_write(&mut self);

    /// Finish the segment (close the open cluster, write cues, patch sizes
    /// when the delegate is seekable). Returns `false` on failure.
    fn finalize(&mut self) -> bool;
}

impl<W: SegmentWriter + ?Sized> SegmentWriter for &mut W {
    fn open_segment(&mut self, delegate: SharedDelegate) -> bool {
        (**self).open_segment(delegate)
    }

    fn set_writing_app(&mut self, name: &str) {
        (**self).set_writing_app(name)
    }

    fn set_muxing_app(&mut self, name: &str) {
        (**self).set_muxing_app(name)
    }

    fn add_video_track(&mut self, width: u32, height: u32) -> Option<TrackHandle> {
        (**self).add_video_track(width, height)
    }

    fn add_audio_track(&mut self, sample_rate: u32, channels: u8) -> Option<TrackHandle> {
        (**self).add_audio_track(sample_rate, channels)
    }

    fn set_codec_id(&mut self, track: TrackHandle, codec_id: &str) {
        (**self).set_codec_id(track, codec_id)
    }

    fn set_codec_private(&mut self, track: TrackHandle, data: &[u8]) -> bool {
        (**self).set_codec_private(track, data)
    }

    fn set_colour(&mut self, track: TrackHandle, colour: Colour) {
        (**self).set_colour(track, colour)
    }

    fn set_alpha_mode(&mut self, track: TrackHandle) {
        (**self).set_alpha_mode(track)
    }

    fn set_bit_depth(&mut self, track: TrackHandle, bit_depth: u64) {
        (**self).set_bit_depth(track, bit_depth)
    }

    fn write_block(
        &mut self,
        track: TrackHandle,
        payload: &[u8],
        timestamp_ns: u64,
        is_keyframe: bool,
    ) -> bool {
        (**self).write_block(track, payload, timestamp_ns, is_keyframe)
    }

    fn write_block_with_additional(
        &mut self,
        track: TrackHandle,
        payload: &[u8],
        additional: &[u8],
        add_id: u64,
        timestamp_ns: u64,
        is_keyframe: bool,
    ) -> bool {
        (**self).write_block_with_additional(
            track,
            payload,
            additional,
            add_id,
            timestamp_ns,
            is_keyframe,
        )
    }

    fn force_new_cluster_on_next_write(&mut self) {
        (**self).force_new_cluster_on_next_write()
    }

    fn finalize(&mut self) -> bool {
        (**self).finalize()
    }
}
