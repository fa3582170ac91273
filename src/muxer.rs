//! The muxer: interleaves encoded audio and video frames into one WebM
//! segment.
//!
//! ## Lifecycle
//!
//! ```text
//! Muxer::new        -> TracksPending   (segment opened on the delegate)
//! last track added  -> Steady          (pending frames flushed, in order)
//! put_frame         -> Steady          (frames written straight through)
//! flush             -> Finalized       (segment writer finalizes)
//! ```
//!
//! Tracks are registered either explicitly ([`Muxer::add_video_track`],
//! [`Muxer::add_audio_track`]) or lazily from the parameters carried by the
//! first frame of each kind. Until every expected track exists, frames of
//! *both* kinds are held back, because the segment writer must emit all
//! track headers before the first block.
//!
//! Dropping a muxer does not finalize the segment.

use std::time::Duration;

use crate::buffer::{BufferedFrame, FrameBuffer};
use crate::cluster::ClusterPolicy;
use crate::codec::{AudioCodec, opus_header};
use crate::delegate::SharedDelegate;
use crate::error::{MuxError, Result};
use crate::frame::{AudioParameters, EncodedFrame, FrameParams, VideoParameters};
use crate::segment::{ALPHA_BLOCK_ADD_ID, SegmentWriter};
use crate::sequence::SequenceChecker;
use crate::track::{AudioTrack, TrackKind, TrackRegistry, VideoTrack, normalize_frame_rate};

/// Default `WritingApp` / `MuxingApp` written to the segment info.
pub const DEFAULT_APP_NAME: &str = "webm-mux";

/// Muxer configuration.
#[derive(Debug, Clone)]
pub struct MuxerConfig {
    /// Expect a video track. At least one of `has_video` / `has_audio`
    /// must be set.
    pub has_video: bool,
    /// Expect an audio track.
    pub has_audio: bool,
    /// Force a new cluster when the delegate has not written for this long.
    /// Raised to 100 ms; `None` or zero disables forcing.
    pub max_data_output_interval: Option<Duration>,
    /// Cap on frames held while tracks are pending. `None` is unbounded.
    pub max_buffered_frames: Option<usize>,
    pub writing_app: String,
    pub muxing_app: String,
}

impl Default for MuxerConfig {
    fn default() -> Self {
        Self {
            has_video: true,
            has_audio: true,
            max_data_output_interval: None,
            max_buffered_frames: None,
            writing_app: DEFAULT_APP_NAME.to_string(),
            muxing_app: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl MuxerConfig {
    pub fn video_only() -> Self {
        Self {
            has_audio: false,
            ..Self::default()
        }
    }

    pub fn audio_only() -> Self {
        Self {
            has_video: false,
            ..Self::default()
        }
    }

    /// Live output: bound how long data may sit in an open cluster.
    pub fn with_max_data_output_interval(mut self, interval: Duration) -> Self {
        self.max_data_output_interval = Some(interval);
        self
    }

    pub fn with_max_buffered_frames(mut self, frames: usize) -> Self {
        self.max_buffered_frames = Some(frames);
        self
    }
}

/// Where the muxer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxerPhase {
    /// Segment open; at least one expected track is missing.
    TracksPending,
    /// All expected tracks registered; frames flow to the writer.
    Steady,
    /// The segment has been finalized.
    Finalized,
}

/// WebM muxer over a [`SegmentWriter`].
///
/// Every method must be called from one thread (checked in debug builds
/// from the first call on). Nothing blocks except the synchronous write into
/// the delegate, so a slow sink stalls the caller.
pub struct Muxer<W> {
    segment: W,
    delegate: SharedDelegate,
    tracks: TrackRegistry,
    pending: FrameBuffer,
    cluster_policy: ClusterPolicy,
    phase: MuxerPhase,
    force_one_write_error: bool,
    sequence: SequenceChecker,
}

impl<W: SegmentWriter> Muxer<W> {
    /// Open a segment on `delegate` and set up the muxer.
    ///
    /// `segment` must write every byte through `delegate`.
    ///
    /// # Panics
    ///
    /// If the config expects neither video nor audio.
    pub fn new(config: MuxerConfig, mut segment: W, delegate: SharedDelegate) -> Result<Self> {
        let tracks = TrackRegistry::new(config.has_video, config.has_audio);

        if !segment.open_segment(delegate.clone()) {
            tracing::error!("segment writer failed to open segment");
            return Err(MuxError::SegmentOpen);
        }
        segment.set_writing_app(&config.writing_app);
        segment.set_muxing_app(&config.muxing_app);

        let cluster_policy =
            ClusterPolicy::new(config.has_video, config.max_data_output_interval);

        tracing::debug!(
            has_video = config.has_video,
            has_audio = config.has_audio,
            forced_cluster_interval = ?cluster_policy.interval(),
            max_buffered_frames = ?config.max_buffered_frames,
            "muxer created"
        );

        Ok(Self {
            segment,
            delegate,
            tracks,
            pending: FrameBuffer::new(config.max_buffered_frames),
            cluster_policy,
            phase: MuxerPhase::TracksPending,
            force_one_write_error: false,
            sequence: SequenceChecker::detached(),
        })
    }

    pub fn phase(&self) -> MuxerPhase {
        self.phase
    }

    pub fn tracks(&self) -> &TrackRegistry {
        &self.tracks
    }

    /// Frames waiting for the remaining tracks.
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    pub fn segment(&self) -> &W {
        &self.segment
    }

    pub fn segment_mut(&mut self) -> &mut W {
        &mut self.segment
    }

    pub fn delegate(&self) -> &SharedDelegate {
        &self.delegate
    }

    /// Give back the segment writer. Does not finalize.
    pub fn into_segment(self) -> W {
        self.segment
    }

    /// Register the video track.
    ///
    /// An out-of-range frame rate falls back to 30 fps. A color space
    /// without a WebM equivalent is dropped rather than partially written.
    /// Alpha is enabled for every codec except H.264; AV1 gets its
    /// `CodecPrivate`.
    ///
    /// Frames buffered while this was the last missing track are written
    /// before returning.
    ///
    /// # Panics
    ///
    /// If a video track is already registered.
    pub fn add_video_track(&mut self, params: &VideoParameters) -> Result<()> {
        self.sequence.check();
        self.register_video(params)?;
        self.flush_pending_if_ready()
    }

    /// Register the audio track. Opus gets a synthesized identification
    /// header as `CodecPrivate`; PCM has none.
    ///
    /// # Panics
    ///
    /// If an audio track is already registered, or `channels` is not 1 or 2.
    pub fn add_audio_track(&mut self, params: AudioParameters) -> Result<()> {
        self.sequence.check();
        self.register_audio(params)?;
        self.flush_pending_if_ready()
    }

    /// Hand one encoded frame to the muxer.
    ///
    /// - An empty video frame is dropped and reported as success.
    /// - The first frame of a kind registers its track from the frame's
    ///   parameters; the first video frame must be a keyframe.
    /// - Until every expected track exists, the frame is only buffered. With
    ///   a buffer cap, a frame that finds the buffer full is refused before
    ///   its track is registered.
    /// - Audio frames may force a new cluster first (see [`ClusterPolicy`]).
    ///
    /// A write failure is returned as is. The muxer does not retry, and
    /// later calls are still attempted.
    ///
    /// # Panics
    ///
    /// If the video codec differs from the registered track's codec.
    pub fn put_frame(&mut self, frame: EncodedFrame, relative_timestamp: Duration) -> Result<()> {
        self.sequence.check();
        if self.phase == MuxerPhase::Finalized {
            return Err(MuxError::Finalized);
        }

        tracing::trace!(
            kind = %frame.kind(),
            bytes = frame.data.len(),
            keyframe = frame.is_keyframe,
            ts = ?relative_timestamp,
            "put frame"
        );

        // Segment writers reject zero-sized blocks.
        if frame.kind() == TrackKind::Video && frame.data.is_empty() {
            tracing::trace!(ts = ?relative_timestamp, "dropping empty video frame");
            return Ok(());
        }

        // A frame that cannot be buffered must not register its track.
        if !self.tracks.is_ready_with(frame.kind()) {
            self.pending.ensure_room()?;
        }

        match &frame.params {
            FrameParams::Audio(params) => {
                // Checked before any lazy registration: the decision must
                // rest on real delegate idle time.
                self.maybe_force_new_cluster();
                if !self.tracks.is_registered(TrackKind::Audio) {
                    self.register_audio(*params)?;
                }
            }
            FrameParams::Video(params) => match self.tracks.video() {
                Some(track) => assert_eq!(
                    track.codec, params.codec,
                    "video codec switched mid-stream"
                ),
                None => {
                    if !frame.is_keyframe {
                        tracing::warn!(
                            ts = ?relative_timestamp,
                            "rejecting first video frame: not a keyframe"
                        );
                        return Err(MuxError::MissingKeyframe);
                    }
                    self.register_video(params)?;
                }
            },
        }

        if !self.tracks.is_ready() {
            self.pending.push(frame, relative_timestamp)?;
            tracing::trace!(
                pending = self.pending.len(),
                "frame buffered until all tracks are registered"
            );
            return Ok(());
        }

        // Earlier frames go first; the first error wins.
        let flushed = self.flush_pending_if_ready();
        let written = self.write_frame(BufferedFrame {
            frame,
            timestamp: relative_timestamp,
        });
        flushed.and(written)
    }

    /// Finalize the segment through the segment writer.
    ///
    /// On an unseekable delegate the writer may be unable to finish an open
    /// element; that failure is returned and the muxer stays unfinalized.
    /// Frames still waiting for a missing track are never written.
    pub fn flush(&mut self) -> Result<()> {
        self.sequence.check();
        if self.phase == MuxerPhase::Finalized {
            return Err(MuxError::Finalized);
        }
        if !self.pending.is_empty() {
            tracing::warn!(
                pending = self.pending.len(),
                "finalizing with frames still waiting for a track"
            );
        }

        if !self.segment.finalize() {
            tracing::error!("segment writer failed to finalize");
            return Err(MuxError::FinalizeFailed);
        }

        self.phase = MuxerPhase::Finalized;
        tracing::debug!(
            bytes = self.delegate.lock().position(),
            "segment finalized"
        );
        Ok(())
    }

    /// Make the next block write fail once. Test hook for the failure path.
    #[doc(hidden)]
    pub fn force_one_write_error(&mut self) {
        self.force_one_write_error = true;
    }

    fn register_video(&mut self, params: &VideoParameters) -> Result<()> {
        assert!(
            !self.tracks.is_registered(TrackKind::Video),
            "video track can only be registered once"
        );

        let size = params.size;
        let Some(handle) = self.segment.add_video_track(size.width, size.height) else {
            tracing::error!(width = size.width, height = size.height, "error adding video track");
            return Err(MuxError::TrackRejected(TrackKind::Video));
        };

        let colour = params.color_space.and_then(|color_space| {
            let colour = color_space.to_colour();
            if colour.is_none() {
                tracing::warn!(?color_space, "color space has no WebM Colour equivalent");
            }
            colour
        });
        if let Some(colour) = colour {
            self.segment.set_colour(handle, colour);
        }

        let codec = params.codec;
        self.segment.set_codec_id(handle, codec.codec_id());
        if let Some(private) = codec.codec_private() {
            if !self.segment.set_codec_private(handle, private) {
                tracing::error!(%codec, "failed to set CodecPrivate");
            }
        }

        let alpha = codec.supports_alpha();
        if alpha {
            self.segment.set_alpha_mode(handle);
        }

        self.tracks.register_video(VideoTrack {
            handle,
            codec,
            size,
            frame_rate: normalize_frame_rate(params.frame_rate),
            colour,
            alpha,
        });
        self.update_phase();
        Ok(())
    }

    fn register_audio(&mut self, params: AudioParameters) -> Result<()> {
        assert!(
            !self.tracks.is_registered(TrackKind::Audio),
            "audio track can only be registered once"
        );
        assert!(
            matches!(params.channels, 1 | 2),
            "only 1 or 2 audio channels supported, requested {}",
            params.channels
        );

        let Some(handle) = self
            .segment
            .add_audio_track(params.sample_rate, params.channels)
        else {
            tracing::error!(
                sample_rate = params.sample_rate,
                channels = params.channels,
                "error adding audio track"
            );
            return Err(MuxError::TrackRejected(TrackKind::Audio));
        };

        let codec = params.codec;
        self.segment.set_bit_depth(handle, codec.bit_depth());
        self.segment.set_codec_id(handle, codec.codec_id());

        let codec_private = match codec {
            AudioCodec::Opus => {
                let header = opus_header(params.sample_rate, params.channels);
                if !self.segment.set_codec_private(handle, &header) {
                    tracing::error!("failed to set Opus header");
                }
                Some(header.to_vec())
            }
            AudioCodec::Pcm => None,
        };

        self.tracks.register_audio(AudioTrack {
            handle,
            codec,
            sample_rate: params.sample_rate,
            channels: params.channels,
            bit_depth: codec.bit_depth(),
            codec_private,
        });
        self.update_phase();
        Ok(())
    }

    fn update_phase(&mut self) {
        if self.phase == MuxerPhase::TracksPending && self.tracks.is_ready() {
            self.phase = MuxerPhase::Steady;
            tracing::debug!(pending = self.pending.len(), "all expected tracks registered");
        }
    }

    fn flush_pending_if_ready(&mut self) -> Result<()> {
        if self.tracks.is_ready() && !self.pending.is_empty() {
            self.flush_pending()
        } else {
            Ok(())
        }
    }

    /// Write every pending frame in arrival order.
    ///
    /// Every frame is attempted even after a failure. The first error is
    /// returned.
    fn flush_pending(&mut self) -> Result<()> {
        if self.pending.len() > 1 {
            tracing::debug!(frames = self.pending.len(), "flushing buffered frames");
        }

        let mut result = Ok(());
        while let Some(buffered) = self.pending.pop_front() {
            let written = self.write_frame(buffered);
            if result.is_ok() {
                result = written;
            }
        }
        result
    }

    fn write_frame(&mut self, buffered: BufferedFrame) -> Result<()> {
        let BufferedFrame { frame, timestamp } = buffered;
        let kind = frame.kind();

        if self.force_one_write_error {
            self.force_one_write_error = false;
            tracing::debug!("forcing a write error");
            return Err(MuxError::WriteFailed { kind, timestamp });
        }

        let handle = self
            .tracks
            .handle(kind)
            .ok_or(MuxError::TrackRejected(kind))?;
        let timestamp_ns = u64::try_from(timestamp.as_nanos()).unwrap_or(u64::MAX);

        let written = if frame.has_alpha() {
            self.segment.write_block_with_additional(
                handle,
                &frame.data,
                &frame.alpha_data,
                ALPHA_BLOCK_ADD_ID,
                timestamp_ns,
                frame.is_keyframe,
            )
        } else {
            self.segment
                .write_block(handle, &frame.data, timestamp_ns, frame.is_keyframe)
        };

        if !written {
            tracing::error!(%kind, %handle, ts = ?timestamp, "segment writer rejected block");
            return Err(MuxError::WriteFailed { kind, timestamp });
        }
        Ok(())
    }

    fn maybe_force_new_cluster(&mut self) {
        let since_last_output = self
            .delegate
            .lock()
            .last_write_time()
            .map(|t| t.elapsed());

        if self.cluster_policy.should_force(since_last_output) {
            tracing::trace!(idle = ?since_last_output, "forcing new cluster on next frame");
            self.segment.force_new_cluster_on_next_write();
        }
    }
}
