//! Track registry.
//!
//! A WebM recording carries at most one video and one audio track. The
//! registry holds what was registered with the segment writer and answers
//! the readiness question for the frame buffer: are all tracks the muxer was
//! configured to expect present?
//!
//! Registration is one-shot. Registering a kind twice is a caller bug and
//! panics.

use std::fmt;

use crate::codec::{AudioCodec, VideoCodec};
use crate::color::Colour;
use crate::frame::Size;
use crate::segment::TrackHandle;

/// Frame rates at or below zero, or above this, are treated as unknown.
pub const MAX_FRAME_RATE: f64 = 180.0;

/// Frame rate assumed when the encoder reports none or a bogus one.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Kind of a track, and of the frames that belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Replace a missing or implausible frame rate with [`DEFAULT_FRAME_RATE`].
pub fn normalize_frame_rate(frame_rate: f64) -> f64 {
    if frame_rate <= 0.0 || frame_rate > MAX_FRAME_RATE || frame_rate.is_nan() {
        DEFAULT_FRAME_RATE
    } else {
        frame_rate
    }
}

/// A registered video track.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTrack {
    pub handle: TrackHandle,
    pub codec: VideoCodec,
    pub size: Size,
    pub frame_rate: f64,
    pub colour: Option<Colour>,
    /// Alpha frames may be written as `BlockAdditional`.
    pub alpha: bool,
}

/// A registered audio track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub handle: TrackHandle,
    pub codec: AudioCodec,
    pub sample_rate: u32,
    pub channels: u8,
    pub bit_depth: u64,
    pub codec_private: Option<Vec<u8>>,
}

/// At-most-one video and at-most-one audio track, plus the kinds expected.
#[derive(Debug)]
pub struct TrackRegistry {
    expect_video: bool,
    expect_audio: bool,
    video: Option<VideoTrack>,
    audio: Option<AudioTrack>,
}

impl TrackRegistry {
    /// # Panics
    ///
    /// If neither kind is expected.
    pub fn new(expect_video: bool, expect_audio: bool) -> Self {
        assert!(
            expect_video || expect_audio,
            "a muxer must expect at least one of video or audio"
        );
        Self {
            expect_video,
            expect_audio,
            video: None,
            audio: None,
        }
    }

    pub fn expects(&self, kind: TrackKind) -> bool {
        match kind {
            TrackKind::Video => self.expect_video,
            TrackKind::Audio => self.expect_audio,
        }
    }

    pub fn is_registered(&self, kind: TrackKind) -> bool {
        self.handle(kind).is_some()
    }

    /// Whether every expected track kind has a handle.
    pub fn is_ready(&self) -> bool {
        [TrackKind::Video, TrackKind::Audio]
            .into_iter()
            .all(|kind| !self.expects(kind) || self.is_registered(kind))
    }

    /// Whether the registry is ready once `kind` is registered, if it is not
    /// already.
    pub fn is_ready_with(&self, kind: TrackKind) -> bool {
        [TrackKind::Video, TrackKind::Audio]
            .into_iter()
            .all(|k| k == kind || !self.expects(k) || self.is_registered(k))
    }

    pub fn handle(&self, kind: TrackKind) -> Option<TrackHandle> {
        match kind {
            TrackKind::Video => self.video.as_ref().map(|t| t.handle),
            TrackKind::Audio => self.audio.as_ref().map(|t| t.handle),
        }
    }

    pub fn video(&self) -> Option<&VideoTrack> {
        self.video.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref()
    }

    /// # Panics
    ///
    /// If a video track is already registered.
    pub fn register_video(&mut self, track: VideoTrack) {
        assert!(
            self.video.is_none(),
            "video track can only be registered once"
        );
        tracing::debug!(
            handle = %track.handle,
            codec = %track.codec,
            width = track.size.width,
            height = track.size.height,
            frame_rate = track.frame_rate,
            alpha = track.alpha,
            "video track registered"
        );
        self.video = Some(track);
    }

    /// # Panics
    ///
    /// If an audio track is already registered.
    pub fn register_audio(&mut self, track: AudioTrack) {
        assert!(
            self.audio.is_none(),
            "audio track can only be registered once"
        );
        tracing::debug!(
            handle = %track.handle,
            codec = %track.codec,
            sample_rate = track.sample_rate,
            channels = track.channels,
            "audio track registered"
        );
        self.audio = Some(track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_track(number: u64) -> VideoTrack {
        VideoTrack {
            handle: TrackHandle::new(number).unwrap(),
            codec: VideoCodec::Vp8,
            size: Size::new(640, 480),
            frame_rate: 30.0,
            colour: None,
            alpha: true,
        }
    }

    fn audio_track(number: u64) -> AudioTrack {
        AudioTrack {
            handle: TrackHandle::new(number).unwrap(),
            codec: AudioCodec::Opus,
            sample_rate: 48000,
            channels: 2,
            bit_depth: 32,
            codec_private: None,
        }
    }

    #[test]
    fn frame_rate_defaults() {
        assert_eq!(normalize_frame_rate(0.0), DEFAULT_FRAME_RATE);
        assert_eq!(normalize_frame_rate(-5.0), DEFAULT_FRAME_RATE);
        assert_eq!(normalize_frame_rate(180.5), DEFAULT_FRAME_RATE);
        assert_eq!(normalize_frame_rate(f64::NAN), DEFAULT_FRAME_RATE);
        assert_eq!(normalize_frame_rate(180.0), 180.0);
        assert_eq!(normalize_frame_rate(24.0), 24.0);
    }

    #[test]
    fn ready_once_all_expected_kinds_registered() {
        let mut reg = TrackRegistry::new(true, true);
        assert!(!reg.is_ready());
        reg.register_audio(audio_track(1));
        assert!(!reg.is_ready());
        reg.register_video(video_track(2));
        assert!(reg.is_ready());
        assert_eq!(reg.handle(TrackKind::Video).unwrap().get(), 2);
    }

    #[test]
    fn ready_with_counts_the_missing_kind() {
        let mut reg = TrackRegistry::new(true, true);
        assert!(!reg.is_ready_with(TrackKind::Video));
        reg.register_audio(audio_track(1));
        assert!(reg.is_ready_with(TrackKind::Video));
        assert!(!reg.is_ready_with(TrackKind::Audio));

        let video_only = TrackRegistry::new(true, false);
        assert!(video_only.is_ready_with(TrackKind::Video));
        assert!(!video_only.is_ready_with(TrackKind::Audio));
    }

    #[test]
    fn audio_only_ready_without_video() {
        let mut reg = TrackRegistry::new(false, true);
        assert!(!reg.expects(TrackKind::Video));
        reg.register_audio(audio_track(1));
        assert!(reg.is_ready());
        assert!(!reg.is_registered(TrackKind::Video));
    }

    #[test]
    #[should_panic(expected = "at least one")]
    fn must_expect_something() {
        TrackRegistry::new(false, false);
    }

    #[test]
    #[should_panic(expected = "video track can only be registered once")]
    fn double_video_registration_panics() {
        let mut reg = TrackRegistry::new(true, false);
        reg.register_video(video_track(1));
        reg.register_video(video_track(2));
    }

    #[test]
    #[should_panic(expected = "audio track can only be registered once")]
    fn double_audio_registration_panics() {
        let mut reg = TrackRegistry::new(false, true);
        reg.register_audio(audio_track(1));
        reg.register_audio(audio_track(2));
    }
}
