//! Encoded frames and the per-track parameters they carry.

use crate::codec::{AudioCodec, VideoCodec};
use crate::color::ColorSpace;
use crate::track::TrackKind;

/// Pixel dimensions of a video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Parameters the video encoder attaches to every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoParameters {
    pub codec: VideoCodec,
    /// Visible size of the encoded picture.
    pub size: Size,
    /// Nominal frame rate. Out-of-range values are replaced on registration.
    pub frame_rate: f64,
    pub color_space: Option<ColorSpace>,
}

impl VideoParameters {
    pub fn new(codec: VideoCodec, size: Size, frame_rate: f64) -> Self {
        Self {
            codec,
            size,
            frame_rate,
            color_space: None,
        }
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = Some(color_space);
        self
    }
}

/// Parameters the audio encoder attaches to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioParameters {
    pub codec: AudioCodec,
    pub sample_rate: u32,
    /// 1 (mono) or 2 (stereo).
    pub channels: u8,
}

impl AudioParameters {
    pub fn new(codec: AudioCodec, sample_rate: u32, channels: u8) -> Self {
        Self {
            codec,
            sample_rate,
            channels,
        }
    }
}

/// Track-specific half of an [`EncodedFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum FrameParams {
    Video(VideoParameters),
    Audio(AudioParameters),
}

impl FrameParams {
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Video(_) => TrackKind::Video,
            Self::Audio(_) => TrackKind::Audio,
        }
    }
}

/// One encoded access unit handed to the muxer.
///
/// `alpha_data` carries the separately encoded alpha plane for codecs
/// that support it; it is written as `BlockAdditional`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub params: FrameParams,
    pub data: Vec<u8>,
    pub alpha_data: Vec<u8>,
    pub is_keyframe: bool,
}

impl EncodedFrame {
    pub fn video(params: VideoParameters, data: Vec<u8>, is_keyframe: bool) -> Self {
        Self {
            params: FrameParams::Video(params),
            data,
            alpha_data: Vec::new(),
            is_keyframe,
        }
    }

    /// Audio frames are always independently decodable.
    pub fn audio(params: AudioParameters, data: Vec<u8>) -> Self {
        Self {
            params: FrameParams::Audio(params),
            data,
            alpha_data: Vec::new(),
            is_keyframe: true,
        }
    }

    pub fn with_alpha(mut self, alpha_data: Vec<u8>) -> Self {
        self.alpha_data = alpha_data;
        self
    }

    pub fn kind(&self) -> TrackKind {
        self.params.kind()
    }

    pub fn has_alpha(&self) -> bool {
        !self.alpha_data.is_empty()
    }
}
