//! Codec identifiers and codec-private data synthesis.
//!
//! WebM stores one opaque `CodecPrivate` blob per track. A decoder needs it
//! before it can interpret any block of that track, so the muxer builds it
//! from the encoder's parameters when the track is registered.
//!
//! | Codec | Matroska ID | CodecPrivate |
//! |-------|-------------|--------------|
//! | VP8   | `V_VP8` | none |
//! | VP9   | `V_VP9` | none |
//! | AV1   | `V_AV1` | [`AV1_CODEC_PRIVATE`] (av1C record, 4 bytes) |
//! | H.264 | `V_MPEG4/ISO/AVC` | none |
//! | Opus  | `A_OPUS` | [`opus_header`] (19 bytes) |
//! | PCM   | `A_PCM/FLOAT/IEEE` | none |

use std::fmt;

/// Video codecs the muxer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    Vp8,
    Vp9,
    Av1,
    H264,
}

impl VideoCodec {
    /// Matroska `CodecID` string.
    pub fn codec_id(self) -> &'static str {
        match self {
            Self::Vp8 => "V_VP8",
            Self::Vp9 => "V_VP9",
            Self::Av1 => "V_AV1",
            Self::H264 => "V_MPEG4/ISO/AVC",
        }
    }

    /// Whether the track may carry an alpha plane in `BlockAdditional`.
    ///
    /// H.264 has no alpha side channel in WebM.
    pub fn supports_alpha(self) -> bool {
        match self {
            Self::Vp8 | Self::Vp9 | Self::Av1 => true,
            Self::H264 => false,
        }
    }

    /// CodecPrivate bytes the track header must carry, if any.
    pub fn codec_private(self) -> Option<&'static [u8]> {
        match self {
            Self::Av1 => Some(&AV1_CODEC_PRIVATE as &'static [u8]),
            Self::Vp8 | Self::Vp9 | Self::H264 => None,
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vp8 => "VP8",
            Self::Vp9 => "VP9",
            Self::Av1 => "AV1",
            Self::H264 => "H.264",
        };
        f.write_str(name)
    }
}

/// Audio codecs the muxer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCodec {
    Opus,
    /// Interleaved 32-bit float PCM.
    Pcm,
}

impl AudioCodec {
    /// Matroska `CodecID` string.
    pub fn codec_id(self) -> &'static str {
        match self {
            Self::Opus => "A_OPUS",
            Self::Pcm => "A_PCM/FLOAT/IEEE",
        }
    }

    /// Sample bit depth written to the track header.
    ///
    /// Audio reaching the muxer is always produced from `f32` samples.
    pub fn bit_depth(self) -> u64 {
        match self {
            Self::Opus | Self::Pcm => 32,
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opus => f.write_str("Opus"),
            Self::Pcm => f.write_str("PCM"),
        }
    }
}

// --- Opus identification header (RFC 7845 §5.1) ---

/// Total size of the Opus identification header.
pub const OPUS_HEADER_SIZE: usize = 19;

/// Magic signature at the start of the Opus identification header.
pub const OPUS_MAGIC: &[u8; 8] = b"OpusHead";

const OPUS_VERSION_OFFSET: usize = 8;
const OPUS_CHANNELS_OFFSET: usize = 9;
const OPUS_PRE_SKIP_OFFSET: usize = 10;
const OPUS_SAMPLE_RATE_OFFSET: usize = 12;
const OPUS_GAIN_OFFSET: usize = 16;
const OPUS_CHANNEL_MAPPING_OFFSET: usize = 18;

/// Build the 19-byte Opus identification header stored as `CodecPrivate`.
///
/// ```text
///  0               8   9   10      12              16      18
/// +---------------+---+---+-------+---------------+-------+---+
/// |   "OpusHead"  |ver|ch |pre-skp| input rate    | gain  |map|
/// +---------------+---+---+-------+---------------+-------+---+
/// ```
///
/// Multi-byte fields are little-endian. Pre-skip, output gain and channel
/// mapping family are always zero.
///
/// # Panics
///
/// If `channels` is greater than 2. Mapping family 0 only covers mono and
/// stereo.
pub fn opus_header(sample_rate: u32, channels: u8) -> [u8; OPUS_HEADER_SIZE] {
    assert!(
        channels <= 2,
        "Opus mapping family 0 supports at most 2 channels, got {channels}"
    );

    let mut header = [0u8; OPUS_HEADER_SIZE];
    header[..OPUS_VERSION_OFFSET].copy_from_slice(OPUS_MAGIC);
    header[OPUS_VERSION_OFFSET] = 1;
    header[OPUS_CHANNELS_OFFSET] = channels;
    header[OPUS_PRE_SKIP_OFFSET..OPUS_SAMPLE_RATE_OFFSET].copy_from_slice(&0u16.to_le_bytes());
    header[OPUS_SAMPLE_RATE_OFFSET..OPUS_GAIN_OFFSET].copy_from_slice(&sample_rate.to_le_bytes());
    header[OPUS_GAIN_OFFSET..OPUS_CHANNEL_MAPPING_OFFSET].copy_from_slice(&0u16.to_le_bytes());
    header[OPUS_CHANNEL_MAPPING_OFFSET] = 0;
    header
}

// --- AV1 CodecPrivate (av1C, matroska codec/av1.md) ---

mod av1 {
    pub const MARKER_AND_VERSION: u8 = 255;
    pub const SEQ_PROFILE: u8 = 0; // Main
    pub const SEQ_LEVEL_IDX_0: u8 = 9; // 4.1, ~1920x1080@60
    pub const SEQ_TIER_0: u8 = 0;
    pub const HIGH_BITDEPTH: u8 = 0;
    pub const TWELVE_BIT: u8 = 0;
    pub const MONOCHROME: u8 = 0;
    pub const CHROMA_SUBSAMPLING_X: u8 = 1;
    pub const CHROMA_SUBSAMPLING_Y: u8 = 1;
    pub const CHROMA_SAMPLE_POSITION: u8 = 0;
    pub const INITIAL_PRESENTATION_DELAY_PRESENT: u8 = 0;
    pub const INITIAL_PRESENTATION_DELAY_MINUS_ONE: u8 = 0;
}

/// AV1 `CodecPrivate`: main profile, level 4.1, 8-bit 4:2:0.
///
/// ```text
/// byte 0: marker(1) version(7)                       = 255
/// byte 1: seq_profile(3) seq_level_idx_0(5)
/// byte 2: tier(1) high_bitdepth(1) twelve_bit(1) monochrome(1)
///         subsampling_x(1) subsampling_y(1) chroma_sample_position(2)
/// byte 3: reserved(3) delay_present(1) delay_minus_one(4)
/// ```
pub const AV1_CODEC_PRIVATE: [u8; 4] = [
    av1::MARKER_AND_VERSION,
    (av1::SEQ_PROFILE << 5) | av1::SEQ_LEVEL_IDX_0,
    (av1::SEQ_TIER_0 << 7)
        | (av1::HIGH_BITDEPTH << 6)
        | (av1::TWELVE_BIT << 5)
        | (av1::MONOCHROME << 4)
        | (av1::CHROMA_SUBSAMPLING_X << 3)
        | (av1::CHROMA_SUBSAMPLING_Y << 2)
        | av1::CHROMA_SAMPLE_POSITION,
    (av1::INITIAL_PRESENTATION_DELAY_PRESENT << 4) | av1::INITIAL_PRESENTATION_DELAY_MINUS_ONE,
];

#[cfg(test)]
mod tests {
    use super::*;

    // --- Opus ---

    #[test]
    fn opus_header_stereo_48k() {
        let h = opus_header(48000, 2);
        assert_eq!(h.len(), 19);
        assert_eq!(&h[..8], b"OpusHead");
        assert_eq!(h[8], 1);
        assert_eq!(h[9], 2);
    }

    #[test]
    fn opus_header_little_endian_fields() {
        let h = opus_header(48000, 1);
        assert_eq!(u16::from_le_bytes([h[10], h[11]]), 0); // pre-skip
        assert_eq!(u32::from_le_bytes([h[12], h[13], h[14], h[15]]), 48000);
        assert_eq!(u16::from_le_bytes([h[16], h[17]]), 0); // gain
        assert_eq!(h[18], 0); // mapping family
    }

    #[test]
    fn opus_header_keeps_input_rate() {
        let h = opus_header(16000, 1);
        assert_eq!(&h[12..16], &16000u32.to_le_bytes());
    }

    #[test]
    #[should_panic(expected = "at most 2 channels")]
    fn opus_header_rejects_surround() {
        opus_header(48000, 6);
    }

    // --- AV1 ---

    #[test]
    fn av1_codec_private_layout() {
        assert_eq!(AV1_CODEC_PRIVATE.len(), 4);
        assert_eq!(AV1_CODEC_PRIVATE[0], 255);
        assert_eq!(AV1_CODEC_PRIVATE[1] >> 5, 0, "main profile");
        assert_eq!(AV1_CODEC_PRIVATE[1] & 0x1f, 9, "level 4.1");
        assert_eq!(AV1_CODEC_PRIVATE[2], 0b0000_1100, "8-bit 4:2:0");
        assert_eq!(AV1_CODEC_PRIVATE[3], 0);
    }

    // --- Codec metadata ---

    #[test]
    fn only_av1_has_video_codec_private() {
        assert_eq!(VideoCodec::Av1.codec_private(), Some(&AV1_CODEC_PRIVATE[..]));
        assert!(VideoCodec::Vp8.codec_private().is_none());
        assert!(VideoCodec::Vp9.codec_private().is_none());
        assert!(VideoCodec::H264.codec_private().is_none());
    }

    #[test]
    fn h264_has_no_alpha() {
        assert!(!VideoCodec::H264.supports_alpha());
        assert!(VideoCodec::Vp8.supports_alpha());
        assert!(VideoCodec::Vp9.supports_alpha());
        assert!(VideoCodec::Av1.supports_alpha());
    }

    #[test]
    fn codec_ids() {
        assert_eq!(VideoCodec::Vp9.codec_id(), "V_VP9");
        assert_eq!(VideoCodec::H264.codec_id(), "V_MPEG4/ISO/AVC");
        assert_eq!(AudioCodec::Opus.codec_id(), "A_OPUS");
        assert_eq!(AudioCodec::Pcm.codec_id(), "A_PCM/FLOAT/IEEE");
        assert_eq!(AudioCodec::Pcm.bit_depth(), 32);
    }
}
