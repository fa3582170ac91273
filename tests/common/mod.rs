//! Recording `SegmentWriter` shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use webmux::{
    AudioCodec, AudioParameters, Colour, Delegate, EncodedFrame, LiveSink, SegmentWriter,
    SharedDelegate, Size, TrackHandle, VideoCodec, VideoParameters,
};

/// EBML magic the fake writes when a segment is opened.
pub const EBML_MAGIC: [u8; 4] = [0x1a, 0x45, 0xdf, 0xa3];

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    OpenSegment,
    WritingApp(String),
    MuxingApp(String),
    AddVideoTrack { width: u32, height: u32 },
    AddAudioTrack { sample_rate: u32, channels: u8 },
    CodecId(u64, String),
    CodecPrivate(u64, Vec<u8>),
    Colour(u64, Colour),
    AlphaMode(u64),
    BitDepth(u64, u64),
    Block {
        track: u64,
        payload: Vec<u8>,
        timestamp_ns: u64,
        keyframe: bool,
    },
    BlockWithAdditional {
        track: u64,
        payload: Vec<u8>,
        additional: Vec<u8>,
        add_id: u64,
        timestamp_ns: u64,
        keyframe: bool,
    },
    ForceNewCluster,
    Finalize,
}

/// Records every call and echoes block payloads into the delegate.
#[derive(Default)]
pub struct RecordingWriter {
    pub events: Vec<Event>,
    pub delegate: Option<SharedDelegate>,
    pub next_track: u64,
    pub fail_open: bool,
    pub reject_tracks: bool,
    pub fail_blocks: bool,
    pub fail_finalize: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads of all written blocks, in write order.
    pub fn block_payloads(&self) -> Vec<Vec<u8>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Block { payload, .. } | Event::BlockWithAdditional { payload, .. } => {
                    Some(payload.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn block_count(&self) -> usize {
        self.block_payloads().len()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }

    fn emit(&self, bytes: &[u8]) {
        if let Some(delegate) = &self.delegate {
            let _ = delegate.lock().write(bytes);
        }
    }
}

impl SegmentWriter for RecordingWriter {
    fn open_segment(&mut self, delegate: SharedDelegate) -> bool {
        if self.fail_open {
            return false;
        }
        self.events.push(Event::OpenSegment);
        self.delegate = Some(delegate);
        self.emit(&EBML_MAGIC);
        true
    }

    fn set_writing_app(&mut self, name: &str) {
        self.events.push(Event::WritingApp(name.to_string()));
    }

    fn set_muxing_app(&mut self, name: &str) {
        self.events.push(Event::MuxingApp(name.to_string()));
    }

    fn add_video_track(&mut self, width: u32, height: u32) -> Option<TrackHandle> {
        self.events.push(Event::AddVideoTrack { width, height });
        self.allocate_track()
    }

    fn add_audio_track(&mut self, sample_rate: u32, channels: u8) -> Option<TrackHandle> {
        self.events.push(Event::AddAudioTrack {
            sample_rate,
            channels,
        });
        self.allocate_track()
    }

    fn set_codec_id(&mut self, track: TrackHandle, codec_id: &str) {
        self.events.push(Event::CodecId(track.get(), codec_id.to_string()));
    }

    fn set_codec_private(&mut self, track: TrackHandle, data: &[u8]) -> bool {
        self.events.push(Event::CodecPrivate(track.get(), data.to_vec()));
        true
    }

    fn set_colour(&mut self, track: TrackHandle, colour: Colour) {
        self.events.push(Event::Colour(track.get(), colour));
    }

    fn set_alpha_mode(&mut self, track: TrackHandle) {
        self.events.push(Event::AlphaMode(track.get()));
    }

    fn set_bit_depth(&mut self, track: TrackHandle, bit_depth: u64) {
        self.events.push(Event::BitDepth(track.get(), bit_depth));
    }

    fn write_block(
        &mut self,
        track: TrackHandle,
        payload: &[u8],
        timestamp_ns: u64,
        is_keyframe: bool,
    ) -> bool {
        if self.fail_blocks {
            return false;
        }
        self.events.push(Event::Block {
            track: track.get(),
            payload: payload.to_vec(),
            timestamp_ns,
            keyframe: is_keyframe,
        });
        self.emit(payload);
        true
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
        if self.fail_blocks {
            return false;
        }
        self.events.push(Event::BlockWithAdditional {
            track: track.get(),
            payload: payload.to_vec(),
            additional: additional.to_vec(),
            add_id,
            timestamp_ns,
            keyframe: is_keyframe,
        });
        self.emit(payload);
        self.emit(additional);
        true
    }

    fn force_new_cluster_on_next_write(&mut self) {
        self.events.push(Event::ForceNewCluster);
    }

    fn finalize(&mut self) -> bool {
        self.events.push(Event::Finalize);
        !self.fail_finalize
    }
}

impl RecordingWriter {
    fn allocate_track(&mut self) -> Option<TrackHandle> {
        if self.reject_tracks {
            return None;
        }
        self.next_track += 1;
        TrackHandle::new(self.next_track)
    }
}

/// A delegate whose sink collects every byte into `bytes`.
pub fn collecting_delegate() -> (SharedDelegate, Arc<Mutex<Vec<u8>>>) {
    let bytes = Arc::new(Mutex::new(Vec::new()));
    let sink_bytes = bytes.clone();
    let delegate = Delegate::shared(LiveSink::new(move |data: &[u8]| {
        sink_bytes.lock().extend_from_slice(data)
    }));
    (delegate, bytes)
}

pub fn null_delegate() -> SharedDelegate {
    Delegate::shared(LiveSink::new(|_: &[u8]| {}))
}

pub fn vp8_params() -> VideoParameters {
    VideoParameters::new(VideoCodec::Vp8, Size::new(640, 480), 30.0)
}

pub fn opus_params() -> AudioParameters {
    AudioParameters::new(AudioCodec::Opus, 48000, 2)
}

pub fn video_frame(params: &VideoParameters, tag: u8, keyframe: bool) -> EncodedFrame {
    EncodedFrame::video(params.clone(), vec![tag; 8], keyframe)
}

pub fn audio_frame(tag: u8) -> EncodedFrame {
    EncodedFrame::audio(opus_params(), vec![tag; 4])
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
