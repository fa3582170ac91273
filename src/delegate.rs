//! Output delegate: the byte sink the segment writer emits into.
//!
//! [`Delegate`] wraps a [`Sink`] and records two pieces of state that the
//! rest of the crate observes:
//!
//! - **Last write time**: read by the cluster forcing policy to decide
//!   whether buffered cluster data has been held back for too long.
//! - **Position**: the byte offset of the next write, used by seekable
//!   writers to back-patch element sizes on finalize.
//!
//! Two sinks ship with the crate:
//!
//! | Sink | Seekable | Use |
//! |------|----------|-----|
//! | [`LiveSink`] | no | live transports; each byte range goes to a callback |
//! | [`FileSink`] | yes | files or any `Write + Seek` |
//!
//! The delegate is shared between the muxer and the segment writer as a
//! [`SharedDelegate`].

use std::io::{self, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// Delegate handle shared by the muxer (reader of the last write time)
/// and the segment writer (producer of bytes).
pub type SharedDelegate = Arc<Mutex<Delegate>>;

/// Destination for the container bytes.
pub trait Sink: Send {
    /// Write the whole byte range.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Whether [`seek`](Self::seek) is supported.
    fn is_seekable(&self) -> bool {
        false
    }

    /// Move the write cursor to an absolute offset.
    fn seek(&mut self, _position: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "sink is not seekable",
        ))
    }
}

/// Byte sink wrapper that tracks output time and position.
pub struct Delegate {
    sink: Box<dyn Sink>,
    position: u64,
    last_write_time: Option<Instant>,
}

impl Delegate {
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            position: 0,
            last_write_time: None,
        }
    }

    /// Wrap `sink` in a [`SharedDelegate`].
    pub fn shared(sink: impl Sink + 'static) -> SharedDelegate {
        Arc::new(Mutex::new(Self::new(sink)))
    }

    /// Forward `data` to the sink.
    ///
    /// The output time is stamped before the sink runs, so a failed write
    /// still counts as output activity. The position only advances on
    /// success.
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        tracing::trace!(len = data.len(), position = self.position, "delegate write");
        self.last_write_time = Some(Instant::now());
        self.sink.write(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    /// Instant of the most recent [`write`](Self::write), `None` before the
    /// first one.
    pub fn last_write_time(&self) -> Option<Instant> {
        self.last_write_time
    }

    /// Byte offset of the next write.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn is_seekable(&self) -> bool {
        self.sink.is_seekable()
    }

    /// Move the write cursor. Fails on unseekable sinks.
    pub fn seek(&mut self, position: u64) -> io::Result<()> {
        self.sink.seek(position)?;
        self.position = position;
        Ok(())
    }
}

impl std::fmt::Debug for Delegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delegate")
            .field("position", &self.position)
            .field("last_write_time", &self.last_write_time)
            .field("seekable", &self.sink.is_seekable())
            .finish()
    }
}

/// Unseekable sink handing every byte range to a callback.
///
/// Suits live consumption (a WebSocket, a pipe, an HTTP chunked response):
/// the callback sees bytes in the order a player must parse them.
pub struct LiveSink<F> {
    on_data: F,
}

impl<F> LiveSink<F>
where
    F: FnMut(&[u8]) + Send,
{
    pub fn new(on_data: F) -> Self {
        Self { on_data }
    }
}

impl<F> Sink for LiveSink<F>
where
    F: FnMut(&[u8]) + Send,
{
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        (self.on_data)(data);
        Ok(())
    }
}

/// Seekable sink over any `Write + Seek`, typically a [`std::fs::File`].
pub struct FileSink<W> {
    inner: W,
}

impl<W: Write + Seek + Send> FileSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek + Send> Sink for FileSink<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn seek(&mut self, position: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(position)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingSink;

    impl Sink for FailingSink {
        fn write(&mut self, _data: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn no_write_time_before_first_write() {
        let d = Delegate::new(LiveSink::new(|_: &[u8]| {}));
        assert!(d.last_write_time().is_none());
        assert_eq!(d.position(), 0);
    }

    #[test]
    fn write_stamps_time_and_advances_position() {
        let before = Instant::now();
        let mut d = Delegate::new(LiveSink::new(|_: &[u8]| {}));
        d.write(&[1, 2, 3]).unwrap();
        d.write(&[4]).unwrap();
        assert_eq!(d.position(), 4);
        assert!(d.last_write_time().unwrap() >= before);
    }

    #[test]
    fn live_sink_forwards_bytes_in_order() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let r = received.clone();
        let mut d = Delegate::new(LiveSink::new(move |data: &[u8]| {
            r.lock().extend_from_slice(data)
        }));
        d.write(b"\x1a\x45").unwrap();
        d.write(b"\xdf\xa3").unwrap();
        assert_eq!(*received.lock(), vec![0x1a, 0x45, 0xdf, 0xa3]);
    }

    #[test]
    fn live_sink_cannot_seek() {
        let mut d = Delegate::new(LiveSink::new(|_: &[u8]| {}));
        assert!(!d.is_seekable());
        let err = d.seek(0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn file_sink_seeks_and_overwrites() {
        let mut d = Delegate::new(FileSink::new(Cursor::new(Vec::new())));
        assert!(d.is_seekable());
        d.write(&[0, 0, 0, 0]).unwrap();
        d.seek(1).unwrap();
        assert_eq!(d.position(), 1);
        d.write(&[9, 9]).unwrap();
        assert_eq!(d.position(), 3);
    }

    #[test]
    fn failed_write_still_counts_as_output() {
        let mut d = Delegate::new(FailingSink);
        assert!(d.write(&[1, 2]).is_err());
        assert!(d.last_write_time().is_some());
        assert_eq!(d.position(), 0);
    }
}
