// Append-only accumulator for encoded Ogg bytes

use bytes::{Bytes, BytesMut};

/// Growable byte buffer shared across encode calls.
///
/// Pages are appended as they leave the muxer. `drain` hands the filled
/// region to the caller without copying; the sink keeps its spare capacity
/// and continues appending after it.
#[derive(Debug, Default)]
pub struct ByteSink {
    buf: BytesMut,
}

impl ByteSink {
    pub fn new() -> Self {
        ByteSink::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteSink {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append one Ogg page (header followed by body)
    pub fn append_page(&mut self, header: &[u8], body: &[u8]) {
        let len = header.len() + body.len();
        if len == 0 {
            return;
        }
        self.buf.reserve(len);
        self.buf.extend_from_slice(header);
        self.buf.extend_from_slice(body);
    }

    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes produced and not yet drained
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Transfer the accumulated bytes to the caller and reset the length.
    ///
    /// Returns `None` when nothing is buffered.
    pub fn drain(&mut self) -> Option<Bytes> {
        if self.buf.is_empty() {
            return None;
        }
        Some(self.buf.split().freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_page_concatenates_header_and_body() {
        let mut sink = ByteSink::new();
        sink.append_page(b"OggS", b"body");
        sink.append_page(b"", b"");
        assert_eq!(sink.len(), 8);
        assert_eq!(&sink.drain().unwrap()[..], b"OggSbody");
    }

    #[test]
    fn drain_resets_length_and_second_drain_is_empty() {
        let mut sink = ByteSink::with_capacity(64);
        sink.append(b"abc");
        let first = sink.drain();
        assert_eq!(first.as_deref(), Some(&b"abc"[..]));
        assert_eq!(sink.len(), 0);
        assert!(sink.drain().is_none());
    }

    #[test]
    fn drained_bytes_survive_further_appends() {
        let mut sink = ByteSink::with_capacity(16);
        sink.append(b"first");
        let first = sink.drain().unwrap();
        sink.append(b"second");
        assert_eq!(&first[..], b"first");
        assert_eq!(&sink.drain().unwrap()[..], b"second");
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut sink = ByteSink::new();
        for _ in 0..100 {
            sink.append_page(&[0u8; 27], &[1u8; 255]);
            assert!(sink.len() <= sink.capacity());
        }
    }
}
