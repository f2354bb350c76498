// Streaming Vorbis encoder session
//
// Lifecycle:
// 1. init: configure the codec, write the three header pages into the sink
// 2. per chunk: analysis_window, fill it, process(samples written)
// 3. finish: end of stream, remaining packets and pages are flushed
// 4. drain: take the accumulated Ogg bytes (may be called at any point)
// 5. close (or drop): release codec, container and sink state

use std::ptr;
use std::slice;

use bytes::Bytes;

use crate::config::EncoderConfig;
use crate::error::{Error, Result};
use crate::ogg::Muxer;
use crate::sink::ByteSink;
use crate::tags::{unpack, ENCODER_NAME, ENCODER_TAG};
use crate::vorbis::{Analyzer, CodecInfo, CommentList, HeaderPackets};

/// Samples per channel accepted by one `process` call.
///
/// libvorbis stages analysis data on the stack, so the per-step working set
/// has to stay bounded no matter how long the stream is.
pub const ANALYSIS_SAMPLE_COUNT: usize = 8192;

// Header pages plus a few seconds of audio at typical bitrates
const INITIAL_SINK_CAPACITY: usize = 64 * 1024;

/// Per-channel staging buffers for the next `process` call.
///
/// Planar `f32` samples in [-1.0, 1.0]. Every channel starts zeroed and
/// holds `ANALYSIS_SAMPLE_COUNT` samples.
pub struct AnalysisWindow<'a> {
    channels: Vec<&'a mut [f32]>,
}

impl<'a> AnalysisWindow<'a> {
    pub fn capacity(&self) -> usize {
        ANALYSIS_SAMPLE_COUNT
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(|c| &mut **c)
    }

    pub fn channels_mut(&mut self) -> &mut [&'a mut [f32]] {
        &mut self.channels
    }

    /// Copy `count` frames starting at `offset` from planar sources
    fn copy_planar(&mut self, sources: &[&[f32]], offset: usize, count: usize) {
        for (dest, src) in self.channels.iter_mut().zip(sources) {
            dest[..count].copy_from_slice(&src[offset..offset + count]);
        }
    }

    /// Deinterleave whole frames into the channel buffers
    fn copy_interleaved(&mut self, frames: &[f32]) {
        let channels = self.channels.len();
        for (i, frame) in frames.chunks_exact(channels).enumerate() {
            for (dest, &sample) in self.channels.iter_mut().zip(frame) {
                dest[i] = sample;
            }
        }
    }
}

/// One Ogg Vorbis logical stream being encoded.
///
/// Holds raw libvorbis/libogg state, so it stays on the thread that
/// created it.
pub struct EncodingSession {
    // Fields drop in order: container, codec pipeline, tags, info, sink
    mux: Muxer,
    analyzer: Analyzer,
    comments: CommentList,
    info: CodecInfo,
    sink: ByteSink,
    channels: u32,
    sample_rate: u32,
    quality: f32,
    window_pending: bool,
    finished: bool,
}

impl EncodingSession {
    /// Create a session from host-style arguments.
    ///
    /// `tags_blob` uses the packed tag format. Malformed fragments, including
    /// ones libvorbis cannot store because of a NUL byte, are skipped.
    pub fn init(
        channels: u32,
        sample_rate: u32,
        quality: f32,
        tags_blob: Option<&str>,
    ) -> Result<Self> {
        let tags = tags_blob
            .map(unpack)
            .unwrap_or_default()
            .into_iter()
            .filter(|tag| {
                let storable = !tag.name.contains('\0') && !tag.value.contains('\0');
                if !storable {
                    log::debug!("dropping tag fragment with a NUL byte: {:?}", tag.name);
                }
                storable
            })
            .collect();
        let config = EncoderConfig {
            channels,
            sample_rate,
            quality,
            tags,
        };
        Self::new(&config)
    }

    /// Create a session and write the header pages into its sink
    pub fn new(config: &EncoderConfig) -> Result<Self> {
        config.validate()?;

        let mut info = CodecInfo::new();
        info.configure_vbr(config.channels, config.sample_rate, config.quality)?;

        let mut comments = CommentList::new();
        comments.add(ENCODER_TAG, ENCODER_NAME)?;
        for tag in &config.tags {
            comments.add(&tag.name, &tag.value)?;
        }

        let mut analyzer = unsafe { Analyzer::new(&mut info)? };
        let mut mux = Muxer::new(rand::random::<u32>())?;
        let mut sink = ByteSink::with_capacity(INITIAL_SINK_CAPACITY);

        {
            let HeaderPackets {
                mut identification,
                mut comment,
                mut setup,
            } = analyzer.header_packets(&mut comments)?;
            mux.submit_packet(&mut identification)?;
            mux.submit_packet(&mut comment)?;
            mux.submit_packet(&mut setup)?;
        }
        // Header pages must go out whole, before any audio page
        let pages = flush_pages(&mut mux, &mut sink);

        log::debug!(
            "encoder session {:#010x}: {} channel(s), {} Hz, quality {}, {} tag(s), {} header page(s)",
            mux.serial(),
            config.channels,
            config.sample_rate,
            config.quality,
            comments.len(),
            pages
        );

        Ok(EncodingSession {
            mux,
            analyzer,
            comments,
            info,
            sink,
            channels: config.channels,
            sample_rate: config.sample_rate,
            quality: config.quality,
            window_pending: false,
            finished: false,
        })
    }

    /// Stream serial number, fixed at creation
    pub fn serial(&self) -> u32 {
        self.mux.serial()
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Nominal bitrate libvorbis picked for the configured quality
    pub fn bitrate_nominal(&self) -> Option<u32> {
        self.info.bitrate_nominal()
    }

    /// Number of comments written to the comment header, `ENCODER` included
    pub fn tag_count(&self) -> usize {
        self.comments.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Borrow the staging buffers for the next chunk.
    ///
    /// Must be requested again before every `process` that writes samples.
    pub fn analysis_window(&mut self) -> Result<AnalysisWindow<'_>> {
        let buffer = self.raw_analysis_buffer()?;
        let channels = (0..self.channels as usize)
            .map(|ch| unsafe {
                let samples = *buffer.add(ch);
                slice::from_raw_parts_mut(samples, ANALYSIS_SAMPLE_COUNT)
            })
            .collect();
        Ok(AnalysisWindow { channels })
    }

    /// The libvorbis channel pointer array behind `analysis_window`, zeroed
    pub(crate) fn raw_analysis_buffer(&mut self) -> Result<*mut *mut f32> {
        if self.finished {
            return Err(Error::Finished);
        }
        let buffer = self.analyzer.buffer(ANALYSIS_SAMPLE_COUNT)?;
        for ch in 0..self.channels as usize {
            unsafe {
                ptr::write_bytes(*buffer.add(ch), 0, ANALYSIS_SAMPLE_COUNT);
            }
        }
        self.window_pending = true;
        Ok(buffer)
    }

    /// Commit `samples_written` samples per channel from the current window
    /// and encode every block that became complete.
    ///
    /// Zero signals end of stream, same as `finish`.
    pub fn process(&mut self, samples_written: usize) -> Result<()> {
        if samples_written == 0 {
            return self.finish();
        }
        if self.finished {
            return Err(Error::Finished);
        }
        if samples_written > ANALYSIS_SAMPLE_COUNT {
            return Err(Error::WindowOverflow {
                requested: samples_written,
                capacity: ANALYSIS_SAMPLE_COUNT,
            });
        }
        if !self.window_pending {
            return Err(Error::WindowNotRequested);
        }
        self.window_pending = false;

        self.analyzer.wrote(samples_written)?;
        self.encode_ready_blocks()
    }

    /// Signal end of stream and flush everything still buffered.
    ///
    /// Calling it again is a no-op.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            log::warn!(
                "end of stream already signalled for stream {:#010x}",
                self.serial()
            );
            return Ok(());
        }
        self.finished = true;
        self.window_pending = false;

        self.analyzer.wrote(0)?;
        self.encode_ready_blocks()?;
        let pages = flush_pages(&mut self.mux, &mut self.sink);
        log::debug!(
            "stream {:#010x} finished, {} trailing page(s), {} byte(s) pending",
            self.serial(),
            pages,
            self.sink.len()
        );
        Ok(())
    }

    fn encode_ready_blocks(&mut self) -> Result<()> {
        let mut pages = 0;
        while self.analyzer.next_block()? {
            self.analyzer.transform_block()?;
            self.analyzer.add_block_to_bitrate()?;
            while let Some(mut packet) = self.analyzer.next_packet()? {
                self.mux.submit_packet(&mut packet)?;
                pages += emit_pages(&mut self.mux, &mut self.sink);
            }
        }
        if pages > 0 {
            log::trace!("stream {:#010x}: {} page(s) emitted", self.serial(), pages);
        }
        Ok(())
    }

    /// Encode planar channel buffers, chunked by the window capacity
    pub fn encode_planar(&mut self, channels: &[&[f32]]) -> Result<()> {
        if channels.len() != self.channels as usize {
            return Err(Error::InvalidConfiguration(format!(
                "expected {} channel buffer(s), got {}",
                self.channels,
                channels.len()
            )));
        }
        let frames = channels.first().map_or(0, |c| c.len());
        if channels.iter().any(|c| c.len() != frames) {
            return Err(Error::InvalidConfiguration(
                "channel buffers differ in length".to_string(),
            ));
        }

        let mut offset = 0;
        while offset < frames {
            let count = (frames - offset).min(ANALYSIS_SAMPLE_COUNT);
            self.analysis_window()?.copy_planar(channels, offset, count);
            self.process(count)?;
            offset += count;
        }
        Ok(())
    }

    /// Encode interleaved frames, chunked by the window capacity
    pub fn encode_interleaved(&mut self, samples: &[f32]) -> Result<()> {
        let channels = self.channels as usize;
        if samples.len() % channels != 0 {
            return Err(Error::InvalidConfiguration(format!(
                "{} interleaved samples do not divide into {} channel(s)",
                samples.len(),
                channels
            )));
        }
        for chunk in samples.chunks(ANALYSIS_SAMPLE_COUNT * channels) {
            self.analysis_window()?.copy_interleaved(chunk);
            self.process(chunk.len() / channels)?;
        }
        Ok(())
    }

    /// Encoded bytes waiting to be drained
    pub fn data_len(&self) -> usize {
        self.sink.len()
    }

    /// Take the encoded bytes produced so far; `None` if there are none
    pub fn drain(&mut self) -> Option<Bytes> {
        self.sink.drain()
    }

    /// Release all codec, container and sink state
    pub fn close(self) {
        if self.sink.is_empty() {
            log::debug!("closing encoder session {:#010x}", self.serial());
        } else {
            log::debug!(
                "closing encoder session {:#010x} ({} byte(s) undrained)",
                self.serial(),
                self.sink.len()
            );
        }
    }
}

fn emit_pages(mux: &mut Muxer, sink: &mut ByteSink) -> usize {
    let mut pages = 0;
    while let Some(page) = mux.next_page() {
        sink.append_page(page.header(), page.body());
        pages += 1;
    }
    pages
}

fn flush_pages(mux: &mut Muxer, sink: &mut ByteSink) -> usize {
    let mut pages = 0;
    while let Some(page) = mux.flush_page() {
        sink.append_page(page.header(), page.body());
        pages += 1;
    }
    pages
}

/// Encode a whole planar buffer in one call and return the Ogg bytes
pub fn encode_planar_to_bytes(config: &EncoderConfig, channels: &[&[f32]]) -> Result<Bytes> {
    let mut session = EncodingSession::new(config)?;
    session.encode_planar(channels)?;
    session.finish()?;
    let data = session.drain().ok_or(Error::EmptyOutput)?;
    session.close();
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::{PageHeader, PageWalker, OGG_SIGNATURE};
    use crate::vorbis::{HEADER_PACKET_COUNT, PACKET_TYPE_IDENTIFICATION, VORBIS_SIGNATURE};

    fn sine(frames: usize, rate: u32) -> Vec<f32> {
        (0..frames)
            .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn init_emits_header_pages_with_three_packets() {
        let mut session = EncodingSession::init(2, 44100, 0.5, None).unwrap();
        let data = session.drain().unwrap();
        assert_eq!(&data[..4], OGG_SIGNATURE);

        let pages: Vec<PageHeader> = PageWalker::new(&data).map(|(_, h)| h).collect();
        assert!(pages.len() >= 2);
        assert!(pages[0].is_bos());
        assert!(pages.iter().all(|p| p.serial == session.serial()));
        assert!(pages.iter().all(|p| p.granule_position == 0));
        // The first page carries the identification header alone
        assert_eq!(pages[0].packets_completed(), 1);
        let body = &data[pages[0].header_len()..];
        assert_eq!(body[0], PACKET_TYPE_IDENTIFICATION);
        assert_eq!(&body[1..7], VORBIS_SIGNATURE);

        let packets: usize = pages.iter().map(|p| p.packets_completed()).sum();
        assert_eq!(packets, HEADER_PACKET_COUNT);
    }

    #[test]
    fn second_drain_without_processing_is_empty() {
        let mut session = EncodingSession::init(1, 22050, 0.3, Some("TITLE=x")).unwrap();
        assert!(session.data_len() > 0);
        assert!(session.drain().is_some());
        assert_eq!(session.data_len(), 0);
        assert!(session.drain().is_none());
    }

    #[test]
    fn fixed_encoder_tag_comes_first() {
        let session = EncodingSession::init(1, 8000, 0.0, Some("A=1\tjunk\tB=2")).unwrap();
        assert_eq!(session.tag_count(), 3);
        assert_eq!(
            session.comments.entries()[0],
            crate::tags::TagEntry::new(ENCODER_TAG, ENCODER_NAME)
        );
    }

    #[test]
    fn blob_fragments_with_nul_bytes_are_skipped() {
        let session =
            EncodingSession::init(1, 8000, 0.0, Some("A=1\tB=x\0y\tC\0=2\tD=4")).unwrap();
        let names: Vec<String> = session
            .comments
            .entries()
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(names, vec![ENCODER_TAG, "A", "D"]);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        assert!(matches!(
            EncodingSession::init(0, 44100, 0.5, None),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            EncodingSession::init(2, 0, 0.5, None),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            EncodingSession::init(2, 44100, -5.0, None),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn window_has_fixed_capacity_per_channel() {
        let mut session = EncodingSession::init(2, 44100, 0.5, None).unwrap();
        let mut window = session.analysis_window().unwrap();
        assert_eq!(window.capacity(), ANALYSIS_SAMPLE_COUNT);
        assert_eq!(window.channel_count(), 2);
        let left = window.channel(0).unwrap();
        assert_eq!(left.len(), ANALYSIS_SAMPLE_COUNT);
        assert!(left.iter().all(|&s| s == 0.0));
        assert!(window.channel(2).is_none());
    }

    #[test]
    fn oversized_process_is_rejected() {
        let mut session = EncodingSession::init(1, 44100, 0.5, None).unwrap();
        session.analysis_window().unwrap();
        let err = session.process(ANALYSIS_SAMPLE_COUNT + 1).unwrap_err();
        assert!(matches!(
            err,
            Error::WindowOverflow {
                requested,
                capacity: ANALYSIS_SAMPLE_COUNT
            } if requested == ANALYSIS_SAMPLE_COUNT + 1
        ));
    }

    #[test]
    fn process_requires_a_fresh_window() {
        let mut session = EncodingSession::init(1, 44100, 0.5, None).unwrap();
        assert!(matches!(session.process(16), Err(Error::WindowNotRequested)));

        session.analysis_window().unwrap();
        session.process(16).unwrap();
        assert!(matches!(session.process(16), Err(Error::WindowNotRequested)));
    }

    #[test]
    fn finish_marks_last_page_eos_and_is_idempotent() {
        let mut session = EncodingSession::init(2, 44100, 0.4, None).unwrap();
        let tone = sine(20_000, 44100);
        session.encode_planar(&[&tone, &tone]).unwrap();
        session.finish().unwrap();
        session.process(0).unwrap();
        assert!(session.is_finished());
        assert!(matches!(session.analysis_window(), Err(Error::Finished)));

        let data = session.drain().unwrap();
        let pages: Vec<PageHeader> = PageWalker::new(&data).map(|(_, h)| h).collect();
        let last = pages.last().unwrap();
        assert!(last.is_eos());
        assert!(last.granule_position >= 20_000);
        assert!(pages[..pages.len() - 1].iter().all(|p| !p.is_eos()));
    }

    #[test]
    fn small_chunks_may_produce_no_pages() {
        let mut session = EncodingSession::init(1, 44100, 0.5, None).unwrap();
        session.drain();
        let mut window = session.analysis_window().unwrap();
        window.channel(0).unwrap()[..64].fill(0.25);
        session.process(64).unwrap();
        assert_eq!(session.data_len(), 0);
    }

    #[test]
    fn interleaved_and_planar_input_are_validated() {
        let mut session = EncodingSession::init(2, 44100, 0.5, None).unwrap();
        assert!(session.encode_interleaved(&[0.0; 3]).is_err());
        assert!(session.encode_planar(&[&[0.0; 4]]).is_err());
        assert!(session.encode_planar(&[&[0.0; 4], &[0.0; 5]]).is_err());
        session.encode_interleaved(&[0.0; 2 * 10_000]).unwrap();
    }

    #[test]
    fn sessions_pick_independent_serials() {
        let a = EncodingSession::init(1, 44100, 0.5, None).unwrap();
        let b = EncodingSession::init(1, 44100, 0.5, None).unwrap();
        assert_ne!(a.serial(), b.serial());
        a.close();
        b.close();
    }

    #[test]
    fn one_shot_encode_returns_complete_stream() {
        let tone = sine(4_000, 8000);
        let data = encode_planar_to_bytes(&EncoderConfig::new(1, 8000, 0.2), &[&tone]).unwrap();
        let last = PageWalker::new(&data).last().unwrap().1;
        assert!(last.is_eos());
    }
}
