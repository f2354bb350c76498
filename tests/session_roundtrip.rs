//! End-to-end tests: stream audio through an encoding session, then read the
//! produced Ogg stream back with the page walker and the tag scanner.

use std::thread;

use oggbridge::ogg::{PageHeader, PageWalker};
use oggbridge::{
    scan, EncoderConfig, EncodingSession, Error, ScanState, ANALYSIS_SAMPLE_COUNT,
};

fn tone(frames: usize, rate: u32, freq: f32) -> Vec<f32> {
    (0..frames)
        .map(|i| (i as f32 * freq * std::f32::consts::TAU / rate as f32).sin() * 0.4)
        .collect()
}

fn page_headers(data: &[u8]) -> Vec<PageHeader> {
    let mut walker = PageWalker::new(data);
    let pages: Vec<PageHeader> = walker.by_ref().map(|(_, h)| h).collect();
    assert_eq!(walker.position(), data.len(), "stream must end on a page boundary");
    pages
}

/// Feed `frames` of a stereo tone in chunks of `chunk` samples, draining
/// after every call.
fn stream_in_chunks(session: &mut EncodingSession, frames: usize, chunk: usize) -> Vec<u8> {
    let left = tone(frames, session.sample_rate(), 440.0);
    let right = tone(frames, session.sample_rate(), 660.0);
    let mut out = Vec::new();
    out.extend(session.drain().unwrap());

    let mut offset = 0;
    while offset < frames {
        let count = chunk.min(frames - offset);
        let mut window = session.analysis_window().unwrap();
        window.channel(0).unwrap()[..count].copy_from_slice(&left[offset..offset + count]);
        window.channel(1).unwrap()[..count].copy_from_slice(&right[offset..offset + count]);
        session.process(count).unwrap();
        if let Some(data) = session.drain() {
            out.extend_from_slice(&data);
        }
        offset += count;
    }

    session.process(0).unwrap();
    out.extend(session.drain().unwrap());
    out
}

#[test]
fn chunked_stream_is_a_well_formed_ogg_vorbis_file() {
    let config = EncoderConfig::new(2, 44100, 0.5)
        .with_tag("TITLE", "Roundtrip")
        .with_tag("ARTIST", "oggbridge tests");
    let mut session = EncodingSession::new(&config).unwrap();
    let serial = session.serial();
    let frames = 3 * ANALYSIS_SAMPLE_COUNT + 1234;
    let data = stream_in_chunks(&mut session, frames, ANALYSIS_SAMPLE_COUNT);
    session.close();

    let pages = page_headers(&data);
    assert!(pages.len() > 3);
    assert!(pages[0].is_bos());
    assert!(pages.last().unwrap().is_eos());
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.serial, serial);
        assert_eq!(page.sequence as usize, i);
    }
    // Pages that complete no packet carry granule position -1
    let granules: Vec<u64> = pages
        .iter()
        .map(|p| p.granule_position)
        .filter(|&g| g != u64::MAX)
        .collect();
    assert!(granules.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(pages.last().unwrap().granule_position, frames as u64);

    let report = scan(&data).unwrap();
    assert_eq!(report.serial, serial);
    assert_eq!(report.channels, 2);
    assert_eq!(report.sample_rate, 44100);
    assert_eq!(oggbridge::tags::find(&report.tags, "title"), Some("Roundtrip"));
    assert_eq!(report.tags.len(), 3);
}

#[test]
fn chunk_size_does_not_change_the_audio_length() {
    let frames = 20_000;
    for chunk in [100, 4096, ANALYSIS_SAMPLE_COUNT] {
        let mut session = EncodingSession::init(2, 32000, 0.2, None).unwrap();
        let data = stream_in_chunks(&mut session, frames, chunk);
        let last = page_headers(&data).pop().unwrap();
        assert!(last.is_eos());
        assert_eq!(last.granule_position, frames as u64, "chunk size {}", chunk);
    }
}

#[test]
fn stream_without_audio_still_terminates() {
    let mut session = EncodingSession::init(1, 8000, 0.0, None).unwrap();
    session.finish().unwrap();
    let data = session.drain().unwrap();
    let pages = page_headers(&data);
    assert!(pages.last().unwrap().is_eos());
    assert!(scan(&data).is_ok());
}

#[test]
fn headers_alone_can_be_scanned_before_audio_arrives() {
    let mut session = EncodingSession::init(2, 44100, 0.5, Some("ALBUM=Early")).unwrap();
    let headers = session.drain().unwrap();
    let report = scan(&headers).unwrap();
    assert_eq!(oggbridge::tags::find(&report.tags, "ALBUM"), Some("Early"));
    assert_eq!(report.serial, session.serial());
}

#[test]
fn truncated_stream_reports_progress() {
    let mut session = EncodingSession::init(2, 44100, 0.5, None).unwrap();
    let headers = session.drain().unwrap();
    let first_page = page_headers(&headers)[0].page_len();

    match scan(&headers[..first_page]) {
        Err(Error::Truncated { reached }) => assert_eq!(reached, ScanState::StreamInitialized),
        other => panic!("expected truncation, got {:?}", other),
    }
}

#[test]
fn sessions_on_separate_threads_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|n| {
            thread::spawn(move || {
                let config = EncoderConfig::new(1, 22050, 0.3).with_tag("INDEX", n.to_string());
                let mut session = EncodingSession::new(&config).unwrap();
                session.encode_planar(&[&tone(10_000, 22050, 220.0 * (n + 1) as f32)]).unwrap();
                session.finish().unwrap();
                let serial = session.serial();
                (n, serial, session.drain().unwrap().to_vec())
            })
        })
        .collect();

    for handle in handles {
        let (n, serial, data) = handle.join().unwrap();
        let report = scan(&data).unwrap();
        assert_eq!(report.serial, serial);
        assert_eq!(
            oggbridge::tags::find(&report.tags, "INDEX"),
            Some(n.to_string().as_str())
        );
    }
}
