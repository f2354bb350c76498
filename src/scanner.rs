// Comment tag scanner for complete Ogg Vorbis byte streams
//
// Only the first logical stream is read, and only up to its comment header:
// the identification and comment packets are parsed, audio is never touched.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::ogg::{Demuxer, PageSync};
use crate::tags::{pack, TagEntry};
use crate::vorbis::HeaderParser;

/// How far a scan got; reported with truncation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ScanState {
    Start,
    SyncInitialized,
    StreamInitialized,
    CommentFound,
}

/// Stream facts gathered from the identification and comment headers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub serial: u32,
    pub channels: u32,
    pub sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_nominal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub tags: Vec<TagEntry>,
}

/// Parse the headers of the first logical stream in `data`
pub fn scan(data: &[u8]) -> Result<ScanReport> {
    let mut state = ScanState::Start;
    let result = read_headers(data, &mut state);
    match &result {
        Ok(report) => log::debug!(
            "stream {:#010x}: {} tag(s) found in {} byte(s)",
            report.serial,
            report.tags.len(),
            data.len()
        ),
        Err(e) => log::debug!("tag scan stopped at {:?}: {}", state, e),
    }
    result
}

fn read_headers(data: &[u8], state: &mut ScanState) -> Result<ScanReport> {
    let mut input = data;
    let mut sync = PageSync::new();
    let mut headers = HeaderParser::new();
    *state = ScanState::SyncInitialized;

    // The first complete page decides which logical stream is read
    let mut demux = {
        let mut page = sync
            .next_page(&mut input)?
            .ok_or(Error::Truncated { reached: *state })?;
        let mut demux = Demuxer::new(page.serial())?;
        demux.submit_page(&mut page)?;
        demux
    };
    let serial = demux.serial();
    *state = ScanState::StreamInitialized;

    loop {
        while let Some(mut packet) = demux.next_packet()? {
            headers.submit(&mut packet)?;
            if headers.parsed() == 2 {
                *state = ScanState::CommentFound;
                let info = headers.info();
                return Ok(ScanReport {
                    serial,
                    channels: info.channels(),
                    sample_rate: info.sample_rate(),
                    bitrate_nominal: info.bitrate_nominal(),
                    vendor: headers.comments().vendor(),
                    tags: headers.comments().entries(),
                });
            }
        }

        let mut page = sync
            .next_page(&mut input)?
            .ok_or(Error::Truncated { reached: *state })?;
        if page.serial() != serial {
            log::trace!("skipping page of stream {:#010x}", page.serial());
            continue;
        }
        demux.submit_page(&mut page)?;
    }
}

/// Tags of the first logical stream, in stored order
pub fn scan_tags(data: &[u8]) -> Result<Vec<TagEntry>> {
    scan(data).map(|report| report.tags)
}

/// Tags in packed form, `None` when the data could not be scanned
pub fn scan_packed(data: &[u8]) -> Option<String> {
    scan_tags(data).ok().map(|tags| pack(&tags))
}
