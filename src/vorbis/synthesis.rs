use aotuv_lancer_vorbis_sys::vorbis_synthesis_headerin;

use crate::error::{Error, Result};
use crate::ogg::Packet;
use crate::vorbis::{CodecInfo, CommentList, HEADER_PACKET_COUNT};

/// Decoder-side header parsing.
///
/// libvorbis keeps state between header packets, so packets must be
/// submitted in stream order starting with the identification header.
pub struct HeaderParser {
    comments: CommentList,
    info: CodecInfo,
    parsed: usize,
}

impl HeaderParser {
    pub fn new() -> Self {
        HeaderParser {
            comments: CommentList::new(),
            info: CodecInfo::new(),
            parsed: 0,
        }
    }

    pub fn submit(&mut self, packet: &mut Packet<'_>) -> Result<()> {
        if self.parsed >= HEADER_PACKET_COUNT {
            return Err(Error::Corrupt("more than three header packets".to_string()));
        }
        let code = unsafe {
            vorbis_synthesis_headerin(
                self.info.as_mut_ptr(),
                self.comments.as_mut_ptr(),
                packet.as_mut_ptr(),
            )
        };
        if code != 0 {
            return Err(Error::Corrupt(format!(
                "header packet {} rejected by libvorbis (code {})",
                self.parsed + 1,
                code
            )));
        }
        self.parsed += 1;
        Ok(())
    }

    /// Header packets accepted so far
    pub fn parsed(&self) -> usize {
        self.parsed
    }

    pub fn info(&self) -> &CodecInfo {
        &self.info
    }

    pub fn comments(&self) -> &CommentList {
        &self.comments
    }
}

impl Default for HeaderParser {
    fn default() -> Self {
        HeaderParser::new()
    }
}
