// Logical stream states: packets to pages (Muxer) and pages to packets (Demuxer)

use std::mem;

use ogg_next_sys::{
    ogg_packet, ogg_page, ogg_stream_clear, ogg_stream_flush, ogg_stream_init,
    ogg_stream_packetin, ogg_stream_packetout, ogg_stream_pagein, ogg_stream_pageout,
    ogg_stream_state,
};

use crate::error::{Error, Result};
use crate::ogg::{Packet, Page};

/// Owned `ogg_stream_state`, cleared on drop
struct StreamState {
    raw: Box<ogg_stream_state>,
    serial: u32,
}

impl StreamState {
    fn new(serial: u32) -> Result<Self> {
        let mut raw: Box<ogg_stream_state> = Box::new(unsafe { mem::zeroed() });
        if unsafe { ogg_stream_init(&mut *raw, serial as i32) } != 0 {
            return Err(Error::Allocation("ogg_stream_init"));
        }
        Ok(StreamState { raw, serial })
    }
}

impl Drop for StreamState {
    fn drop(&mut self) {
        unsafe {
            ogg_stream_clear(&mut *self.raw);
        }
    }
}

/// Turns packets of one logical stream into pages
pub struct Muxer {
    state: StreamState,
}

impl Muxer {
    pub fn new(serial: u32) -> Result<Self> {
        Ok(Muxer {
            state: StreamState::new(serial)?,
        })
    }

    pub fn serial(&self) -> u32 {
        self.state.serial
    }

    pub fn submit_packet(&mut self, packet: &mut Packet<'_>) -> Result<()> {
        let code = unsafe { ogg_stream_packetin(&mut *self.state.raw, packet.as_mut_ptr()) };
        if code != 0 {
            return Err(Error::Container {
                op: "ogg_stream_packetin",
                code,
            });
        }
        Ok(())
    }

    /// Next page once enough data has accumulated; `None` is normal
    pub fn next_page(&mut self) -> Option<Page<'_>> {
        let mut raw: ogg_page = unsafe { mem::zeroed() };
        if unsafe { ogg_stream_pageout(&mut *self.state.raw, &mut raw) } == 0 {
            return None;
        }
        Some(unsafe { Page::from_raw(raw) })
    }

    /// Force out whatever is buffered as a complete page
    pub fn flush_page(&mut self) -> Option<Page<'_>> {
        let mut raw: ogg_page = unsafe { mem::zeroed() };
        if unsafe { ogg_stream_flush(&mut *self.state.raw, &mut raw) } == 0 {
            return None;
        }
        Some(unsafe { Page::from_raw(raw) })
    }
}

/// Reassembles packets of one logical stream from its pages
pub struct Demuxer {
    state: StreamState,
}

impl Demuxer {
    pub fn new(serial: u32) -> Result<Self> {
        Ok(Demuxer {
            state: StreamState::new(serial)?,
        })
    }

    pub fn serial(&self) -> u32 {
        self.state.serial
    }

    /// Feed a page; it must belong to this demuxer's serial
    pub fn submit_page(&mut self, page: &mut Page<'_>) -> Result<()> {
        let code = unsafe { ogg_stream_pagein(&mut *self.state.raw, page.as_mut_ptr()) };
        if code != 0 {
            return Err(Error::Container {
                op: "ogg_stream_pagein",
                code,
            });
        }
        Ok(())
    }

    /// Next complete packet, `Ok(None)` when more pages are needed.
    ///
    /// A gap in the packet sequence is reported as corruption.
    pub fn next_packet(&mut self) -> Result<Option<Packet<'_>>> {
        let mut raw: ogg_packet = unsafe { mem::zeroed() };
        match unsafe { ogg_stream_packetout(&mut *self.state.raw, &mut raw) } {
            1 => Ok(Some(unsafe { Packet::from_raw(raw) })),
            0 => Ok(None),
            _ => Err(Error::Corrupt(format!(
                "gap in packet sequence of stream {:#010x}",
                self.state.serial
            ))),
        }
    }
}
