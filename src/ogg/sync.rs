// Page synchronization over an in-memory byte range

use std::mem;
use std::ptr;

use ogg_next_sys::{
    ogg_page, ogg_sync_buffer, ogg_sync_clear, ogg_sync_init, ogg_sync_pageout, ogg_sync_state,
    ogg_sync_wrote,
};

use crate::error::{Error, Result};
use crate::ogg::Page;

/// Maximum number of bytes handed to libogg per feed
pub const SYNC_CHUNK: usize = 8192;

/// Finds page boundaries in raw bytes fed incrementally from a cursor
pub struct PageSync {
    raw: Box<ogg_sync_state>,
}

impl PageSync {
    pub fn new() -> Self {
        let mut raw: Box<ogg_sync_state> = Box::new(unsafe { mem::zeroed() });
        // ogg_sync_init only zeroes the struct and cannot fail
        unsafe {
            ogg_sync_init(&mut *raw);
        }
        PageSync { raw }
    }

    /// Next complete page, reading from `input` as needed.
    ///
    /// Pages already buffered by an earlier feed are returned first. The
    /// consumed prefix of `input` is advanced past. `Ok(None)` means the
    /// input ran out without completing another page.
    pub fn next_page(&mut self, input: &mut &[u8]) -> Result<Option<Page<'_>>> {
        let mut raw: ogg_page = unsafe { mem::zeroed() };
        loop {
            match unsafe { ogg_sync_pageout(&mut *self.raw, &mut raw) } {
                1 => return Ok(Some(unsafe { Page::from_raw(raw) })),
                0 => {
                    if input.is_empty() {
                        return Ok(None);
                    }
                    let len = input.len().min(SYNC_CHUNK);
                    self.feed(&input[..len])?;
                    *input = &input[len..];
                }
                _ => log::trace!("skipping unsynced bytes"),
            }
        }
    }

    fn feed(&mut self, data: &[u8]) -> Result<()> {
        let buffer = unsafe { ogg_sync_buffer(&mut *self.raw, data.len() as _) };
        if buffer.is_null() {
            return Err(Error::Allocation("ogg_sync_buffer"));
        }
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), buffer as *mut u8, data.len());
        }
        let code = unsafe { ogg_sync_wrote(&mut *self.raw, data.len() as _) };
        if code != 0 {
            return Err(Error::Container {
                op: "ogg_sync_wrote",
                code,
            });
        }
        Ok(())
    }
}

impl Default for PageSync {
    fn default() -> Self {
        PageSync::new()
    }
}

impl Drop for PageSync {
    fn drop(&mut self) {
        unsafe {
            ogg_sync_clear(&mut *self.raw);
        }
    }
}
