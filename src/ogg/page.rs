use std::marker::PhantomData;
use std::slice;

use ogg_next_sys::{ogg_page, ogg_page_serialno};

use crate::ogg::{
    OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS, OGG_SIGNATURE,
    PAGE_HEADER_LEN,
};

/// A complete page borrowed from a libogg stream or sync state
pub struct Page<'a> {
    raw: ogg_page,
    _owner: PhantomData<&'a ()>,
}

impl<'a> Page<'a> {
    /// # Safety
    ///
    /// `raw.header`/`raw.body` must point to `header_len`/`body_len`
    /// readable bytes for `'a`.
    pub(crate) unsafe fn from_raw(raw: ogg_page) -> Self {
        Page {
            raw,
            _owner: PhantomData,
        }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut ogg_page {
        &mut self.raw
    }

    pub fn header(&self) -> &[u8] {
        raw_bytes(self.raw.header, self.raw.header_len as isize)
    }

    pub fn body(&self) -> &[u8] {
        raw_bytes(self.raw.body, self.raw.body_len as isize)
    }

    pub fn len(&self) -> usize {
        self.header().len() + self.body().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serial number of the logical stream this page belongs to
    pub fn serial(&self) -> u32 {
        unsafe { ogg_page_serialno(&self.raw) as u32 }
    }
}

impl std::fmt::Debug for Page<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("serial", &self.serial())
            .field("header_len", &self.header().len())
            .field("body_len", &self.body().len())
            .finish()
    }
}

fn raw_bytes<'a>(ptr: *const u8, len: isize) -> &'a [u8] {
    if ptr.is_null() || len <= 0 {
        return &[];
    }
    unsafe { slice::from_raw_parts(ptr, len as usize) }
}

/// OGG Page Header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    pub version: u8,
    pub header_type: u8,
    pub granule_position: u64,
    pub serial: u32,
    pub sequence: u32,
    pub crc: u32,
    pub segment_table: Vec<u8>,
}

impl PageHeader {
    /// Parse a page header from the start of `data`.
    ///
    /// Returns `None` when the capture pattern or version is wrong, or the
    /// segment table is cut off. The checksum is not verified.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < PAGE_HEADER_LEN {
            return None;
        }
        let header = &data[..PAGE_HEADER_LEN];

        // Check OGG signature
        if &header[0..4] != OGG_SIGNATURE {
            return None;
        }

        let version = header[4];
        if version != 0 {
            return None;
        }

        let header_type = header[5];
        let granule_position = u64::from_le_bytes(header[6..14].try_into().ok()?);
        let serial = u32::from_le_bytes(header[14..18].try_into().ok()?);
        let sequence = u32::from_le_bytes(header[18..22].try_into().ok()?);
        let crc = u32::from_le_bytes(header[22..26].try_into().ok()?);
        let segment_count = header[26] as usize;

        // Read segment table
        let segment_table = data.get(PAGE_HEADER_LEN..PAGE_HEADER_LEN + segment_count)?;

        Some(PageHeader {
            version,
            header_type,
            granule_position,
            serial,
            sequence,
            crc,
            segment_table: segment_table.to_vec(),
        })
    }

    /// Header length including the segment table
    pub fn header_len(&self) -> usize {
        PAGE_HEADER_LEN + self.segment_table.len()
    }

    /// Calculate total page data size from segment table
    pub fn body_len(&self) -> usize {
        self.segment_table.iter().map(|&x| x as usize).sum()
    }

    pub fn page_len(&self) -> usize {
        self.header_len() + self.body_len()
    }

    /// Packets that end on this page (lacing values below 255)
    pub fn packets_completed(&self) -> usize {
        self.segment_table.iter().filter(|&&x| x < 255).count()
    }

    pub fn is_continuation(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }
}

/// Walks the pages of an in-memory Ogg stream.
///
/// Yields the byte offset of each page with its header and stops at the
/// first position that does not hold a complete page.
pub struct PageWalker<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PageWalker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        PageWalker { data, pos: 0 }
    }

    /// Offset just past the last page yielded
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for PageWalker<'a> {
    type Item = (usize, PageHeader);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.pos..)?;
        let header = PageHeader::parse(rest)?;
        let page_len = header.page_len();
        if page_len > rest.len() {
            return None;
        }
        let offset = self.pos;
        self.pos += page_len;
        Some((offset, header))
    }
}
