// Ogg container support
//
// OGG Page Header (27 bytes, then the segment table):
// - Capture Pattern: "OggS" (4 bytes)
// - Version: 0 (1 byte)
// - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
// - Granule Position (8 bytes)
// - Bitstream Serial Number (4 bytes)
// - Page Sequence Number (4 bytes)
// - CRC Checksum (4 bytes)
// - Number of Page Segments (1 byte)
// - Segment Table (variable)
//
// Framing, checksums and packet reassembly are done by libogg. This module
// wraps its stream and sync states, plus a small header parser used to
// inspect produced streams.

pub mod packet;
pub mod page;
pub mod stream;
pub mod sync;

pub use packet::Packet;
pub use page::{Page, PageHeader, PageWalker};
pub use stream::{Demuxer, Muxer};
pub use sync::{PageSync, SYNC_CHUNK};

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

/// Fixed part of a page header, before the segment table
pub const PAGE_HEADER_LEN: usize = 27;

// OGG page header types
pub const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream
