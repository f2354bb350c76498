// Vorbis codec state wrappers
//
// Vorbis Structure:
// 1. Identification Header (packet type 1)
// 2. Comment Header (packet type 3) - Contains Vorbis Comment
// 3. Setup Header (packet type 5)
// 4. Audio packets
//
// Each libvorbis state struct is boxed so its address stays fixed: the dsp
// state keeps a pointer to the info it was initialised from, and the block
// keeps a pointer to the dsp state.

pub mod analysis;
pub mod comment;
pub mod info;
pub mod synthesis;

pub use analysis::{Analyzer, HeaderPackets};
pub use comment::CommentList;
pub use info::CodecInfo;
pub use synthesis::HeaderParser;

/// Common prefix of every Vorbis header packet after the type byte
pub const VORBIS_SIGNATURE: &[u8; 6] = b"vorbis";

pub const PACKET_TYPE_IDENTIFICATION: u8 = 0x01;
pub const PACKET_TYPE_COMMENT: u8 = 0x03;
pub const PACKET_TYPE_SETUP: u8 = 0x05;

/// Number of header packets that precede audio data
pub const HEADER_PACKET_COUNT: usize = 3;
