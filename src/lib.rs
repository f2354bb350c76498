//! oggbridge - streaming Ogg Vorbis encoding and comment tag reading
//!
//! Built on libvorbis and libogg. An [`EncodingSession`] turns planar float
//! audio into Ogg pages chunk by chunk; [`scanner::scan`] reads the comment
//! tags back from a complete stream. The same operations are exported over a
//! C ABI ([`abi`]) and, with the `python` feature, as a Python module.

pub mod abi;
pub mod config;
pub mod error;
pub mod ogg;
pub mod scanner;
pub mod session;
pub mod sink;
pub mod tags;
pub mod utils;
pub mod vorbis;

#[cfg(feature = "python")]
mod python;

pub use config::EncoderConfig;
pub use error::{Error, Result};
pub use scanner::{scan, scan_tags, ScanReport, ScanState};
pub use session::{encode_planar_to_bytes, AnalysisWindow, EncodingSession, ANALYSIS_SAMPLE_COUNT};
pub use sink::ByteSink;
pub use tags::{pack, unpack, TagEntry};
