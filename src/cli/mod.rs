// CLI module for oggbridge
//
// Command-line front end over the library: raw PCM encoding, tag reading and
// page listing. Only compiled into the binary.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config};
pub use output::OutputFormatter;
