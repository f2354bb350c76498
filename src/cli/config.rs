// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// oggbridge - Ogg Vorbis encoding and tag CLI tool
#[derive(Parser, Debug)]
#[command(name = "oggbridge")]
#[command(about = "Encode raw PCM to Ogg Vorbis and inspect Ogg Vorbis tags", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
    /// Tab-separated NAME=value tag blob
    Packed,
}

/// Layout of raw PCM input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SampleFormat {
    /// 32-bit little-endian float, interleaved
    #[default]
    F32le,
    /// 16-bit little-endian signed integer, interleaved
    S16le,
}

impl SampleFormat {
    pub fn sample_size(self) -> usize {
        match self {
            SampleFormat::F32le => 4,
            SampleFormat::S16le => 2,
        }
    }

    /// Convert raw little-endian bytes into float samples
    pub fn decode(self, bytes: &[u8], out: &mut Vec<f32>) {
        out.clear();
        match self {
            SampleFormat::F32le => out.extend(
                bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            ),
            SampleFormat::S16le => out.extend(
                bytes
                    .chunks_exact(2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0),
            ),
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode raw interleaved PCM into an Ogg Vorbis file
    Encode {
        /// Raw PCM input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Ogg Vorbis output file
        #[arg(short, long)]
        output: PathBuf,

        /// Encoder preset (JSON); flags below override it
        #[arg(long, value_name = "PRESET")]
        config: Option<PathBuf>,

        /// Number of interleaved channels
        #[arg(short, long)]
        channels: Option<u32>,

        /// Sample rate in Hz
        #[arg(short, long)]
        rate: Option<u32>,

        /// VBR quality, -0.1 to 1.0
        #[arg(long, allow_negative_numbers = true)]
        quality: Option<f32>,

        /// Tag to write, as NAME=VALUE (repeatable)
        #[arg(short, long = "tag", value_name = "NAME=VALUE")]
        tags: Vec<String>,

        /// Raw sample layout
        #[arg(long, value_enum, default_value = "f32le")]
        sample_format: SampleFormat,
    },

    /// Read comment tags from Ogg Vorbis file(s)
    Tags {
        /// File paths or glob patterns
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the Ogg pages of a file
    Pages {
        /// Ogg file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Config {
    /// Log level implied by the quiet/verbose flags; RUST_LOG still wins
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_with_repeated_tags() {
        let config = Config::try_parse_from([
            "oggbridge", "encode", "in.raw", "-o", "out.ogg", "--quality", "-0.1", "-t",
            "ARTIST=A", "-t", "TITLE=B", "--sample-format", "s16le",
        ])
        .unwrap();
        match config.command {
            Commands::Encode {
                quality,
                tags,
                sample_format,
                ..
            } => {
                assert_eq!(quality, Some(-0.1));
                assert_eq!(tags, vec!["ARTIST=A", "TITLE=B"]);
                assert_eq!(sample_format, SampleFormat::S16le);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let config =
            Config::try_parse_from(["oggbridge", "tags", "a.ogg", "--format", "packed", "-v"])
                .unwrap();
        assert_eq!(config.format, OutputFormat::Packed);
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn s16_samples_scale_to_unit_range() {
        let mut out = Vec::new();
        SampleFormat::S16le.decode(&[0x00, 0x80, 0x00, 0x40, 0xFF], &mut out);
        assert_eq!(out, vec![-1.0, 0.5]);
    }
}
