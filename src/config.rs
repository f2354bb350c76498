// Encoder configuration, loadable from JSON presets

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tags::TagEntry;

pub const DEFAULT_CHANNELS: u32 = 2;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
/// Roughly 128 kbps for stereo 44.1 kHz material
pub const DEFAULT_QUALITY: f32 = 0.5;

/// Vorbis stores the channel count in a single byte
pub const MAX_CHANNELS: u32 = 255;

/// Settings fixed for the lifetime of an encoding session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub channels: u32,
    pub sample_rate: u32,
    /// Quality-based VBR factor, -0.1 (smallest) to 1.0 (best)
    pub quality: f32,
    /// Tags written after the fixed `ENCODER` tag, in order
    pub tags: Vec<TagEntry>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            quality: DEFAULT_QUALITY,
            tags: Vec::new(),
        }
    }
}

impl EncoderConfig {
    pub fn new(channels: u32, sample_rate: u32, quality: f32) -> Self {
        EncoderConfig {
            channels,
            sample_rate,
            quality,
            tags: Vec::new(),
        }
    }

    /// Add a tag (builder style)
    pub fn with_tag<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.add_tag(name, value);
        self
    }

    pub fn add_tag<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.tags.push(TagEntry::new(name, value));
    }

    /// Checks done before libvorbis sees the values.
    ///
    /// The quality range is left to libvorbis.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(Error::InvalidConfiguration(format!(
                "channel count {} outside 1-{}",
                self.channels, MAX_CHANNELS
            )));
        }
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfiguration(
                "sample rate must be positive".to_string(),
            ));
        }
        if !self.quality.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "quality {} is not a number",
                self.quality
            )));
        }
        for tag in &self.tags {
            tag.validate()?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfiguration(format!("invalid encoder preset: {}", e)))
    }

    /// Load a preset; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
