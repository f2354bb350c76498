use std::ffi::c_long;
use std::mem;

use aotuv_lancer_vorbis_sys::{vorbis_encode_init_vbr, vorbis_info, vorbis_info_clear, vorbis_info_init};

use crate::error::{Error, Result};

/// Owned `vorbis_info`: channel layout, rate and codec setup
pub struct CodecInfo {
    raw: Box<vorbis_info>,
}

impl CodecInfo {
    pub fn new() -> Self {
        let mut raw: Box<vorbis_info> = Box::new(unsafe { mem::zeroed() });
        unsafe {
            vorbis_info_init(&mut *raw);
        }
        CodecInfo { raw }
    }

    /// Set up quality-based VBR encoding.
    ///
    /// The quality range is whatever libvorbis accepts (about -0.1 to 1.0).
    pub fn configure_vbr(&mut self, channels: u32, sample_rate: u32, quality: f32) -> Result<()> {
        let code = unsafe {
            vorbis_encode_init_vbr(
                &mut *self.raw,
                channels as c_long,
                sample_rate as c_long,
                quality,
            )
        };
        if code != 0 {
            return Err(Error::InvalidConfiguration(format!(
                "libvorbis rejected {} channel(s) at {} Hz with quality {} (code {})",
                channels, sample_rate, quality, code
            )));
        }
        Ok(())
    }

    pub fn channels(&self) -> u32 {
        self.raw.channels.max(0) as u32
    }

    pub fn sample_rate(&self) -> u32 {
        self.raw.rate.max(0) as u32
    }

    /// Nominal bitrate in bits per second, if the stream declares one
    pub fn bitrate_nominal(&self) -> Option<u32> {
        let rate = self.raw.bitrate_nominal;
        if rate > 0 {
            Some(rate as u32)
        } else {
            None
        }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut vorbis_info {
        &mut *self.raw
    }
}

impl Default for CodecInfo {
    fn default() -> Self {
        CodecInfo::new()
    }
}

impl Drop for CodecInfo {
    fn drop(&mut self) {
        // Safe after a failed vorbis_encode_init_vbr: the struct is zeroed by then
        unsafe {
            vorbis_info_clear(&mut *self.raw);
        }
    }
}
