use std::ffi::c_int;
use std::mem;
use std::ptr;

use aotuv_lancer_vorbis_sys::{
    vorbis_analysis, vorbis_analysis_blockout, vorbis_analysis_buffer,
    vorbis_analysis_headerout, vorbis_analysis_init, vorbis_analysis_wrote, vorbis_block,
    vorbis_block_clear, vorbis_block_init, vorbis_bitrate_addblock, vorbis_bitrate_flushpacket,
    vorbis_dsp_clear, vorbis_dsp_state,
};
use ogg_next_sys::ogg_packet;

use crate::error::{Error, Result};
use crate::ogg::Packet;
use crate::vorbis::{CodecInfo, CommentList};

/// The three mandatory header packets, borrowed from the analyzer
pub struct HeaderPackets<'a> {
    pub identification: Packet<'a>,
    pub comment: Packet<'a>,
    pub setup: Packet<'a>,
}

/// Encoder-side dsp state plus its working block
pub struct Analyzer {
    block: Box<vorbis_block>,
    dsp: Box<vorbis_dsp_state>,
    channels: usize,
}

impl Analyzer {
    /// # Safety
    ///
    /// `info` must be configured for encoding and must outlive the analyzer.
    /// `CodecInfo` is boxed, so moving the wrapper does not move the struct.
    pub unsafe fn new(info: &mut CodecInfo) -> Result<Self> {
        let channels = info.channels() as usize;
        let mut dsp: Box<vorbis_dsp_state> = Box::new(mem::zeroed());
        let code = vorbis_analysis_init(&mut *dsp, info.as_mut_ptr());
        if code != 0 {
            return Err(Error::Codec {
                op: "vorbis_analysis_init",
                code,
            });
        }

        let mut block: Box<vorbis_block> = Box::new(mem::zeroed());
        let code = vorbis_block_init(&mut *dsp, &mut *block);
        if code != 0 {
            vorbis_dsp_clear(&mut *dsp);
            return Err(Error::Codec {
                op: "vorbis_block_init",
                code,
            });
        }

        Ok(Analyzer {
            block,
            dsp,
            channels,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Build identification, comment and setup packets
    pub fn header_packets(&mut self, comments: &mut CommentList) -> Result<HeaderPackets<'_>> {
        let mut identification: ogg_packet = unsafe { mem::zeroed() };
        let mut comment: ogg_packet = unsafe { mem::zeroed() };
        let mut setup: ogg_packet = unsafe { mem::zeroed() };
        let code = unsafe {
            vorbis_analysis_headerout(
                &mut *self.dsp,
                comments.as_mut_ptr(),
                &mut identification,
                &mut comment,
                &mut setup,
            )
        };
        if code != 0 {
            return Err(Error::Codec {
                op: "vorbis_analysis_headerout",
                code,
            });
        }
        Ok(unsafe {
            HeaderPackets {
                identification: Packet::from_raw(identification),
                comment: Packet::from_raw(comment),
                setup: Packet::from_raw(setup),
            }
        })
    }

    /// Per-channel staging buffers with room for `samples` samples each
    pub(crate) fn buffer(&mut self, samples: usize) -> Result<*mut *mut f32> {
        let buffer = unsafe { vorbis_analysis_buffer(&mut *self.dsp, samples as c_int) };
        if buffer.is_null() {
            return Err(Error::Allocation("vorbis_analysis_buffer"));
        }
        Ok(buffer)
    }

    /// Commit samples written to the staging buffers; 0 marks end of stream
    pub fn wrote(&mut self, samples: usize) -> Result<()> {
        let code = unsafe { vorbis_analysis_wrote(&mut *self.dsp, samples as c_int) };
        if code != 0 {
            return Err(Error::Codec {
                op: "vorbis_analysis_wrote",
                code,
            });
        }
        Ok(())
    }

    /// Move the next complete block into the working block
    pub fn next_block(&mut self) -> Result<bool> {
        match unsafe { vorbis_analysis_blockout(&mut *self.dsp, &mut *self.block) } {
            1 => Ok(true),
            0 => Ok(false),
            code => Err(Error::Codec {
                op: "vorbis_analysis_blockout",
                code,
            }),
        }
    }

    /// Run the codec transform on the working block
    pub fn transform_block(&mut self) -> Result<()> {
        let code = unsafe { vorbis_analysis(&mut *self.block, ptr::null_mut()) };
        if code != 0 {
            return Err(Error::Codec {
                op: "vorbis_analysis",
                code,
            });
        }
        Ok(())
    }

    /// Hand the transformed block to the bitrate manager
    pub fn add_block_to_bitrate(&mut self) -> Result<()> {
        let code = unsafe { vorbis_bitrate_addblock(&mut *self.block) };
        if code != 0 {
            return Err(Error::Codec {
                op: "vorbis_bitrate_addblock",
                code,
            });
        }
        Ok(())
    }

    /// Next finished audio packet, `Ok(None)` when none is ready
    pub fn next_packet(&mut self) -> Result<Option<Packet<'_>>> {
        let mut raw: ogg_packet = unsafe { mem::zeroed() };
        match unsafe { vorbis_bitrate_flushpacket(&mut *self.dsp, &mut raw) } {
            0 => Ok(None),
            code if code > 0 => Ok(Some(unsafe { Packet::from_raw(raw) })),
            code => Err(Error::Codec {
                op: "vorbis_bitrate_flushpacket",
                code,
            }),
        }
    }
}

impl Drop for Analyzer {
    fn drop(&mut self) {
        unsafe {
            vorbis_block_clear(&mut *self.block);
            vorbis_dsp_clear(&mut *self.dsp);
        }
    }
}
