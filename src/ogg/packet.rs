use std::marker::PhantomData;
use std::slice;

use ogg_next_sys::ogg_packet;

/// A packet borrowed from libogg or libvorbis internal storage.
///
/// The bytes stay valid until the state that produced the packet is
/// touched again, which the lifetime ties to the producer's borrow.
pub struct Packet<'a> {
    raw: ogg_packet,
    _owner: PhantomData<&'a ()>,
}

impl<'a> Packet<'a> {
    /// # Safety
    ///
    /// `raw.packet` must point to `raw.bytes` readable bytes for `'a`.
    pub(crate) unsafe fn from_raw(raw: ogg_packet) -> Self {
        Packet {
            raw,
            _owner: PhantomData,
        }
    }

    // libogg takes packets through mutable pointers even when only reading them
    pub(crate) fn as_mut_ptr(&mut self) -> *mut ogg_packet {
        &mut self.raw
    }

    pub fn data(&self) -> &[u8] {
        if self.raw.packet.is_null() || self.raw.bytes <= 0 {
            return &[];
        }
        unsafe { slice::from_raw_parts(self.raw.packet, self.raw.bytes as usize) }
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    pub fn is_bos(&self) -> bool {
        self.raw.b_o_s != 0
    }

    pub fn is_eos(&self) -> bool {
        self.raw.e_o_s != 0
    }

    pub fn granule_position(&self) -> i64 {
        self.raw.granulepos as i64
    }

    pub fn packet_no(&self) -> i64 {
        self.raw.packetno as i64
    }
}

impl std::fmt::Debug for Packet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("bytes", &self.len())
            .field("bos", &self.is_bos())
            .field("eos", &self.is_eos())
            .field("granule_position", &self.granule_position())
            .field("packet_no", &self.packet_no())
            .finish()
    }
}
