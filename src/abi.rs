// C ABI exported from the cdylib
//
// Sessions are handed out as opaque boxed pointers. Every failure is logged
// and reported as a null pointer or a negative status; nothing panics across
// the boundary.

use std::ffi::{c_char, c_float, c_int, CStr, CString};
use std::ptr;
use std::slice;

use crate::scanner::scan_packed;
use crate::session::{EncodingSession, ANALYSIS_SAMPLE_COUNT};

/// Create an encoder session and write its header pages.
///
/// `tags` is a packed tag blob or null. Returns null on failure.
///
/// # Safety
///
/// `tags` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_encoder_init(
    channels: c_int,
    sample_rate: c_int,
    quality: c_float,
    tags: *const c_char,
) -> *mut EncodingSession {
    if channels <= 0 || sample_rate <= 0 {
        log::warn!(
            "encoder init rejected: {} channel(s) at {} Hz",
            channels,
            sample_rate
        );
        return ptr::null_mut();
    }

    let tags = if tags.is_null() {
        None
    } else {
        Some(CStr::from_ptr(tags).to_string_lossy())
    };

    match EncodingSession::init(channels as u32, sample_rate as u32, quality, tags.as_deref()) {
        Ok(session) => Box::into_raw(Box::new(session)),
        Err(e) => {
            log::warn!("encoder init failed: {}", e);
            ptr::null_mut()
        }
    }
}

/// Samples per channel in every analysis buffer
#[no_mangle]
pub extern "C" fn oggbridge_analysis_capacity() -> c_int {
    ANALYSIS_SAMPLE_COUNT as c_int
}

/// Per-channel sample buffers for the next `oggbridge_encoder_process` call.
///
/// Returns an array of `channels` pointers, each to
/// `oggbridge_analysis_capacity()` zeroed floats, or null on failure.
///
/// # Safety
///
/// `session` must be null or a live pointer from `oggbridge_encoder_init`.
/// The buffers stay valid until the next call on the same session.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_encoder_analysis_buffer(
    session: *mut EncodingSession,
) -> *mut *mut c_float {
    let Some(session) = session.as_mut() else {
        return ptr::null_mut();
    };
    match session.raw_analysis_buffer() {
        Ok(buffer) => buffer,
        Err(e) => {
            log::warn!("analysis buffer unavailable: {}", e);
            ptr::null_mut()
        }
    }
}

/// Encode `count` samples per channel from the analysis buffer.
///
/// A count of zero signals end of stream. Returns 0 on success, -1 on error.
///
/// # Safety
///
/// `session` must be null or a live pointer from `oggbridge_encoder_init`.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_encoder_process(
    session: *mut EncodingSession,
    count: c_int,
) -> c_int {
    let Some(session) = session.as_mut() else {
        return -1;
    };
    if count < 0 {
        log::warn!("negative sample count {}", count);
        return -1;
    }
    match session.process(count as usize) {
        Ok(()) => 0,
        Err(e) => {
            log::warn!("process failed for stream {:#010x}: {}", session.serial(), e);
            -1
        }
    }
}

/// Encoded bytes waiting to be transferred
///
/// # Safety
///
/// `session` must be null or a live pointer from `oggbridge_encoder_init`.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_encoder_data_len(session: *const EncodingSession) -> usize {
    session.as_ref().map_or(0, |s| s.data_len())
}

/// Move the pending encoded bytes out of the session.
///
/// Writes the length to `out_len` and returns a buffer the caller releases
/// with `oggbridge_free_bytes`. Returns null (length 0) when nothing is pending.
///
/// The drained bytes still share the sink's allocation, so they are copied
/// once into a buffer owned by the caller. Rust callers use
/// `EncodingSession::drain` and get them without a copy.
///
/// # Safety
///
/// `session` must be null or a live pointer from `oggbridge_encoder_init`;
/// `out_len` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_encoder_transfer_data(
    session: *mut EncodingSession,
    out_len: *mut usize,
) -> *mut u8 {
    let data = session.as_mut().and_then(|s| s.drain());
    let (buffer, len) = match data {
        Some(bytes) => {
            let boxed = Vec::from(bytes).into_boxed_slice();
            let len = boxed.len();
            (Box::into_raw(boxed) as *mut u8, len)
        }
        None => (ptr::null_mut(), 0),
    };
    if let Some(out_len) = out_len.as_mut() {
        *out_len = len;
    }
    buffer
}

/// Release a session and everything it owns
///
/// # Safety
///
/// `session` must be null or a pointer from `oggbridge_encoder_init` that has
/// not been cleared yet.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_encoder_clear(session: *mut EncodingSession) {
    if session.is_null() {
        return;
    }
    Box::from_raw(session).close();
}

/// Scan an Ogg Vorbis stream and return its tags packed.
///
/// Release the result with `oggbridge_free_string`. Returns null when the
/// stream cannot be scanned.
///
/// # Safety
///
/// `bytes` must be null or valid for reads of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_decode_comments(bytes: *const u8, len: usize) -> *mut c_char {
    if bytes.is_null() || len == 0 {
        return ptr::null_mut();
    }
    let data = slice::from_raw_parts(bytes, len);
    let Some(packed) = scan_packed(data) else {
        return ptr::null_mut();
    };
    match CString::new(packed) {
        Ok(packed) => packed.into_raw(),
        Err(_) => {
            log::warn!("tag blob contains a NUL byte");
            ptr::null_mut()
        }
    }
}

/// Release a buffer from `oggbridge_encoder_transfer_data`
///
/// # Safety
///
/// `ptr` and `len` must be exactly what the transfer returned, released once.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_free_bytes(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
}

/// Release a string from `oggbridge_decode_comments`
///
/// # Safety
///
/// `ptr` must come from `oggbridge_decode_comments` and be released once.
#[no_mangle]
pub unsafe extern "C" fn oggbridge_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(CString::from_raw(ptr));
}
