use std::ffi::{CStr, CString};
use std::mem;
use std::slice;

use aotuv_lancer_vorbis_sys::{
    vorbis_comment, vorbis_comment_add_tag, vorbis_comment_clear, vorbis_comment_init,
};

use crate::error::{Error, Result};
use crate::tags::TagEntry;
use crate::utils::encoding::{decode_text, TextEncoding};

/// Owned `vorbis_comment`: vendor string plus user comments
pub struct CommentList {
    raw: Box<vorbis_comment>,
}

impl CommentList {
    pub fn new() -> Self {
        let mut raw: Box<vorbis_comment> = Box::new(unsafe { mem::zeroed() });
        unsafe {
            vorbis_comment_init(&mut *raw);
        }
        CommentList { raw }
    }

    /// Append one comment. libvorbis stores it as `name=value`.
    pub fn add(&mut self, name: &str, value: &str) -> Result<()> {
        let name = CString::new(name)
            .map_err(|_| Error::InvalidTag(format!("name {:?} contains a NUL byte", name)))?;
        let value = CString::new(value)
            .map_err(|_| Error::InvalidTag(format!("value {:?} contains a NUL byte", value)))?;
        unsafe {
            vorbis_comment_add_tag(&mut *self.raw, name.as_ptr(), value.as_ptr());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.raw.comments.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw comment bytes in stored order
    pub fn raw_comments(&self) -> Vec<&[u8]> {
        let count = self.len();
        if count == 0 || self.raw.user_comments.is_null() || self.raw.comment_lengths.is_null() {
            return Vec::new();
        }
        let (comments, lengths) = unsafe {
            (
                slice::from_raw_parts(self.raw.user_comments, count),
                slice::from_raw_parts(self.raw.comment_lengths, count),
            )
        };
        comments
            .iter()
            .zip(lengths)
            .filter(|(ptr, _)| !ptr.is_null())
            .map(|(&ptr, &len)| unsafe {
                slice::from_raw_parts(ptr as *const u8, len.max(0) as usize)
            })
            .collect()
    }

    /// Comments split into tags. Entries without `=` are skipped.
    pub fn entries(&self) -> Vec<TagEntry> {
        self.raw_comments()
            .into_iter()
            .filter_map(|bytes| {
                let (text, encoding) = decode_text(bytes);
                if encoding != TextEncoding::Utf8 {
                    log::debug!("comment is not valid UTF-8, decoded as {:?}", encoding);
                }
                let tag = TagEntry::parse(&text);
                if tag.is_none() {
                    log::debug!("skipping comment without '=': {:?}", text);
                }
                tag
            })
            .collect()
    }

    /// Vendor string, set when a comment header has been parsed
    pub fn vendor(&self) -> Option<String> {
        if self.raw.vendor.is_null() {
            return None;
        }
        let bytes = unsafe { CStr::from_ptr(self.raw.vendor) }.to_bytes();
        Some(decode_text(bytes).0.into_owned())
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut vorbis_comment {
        &mut *self.raw
    }
}

impl Default for CommentList {
    fn default() -> Self {
        CommentList::new()
    }
}

impl Drop for CommentList {
    fn drop(&mut self) {
        unsafe {
            vorbis_comment_clear(&mut *self.raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_comments_come_back_in_order() {
        let mut comments = CommentList::new();
        comments.add("ENCODER", "oggbridge").unwrap();
        comments.add("TITLE", "a=b").unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(
            comments.entries(),
            vec![TagEntry::new("ENCODER", "oggbridge"), TagEntry::new("TITLE", "a=b")]
        );
    }

    #[test]
    fn nul_bytes_are_rejected() {
        let mut comments = CommentList::new();
        assert!(comments.add("BAD\0NAME", "x").is_err());
        assert!(comments.is_empty());
    }

    #[test]
    fn fresh_list_has_no_vendor() {
        assert!(CommentList::new().vendor().is_none());
    }
}
