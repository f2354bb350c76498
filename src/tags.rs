// Vorbis comment tags and the tab-separated blob used to move them across the host boundary
//
// Blob format: UTF-8, `name=value` fragments joined by a horizontal tab,
// no trailing separator and no escaping. Only the first `=` of a fragment
// splits name from value, so values may contain `=`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator between packed tag fragments
pub const TAG_DELIMITER: char = '\t';

/// Identifying tag added to every stream this crate encodes
pub const ENCODER_TAG: &str = "ENCODER";
pub const ENCODER_NAME: &str = "oggbridge";

/// A single `name=value` comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    pub value: String,
}

impl TagEntry {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        TagEntry {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse one `name=value` fragment, splitting on the first `=`
    pub fn parse(fragment: &str) -> Option<Self> {
        fragment
            .split_once('=')
            .map(|(name, value)| TagEntry::new(name, value))
    }

    /// Reject characters that would corrupt a packed blob
    pub fn validate(&self) -> Result<()> {
        if self.name.contains('=') {
            return Err(Error::InvalidTag(format!(
                "name \"{}\" contains reserved character \"=\"",
                self.name
            )));
        }
        if self.name.contains(TAG_DELIMITER) {
            return Err(Error::InvalidTag(format!(
                "name \"{}\" contains reserved character (tab)",
                self.name
            )));
        }
        if self.value.contains(TAG_DELIMITER) {
            return Err(Error::InvalidTag(format!(
                "value \"{}\" contains reserved character (tab)",
                self.value
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for TagEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl std::str::FromStr for TagEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = TagEntry::parse(s)
            .ok_or_else(|| Error::InvalidTag(format!("\"{}\" is not NAME=VALUE", s)))?;
        tag.validate()?;
        Ok(tag)
    }
}

/// Join tags into a blob
pub fn pack(tags: &[TagEntry]) -> String {
    let mut packed = String::with_capacity(
        tags.iter()
            .map(|t| t.name.len() + t.value.len() + 2)
            .sum(),
    );
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            packed.push(TAG_DELIMITER);
        }
        packed.push_str(&tag.name);
        packed.push('=');
        packed.push_str(&tag.value);
    }
    packed
}

/// Split a blob back into tags. Fragments without `=` are dropped.
pub fn unpack(blob: &str) -> Vec<TagEntry> {
    if blob.is_empty() {
        return Vec::new();
    }

    blob.split(TAG_DELIMITER)
        .filter_map(|fragment| {
            let tag = TagEntry::parse(fragment);
            if tag.is_none() && !fragment.is_empty() {
                log::debug!("dropping tag fragment without '=': {:?}", fragment);
            }
            tag
        })
        .collect()
}

/// First value whose name matches, ignoring ASCII case
pub fn find<'a>(tags: &'a [TagEntry], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .map(|t| t.value.as_str())
}

/// Common Vorbis comment field names
pub struct VorbisFields;
impl VorbisFields {
    pub const TITLE: &'static str = "TITLE";
    pub const ARTIST: &'static str = "ARTIST";
    pub const ALBUM: &'static str = "ALBUM";
    pub const DATE: &'static str = "DATE";
    pub const TRACKNUMBER: &'static str = "TRACKNUMBER";
    pub const GENRE: &'static str = "GENRE";
    pub const COMMENT: &'static str = "COMMENT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_joins_with_tabs_without_trailing_separator() {
        let tags = vec![
            TagEntry::new("TITLE", "Test"),
            TagEntry::new("ARTIST", "Someone"),
        ];
        assert_eq!(pack(&tags), "TITLE=Test\tARTIST=Someone");
    }

    #[test]
    fn pack_of_nothing_is_empty() {
        assert_eq!(pack(&[]), "");
    }

    #[test]
    fn unpack_splits_on_first_equals_only() {
        let tags = unpack("EQUATION=a=b+c");
        assert_eq!(tags, vec![TagEntry::new("EQUATION", "a=b+c")]);
    }

    #[test]
    fn unpack_drops_fragments_without_equals() {
        let tags = unpack("TITLE=Song\tgarbage\t\tALBUM=");
        assert_eq!(
            tags,
            vec![TagEntry::new("TITLE", "Song"), TagEntry::new("ALBUM", "")]
        );
    }

    #[test]
    fn unpack_empty_blob_yields_no_tags() {
        assert!(unpack("").is_empty());
    }

    #[test]
    fn validate_rejects_reserved_characters() {
        assert!(TagEntry::new("A=B", "x").validate().is_err());
        assert!(TagEntry::new("A\tB", "x").validate().is_err());
        assert!(TagEntry::new("A", "x\ty").validate().is_err());
        assert!(TagEntry::new("A", "x=y").validate().is_ok());
    }

    #[test]
    fn from_str_requires_name_value_form() {
        let tag: TagEntry = "GENRE=Ambient".parse().unwrap();
        assert_eq!(tag, TagEntry::new("GENRE", "Ambient"));
        assert!("GENRE".parse::<TagEntry>().is_err());
    }

    #[test]
    fn find_ignores_case() {
        let tags = vec![TagEntry::new("Title", "x")];
        assert_eq!(find(&tags, VorbisFields::TITLE), Some("x"));
        assert_eq!(find(&tags, VorbisFields::ARTIST), None);
    }
}
