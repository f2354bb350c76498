//! Property-based tests for the packed tag format.
//!
//! Covers the pack/unpack law on valid tags and checks that tags survive a
//! trip through the encoder and the tag scanner.

use oggbridge::tags::{find, pack, unpack, TagEntry, ENCODER_NAME, ENCODER_TAG};
use oggbridge::{scan_tags, EncoderConfig, EncodingSession};
use proptest::prelude::*;

fn tag_strategy() -> impl Strategy<Value = TagEntry> {
    ("[^=\t]{0,12}", "[^\t]{0,24}").prop_map(|(name, value)| TagEntry::new(name, value))
}

// Comment names as written by real taggers; values without NUL or tab
fn vorbis_tag_strategy() -> impl Strategy<Value = TagEntry> {
    ("[A-Z][A-Z_]{0,9}", "[^\t\u{0}]{0,32}").prop_map(|(name, value)| TagEntry::new(name, value))
}

proptest! {
    /// Packing valid tags and unpacking the blob yields the same list.
    #[test]
    fn unpack_inverts_pack(tags in prop::collection::vec(tag_strategy(), 0..8)) {
        prop_assert!(tags.iter().all(|t| t.validate().is_ok()));
        prop_assert_eq!(unpack(&pack(&tags)), tags);
    }

    /// Whatever the input, unpacked tags are valid and re-pack without loss.
    #[test]
    fn unpack_output_is_always_valid(blob in "[a-zA-Z0-9= \t]{0,64}") {
        let tags = unpack(&blob);
        for tag in &tags {
            prop_assert!(tag.validate().is_ok());
        }
        prop_assert_eq!(unpack(&pack(&tags)), tags);
    }

    /// Fragments without '=' never produce a tag.
    #[test]
    fn fragments_without_separator_are_dropped(words in prop::collection::vec("[^=\t]{1,10}", 1..6)) {
        prop_assert!(unpack(&words.join("\t")).is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Tags given to the encoder come back from the scanner in order,
    /// after the fixed encoder tag.
    #[test]
    fn encoded_tags_are_scanned_back(tags in prop::collection::vec(vorbis_tag_strategy(), 0..5)) {
        let mut session = EncodingSession::init(1, 22050, 0.3, Some(&pack(&tags))).unwrap();
        session.finish().unwrap();
        let data = session.drain().unwrap();

        let scanned = scan_tags(&data).unwrap();
        prop_assert_eq!(&scanned[0], &TagEntry::new(ENCODER_TAG, ENCODER_NAME));
        prop_assert_eq!(&scanned[1..], tags.as_slice());
    }
}

#[test]
fn duplicate_names_are_preserved() {
    let config = EncoderConfig::new(2, 48000, 0.5)
        .with_tag("ARTIST", "First")
        .with_tag("ARTIST", "Second");
    let mut session = EncodingSession::new(&config).unwrap();
    let data = session.drain().unwrap();

    let tags = scan_tags(&data).unwrap();
    let artists: Vec<&str> = tags
        .iter()
        .filter(|t| t.name == "ARTIST")
        .map(|t| t.value.as_str())
        .collect();
    assert_eq!(artists, vec!["First", "Second"]);
    assert_eq!(find(&tags, "artist"), Some("First"));
}

#[test]
fn blob_with_malformed_fragments_still_encodes() {
    let mut session =
        EncodingSession::init(1, 44100, 0.5, Some("TITLE=Song\tnonsense\t\tGENRE=a=b")).unwrap();
    let data = session.drain().unwrap();
    assert_eq!(
        pack(&scan_tags(&data).unwrap()),
        "ENCODER=oggbridge\tTITLE=Song\tGENRE=a=b"
    );
}
