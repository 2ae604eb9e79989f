use crate::error::{Error, Result};

/// Width of a section tag: the tag text padded with spaces.
pub const TAG_SIZE: usize = 0x14;

/// Tag opening the name section.
pub const FILENAME_TAG: &str = "Filename";

/// Tag opening the payload section.
pub const PACK_TAG: &str = "Pack";

/// Offset of the name section size field.
pub const NAME_SECTION_SIZE_OFFSET: usize = TAG_SIZE;

/// Offset of the name offset table; name offsets are relative to it.
pub const NAME_TABLE_OFFSET: usize = TAG_SIZE + 4;

/// Tag, size field and count field of the payload section.
pub const PACK_HEADER_SIZE: usize = TAG_SIZE + 8;

/// One payload record: absolute data offset and data length.
pub const PACK_RECORD_SIZE: usize = 8;

/// Reserved zero word between the payload records and the data.
pub const PACK_RESERVED_SIZE: usize = 4;

pub const NAME_SECTION_ALIGN: usize = 8;
pub const DATA_ALIGN: usize = 16;
pub const FILE_ALIGN: usize = 16;

/// Round `value` up to the next multiple of `align`.
pub fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

/// Format a section tag: the text followed by spaces up to [`TAG_SIZE`] bytes.
pub fn format_tag(text: &str) -> Result<[u8; TAG_SIZE]> {
    if text.len() > TAG_SIZE {
        return Err(Error::NameTooLong(text.to_string()));
    }
    let mut tag = [b' '; TAG_SIZE];
    tag[..text.len()].copy_from_slice(text.as_bytes());
    Ok(tag)
}

/// A named sound payload. The bytes are opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Payload length in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// An ordered list of entries; the order is the on-disk layout.
///
/// Names are not required to be unique. Lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    entries: Vec<Entry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete archive buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        super::parser::decode(data).map(|entries| Self { entries })
    }

    /// Serialize the archive, recomputing every offset, size and padding field.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        super::writer::encode(&self.entries)
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn add_entry(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.push(Entry::new(name, data));
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Put `entry` at `index`, returning the entry it displaced.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace(&mut self, index: usize, entry: Entry) -> Entry {
        std::mem::replace(&mut self.entries[index], entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Entry> for Archive {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_space_padded() {
        let tag = format_tag(PACK_TAG).unwrap();
        assert_eq!(&tag[..4], b"Pack");
        assert!(tag[4..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn tag_of_exact_width_is_accepted() {
        let text = "A".repeat(TAG_SIZE);
        assert_eq!(format_tag(&text).unwrap(), [b'A'; TAG_SIZE]);
    }

    #[test]
    fn overlong_tag_is_rejected() {
        let text = "A".repeat(TAG_SIZE + 1);
        assert!(matches!(format_tag(&text), Err(Error::NameTooLong(t)) if t == text));
    }

    #[test]
    fn align_up_rounds_to_boundary() {
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(1, 16), 16);
        assert_eq!(align_up(16, 16), 16);
        assert_eq!(align_up(25, 8), 32);
    }

    #[test]
    fn collects_entries_in_order() {
        let archive: Archive = ["b.ogg", "a.ogg"]
            .into_iter()
            .map(|name| Entry::new(name, name.as_bytes()))
            .collect();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.names().collect::<Vec<_>>(), ["b.ogg", "a.ogg"]);
        assert_eq!(archive.entries()[1].data, b"a.ogg");
    }

    #[test]
    fn lookups_return_first_match() {
        let mut archive = Archive::new();
        archive.add_entry("a.ogg", vec![1]);
        archive.add_entry("b.ogg", vec![2]);
        archive.add_entry("a.ogg", vec![3]);

        assert_eq!(archive.position("a.ogg"), Some(0));
        assert_eq!(archive.find("a.ogg").map(|e| e.data.clone()), Some(vec![1]));
        assert_eq!(archive.position("c.ogg"), None);

        let old = archive.replace(1, Entry::new("c.ogg", vec![4]));
        assert_eq!(old.name, "b.ogg");
        assert_eq!(archive.names().collect::<Vec<_>>(), ["a.ogg", "c.ogg", "a.ogg"]);
    }
}
