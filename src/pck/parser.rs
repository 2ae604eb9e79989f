//! PCK archive decoder.
//!
//! ## Decoding Strategy
//!
//! The archive is read front to back from a single in-memory buffer:
//! 1. Read the name section size and the first name offset; the entry
//!    count is that first offset divided by four
//! 2. Read every null-terminated name through the offset table
//! 3. Jump to the payload section (the name section size rounded up to
//!    8 bytes) and read one (offset, length) record per name
//! 4. Pair names and payloads by index
//!
//! Stored sizes are never trusted: every range is checked against the
//! buffer before it is sliced.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Error, Result};

use super::structures::*;

/// Decode a whole archive buffer into its ordered entries.
///
/// # Arguments
///
/// * `data` - The complete archive, as read from disk
///
/// # Returns
///
/// The entries in on-disk order, each name paired with the payload record
/// at the same index.
///
/// # Errors
///
/// Returns [`Error::MalformedArchive`] if any field points outside the
/// buffer or holds a negative length or offset. Unexpected section tags and
/// a mismatched payload count are only logged.
pub fn decode(data: &[u8]) -> Result<Vec<Entry>> {
    let name_section_size = read_len(data, NAME_SECTION_SIZE_OFFSET, "name section size")?;
    if name_section_size < NAME_TABLE_OFFSET || name_section_size > data.len() {
        return Err(malformed(format!(
            "name section size {} outside of {}..={}",
            name_section_size,
            NAME_TABLE_OFFSET,
            data.len()
        )));
    }
    check_tag(data, 0, FILENAME_TAG);

    let names = read_names(&data[..name_section_size])?;

    let pack_offset = align_up(name_section_size, NAME_SECTION_ALIGN);
    check_tag(data, pack_offset, PACK_TAG);

    let stored_count = read_i32(data, pack_offset + TAG_SIZE + 4)?;
    if usize::try_from(stored_count).ok() != Some(names.len()) {
        tracing::warn!(
            "payload section lists {} entries but the name section has {}",
            stored_count,
            names.len()
        );
    }

    let records_offset = pack_offset + PACK_HEADER_SIZE;
    let records_len = names.len() * PACK_RECORD_SIZE;
    let records = slice(data, records_offset, records_len, "payload records")?;
    let mut cursor = Cursor::new(records);

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let offset = cursor.read_i32::<LittleEndian>()?;
        let size = cursor.read_i32::<LittleEndian>()?;
        let offset = to_len(offset, "payload offset")?;
        let size = to_len(size, "payload size")?;

        let payload = slice(data, offset, size, &format!("payload of \"{}\"", name))?;
        entries.push(Entry::new(name, payload));
    }

    Ok(entries)
}

/// Read the names through the offset table.
///
/// The table holds no count of its own: the first offset points just past
/// the table, so it equals `count * 4`.
///
/// # Arguments
///
/// * `section` - The name section without its trailing padding
///
/// # Returns
///
/// The names in table order; empty if the section is too short to hold an
/// offset table.
fn read_names(section: &[u8]) -> Result<Vec<String>> {
    // No room for an offset table: the archive is empty.
    if section.len() < NAME_TABLE_OFFSET + 4 {
        return Ok(Vec::new());
    }

    let first = read_len(section, NAME_TABLE_OFFSET, "first name offset")?;
    if first % 4 != 0 {
        return Err(malformed(format!(
            "first name offset {} is not a multiple of 4",
            first
        )));
    }
    let count = first / 4;
    let table = slice(section, NAME_TABLE_OFFSET, first, "name offset table")?;
    let mut cursor = Cursor::new(table);

    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = to_len(cursor.read_i32::<LittleEndian>()?, "name offset")?;
        names.push(read_cstr(section, NAME_TABLE_OFFSET + offset)?);
    }
    Ok(names)
}

/// Read a null-terminated name, one byte per char.
///
/// # Arguments
///
/// * `section` - The name section; the terminator must lie inside it
/// * `start` - Offset of the first name byte within `section`
///
/// # Returns
///
/// The name without its terminator.
fn read_cstr(section: &[u8], start: usize) -> Result<String> {
    let bytes = section
        .get(start..)
        .ok_or_else(|| malformed(format!("name offset {} outside of name section", start)))?;
    let end = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| malformed(format!("name at {} is not null-terminated", start)))?;
    Ok(bytes[..end].iter().map(|&b| b as char).collect())
}

fn check_tag(data: &[u8], offset: usize, text: &str) {
    let Ok(expected) = format_tag(text) else {
        return;
    };
    if data.get(offset..offset + TAG_SIZE) != Some(&expected[..]) {
        tracing::warn!("section tag at {:#x} is not \"{}\"", offset, text);
    }
}

fn slice<'a>(data: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            malformed(format!(
                "{} at {:#x}+{} exceeds buffer of {} bytes",
                what,
                offset,
                len,
                data.len()
            ))
        })
}

fn read_i32(data: &[u8], offset: usize) -> Result<i32> {
    let mut field = slice(data, offset, 4, "field")?;
    Ok(field.read_i32::<LittleEndian>()?)
}

/// Read a field that must hold a non-negative length or offset.
fn read_len(data: &[u8], offset: usize, what: &str) -> Result<usize> {
    let mut field = slice(data, offset, 4, what)?;
    to_len(field.read_i32::<LittleEndian>()?, what)
}

fn to_len(value: i32, what: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| malformed(format!("negative {}: {}", what, value)))
}

fn malformed(msg: String) -> Error {
    Error::MalformedArchive(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pck::writer::encode;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Entry> {
        vec![
            Entry::new("a.ogg", vec![0xAA; 10]),
            Entry::new("bb.ogg", vec![0xBB; 10]),
        ]
    }

    #[test]
    fn decodes_encoder_output() {
        let bytes = encode(&sample()).unwrap();
        assert_eq!(decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn recovers_entry_count_from_first_offset() {
        for count in [0usize, 1, 2, 100] {
            let entries: Vec<_> = (0..count)
                .map(|i| Entry::new(format!("sound_{}.ogg", i), vec![i as u8; i % 37]))
                .collect();
            let bytes = encode(&entries).unwrap();
            if count > 0 {
                assert_eq!(read_i32(&bytes, NAME_TABLE_OFFSET).unwrap() as usize, count * 4);
            }
            let decoded = decode(&bytes).unwrap();
            assert_eq!(decoded.len(), count);
            assert_eq!(decoded, entries);
        }
    }

    #[test]
    fn pairs_names_and_payloads_by_index() {
        // Payload records point at the data in reverse order; the names
        // still pair with records by position.
        let mut bytes = encode(&sample()).unwrap();
        let pack_offset = align_up(read_len(&bytes, NAME_SECTION_SIZE_OFFSET, "").unwrap(), 8);
        let first = pack_offset + PACK_HEADER_SIZE;
        let second = first + PACK_RECORD_SIZE;
        let (a, b) = bytes.split_at_mut(second);
        a[first..].swap_with_slice(&mut b[..PACK_RECORD_SIZE]);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded[0].name, "a.ogg");
        assert_eq!(decoded[0].data, vec![0xBB; 10]);
        assert_eq!(decoded[1].name, "bb.ogg");
        assert_eq!(decoded[1].data, vec![0xAA; 10]);
    }

    #[test]
    fn truncated_buffer_is_malformed() {
        let bytes = encode(&sample()).unwrap();
        for len in [0, 10, 23, 30, 64, bytes.len() - 20] {
            assert!(
                matches!(decode(&bytes[..len]), Err(Error::MalformedArchive(_))),
                "length {} decoded",
                len
            );
        }
    }

    #[test]
    fn payload_past_end_is_malformed() {
        let mut bytes = encode(&sample()).unwrap();
        let pack_offset = align_up(read_len(&bytes, NAME_SECTION_SIZE_OFFSET, "").unwrap(), 8);
        let size_field = pack_offset + PACK_HEADER_SIZE + 4;
        bytes[size_field..size_field + 4].copy_from_slice(&0x1000i32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(Error::MalformedArchive(_))));
    }

    #[test]
    fn negative_fields_are_malformed() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[NAME_SECTION_SIZE_OFFSET..NAME_SECTION_SIZE_OFFSET + 4]
            .copy_from_slice(&(-8i32).to_le_bytes());
        assert!(matches!(decode(&bytes), Err(Error::MalformedArchive(_))));
    }

    #[test]
    fn unterminated_name_is_malformed() {
        let mut bytes = encode(&[Entry::new("x", vec![1])]).unwrap();
        // name section: tag, size, one offset, "x\0"
        let terminator = NAME_TABLE_OFFSET + 4 + 1;
        assert_eq!(bytes[terminator], 0);
        bytes[terminator] = b'y';
        assert!(matches!(decode(&bytes), Err(Error::MalformedArchive(_))));
    }

    #[test]
    fn unexpected_tags_are_tolerated() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[..TAG_SIZE].copy_from_slice(&[b'?'; TAG_SIZE]);
        assert_eq!(decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn unexpected_pack_tag_and_count_are_tolerated() {
        let mut bytes = encode(&sample()).unwrap();
        let pack_offset = align_up(read_len(&bytes, NAME_SECTION_SIZE_OFFSET, "").unwrap(), 8);
        bytes[pack_offset..pack_offset + TAG_SIZE].copy_from_slice(&format_tag("Data").unwrap());
        let count_field = pack_offset + TAG_SIZE + 4;
        bytes[count_field..count_field + 4].copy_from_slice(&7i32.to_le_bytes());

        assert_eq!(decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn high_bytes_in_names_map_to_chars() {
        let mut bytes = encode(&[Entry::new("a", vec![])]).unwrap();
        bytes[NAME_TABLE_OFFSET + 4] = 0xE9;
        assert_eq!(decode(&bytes).unwrap()[0].name, "\u{e9}");
    }
}
