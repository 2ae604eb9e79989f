//! PCK archive encoder.
//!
//! Entries are kept as one ordered list in memory and only split into the
//! two parallel on-disk tables (names, payload records) here.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};

use super::structures::*;

/// Serialize `entries` into a complete archive buffer.
pub fn encode(entries: &[Entry]) -> Result<Vec<u8>> {
    let names = write_name_section(entries)?;
    let pack = write_pack_section(entries, names.len())?;

    let mut out = names;
    out.extend_from_slice(&pack);
    pad_to(&mut out, FILE_ALIGN);
    Ok(out)
}

/// Tag, size, offset table and null-terminated names, padded to 8 bytes.
fn write_name_section(entries: &[Entry]) -> Result<Vec<u8>> {
    let table_len = entries.len() * 4;

    let mut offsets = Vec::with_capacity(entries.len());
    let mut name_bytes = Vec::new();
    for entry in entries {
        offsets.push(to_i32(name_bytes.len() + table_len, "name offset")?);
        name_bytes.extend(name_to_ascii(&entry.name)?);
        name_bytes.push(0);
    }

    let mut section = Vec::with_capacity(NAME_TABLE_OFFSET + table_len + name_bytes.len());
    section.extend_from_slice(&format_tag(FILENAME_TAG)?);
    // size, filled in once the section is complete
    section.write_i32::<LittleEndian>(0)?;
    for offset in offsets {
        section.write_i32::<LittleEndian>(offset)?;
    }
    section.extend_from_slice(&name_bytes);

    let size = to_i32(section.len(), "name section size")?;
    LittleEndian::write_i32(
        &mut section[NAME_SECTION_SIZE_OFFSET..NAME_TABLE_OFFSET],
        size,
    );

    pad_to(&mut section, NAME_SECTION_ALIGN);
    Ok(section)
}

/// Tag, header size, count, payload records, reserved word and the 16 byte
/// aligned payloads. `name_section_len` is the padded length of the section
/// before it; data offsets are absolute.
fn write_pack_section(entries: &[Entry], name_section_len: usize) -> Result<Vec<u8>> {
    let header_len = PACK_HEADER_SIZE + entries.len() * PACK_RECORD_SIZE;
    let data_start = name_section_len + header_len + PACK_RESERVED_SIZE;

    let mut records = Vec::with_capacity(entries.len() * PACK_RECORD_SIZE);
    let mut data = Vec::new();
    for entry in entries {
        records.write_i32::<LittleEndian>(to_i32(data_start + data.len(), "payload offset")?)?;
        records.write_i32::<LittleEndian>(to_i32(entry.size(), "payload size")?)?;
        data.extend_from_slice(&entry.data);
        pad_to(&mut data, DATA_ALIGN);
    }

    let mut section = Vec::with_capacity(header_len + PACK_RESERVED_SIZE + data.len());
    section.extend_from_slice(&format_tag(PACK_TAG)?);
    section.write_i32::<LittleEndian>(to_i32(header_len, "pack header size")?)?;
    section.write_i32::<LittleEndian>(to_i32(entries.len(), "entry count")?)?;
    section.extend_from_slice(&records);
    section.write_i32::<LittleEndian>(0)?;
    section.extend_from_slice(&data);
    Ok(section)
}

/// Names are stored as ASCII; anything else becomes `?`.
fn name_to_ascii(name: &str) -> Result<Vec<u8>> {
    if name.contains('\0') {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(name
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect())
}

fn pad_to(buf: &mut Vec<u8>, align: usize) {
    buf.resize(align_up(buf.len(), align), 0);
}

fn to_i32(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::ArchiveTooLarge(format!("{} {}", what, value)))
}
