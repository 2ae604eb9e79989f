//! PCK sound archive codec and editor.
//!
//! ## PCK Format Overview
//!
//! A PCK file is two sections, all integers 32-bit little-endian signed:
//!
//! 1. Name section
//!    - `"Filename"` tag, space padded to 0x14 bytes
//!    - section size (excluding the trailing padding)
//!    - offset table, one entry per name, relative to the start of the table
//!    - null-terminated names
//!    - zero padding to 8 byte alignment
//! 2. Payload section
//!    - `"Pack"` tag, space padded to 0x14 bytes
//!    - header size (tag, size, count and records)
//!    - entry count
//!    - one record per entry: absolute data offset and data length
//!    - a reserved zero word
//!    - the payloads, each zero padded to 16 bytes
//!
//! The whole file is zero padded to 16 bytes. There is no stored count in
//! the name section: the first name offset always equals `count * 4`, which
//! is how readers recover the count.
//!
//! - [`structures`]: [`Entry`], [`Archive`] and format constants
//! - [`parser`]: decoding a buffer into entries
//! - [`writer`]: encoding entries into a buffer
//! - [`editor`]: extract, list, repack and replace on top of a [`Storage`](crate::io::Storage)

mod editor;
mod parser;
mod structures;
mod writer;

pub use editor::{PckEditor, read_name_list};
pub use parser::decode;
pub use structures::*;
pub use writer::encode;
