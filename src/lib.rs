//! # pckedit
//!
//! A Rust editor for PCK sound archives.
//!
//! A PCK archive packs many independently encoded sounds together with a
//! name index. This library decodes an archive into an ordered list of
//! named payloads, encodes such a list back into a byte-exact archive, and
//! builds the usual editing operations on top. Payload bytes are opaque:
//! no audio format is decoded or validated.
//!
//! ## Features
//!
//! - Decode and encode the two-section PCK layout with its 8 and 16 byte alignment
//! - Extract every sound, or a single sound by name
//! - Repack a folder of sounds in a caller-chosen order
//! - Replace one sound in place
//! - List the sound names
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use pckedit::{Archive, LocalStorage, PckEditor};
//!
//! fn main() -> pckedit::Result<()> {
//!     let editor = PckEditor::new(Arc::new(LocalStorage::new()));
//!
//!     // List the sounds of an archive
//!     let archive = editor.open(Path::new("bgm.pck"))?;
//!     for name in archive.names() {
//!         println!("{}", name);
//!     }
//!
//!     // Build one in memory
//!     let mut archive = Archive::new();
//!     archive.add_entry("title.ogg", std::fs::read("title.ogg")?);
//!     editor.save(&archive, Path::new("title.pck"))?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod pck;

pub use cli::{Cli, Mode};
pub use error::{Error, Result};
pub use io::{LocalStorage, MemoryStorage, Storage};
pub use pck::{Archive, Entry, PckEditor, decode, encode, read_name_list};
