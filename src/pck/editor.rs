use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::io::Storage;

use super::structures::{Archive, Entry};

/// High-level PCK operations on top of a [`Storage`].
///
/// Every operation reads and decodes the whole archive, or builds and
/// encodes the whole output, before anything is written. A malformed input
/// therefore never leaves a half-written file behind.
pub struct PckEditor<S: Storage> {
    storage: Arc<S>,
    clean_output: bool,
}

impl<S: Storage> PckEditor<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            clean_output: false,
        }
    }

    /// Remove and re-create the destination directory of `extract_all` and
    /// `replace` before writing into it.
    ///
    /// The input is decoded first, but a write failure after the cleanup
    /// still leaves the directory partially filled. A destination that
    /// contains the input archive is never removed.
    pub fn with_clean_output(mut self, clean: bool) -> Self {
        self.clean_output = clean;
        self
    }

    /// Read and decode an archive file.
    pub fn open(&self, path: &Path) -> Result<Archive> {
        if !self.storage.exists(path) {
            return Err(Error::ArchiveNotFound(path.to_path_buf()));
        }
        let data = self.storage.read(path)?;
        Archive::from_bytes(&data)
    }

    /// Encode an archive and write it to `path`.
    pub fn save(&self, archive: &Archive, path: &Path) -> Result<()> {
        let data = archive.to_bytes()?;
        self.storage.write(path, &data)
    }

    /// Build an entry from a file; the entry is named after the file's basename.
    pub fn load_entry(&self, path: &Path) -> Result<Entry> {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| Error::InvalidName(path.display().to_string()))?;
        let data = self.storage.read(path)?;
        Ok(Entry::new(name, data))
    }

    /// Write every entry to `<dest>/<name>`, in archive order.
    ///
    /// Returns the number of entries written.
    pub fn extract_all(&self, archive_path: &Path, dest: &Path) -> Result<usize> {
        let archive = self.open(archive_path)?;
        for entry in archive.entries() {
            check_file_name(&entry.name)?;
        }

        info!(
            "Exporting {} sounds to \"{}\"...",
            archive.len(),
            dest.display()
        );
        self.prepare_dir(dest, self.may_clean(archive_path, dest))?;
        for entry in archive.entries() {
            debug!("Exporting \"{}\"...", entry.name);
            self.storage.write(&dest.join(&entry.name), &entry.data)?;
        }

        Ok(archive.len())
    }

    /// Write the first entry called `name` to `<dest>/<name>`.
    ///
    /// Nothing is written if the archive has no such entry.
    pub fn extract_one(&self, archive_path: &Path, name: &str, dest: &Path) -> Result<PathBuf> {
        let archive = self.open(archive_path)?;
        let entry = archive
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        check_file_name(&entry.name)?;

        info!("Exporting {}...", entry.name);
        self.prepare_dir(dest, false)?;
        let output = dest.join(&entry.name);
        self.storage.write(&output, &entry.data)?;
        Ok(output)
    }

    /// Build a new archive at `output` from `<source_dir>/<name>` for each
    /// name, in the given order. Entries keep the names exactly as listed.
    pub fn repack<N: AsRef<str>>(
        &self,
        output: &Path,
        source_dir: &Path,
        names: &[N],
    ) -> Result<usize> {
        let mut archive = Archive::new();
        for name in names {
            let name = name.as_ref();
            let path = source_dir.join(name);
            debug!("Adding \"{}\" to PCK...", path.display());
            archive.add_entry(name, self.storage.read(&path)?);
        }

        info!("Writing a new PCK file at \"{}\"...", output.display());
        self.prepare_parent(output)?;
        self.save(&archive, output)?;
        Ok(archive.len())
    }

    /// Swap the entry `old_name` for the contents of `new_file` and write the
    /// result to `<dest>/<archive file name>`.
    ///
    /// The replacement keeps the old entry's position but takes the new
    /// file's basename as its name.
    pub fn replace(
        &self,
        archive_path: &Path,
        old_name: &str,
        new_file: &Path,
        dest: &Path,
    ) -> Result<PathBuf> {
        let mut archive = self.open(archive_path)?;
        let index = archive
            .position(old_name)
            .ok_or_else(|| Error::EntryNotFound(old_name.to_string()))?;

        let entry = self.load_entry(new_file)?;
        info!(
            "Replacing \"{}\" with \"{}\"...",
            old_name,
            new_file.display()
        );
        archive.replace(index, entry);
        let data = archive.to_bytes()?;

        let file_name = archive_path
            .file_name()
            .ok_or_else(|| Error::ArchiveNotFound(archive_path.to_path_buf()))?;
        self.prepare_dir(dest, self.may_clean(archive_path, dest))?;
        let output = dest.join(file_name);
        self.storage.write(&output, &data)?;
        Ok(output)
    }

    /// Write the entry names, one per line, to `output` and return them.
    pub fn list(&self, archive_path: &Path, output: &Path) -> Result<Vec<String>> {
        let archive = self.open(archive_path)?;
        let names: Vec<String> = archive.names().map(str::to_string).collect();

        info!("Writing sound names to \"{}\"...", output.display());
        self.prepare_parent(output)?;
        let mut text = String::new();
        for name in &names {
            text.push_str(name);
            text.push('\n');
        }
        self.storage.write(output, text.as_bytes())?;
        Ok(names)
    }

    /// Whether `dest` may be wiped before writing output for `archive_path`.
    fn may_clean(&self, archive_path: &Path, dest: &Path) -> bool {
        if !self.clean_output {
            return false;
        }
        if is_within(archive_path, dest) {
            warn!(
                "Not removing \"{}\": it contains \"{}\"",
                dest.display(),
                archive_path.display()
            );
            return false;
        }
        true
    }

    fn prepare_parent(&self, file: &Path) -> Result<()> {
        match file.parent() {
            Some(parent) => self.prepare_dir(parent, false),
            None => Ok(()),
        }
    }

    fn prepare_dir(&self, dir: &Path, clean: bool) -> Result<()> {
        if dir.as_os_str().is_empty() {
            return Ok(());
        }
        if clean && self.storage.exists(dir) {
            debug!("Removing \"{}\"", dir.display());
            self.storage.remove_dir_all(dir)?;
        }
        self.storage.create_dir_all(dir)
    }
}

/// Parse an ordered name list: one name per line, blank lines skipped.
pub fn read_name_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Lexical containment check; `.` components are ignored.
fn is_within(path: &Path, dir: &Path) -> bool {
    let strip = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    let dir = strip(dir);
    !dir.as_os_str().is_empty() && strip(path).starts_with(&dir)
}

/// Entry names become file names on extraction; refuse anything that would
/// land outside the destination directory.
fn check_file_name(name: &str) -> Result<()> {
    let path = Path::new(name);
    let plain = path.file_name().is_some_and(|f| f == path.as_os_str());
    if name.is_empty() || !plain || name.contains(['/', '\\']) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_list_skips_blank_lines() {
        let text = "b.ogg\r\n\r\na.ogg\n  \nc.ogg";
        assert_eq!(read_name_list(text), ["b.ogg", "a.ogg", "c.ogg"]);
    }

    #[test]
    fn containment_ignores_current_dir_components() {
        let dir = Path::new("output_bgm");
        assert!(is_within(Path::new("output_bgm/bgm.pck"), dir));
        assert!(is_within(Path::new("./output_bgm/bgm.pck"), dir));
        assert!(is_within(Path::new("output_bgm/bgm.pck"), Path::new("./output_bgm/")));
        assert!(!is_within(Path::new("bgm.pck"), dir));
        assert!(!is_within(Path::new("output_bgm2/bgm.pck"), dir));
        assert!(!is_within(Path::new("bgm.pck"), Path::new("")));
    }

    #[test]
    fn only_plain_file_names_are_extracted() {
        assert!(check_file_name("bgm_01.ogg").is_ok());
        assert!(check_file_name("..hidden").is_ok());
        for name in ["", "..", ".", "../x.ogg", "dir/x.ogg", "dir\\x.ogg", "/abs.ogg"] {
            assert!(check_file_name(name).is_err(), "{:?} accepted", name);
        }
    }
}
