//! Output storage for collected entries
//!
//! The artifact has a header row `username,entry,date,favorites` and one row
//! per entry, comma-delimited with standard quoting. It is produced in one
//! shot at the end of a run: rows go to a temporary sibling file that is
//! renamed over the target once everything is flushed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Entry;

/// Column names, in order
pub const HEADERS: [&str; 4] = ["username", "entry", "date", "favorites"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writer/reader for the entries CSV file
#[derive(Debug, Clone)]
pub struct CsvStorage {
    path: PathBuf,
    utf8_bom: bool,
}

impl CsvStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            utf8_bom: false,
        }
    }

    /// Prefix written files with a UTF-8 byte order mark
    #[must_use]
    pub fn with_bom(mut self, utf8_bom: bool) -> Self {
        self.utf8_bom = utf8_bom;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all entries, replacing any existing file
    ///
    /// An empty slice still produces the header row. Missing parent
    /// directories are created.
    ///
    /// # Errors
    ///
    /// `Error::Io` or `Error::Csv` when the file cannot be created, written
    /// or moved into place. The target is left untouched in that case.
    pub fn write_entries(&self, entries: &[Entry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.tmp_path();
        let written = self
            .write_to(&tmp_path, entries)
            .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(Into::into));
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written?;

        tracing::debug!(path = %self.path.display(), rows = entries.len(), "Wrote CSV");
        Ok(())
    }

    fn write_to(&self, path: &Path, entries: &[Entry]) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        if self.utf8_bom {
            file.write_all(UTF8_BOM)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        writer.write_record(HEADERS)?;
        for entry in entries {
            writer.serialize(entry)?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        file.into_inner()
            .map_err(|e| e.into_error())?
            .sync_all()?;

        Ok(())
    }

    /// Load entries back from the file
    ///
    /// A leading UTF-8 byte order mark is ignored.
    ///
    /// # Errors
    ///
    /// `Error::Io` when the file cannot be read, `Error::Csv` when a row
    /// does not match the expected columns.
    pub fn read_entries(&self) -> Result<Vec<Entry>> {
        let bytes = fs::read(&self.path)?;
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

        let mut reader = csv::Reader::from_reader(body);
        let entries = reader
            .deserialize::<Entry>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "entries.csv".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
