//! Manifest files: `key=value` lines mapping relative paths to content hashes.
//!
//! The same format is used for the remote manifest published next to the
//! instance files and for the local manifest recording what was installed.
//! There is no escaping. Lines that do not split into exactly two fields are
//! skipped without a warning so that hand-edited manifests with blank lines
//! keep loading.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;
use url::Url;

use crate::sync::file::{atomic_write, ensure_file};
use crate::sync::types::{SyncError, SyncResult};
use crate::transport::Transport;

/// Mapping from relative file path to content hash.
///
/// Hashes are opaque: they are only compared for equality, never computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected, so
    /// manifests written in a legacy charset still load their ASCII entries.
    ///
    /// # Errors
    ///
    /// Returns an error only if the reader fails.
    pub fn parse<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut manifest = Self::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some((key, value)) = parse_line(line) {
                manifest.insert(key, value);
            }
        }
        Ok(manifest)
    }

    /// Write every entry as `key=value` on its own line.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (key, value) in &self.entries {
            writeln!(writer, "{key}={value}")?;
        }
        writer.flush()
    }

    /// Load the local manifest, creating an empty file if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, opened or read.
    pub fn load_local(path: &Path) -> SyncResult<Self> {
        if ensure_file(path)? {
            debug!(path = %path.display(), "Created empty local manifest");
            return Ok(Self::new());
        }

        let file = File::open(path).map_err(|e| SyncError::io(path, e))?;
        let manifest = Self::parse(BufReader::new(file)).map_err(|e| SyncError::io(path, e))?;
        debug!(path = %path.display(), entries = manifest.len(), "Loaded local manifest");
        Ok(manifest)
    }

    /// Fetch and parse the remote manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot open the URL or the body
    /// cannot be read.
    pub fn load_remote(transport: &dyn Transport, url: &Url) -> SyncResult<Self> {
        let reader = transport.open(url)?;
        let manifest = Self::parse(BufReader::new(reader)).map_err(|e| SyncError::Read {
            url: url.to_string(),
            source: e,
        })?;
        debug!(%url, entries = manifest.len(), "Loaded remote manifest");
        Ok(manifest)
    }

    /// Persist the manifest, fully replacing the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> SyncResult<()> {
        atomic_write(path, |writer| self.write_to(writer))?;
        debug!(path = %path.display(), entries = self.len(), "Saved local manifest");
        Ok(())
    }

    /// Hash recorded for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Record `hash` for `path`, returning the previous hash.
    pub fn insert(&mut self, path: impl Into<String>, hash: impl Into<String>) -> Option<String> {
        self.entries.insert(path.into(), hash.into())
    }

    /// Forget `path`, returning its hash.
    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path)
    }

    /// Whether `path` is listed.
    #[must_use]
    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Paths in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Split one line into a trimmed `(key, value)` pair.
///
/// Fields are split on every `=` and trailing empty fields are dropped
/// before counting, so `a=b=` still yields `a`/`b` while `a=`, `a=b=c`
/// and blank lines yield nothing.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let mut fields: Vec<&str> = line.split('=').collect();
    while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    match fields.as_slice() {
        [key, value] => Some((key.trim(), value.trim())),
        _ => None,
    }
}
