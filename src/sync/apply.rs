//! Applying a [`Delta`] to the instance directory.

use std::path::{Component, Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::sync::delta::{Decision, Delta};
use crate::sync::file::{copy_to_file, remove_if_exists};
use crate::sync::types::{SyncError, SyncResult};
use crate::transport::Transport;

/// Carries out removals and downloads under one instance root.
pub struct Executor<'a> {
    root: PathBuf,
    remote_root: Url,
    transport: &'a dyn Transport,
}

impl<'a> Executor<'a> {
    /// Create an executor writing under `root` and downloading from
    /// `remote_root`, which must end in `/`.
    pub fn new(root: impl Into<PathBuf>, remote_root: Url, transport: &'a dyn Transport) -> Self {
        Self {
            root: root.into(),
            remote_root,
            transport,
        }
    }

    /// Execute every decision in order, stopping at the first failure.
    ///
    /// `observe` is called before each decision is carried out.
    ///
    /// # Errors
    ///
    /// Returns the first removal or download error.
    pub fn apply<F>(&self, delta: &Delta, mut observe: F) -> SyncResult<()>
    where
        F: FnMut(&Decision),
    {
        for decision in delta.decisions() {
            observe(decision);
            match decision {
                Decision::Remove(path) => {
                    self.remove(path)?;
                }
                Decision::Fetch { path, .. } => {
                    self.fetch(path)?;
                }
                Decision::UpToDate(_) => {}
            }
        }
        Ok(())
    }

    /// Delete `path` under the instance root. Missing files are fine.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unsafe or the file cannot be deleted.
    pub fn remove(&self, path: &str) -> SyncResult<bool> {
        let target = self.local_path(path)?;
        let removed = remove_if_exists(&target)?;
        debug!(path, removed, "Removed stale file");
        Ok(removed)
    }

    /// Download `path` from the remote root over the local copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unsafe, the remote cannot be opened,
    /// or the local file cannot be written.
    pub fn fetch(&self, path: &str) -> SyncResult<u64> {
        let target = self.local_path(path)?;
        let url = self.remote_url(path)?;

        let mut reader = self.transport.open(&url)?;
        let bytes = copy_to_file(&mut reader, url.as_str(), &target)?;
        debug!(path, %url, bytes, "Fetched file");
        Ok(bytes)
    }

    /// Location of `path` on the remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unsafe or cannot be joined.
    pub fn remote_url(&self, path: &str) -> SyncResult<Url> {
        check_relative(path)?;
        self.remote_root
            .join(path)
            .map_err(|e| SyncError::InvalidUrl {
                url: path.to_string(),
                source: e,
            })
    }

    /// Location of `path` under the instance root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unsafe.
    pub fn local_path(&self, path: &str) -> SyncResult<PathBuf> {
        check_relative(path)?;
        Ok(self.root.join(path))
    }
}

/// Reject paths that are empty, absolute, or climb out of the root.
fn check_relative(path: &str) -> SyncResult<()> {
    let unsafe_path = || SyncError::UnsafePath(path.to_string());

    if path.is_empty() || path.starts_with('/') || path.starts_with('\\') {
        return Err(unsafe_path());
    }
    // Remote keys always use `/`; a `\` would only matter on Windows.
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(unsafe_path());
    }
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::delta::compute_delta;
    use crate::sync::manifest::Manifest;
    use std::cell::RefCell;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    /// Serves `"<url>"` as the body and records every request.
    #[derive(Default)]
    struct EchoTransport {
        requests: RefCell<Vec<String>>,
    }

    impl Transport for EchoTransport {
        fn open(&self, url: &Url) -> SyncResult<Box<dyn Read>> {
            self.requests.borrow_mut().push(url.to_string());
            Ok(Box::new(std::io::Cursor::new(url.to_string().into_bytes())))
        }
    }

    /// Fails every request after the first `ok` ones.
    struct FailingTransport {
        ok: usize,
        calls: RefCell<usize>,
    }

    impl Transport for FailingTransport {
        fn open(&self, url: &Url) -> SyncResult<Box<dyn Read>> {
            let mut calls = self.calls.borrow_mut();
            *calls += 1;
            if *calls > self.ok {
                return Err(SyncError::io(
                    url.path(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "404"),
                ));
            }
            Ok(Box::new(std::io::empty()))
        }
    }

    fn remote_root() -> Url {
        Url::parse("https://example.com/pack-instance/").unwrap()
    }

    #[test]
    fn test_apply_removes_and_fetches() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "keep").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "stale").unwrap();

        let local: Manifest = [("a.txt", "h1"), ("b.txt", "h2")].into_iter().collect();
        let remote: Manifest = [("a.txt", "h1"), ("c.txt", "h3")].into_iter().collect();
        let delta = compute_delta(&local, &remote);

        let transport = EchoTransport::default();
        let executor = Executor::new(temp_dir.path(), remote_root(), &transport);
        let mut seen = Vec::new();
        executor
            .apply(&delta, |d| seen.push(d.path().to_string()))
            .unwrap();

        assert_eq!(seen, ["b.txt", "a.txt", "c.txt"]);
        assert!(!temp_dir.path().join("b.txt").exists());
        assert_eq!(fs::read_to_string(temp_dir.path().join("a.txt")).unwrap(), "keep");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("c.txt")).unwrap(),
            "https://example.com/pack-instance/c.txt"
        );
        assert_eq!(transport.requests.borrow().len(), 1);
    }

    #[test]
    fn test_fetch_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let transport = EchoTransport::default();
        let executor = Executor::new(temp_dir.path(), remote_root(), &transport);

        executor.fetch("mods/deep/x.bin").unwrap();

        assert!(temp_dir.path().join("mods/deep/x.bin").is_file());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let transport = EchoTransport::default();
        let executor = Executor::new(temp_dir.path(), remote_root(), &transport);

        assert!(!executor.remove("never/existed.txt").unwrap());
    }

    #[test]
    fn test_noop_delta_performs_no_requests() {
        let temp_dir = TempDir::new().unwrap();
        let both: Manifest = [("a", "1"), ("b", "2")].into_iter().collect();
        let delta = compute_delta(&both, &both);

        let transport = EchoTransport::default();
        Executor::new(temp_dir.path(), remote_root(), &transport)
            .apply(&delta, |_| {})
            .unwrap();

        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn test_first_failure_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let remote: Manifest = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        let delta = compute_delta(&Manifest::new(), &remote);

        let transport = FailingTransport {
            ok: 1,
            calls: RefCell::new(0),
        };
        let result = Executor::new(temp_dir.path(), remote_root(), &transport).apply(&delta, |_| {});

        assert!(result.is_err());
        assert_eq!(*transport.calls.borrow(), 2);
        assert!(temp_dir.path().join("a").exists());
        assert!(!temp_dir.path().join("c").exists());
    }

    #[test]
    fn test_remote_url_encodes_spaces() {
        let transport = EchoTransport::default();
        let executor = Executor::new("/instance", remote_root(), &transport);

        let url = executor.remote_url("mods/My Mod.jar").unwrap();

        assert_eq!(url.as_str(), "https://example.com/pack-instance/mods/My%20Mod.jar");
    }

    #[test]
    fn test_unsafe_paths_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let transport = EchoTransport::default();
        let executor = Executor::new(temp_dir.path(), remote_root(), &transport);

        for path in ["", "/etc/passwd", "../outside.txt", "mods/../../x", "\\share\\x", "a\\..\\..\\b"] {
            assert!(
                matches!(executor.local_path(path), Err(SyncError::UnsafePath(_))),
                "{path} should be rejected"
            );
            assert!(matches!(executor.fetch(path), Err(SyncError::UnsafePath(_))));
        }
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn test_dot_segments_allowed() {
        let transport = EchoTransport::default();
        let executor = Executor::new("/instance", remote_root(), &transport);

        assert!(executor.local_path("./config/a.cfg").is_ok());
        assert!(executor.local_path(".minecraft/options.txt").is_ok());
    }
}
