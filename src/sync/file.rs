//! File operations for sync.
//!
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Streamed copies into the instance tree, creating parent directories
//! - Idempotent removal

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::sync::types::{SyncError, SyncResult};

/// Write a file atomically.
///
/// This function:
/// 1. Runs `write` against a sibling temporary file (`<name>.tmp`)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Renames the temp file over the target path
///
/// If any step fails, the temp file is removed and the original file (if
/// any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write<F>(path: &Path, write: F) -> SyncResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }

    let result = write_temp(&temp_path, write)
        .map_err(|e| SyncError::io(&temp_path, e))
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| SyncError::io(path, e)));

    if result.is_err() {
        // Best effort; the original error is what matters.
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp<F>(temp_path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let mut writer = BufWriter::new(File::create(temp_path)?);
    write(&mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Make sure `path` exists as a file, creating an empty one if needed.
///
/// Returns `true` if the file was created by this call. Existing content is
/// never truncated.
///
/// # Errors
///
/// Returns an error if the directory chain or the file cannot be created.
pub fn ensure_file(path: &Path) -> SyncResult<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SyncError::io(path, e))?;

    Ok(true)
}

/// Stream `reader` into `target`, replacing any existing file.
///
/// `source` names the stream in read errors; write errors name `target`.
/// Parent directories are created first. The write is not atomic: a failure
/// half way leaves a truncated file behind.
///
/// # Errors
///
/// Returns `SyncError::Read` if the stream fails and `SyncError::Io` if the
/// target cannot be created or written.
pub fn copy_to_file(reader: &mut dyn Read, source: &str, target: &Path) -> SyncResult<u64> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }

    let file = File::create(target).map_err(|e| SyncError::io(target, e))?;
    let mut writer = BufWriter::new(file);
    let mut buf = [0u8; 8 * 1024];
    let mut bytes = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(SyncError::Read {
                    url: source.to_string(),
                    source: e,
                });
            }
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| SyncError::io(target, e))?;
        bytes += n as u64;
    }
    writer.flush().map_err(|e| SyncError::io(target, e))?;

    Ok(bytes)
}

/// Remove a file or empty directory, treating "already gone" as success.
///
/// Returns `true` if something was actually deleted.
///
/// # Errors
///
/// Returns an error for anything other than `NotFound`, including a
/// non-empty directory sitting at `path`.
pub fn remove_if_exists(path: &Path) -> SyncResult<bool> {
    let removed = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    match removed {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SyncError::io(path, e)),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("manifest"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}
