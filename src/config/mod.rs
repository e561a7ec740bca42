//! Location resolution.
//!
//! The updater has no configuration file. Everything it touches is derived
//! from the two command-line arguments:
//!
//! - **Modpack URL**: the base URL, as a directory
//! - **Remote instance URL**: `<base>-instance/`, the root of all downloadable files
//! - **Remote manifest**: `<base>-instance/mmc-pack-updater.remote`
//! - **Local manifest**: `<instance>/mmc-pack-updater.local`

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Error, Result};

/// File name of the manifest kept inside the instance directory.
pub const LOCAL_INFO_FILE_NAME: &str = "mmc-pack-updater.local";

/// File name of the manifest published at the remote instance root.
pub const REMOTE_INFO_FILE_NAME: &str = "mmc-pack-updater.remote";

/// Suffix turning the modpack URL into the remote instance root.
const INSTANCE_SUFFIX: &str = "-instance";

/// All locations used by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    /// Local instance directory being kept in sync.
    pub instance_path: PathBuf,
    /// Modpack base URL with a trailing `/`.
    pub modpack_url: Url,
    /// Root URL of the downloadable instance files, with a trailing `/`.
    pub remote_instance_url: Url,
    /// URL of the remote manifest.
    pub remote_info_url: Url,
    /// Path of the local manifest.
    pub local_info_path: PathBuf,
}

impl Locations {
    /// Derive every location from the instance path and modpack URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the URL is not an absolute URL.
    pub fn resolve(instance_path: impl Into<PathBuf>, base_url: &str) -> Result<Self> {
        let instance_path = instance_path.into();

        let modpack_url = parse_url(&as_directory(base_url))?;
        let remote_instance_url = parse_url(&as_directory(&format!(
            "{}{INSTANCE_SUFFIX}",
            remove_trailing_slash(base_url)
        )))?;
        let remote_info_url = remote_instance_url
            .join(REMOTE_INFO_FILE_NAME)
            .map_err(|e| Error::InvalidArgument(format!("{remote_instance_url}: {e}")))?;
        let local_info_path = local_info_path(&instance_path);

        Ok(Self {
            instance_path,
            modpack_url,
            remote_instance_url,
            remote_info_url,
            local_info_path,
        })
    }
}

/// Path of the local manifest for `instance_path`.
#[must_use]
pub fn local_info_path(instance_path: &Path) -> PathBuf {
    instance_path.join(LOCAL_INFO_FILE_NAME)
}

/// Append `/` unless already present.
fn as_directory(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Strip a single trailing `/`.
fn remove_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

fn parse_url(input: &str) -> Result<Url> {
    let url = Url::parse(input)
        .map_err(|e| Error::InvalidArgument(format!("invalid modpack URL '{input}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidArgument(format!(
            "modpack URL '{input}' cannot hold files"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_trailing_slash() {
        let locations = Locations::resolve("/games/pack", "https://example.com/packs/vanilla+").unwrap();

        assert_eq!(locations.modpack_url.as_str(), "https://example.com/packs/vanilla+/");
        assert_eq!(
            locations.remote_instance_url.as_str(),
            "https://example.com/packs/vanilla+-instance/"
        );
        assert_eq!(
            locations.remote_info_url.as_str(),
            "https://example.com/packs/vanilla+-instance/mmc-pack-updater.remote"
        );
        assert_eq!(
            locations.local_info_path,
            Path::new("/games/pack/mmc-pack-updater.local")
        );
    }

    #[test]
    fn test_resolve_with_trailing_slash() {
        let with = Locations::resolve("/i", "https://example.com/pack/").unwrap();
        let without = Locations::resolve("/i", "https://example.com/pack").unwrap();

        assert_eq!(with, without);
    }

    #[test]
    fn test_resolve_file_url() {
        let locations = Locations::resolve("/i", "file:///srv/packs/pack").unwrap();

        assert_eq!(
            locations.remote_info_url.as_str(),
            "file:///srv/packs/pack-instance/mmc-pack-updater.remote"
        );
    }

    #[test]
    fn test_resolve_rejects_relative() {
        let err = Locations::resolve("/i", "packs/vanilla").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_resolve_rejects_non_base() {
        let err = Locations::resolve("/i", "mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(remove_trailing_slash("a/"), "a");
        assert_eq!(remove_trailing_slash("a//"), "a/");
        assert_eq!(remove_trailing_slash("a"), "a");
    }
}
