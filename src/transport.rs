//! Remote access.
//!
//! The pipeline only ever needs one thing from the network: a readable stream
//! for a URL. [`Transport`] is that seam; [`UrlTransport`] is the real
//! implementation used by the binary.

use std::fs::File;
use std::io::Read;

use tracing::{debug, trace};
use url::Url;

use crate::sync::{SyncError, SyncResult};

/// Opens readable streams for remote locations.
///
/// The returned reader owns its connection or file handle; dropping it
/// releases the resource.
pub trait Transport {
    /// Open `url` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the location is unreachable, missing, or uses a
    /// scheme the transport cannot handle.
    fn open(&self, url: &Url) -> SyncResult<Box<dyn Read>>;
}

/// Blocking transport for `http`, `https` and `file` URLs.
pub struct UrlTransport {
    client: reqwest::blocking::Client,
}

impl UrlTransport {
    /// Create a transport with the default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized (TLS backend).
    pub fn new() -> SyncResult<Self> {
        let client = client_builder().build().map_err(SyncError::Client)?;
        Ok(Self { client })
    }

    fn open_http(&self, url: &Url) -> SyncResult<Box<dyn Read>> {
        trace!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| SyncError::Http {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        debug!(%url, status = status.as_u16(), length = ?response.content_length(), "Opened remote stream");
        Ok(Box::new(response))
    }
}

fn client_builder() -> reqwest::blocking::ClientBuilder {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("mmc-pack-updater/", env!("CARGO_PKG_VERSION")))
}

fn open_file(url: &Url) -> SyncResult<Box<dyn Read>> {
    let path = url
        .to_file_path()
        .map_err(|()| SyncError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
            url: url.to_string(),
        })?;
    let file = File::open(&path).map_err(|e| SyncError::io(&path, e))?;
    debug!(path = %path.display(), "Opened local stream");
    Ok(Box::new(file))
}

impl Transport for UrlTransport {
    fn open(&self, url: &Url) -> SyncResult<Box<dyn Read>> {
        match url.scheme() {
            "http" | "https" => self.open_http(url),
            "file" => open_file(url),
            scheme => Err(SyncError::UnsupportedScheme {
                scheme: scheme.to_string(),
                url: url.to_string(),
            }),
        }
    }
}
