//! Manifest-driven instance sync.
//!
//! One run is a straight pipeline:
//!
//! 1. Load the local manifest (created empty if missing)
//! 2. Fetch the remote manifest
//! 3. Compute the delta: removals first, then one decision per remote path
//! 4. Apply it: delete stale files, download missing or outdated ones
//! 5. Save the updated local manifest
//!
//! The local manifest is only written after step 4 succeeds. A failed run
//! leaves the previous manifest on disk, so anything not confirmed is
//! downloaded again next time.
//!
//! # Example
//!
//! ```ignore
//! use mmcpu::sync::Updater;
//! use mmcpu::transport::UrlTransport;
//!
//! let transport = UrlTransport::new()?;
//! let stats = Updater::new(&locations, &transport).run(|decision| println!("{decision:?}"))?;
//! ```

pub mod apply;
pub mod delta;
mod file;
pub mod manifest;
mod types;

pub use apply::Executor;
pub use delta::{compute_delta, Decision, Delta};
pub use file::{atomic_write, copy_to_file, ensure_file, remove_if_exists};
pub use manifest::Manifest;
pub use types::{SyncError, SyncResult, SyncStats};

use tracing::{debug, info};

use crate::config::Locations;
use crate::transport::Transport;

/// Runs the full pipeline for one instance.
pub struct Updater<'a> {
    locations: &'a Locations,
    transport: &'a dyn Transport,
}

impl<'a> Updater<'a> {
    /// Create an updater for `locations`, reading remote data via `transport`.
    pub fn new(locations: &'a Locations, transport: &'a dyn Transport) -> Self {
        Self {
            locations,
            transport,
        }
    }

    /// Run the sync. `observe` sees each decision before it is applied.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage. Nothing is saved in that case.
    pub fn run<F>(&self, observe: F) -> SyncResult<SyncStats>
    where
        F: FnMut(&Decision),
    {
        let local = Manifest::load_local(&self.locations.local_info_path)?;
        let remote = Manifest::load_remote(self.transport, &self.locations.remote_info_url)?;

        let delta = compute_delta(&local, &remote);
        let stats = delta.stats();
        debug!(
            removed = stats.removed,
            updated = stats.updated,
            up_to_date = stats.up_to_date,
            "Computed delta"
        );

        let executor = Executor::new(
            &self.locations.instance_path,
            self.locations.remote_instance_url.clone(),
            self.transport,
        );
        executor.apply(&delta, observe)?;

        delta.into_manifest().save(&self.locations.local_info_path)?;
        info!(
            instance = %self.locations.instance_path.display(),
            removed = stats.removed,
            updated = stats.updated,
            "Sync complete"
        );

        Ok(stats)
    }
}
