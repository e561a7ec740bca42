//! Delta computation between the local and remote manifests.
//!
//! The engine is pure: it decides what to do and produces the manifest that
//! should be persisted once every decision has been carried out. Side
//! effects live in [`crate::sync::apply`].

use crate::sync::manifest::Manifest;
use crate::sync::types::SyncStats;

/// What to do with one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Listed locally but not remotely: delete the file.
    Remove(String),
    /// Missing locally or recorded with a different hash: download it.
    Fetch {
        /// Relative path.
        path: String,
        /// Remote hash recorded once the file is in place.
        hash: String,
    },
    /// Recorded hash matches the remote.
    UpToDate(String),
}

impl Decision {
    /// Relative path this decision is about.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Remove(path) | Self::UpToDate(path) | Self::Fetch { path, .. } => path.as_str(),
        }
    }
}

/// The full set of decisions for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    decisions: Vec<Decision>,
    manifest: Manifest,
}

impl Delta {
    /// Decisions in execution order: every removal, then one decision per
    /// remote path.
    #[must_use]
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Paths to delete.
    pub fn to_delete(&self) -> impl Iterator<Item = &str> {
        self.decisions.iter().filter_map(|d| match d {
            Decision::Remove(path) => Some(path.as_str()),
            _ => None,
        })
    }

    /// Paths to download.
    pub fn to_fetch(&self) -> impl Iterator<Item = &str> {
        self.decisions.iter().filter_map(|d| match d {
            Decision::Fetch { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }

    /// Paths already current.
    pub fn up_to_date(&self) -> impl Iterator<Item = &str> {
        self.decisions.iter().filter_map(|d| match d {
            Decision::UpToDate(path) => Some(path.as_str()),
            _ => None,
        })
    }

    /// Decision counts.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.decisions
            .iter()
            .fold(SyncStats::default(), |mut stats, decision| {
                match decision {
                    Decision::Remove(_) => stats.removed += 1,
                    Decision::Fetch { .. } => stats.updated += 1,
                    Decision::UpToDate(_) => stats.up_to_date += 1,
                }
                stats
            })
    }

    /// Whether applying this delta would touch the disk.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.stats().is_noop()
    }

    /// Local manifest as it should be saved after a successful apply.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Take the updated local manifest.
    #[must_use]
    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }
}

/// Compare `local` against `remote`.
///
/// Removal decisions are computed against the full local manifest first;
/// fetch decisions are computed against the pruned result. The updated
/// manifest already carries the remote hash for every fetched path, so it
/// must only be persisted after all fetches succeed.
#[must_use]
pub fn compute_delta(local: &Manifest, remote: &Manifest) -> Delta {
    let mut decisions = Vec::with_capacity(local.len() + remote.len());

    let mut manifest: Manifest = local
        .iter()
        .filter(|(path, _)| {
            let keep = remote.contains_key(path);
            if !keep {
                decisions.push(Decision::Remove((*path).to_string()));
            }
            keep
        })
        .collect();

    for (path, remote_hash) in remote.iter() {
        if manifest.get(path) == Some(remote_hash) {
            decisions.push(Decision::UpToDate(path.to_string()));
        } else {
            manifest.insert(path, remote_hash);
            decisions.push(Decision::Fetch {
                path: path.to_string(),
                hash: remote_hash.to_string(),
            });
        }
    }

    Delta {
        decisions,
        manifest,
    }
}
