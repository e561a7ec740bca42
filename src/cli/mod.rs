//! CLI definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::error::{Error, USAGE};

pub mod commands;

/// Keeps a MultiMC modpack instance in sync with its published manifest
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "mmc-pack-updater",
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Instance directory to update (the one holding `.minecraft`)
    #[arg(value_name = "INSTANCE_PATH")]
    pub instance_path: PathBuf,

    /// Modpack base URL; files are served from `<url>-instance/`
    #[arg(value_name = "MODPACK_URL")]
    pub modpack_url: String,
}

/// Translate any clap failure into the updater's usage error.
///
/// There are no flags: `--help` and `--version` are unknown arguments and
/// land here like a wrong argument count.
#[must_use]
pub fn usage_error(err: &clap::Error) -> Error {
    tracing::debug!(kind = ?err.kind(), "Rejected command line");
    Error::Usage(USAGE.to_string())
}
