//! Update command: bring one instance in line with the remote manifest.
//!
//! Progress goes to stdout, one line per decision. Diagnostics go through
//! `tracing` on stderr.

use colored::Colorize;

use crate::cli::Cli;
use crate::config::Locations;
use crate::error::Result;
use crate::sync::{Decision, SyncStats, Updater};
use crate::transport::{Transport, UrlTransport};

/// Execute the update with the default transport.
///
/// # Errors
///
/// Returns an error if the URL is invalid or any load, delete, fetch or
/// save fails. The local manifest is left untouched in that case.
pub fn execute(cli: &Cli) -> Result<SyncStats> {
    let transport = UrlTransport::new()?;
    execute_with(cli, &transport)
}

/// Execute the update against an arbitrary transport.
///
/// # Errors
///
/// See [`execute`].
pub fn execute_with(cli: &Cli, transport: &dyn Transport) -> Result<SyncStats> {
    println!("mmc-pack-updater start");

    let locations = Locations::resolve(&cli.instance_path, &cli.modpack_url)?;
    println!("Instance path: {}", locations.instance_path.display());
    println!("Modpack URI: {}", locations.modpack_url);
    println!("Remote instance URI: {}", locations.remote_instance_url);
    println!("Remote info URI: {}", locations.remote_info_url);

    let stats = Updater::new(&locations, transport).run(print_decision)?;

    print_summary(&stats);
    println!("mmc-pack-updater end");
    Ok(stats)
}

fn print_decision(decision: &Decision) {
    match decision {
        Decision::Remove(path) => {
            println!("Local {path} not found in remote, {}", "removing".yellow());
        }
        Decision::Fetch { path, .. } => {
            println!("Local {path} is outdated, {}", "updating".cyan());
        }
        Decision::UpToDate(path) => {
            println!("Local {path} is {}", "up to date".dimmed());
        }
    }
}

fn print_summary(stats: &SyncStats) {
    if stats.is_noop() {
        println!("{}", "Instance is up to date.".green());
    } else {
        println!(
            "{} {} removed, {} updated, {} up to date",
            "Done:".green().bold(),
            stats.removed,
            stats.updated,
            stats.up_to_date
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use url::Url;

    /// Lay out `<root>/pack-instance/` with a remote manifest and files.
    fn publish(root: &Path, manifest: &str, files: &[(&str, &str)]) -> String {
        let instance = root.join("pack-instance");
        fs::create_dir_all(&instance).unwrap();
        fs::write(instance.join("mmc-pack-updater.remote"), manifest).unwrap();
        for (name, body) in files {
            let path = instance.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        Url::from_file_path(root.join("pack")).unwrap().to_string()
    }

    #[test]
    fn test_execute_over_file_urls() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let modpack_url = publish(
            remote.path(),
            "mods/a.jar=h1\nconfig/b.cfg=h2\n",
            &[("mods/a.jar", "jar"), ("config/b.cfg", "cfg")],
        );
        let cli = Cli {
            instance_path: local.path().to_path_buf(),
            modpack_url,
        };

        let stats = execute(&cli).unwrap();

        assert_eq!(stats.updated, 2);
        assert_eq!(fs::read_to_string(local.path().join("mods/a.jar")).unwrap(), "jar");
        assert_eq!(
            fs::read_to_string(local.path().join("mmc-pack-updater.local")).unwrap(),
            "config/b.cfg=h2\nmods/a.jar=h1\n"
        );

        // Second run has nothing to do.
        let stats = execute(&cli).unwrap();
        assert!(stats.is_noop());
        assert_eq!(stats.up_to_date, 2);
    }

    #[test]
    fn test_execute_invalid_url() {
        let local = TempDir::new().unwrap();
        let cli = Cli {
            instance_path: local.path().to_path_buf(),
            modpack_url: "not a url".to_string(),
        };

        let err = execute(&cli).unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(!local.path().join("mmc-pack-updater.local").exists());
    }

    #[test]
    fn test_execute_missing_file_aborts() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let modpack_url = publish(remote.path(), "missing.txt=h1\n", &[]);
        let cli = Cli {
            instance_path: local.path().to_path_buf(),
            modpack_url,
        };

        let err = execute(&cli).unwrap_err();

        assert_eq!(err.exit_code(), 8);
        assert_eq!(
            fs::read_to_string(local.path().join("mmc-pack-updater.local")).unwrap(),
            ""
        );
    }
}
