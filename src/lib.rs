//! mmc-pack-updater - keeps a MultiMC modpack instance in sync
//!
//! A modpack is published as a directory of files plus a manifest mapping
//! each relative path to a content hash. The updater compares that manifest
//! with the one recorded in the instance, deletes files the pack dropped,
//! downloads files that are new or changed, and records the result.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Derivation of local paths and remote URLs
//! - [`sync`] - Manifest parsing, delta computation and application
//! - [`transport`] - Opening remote streams (`http`, `https`, `file`)
//! - [`error`] - Error types and exit codes

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod sync;
pub mod transport;

pub use error::{Error, Result};
