// src/exec/mod.rs

//! Process launching layer.
//!
//! This module is responsible for actually starting the configured programs,
//! using `tokio::process::Command`, and reporting back to the supervisor via
//! `LaunchEvent`s.
//!
//! - [`launcher`] runs one launch: stdio, working directory, credentials,
//!   spawn, wait.
//! - [`sinks`] opens stdout/stderr sinks.
//! - [`workdir`] prepares the default empty working directory.
//! - [`backend`] provides the `LaunchBackend` trait and the concrete
//!   `RealLaunchBackend` used in production, which tests can replace.

pub mod backend;
pub mod launcher;
pub mod sinks;
pub mod workdir;

pub use backend::{LaunchBackend, RealLaunchBackend};
pub use launcher::{launch_process, split_args, LaunchContext};
pub use sinks::{Sink, StdioSinks};
pub use workdir::{ensure_empty_dir, remove_empty_dir};
