// src/errors.rs

//! Crate-wide error types.
//!
//! - [`PaladinError`] covers everything that can abort the supervisor before
//!   the engine starts (config, log sink).
//! - [`LaunchError`] covers everything that can go wrong for a single launch.
//!   These never abort the supervisor; the launcher turns them into a
//!   `Finished` event and the engine applies its restart policy.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaladinError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dependency cycle: {0}")]
    DependencyCycle(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to open log file {path:?}: {source}")]
    LogSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which kind of identity a credential lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    Group,
}

impl std::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityKind::User => f.write_str("user"),
            IdentityKind::Group => f.write_str("group"),
        }
    }
}

/// Failure of a single launch attempt.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Unknown user/group name, or the identity database could not be read.
    #[error("failed to look up {kind} '{name}'")]
    Lookup {
        kind: IdentityKind,
        name: String,
        #[source]
        source: Option<io::Error>,
    },

    /// A numeric user/group id that does not fit a `u32`.
    #[error("failed to parse {kind} id '{name}': {source}")]
    Parse {
        kind: IdentityKind,
        name: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to open output sink {path:?}: {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("process exited unsuccessfully: {0}")]
    Exited(ExitStatus),

    #[error("failed to wait for process: {0}")]
    Wait(#[source] io::Error),
}

impl LaunchError {
    /// True if the process was actually started before this error happened.
    pub fn is_runtime(&self) -> bool {
        matches!(self, LaunchError::Exited(_) | LaunchError::Wait(_))
    }
}

pub type Result<T> = std::result::Result<T, PaladinError>;
