// src/exec/sinks.rs

//! Output sinks for a child's stdout/stderr.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::process::Stdio;

use crate::errors::LaunchError;

/// Where one output stream of a child goes.
#[derive(Debug)]
pub enum Sink {
    /// `/dev/null`.
    Discard,
    /// An append-mode file.
    File(File),
}

impl Sink {
    pub fn into_stdio(self) -> Stdio {
        match self {
            Sink::Discard => Stdio::null(),
            Sink::File(file) => Stdio::from(file),
        }
    }
}

/// Resolved stdout/stderr pair.
#[derive(Debug)]
pub struct StdioSinks {
    pub stdout: Sink,
    pub stderr: Sink,
}

impl StdioSinks {
    /// Open the sinks for a launch.
    ///
    /// stderr follows stdout (same file description, or discard) when its path
    /// is unset or equal to the stdout path.
    pub fn open(stdout: Option<&Path>, stderr: Option<&Path>) -> Result<Self, LaunchError> {
        let stdout_sink = match stdout {
            Some(path) => Sink::File(open_append(path)?),
            None => Sink::Discard,
        };

        let stderr_sink = match stderr {
            Some(path) if Some(path) != stdout => Sink::File(open_append(path)?),
            _ => share(&stdout_sink, stdout)?,
        };

        Ok(Self {
            stdout: stdout_sink,
            stderr: stderr_sink,
        })
    }
}

fn share(sink: &Sink, path: Option<&Path>) -> Result<Sink, LaunchError> {
    match sink {
        Sink::Discard => Ok(Sink::Discard),
        Sink::File(file) => file
            .try_clone()
            .map(Sink::File)
            .map_err(|source| LaunchError::SinkOpen {
                path: path.map(Path::to_path_buf).unwrap_or_default(),
                source,
            }),
    }
}

/// Open `path` for appending, creating it with mode 0664 if absent.
pub fn open_append(path: &Path) -> Result<File, LaunchError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o664)
        .open(path)
        .map_err(|source| LaunchError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })
}
