#![allow(dead_code)]

pub use paladin_test_utils::builders;
pub use paladin_test_utils::fake_launcher;
pub use paladin_test_utils::{init_tracing, with_timeout};

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use paladin::errors::LaunchError;

/// A "process exited with status 1" error.
pub fn exit_failure() -> LaunchError {
    LaunchError::Exited(ExitStatus::from_raw(1 << 8))
}
