// src/exec/workdir.rs

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Create (if needed) the empty, read-only directory used as the working
/// directory of processes that don't configure one.
///
/// Lives at `<base>/paladin-<pid>/empty`, with `base` defaulting to the
/// system temp dir.
pub fn ensure_empty_dir(base: Option<&Path>) -> io::Result<PathBuf> {
    let base = base
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);
    let dir = base
        .join(format!("paladin-{}", std::process::id()))
        .join("empty");

    fs::create_dir_all(&dir)?;
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o555))?;
    Ok(dir)
}

/// Remove a directory made by [`ensure_empty_dir`], along with its
/// `paladin-<pid>` parent when that is left empty.
pub fn remove_empty_dir(dir: &Path) -> io::Result<()> {
    fs::remove_dir(dir)?;
    if let Some(parent) = dir.parent() {
        match fs::remove_dir(parent) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
