//! The `specs/current` pointer.
//!
//! On Unix the pointer is a relative symlink to the spec directory. Elsewhere
//! it is a one-line file holding the directory name. Both forms are read on
//! every platform, so a project checked out on either side keeps working.

use crate::error::{IoContext, Result};
use crate::paths;
use std::path::Path;

/// Directory name the pointer references, if a pointer is present and names
/// a spec directory. The directory itself may no longer exist.
pub fn target(root: &Path) -> Result<Option<String>> {
    let pointer = paths::current_pointer(root);
    let meta = match std::fs::symlink_metadata(&pointer) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).at(&pointer),
    };

    let raw = if meta.file_type().is_symlink() {
        std::fs::read_link(&pointer).at(&pointer)?
    } else if meta.is_file() {
        std::fs::read_to_string(&pointer)
            .at(&pointer)?
            .trim()
            .into()
    } else {
        tracing::warn!(path = %pointer.display(), "current pointer is not a link or file; ignoring");
        return Ok(None);
    };

    let dir_name = raw
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| paths::is_spec_dir_name(n));
    if dir_name.is_none() {
        tracing::warn!(pointer = %raw.display(), "current pointer does not name a spec directory");
    }
    Ok(dir_name)
}

/// Id of the spec the pointer references.
pub fn current_id(root: &Path) -> Result<Option<String>> {
    Ok(target(root)?.and_then(|name| paths::parse_spec_id(&name).map(str::to_string)))
}

/// Point `specs/current` at `dir_name`, replacing any existing pointer.
///
/// The new pointer is created beside the old one and renamed over it, so
/// readers see either the old target or the new one.
pub fn set(root: &Path, dir_name: &str) -> Result<()> {
    let specs = paths::specs_dir(root);
    let pointer = paths::current_pointer(root);
    let staging = specs.join(format!(".current.{}.tmp", std::process::id()));
    crate::io::remove_if_exists(&staging)?;

    write_pointer(&staging, dir_name)?;
    if let Err(e) = std::fs::rename(&staging, &pointer) {
        let _ = std::fs::remove_file(&staging);
        return Err(e).at(&pointer);
    }
    tracing::info!(spec = dir_name, "current spec set");
    Ok(())
}

#[cfg(unix)]
fn write_pointer(at: &Path, dir_name: &str) -> Result<()> {
    // Relative to the pointer's own directory, which is `specs/` itself.
    std::os::unix::fs::symlink(dir_name, at).at(at)
}

#[cfg(not(unix))]
fn write_pointer(at: &Path, dir_name: &str) -> Result<()> {
    std::fs::write(at, format!("{dir_name}\n")).at(at)
}

/// Remove the pointer. Returns true if one was present.
pub fn unset(root: &Path) -> Result<bool> {
    let removed = crate::io::remove_if_exists(&paths::current_pointer(root))?;
    if removed {
        tracing::info!("current spec unset");
    }
    Ok(removed)
}
