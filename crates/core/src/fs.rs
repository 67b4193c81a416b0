//! Filesystem utilities

use std::path::{Path, PathBuf};

use anyhow::bail;
use log::debug;

/// Resolve a dataset file that must already exist.
///
/// The service never creates its data, so a missing file is a configuration error.
pub fn require_file(path: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(path);
    if !p.exists() {
        bail!("dataset file not found: {}", p.display());
    }
    if !p.is_file() {
        bail!("dataset path is not a file: {}", p.display());
    }
    debug!("using dataset file: {}", p.display());
    Ok(p.to_path_buf())
}
