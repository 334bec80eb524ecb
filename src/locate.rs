//! Result File Locator: map an experiment point to its files on disk.

use crate::error::{AggregateError, Result};
use crate::plan::{ExperimentPoint, FileSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files holding the measurements for `point` under `root`.
///
/// Fixed-name families yield exactly one path. Per-worker families yield every
/// regular file in the configuration directory whose name starts with the
/// family prefix, sorted by name; the count is whatever the run produced, but
/// must not be zero.
pub fn locate(root: &Path, point: &ExperimentPoint) -> Result<Vec<PathBuf>> {
    let dir = root.join(point.dir_name());
    if !dir.is_dir() {
        return Err(AggregateError::NotFound { path: dir });
    }

    match point.family.schema().files {
        FileSet::Fixed(name) => {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(AggregateError::NotFound { path });
            }
            Ok(vec![path])
        }
        FileSet::Prefixed(prefix) => {
            let files = list_prefixed(&dir, prefix)?;
            if files.is_empty() {
                return Err(AggregateError::NotFound {
                    path: dir.join(format!("{}*", prefix)),
                });
            }
            debug!(dir = %dir.display(), count = files.len(), "discovered worker files");
            Ok(files)
        }
    }
}

fn list_prefixed(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AggregateError::io(dir, e))? {
        let entry = entry.map_err(|e| AggregateError::io(dir, e))?;
        let path = entry.path();
        let matches = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(prefix))
            .unwrap_or(false);
        if matches && path.is_file() {
            out.push(path);
        }
    }
    // read_dir order is platform dependent.
    out.sort();
    Ok(out)
}
