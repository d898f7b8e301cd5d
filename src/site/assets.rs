//! Static asset copying.

use super::error::BuildError;
use crate::log;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively, in name order.
///
/// Any entry that cannot be read fails the whole walk.
pub fn collect_all_files(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            BuildError::Io(path, err.into())
        })?;
        let name = entry.file_name().to_str().unwrap_or_default();
        if entry.file_type().is_file() && !IGNORED_FILES.contains(&name) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Copy every file under `source` into `dest`, overwriting existing files.
///
/// A missing `source` copies nothing. Returns the number of files copied.
pub fn copy_dir(source: &Path, dest: &Path) -> Result<usize, BuildError> {
    if !source.is_dir() {
        return Ok(0);
    }

    let files = collect_all_files(source)?;
    for file in &files {
        let Ok(relative) = file.strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| BuildError::Io(parent.to_path_buf(), err))?;
        }
        fs::copy(file, &target).map_err(|err| BuildError::Io(file.clone(), err))?;
        log!("assets"; "{}", relative.display());
    }
    Ok(files.len())
}
