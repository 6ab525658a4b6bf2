//! Folder Scanner
//!
//! Recursively enumerates the files under a source folder and returns
//! their paths relative to that folder, in the order the directory walk
//! produces them.

use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::{
    error::FolderEpubError,
    types::{PathEncoding, RelativePath},
};

/// Lists every non-directory entry below `root`
///
/// Directories themselves are not yielded, and neither are links that
/// resolve to a directory, since the walk does not follow them. Any other
/// link is reported as a file, including a dangling one, so that reading
/// it later fails instead of silently dropping it from the book.
///
/// # Parameters
/// - `root`: The source folder
/// - `encoding`: How file names are converted into entry names
///
/// # Return
/// - `Ok(Vec<RelativePath>)`: Files in traversal order
/// - `Err(FolderEpubError)`: `root` is not a directory, a directory could
///   not be read, or a name was rejected by the encoding
pub fn scan_folder<P: AsRef<Path>>(
    root: P,
    encoding: PathEncoding,
) -> Result<Vec<RelativePath>, FolderEpubError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(FolderEpubError::InvalidSourceFolder {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type().is_dir() || path.is_dir() {
            continue;
        }

        let relative_path = path
            .strip_prefix(root)
            .map_err(|_e| FolderEpubError::InvalidSourceFolder {
                path: path.to_path_buf(),
            })?;

        let relative = RelativePath::new(relative_path, encoding)?;
        debug!("scanned: {}", relative.entry_name());
        files.push(relative);
    }

    Ok(files)
}
