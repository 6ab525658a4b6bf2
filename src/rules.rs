//! Validity Rules
//!
//! Two checks guard the packaging step:
//!
//! - [is_source_valid] refuses folders that still carry an `encryption.xml`
//!   descriptor under `META-INF`, which a protected export leaves behind.
//!   Re-importing such a folder would produce a book whose resources can no
//!   longer be decrypted.
//! - [is_file_to_copy] filters out rights and version control files that
//!   must never end up inside the archive.
//!
//! Both compare whole path components, so the result does not depend on the
//! platform's path separator.

use std::{ffi::OsStr, path::Path};

use log::warn;

use crate::{
    error::FolderEpubError,
    scanner::scan_folder,
    types::{PathEncoding, RelativePath},
};

/// File names that are never copied into the archive
pub const SKIP_LIST: [&str; 4] = [
    "encryption.xml",
    "rights.xml",
    ".gitignore",
    ".gitattributes",
];

/// Directory segment whose whole subtree is never copied
pub const SKIP_DIRECTORY: &str = ".git";

const METADATA_DIRECTORIES: [&str; 2] = ["META-INF", "meta-inf"];
const ENCRYPTION_DESCRIPTORS: [&str; 2] = ["encryption.xml", "ENCRYPTION.XML"];

/// Checks whether a folder may be imported
///
/// The folder is rejected when a single file's path contains both a
/// metadata directory segment and an encryption descriptor segment.
/// The two segments need not be adjacent, but they must belong to the
/// same file.
///
/// # Return
/// - `Ok(true)`: No file looks like a leftover encryption descriptor
/// - `Ok(false)`: The folder must not be imported
/// - `Err(FolderEpubError)`: The folder could not be scanned
pub fn is_source_valid<P: AsRef<Path>>(
    root: P,
    encoding: PathEncoding,
) -> Result<bool, FolderEpubError> {
    for file in scan_folder(root, encoding)? {
        if is_encryption_descriptor(&file) {
            warn!("encryption descriptor found: {}", file.entry_name());
            return Ok(false);
        }
    }

    Ok(true)
}

/// Returns `true` if the file should be written to the archive
pub fn is_file_to_copy(file: &RelativePath) -> bool {
    if file.has_segment(SKIP_DIRECTORY) {
        return false;
    }

    match file.file_name() {
        Some(name) => !SKIP_LIST.iter().any(|skip| name == OsStr::new(skip)),
        None => true,
    }
}

fn is_encryption_descriptor(file: &RelativePath) -> bool {
    METADATA_DIRECTORIES
        .iter()
        .any(|segment| file.has_segment(segment))
        && ENCRYPTION_DESCRIPTORS
            .iter()
            .any(|segment| file.has_segment(segment))
}
