use std::{
    ffi::OsStr,
    path::{Component, Path, PathBuf},
};

use crate::error::FolderEpubError;

/// How file names are turned into archive entry names
///
/// File names on disk are raw OS strings, while zip entry names are
/// UTF-8 text. The encoding is resolved once and passed to the scanner
/// and the packager instead of being read from process-wide state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathEncoding {
    /// Replace invalid sequences with U+FFFD
    #[default]
    Lossy,

    /// Reject any file name that is not valid Unicode
    Strict,
}

impl PathEncoding {
    /// Converts a single path component into text
    ///
    /// # Return
    /// - `Ok(String)`: The component as text
    /// - `Err(FolderEpubError)`: The component is not valid Unicode in `Strict` mode
    pub fn encode_component(
        &self,
        component: &OsStr,
        path: &Path,
    ) -> Result<String, FolderEpubError> {
        match self {
            PathEncoding::Lossy => Ok(component.to_string_lossy().into_owned()),
            PathEncoding::Strict => component
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| FolderEpubError::NonUnicodePath {
                    path: path.to_path_buf(),
                }),
        }
    }
}

/// Order in which non-`mimetype` entries are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// The order produced by the directory walk
    #[default]
    Traversal,

    /// Sorted by entry name, stable across platforms
    Sorted,
}

/// Options for building an archive from a folder
///
/// ## Example
/// ```rust
/// use folder_epub::types::{EntryOrder, PackOptions, PathEncoding};
///
/// let options = PackOptions::default()
///     .with_order(EntryOrder::Sorted)
///     .with_encoding(PathEncoding::Strict)
///     .with_compression_level(9);
///
/// assert_eq!(options.order, EntryOrder::Sorted);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackOptions {
    pub encoding: PathEncoding,
    pub order: EntryOrder,

    /// Deflate level for compressed entries, `None` uses the zip default
    pub compression_level: Option<i64>,
}

impl PackOptions {
    pub fn with_encoding(mut self, encoding: PathEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = Some(level);
        self
    }
}

/// A file path relative to the source folder
///
/// The path keeps its original components for segment comparisons and
/// carries the forward-slash entry name used inside the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath {
    path: PathBuf,
    entry_name: String,
}

impl RelativePath {
    /// Creates a relative path from a path already stripped of the root
    ///
    /// `.` components are dropped; every other component becomes one
    /// segment of the entry name.
    ///
    /// # Parameters
    /// - `path`: Path relative to the source folder
    /// - `encoding`: How to turn components into entry name text
    pub fn new<P: Into<PathBuf>>(
        path: P,
        encoding: PathEncoding,
    ) -> Result<Self, FolderEpubError> {
        let path: PathBuf = path.into();

        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => continue,
                other => segments.push(encoding.encode_component(other.as_os_str(), &path)?),
            }
        }

        Ok(RelativePath {
            entry_name: segments.join("/"),
            path,
        })
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// The name used for this file inside the archive
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    /// Checks whether any component of the path equals `segment`
    pub fn has_segment(&self, segment: &str) -> bool {
        self.path
            .components()
            .any(|component| component.as_os_str() == OsStr::new(segment))
    }

    /// Checks whether the path names `name` directly inside the root
    pub fn is_root_file(&self, name: &str) -> bool {
        let mut components = self
            .path
            .components()
            .filter(|component| *component != Component::CurDir);

        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(first)), None) if first == OsStr::new(name)
        )
    }
}

/// Outcome of a packaging run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackReport {
    /// Entry names in the order they were written, `mimetype` first
    pub entries: Vec<String>,

    /// Source files left out by the exclusion rules
    pub skipped: Vec<RelativePath>,
}

/// An EPUB built from a folder, ready to hand to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedEpub {
    /// File name derived from the folder name, e.g. `Book.epub`
    pub name: String,

    /// Complete archive bytes
    pub data: Vec<u8>,
}
