//! Error Type Definition Module
//!
//! This module defines the errors that may be encountered while scanning a
//! source folder, packaging it into an EPUB archive and handing the result
//! to the host application. All errors are uniformly wrapped in the
//! [FolderEpubError] enumeration.

use std::path::PathBuf;

use thiserror::Error;

/// Types of errors that can occur while importing a folder as an EPUB
#[derive(Debug, Error)]
pub enum FolderEpubError {
    /// ZIP archive related errors
    ///
    /// Errors raised by the zip writer while starting an entry or
    /// finalizing the central directory.
    #[error("Archive error: {source}")]
    ArchiveError { source: zip::result::ZipError },

    /// Encrypted source folder error
    ///
    /// The source folder still carries an `encryption.xml` descriptor
    /// under its `META-INF` directory, left over from a protected export.
    #[error("Encrypted source: Folder \"{}\" contains an encryption.xml file.", folder.display())]
    EncryptedSource { folder: PathBuf },

    /// Incompatible host error
    ///
    /// The host application is older than the minimum version this plugin
    /// was written against.
    #[error("Incompatible host: Version {found} is older than the required {required}.")]
    IncompatibleHost { found: u64, required: u64 },

    /// Invalid source folder error
    ///
    /// The selected path does not exist or is not a directory.
    #[error("Invalid source folder: \"{}\" is not a directory or does not exist.", path.display())]
    InvalidSourceFolder { path: PathBuf },

    #[error("IO error: {source}")]
    IOError { source: std::io::Error },

    /// Missing required file error
    ///
    /// A file that every EPUB container must provide was not found
    /// at the root of the source folder.
    #[error("Missing required file: The \"{file}\" file is missing.")]
    MissingRequiredFile { file: String },

    /// Non-unicode path error
    ///
    /// Only raised when the strict path encoding is configured and a file
    /// name in the source folder cannot be expressed as an archive entry name.
    #[error("Non-unicode path: \"{}\" cannot be used as an archive entry name.", path.display())]
    NonUnicodePath { path: PathBuf },

    /// Preferences error
    ///
    /// This error occurs when the command line host fails to read or
    /// write its JSON preference file.
    #[cfg(feature = "cli")]
    #[error("Preferences error: {source}")]
    PreferencesError { source: serde_json::Error },

    /// WalkDir error
    ///
    /// This error occurs when using the WalkDir library to traverse the directory.
    #[error("WalkDir error: {source}")]
    WalkDirError { source: walkdir::Error },
}

impl From<zip::result::ZipError> for FolderEpubError {
    fn from(value: zip::result::ZipError) -> Self {
        FolderEpubError::ArchiveError { source: value }
    }
}

impl From<std::io::Error> for FolderEpubError {
    fn from(value: std::io::Error) -> Self {
        FolderEpubError::IOError { source: value }
    }
}

impl From<walkdir::Error> for FolderEpubError {
    fn from(value: walkdir::Error) -> Self {
        FolderEpubError::WalkDirError { source: value }
    }
}

#[cfg(feature = "cli")]
impl From<serde_json::Error> for FolderEpubError {
    fn from(value: serde_json::Error) -> Self {
        FolderEpubError::PreferencesError { source: value }
    }
}

#[cfg(test)]
impl PartialEq for FolderEpubError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::EncryptedSource { folder: l_folder },
                Self::EncryptedSource { folder: r_folder },
            ) => l_folder == r_folder,
            (
                Self::IncompatibleHost {
                    found: l_found,
                    required: l_required,
                },
                Self::IncompatibleHost {
                    found: r_found,
                    required: r_required,
                },
            ) => l_found == r_found && l_required == r_required,
            (
                Self::InvalidSourceFolder { path: l_path },
                Self::InvalidSourceFolder { path: r_path },
            ) => l_path == r_path,
            (
                Self::MissingRequiredFile { file: l_file },
                Self::MissingRequiredFile { file: r_file },
            ) => l_file == r_file,
            (Self::NonUnicodePath { path: l_path }, Self::NonUnicodePath { path: r_path }) => {
                l_path == r_path
            }

            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}
