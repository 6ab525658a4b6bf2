//! Folder to EPUB
//!
//! A Rust library that packages the contents of a folder on disk into an
//! EPUB archive and hands it to a host application.
//!
//! An EPUB is a zip archive with a few structural rules: the `mimetype`
//! file comes first and is stored uncompressed, everything else is
//! compressed. This library enforces those rules, leaves out rights and
//! version control files, and refuses folders that still carry encryption
//! metadata from a protected export.
//!
//! ## Features
//!
//! - Recursive folder scan with platform-independent entry names.
//! - EPUB-compliant archive writer with configurable entry order.
//! - Scratch directories that are removed on every exit path.
//! - Host and folder picker traits, so the import pipeline runs against
//!   any host application.
//!
//! ## Quick Start
//!
//! ### Package a folder
//!
//! ```rust, no_run
//! # use folder_epub::{packager::package, types::PackOptions};
//! # fn main() -> Result<(), folder_epub::error::FolderEpubError> {
//! let report = package("path/to/Book", "Book.epub", PackOptions::default())?;
//!
//! println!("Written: {:?}", report.entries);
//! println!("Skipped: {}", report.skipped.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Import into memory
//!
//! ```rust, no_run
//! # use folder_epub::{plugin::import_folder, types::PackOptions};
//! # fn main() -> Result<(), folder_epub::error::FolderEpubError> {
//! let epub = import_folder("path/to/Book", PackOptions::default())?;
//! assert_eq!(epub.name, "Book.epub");
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `cli`: Enable `folder_epub::cli` and the `folder-epub` binary, a command
//!   line host that stores preferences in a JSON file and writes the produced
//!   book to an output directory. Enabled by default.

pub(crate) mod utils;

#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod host;
pub mod packager;
pub mod plugin;
pub mod rules;
pub mod scanner;
pub mod scratch;
pub mod types;
