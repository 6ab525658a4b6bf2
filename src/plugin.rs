//! Plugin Entry Point
//!
//! [run] drives a whole import: ask for a folder, check it, package it in a
//! scratch directory, hand the bytes to the host and remember where the
//! user was. Every failure is printed and turned into a status code, so no
//! error value crosses the host boundary.
//!
//! [import_folder] is the non-interactive core of the same pipeline.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use crate::{
    error::FolderEpubError,
    host::{FolderPicker, Host},
    packager::package,
    rules::is_source_valid,
    scratch::ScratchDir,
    types::{ImportedEpub, PackOptions},
    utils::home_dir,
};

/// Status returned to the host on success or user cancel
pub const STATUS_OK: i32 = 0;

/// Status returned to the host on any failure
pub const STATUS_FAILED: i32 = -1;

/// Preference key holding the directory the picker opens in
pub const LAST_DIR_KEY: &str = "lastDir";

/// Title shown by the folder picker
pub const PICKER_TITLE: &str = "Select Folder to Input into Sigil";

/// Oldest launcher version the plugin runs against
pub const MIN_LAUNCHER_VERSION: u64 = 20160130;

/// Extension appended to the folder name to form the book's file name
pub const EPUB_EXTENSION: &str = "epub";

/// Settings for a plugin run
#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub min_launcher_version: u64,
    pub pack_options: PackOptions,

    /// Directory used when no usable `lastDir` preference exists
    pub home_dir: PathBuf,

    /// Parent directory for scratch directories, `None` for the system temp dir
    pub scratch_parent: Option<PathBuf>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        PluginConfig {
            min_launcher_version: MIN_LAUNCHER_VERSION,
            pack_options: PackOptions::default(),
            home_dir: home_dir(),
            scratch_parent: None,
        }
    }
}

impl PluginConfig {
    pub fn with_pack_options(mut self, options: PackOptions) -> Self {
        self.pack_options = options;
        self
    }

    pub fn with_home_dir<P: Into<PathBuf>>(mut self, home_dir: P) -> Self {
        self.home_dir = home_dir.into();
        self
    }

    pub fn with_scratch_parent<P: Into<PathBuf>>(mut self, parent: P) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }
}

/// Runs the plugin against a host, printing messages to standard output
///
/// # Return
/// - `0`: The book was handed to the host, or the user cancelled
/// - `-1`: Any failure; a message has already been printed
pub fn run<H: Host, F: FolderPicker>(
    host: &mut H,
    picker: &mut F,
    config: &PluginConfig,
) -> i32 {
    run_with_output(host, picker, config, &mut io::stdout())
}

/// Same as [run], with user-facing messages written to `out`
pub fn run_with_output<H: Host, F: FolderPicker, W: Write>(
    host: &mut H,
    picker: &mut F,
    config: &PluginConfig,
    out: &mut W,
) -> i32 {
    match run_inner(host, picker, config, out) {
        Ok(()) => STATUS_OK,
        Err(err) => {
            error!("{}", err);
            STATUS_FAILED
        }
    }
}

fn run_inner<H: Host, F: FolderPicker, W: Write>(
    host: &mut H,
    picker: &mut F,
    config: &PluginConfig,
    out: &mut W,
) -> Result<(), FolderEpubError> {
    let version = host.launcher_version();
    if version < config.min_launcher_version {
        say(
            out,
            &format!(
                "This plugin requires a host launcher version {} or later",
                config.min_launcher_version
            ),
        );
        return Err(FolderEpubError::IncompatibleHost {
            found: version,
            required: config.min_launcher_version,
        });
    }

    let mut prefs = reported(out, "Unable to read plugin preferences", host.get_prefs())?;
    let home = config.home_dir.to_string_lossy();
    prefs.set_default(LAST_DIR_KEY, &home);

    let start = prefs
        .get(LAST_DIR_KEY)
        .map(PathBuf::from)
        .filter(|path| path.is_dir())
        .unwrap_or_else(|| config.home_dir.clone());

    let Some(folder) = picker.pick_directory(&start, PICKER_TITLE) else {
        say(out, "FolderIn plugin cancelled by user");
        return Ok(());
    };

    let epub = match import_with_scratch(&folder, config) {
        Ok(epub) => epub,
        Err(err @ FolderEpubError::InvalidSourceFolder { .. }) => {
            say(out, "Folder selected is not a directory or does not exist");
            return Err(err);
        }
        Err(err @ FolderEpubError::EncryptedSource { .. }) => {
            say(out, "Folder selected is invalid due to existing encryption.xml file");
            return Err(err);
        }
        Err(err) => {
            say(out, "Import from Folder failed");
            say(out, &err.to_string());
            return Err(err);
        }
    };

    info!("adding {} to host", epub.name);
    reported(
        out,
        "Unable to add the book to the host",
        host.add_other_file(&epub.name, epub.data),
    )?;

    if let Some(parent) = folder.parent() {
        prefs.set(LAST_DIR_KEY, &parent.to_string_lossy());
    }
    reported(out, "Unable to save plugin preferences", host.save_prefs(&prefs))?;

    Ok(())
}

fn say<W: Write>(out: &mut W, message: &str) {
    if let Err(err) = writeln!(out, "{}", message) {
        warn!("{}", err);
    }
}

/// Prints a failed host call before passing its error on
fn reported<T, W: Write>(
    out: &mut W,
    context: &str,
    result: Result<T, FolderEpubError>,
) -> Result<T, FolderEpubError> {
    result.inspect_err(|err| say(out, &format!("{}: {}", context, err)))
}

/// Imports a folder as an in-memory EPUB
///
/// The folder must exist, be a directory and pass the encryption check.
/// The archive is built in a scratch directory under the system temp dir,
/// which is removed before this function returns, whatever the outcome.
///
/// # Return
/// - `Ok(ImportedEpub)`: `<folder name>.epub` and its bytes
/// - `Err(FolderEpubError)`: The folder was rejected or packaging failed
pub fn import_folder<P: AsRef<Path>>(
    folder: P,
    options: PackOptions,
) -> Result<ImportedEpub, FolderEpubError> {
    let config = PluginConfig::default().with_pack_options(options);
    import_with_scratch(folder.as_ref(), &config)
}

fn import_with_scratch(
    folder: &Path,
    config: &PluginConfig,
) -> Result<ImportedEpub, FolderEpubError> {
    let options = config.pack_options;

    if !folder.is_dir() {
        return Err(FolderEpubError::InvalidSourceFolder {
            path: folder.to_path_buf(),
        });
    }

    if !is_source_valid(folder, options.encoding)? {
        return Err(FolderEpubError::EncryptedSource {
            folder: folder.to_path_buf(),
        });
    }

    let name = epub_name(folder);

    let scratch = match &config.scratch_parent {
        Some(parent) => ScratchDir::new_in(parent)?,
        None => ScratchDir::new()?,
    };

    let epub_path = scratch.join(&name);
    let data = package(folder, &epub_path, options)
        .and_then(|_| fs::read(&epub_path).map_err(FolderEpubError::from));

    // released before the result is inspected, on success and failure alike
    let released = scratch.close();
    let data = data?;
    released?;

    Ok(ImportedEpub { name, data })
}

/// Derives the book's file name from the folder's base name
pub fn epub_name(folder: &Path) -> String {
    let base = folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());

    format!("{}.{}", base, EPUB_EXTENSION)
}
