//! Command Line Host
//!
//! A [Host] implementation for running the import outside of a host
//! application. Preferences are kept in a JSON file and produced books
//! are written to an output directory.
//!
//! ## Notes
//!
//! - Requires `cli` functionality to use this module.
//! - A missing preference file is treated as empty preferences.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    error::FolderEpubError,
    host::{Host, Preferences},
    plugin::MIN_LAUNCHER_VERSION,
    utils::home_dir,
};

/// Launcher version reported by the command line host
pub const LAUNCHER_VERSION: u64 = MIN_LAUNCHER_VERSION;

/// Returns `$HOME/.folder-epub/prefs.json`
pub fn default_prefs_path() -> PathBuf {
    home_dir().join(".folder-epub").join("prefs.json")
}

#[derive(Debug)]
pub struct CliHost {
    prefs_path: PathBuf,
    output_dir: PathBuf,

    /// Files written by `add_other_file`, in order
    written: Vec<PathBuf>,
}

impl CliHost {
    /// Creates a host backed by a preference file and an output directory
    ///
    /// Neither path needs to exist yet; both are created on first write.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(prefs_path: P, output_dir: Q) -> Self {
        CliHost {
            prefs_path: prefs_path.into(),
            output_dir: output_dir.into(),
            written: vec![],
        }
    }

    pub fn prefs_path(&self) -> &Path {
        &self.prefs_path
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Host for CliHost {
    fn launcher_version(&self) -> u64 {
        LAUNCHER_VERSION
    }

    fn get_prefs(&self) -> Result<Preferences, FolderEpubError> {
        if !self.prefs_path.is_file() {
            debug!("no preference file at {}", self.prefs_path.display());
            return Ok(Preferences::new());
        }

        let data = fs::read(&self.prefs_path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn save_prefs(&mut self, prefs: &Preferences) -> Result<(), FolderEpubError> {
        if let Some(parent) = self.prefs_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(prefs)?;
        fs::write(&self.prefs_path, data)?;
        Ok(())
    }

    fn add_other_file(&mut self, name: &str, data: Vec<u8>) -> Result<(), FolderEpubError> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)?;
        }

        let path = self.output_dir.join(name);
        fs::write(&path, data)?;
        info!("written: {}", path.display());

        self.written.push(path);
        Ok(())
    }
}
