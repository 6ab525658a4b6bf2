//! Scratch Directory
//!
//! A process-private temporary directory that lives for the duration of
//! a single packaging run. The directory is removed when the guard is
//! dropped, so every exit path (including early `?` returns) cleans up.
//! Call [ScratchDir::close] to observe removal errors instead of only
//! logging them.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicUsize, Ordering},
};

use log::{debug, warn};

use crate::{error::FolderEpubError, utils::local_time};

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    released: bool,
}

impl ScratchDir {
    /// Creates a new scratch directory under the system temp directory
    ///
    /// # Return
    /// - `Ok(ScratchDir)`: The directory exists and is owned by this guard
    /// - `Err(FolderEpubError)`: The directory could not be created
    pub fn new() -> Result<Self, FolderEpubError> {
        Self::new_in(env::temp_dir())
    }

    /// Creates a new scratch directory under `parent`
    ///
    /// The directory name combines the process id, a per-process counter
    /// and a timestamp. Creation fails rather than reusing a directory
    /// that already exists. On unix the directory is only accessible to
    /// its owner.
    pub fn new_in<P: AsRef<Path>>(parent: P) -> Result<Self, FolderEpubError> {
        let sequence = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = parent.as_ref().join(format!(
            "folder-epub-{}-{}-{}",
            process::id(),
            sequence,
            local_time()
        ));
        create_private_dir(&path)?;
        debug!("scratch directory created: {}", path.display());

        Ok(ScratchDir {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Joins a file name onto the scratch directory
    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }

    /// Removes the directory and everything inside it
    pub fn close(mut self) -> Result<(), FolderEpubError> {
        self.release().map_err(FolderEpubError::from)
    }

    fn release(&mut self) -> io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        fs::remove_dir_all(&self.path)?;
        debug!("scratch directory removed: {}", self.path.display());
        Ok(())
    }
}

fn create_private_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(path)
}

impl Drop for ScratchDir {
    /// Remove scratch directory when dropped
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("{}", err);
        };
    }
}
