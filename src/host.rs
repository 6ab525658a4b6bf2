//! Host Contract
//!
//! The plugin never talks to a concrete host application. Everything it
//! needs from the outside world goes through two traits:
//!
//! - [Host]: version query, preference storage and registration of the
//!   produced file.
//! - [FolderPicker]: asks the user for a source folder.
//!
//! Two picker backends are provided: [FixedPicker] answers with a path
//! chosen up front (e.g. from the command line), and [PromptPicker] reads
//! a path from a line-based terminal prompt.

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use log::warn;

use crate::error::FolderEpubError;

/// Services provided by the host application
pub trait Host {
    /// Version of the host's plugin launcher, as a `YYYYMMDD` number
    fn launcher_version(&self) -> u64;

    /// Loads the preferences persisted for this plugin
    fn get_prefs(&self) -> Result<Preferences, FolderEpubError>;

    /// Persists the preferences for the next invocation
    fn save_prefs(&mut self, prefs: &Preferences) -> Result<(), FolderEpubError>;

    /// Registers a newly produced file with the host
    fn add_other_file(&mut self, name: &str, data: Vec<u8>) -> Result<(), FolderEpubError>;
}

/// Asks the user for an existing directory
pub trait FolderPicker {
    /// Returns the chosen directory, or `None` if the user cancelled
    ///
    /// # Parameters
    /// - `start`: Directory the picker should open in
    /// - `title`: Prompt shown to the user
    fn pick_directory(&mut self, start: &Path, title: &str) -> Option<PathBuf>;
}

/// Key-value preferences persisted by the host
///
/// Defaults live in a separate layer: they answer lookups for keys that
/// were never set, but are not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(transparent))]
pub struct Preferences {
    values: BTreeMap<String, String>,

    #[cfg_attr(feature = "cli", serde(skip))]
    defaults: BTreeMap<String, String>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates preferences from previously persisted values
    pub fn from_values(values: BTreeMap<String, String>) -> Self {
        Preferences {
            values,
            defaults: BTreeMap::new(),
        }
    }

    /// Returns the stored value, or the default if the key was never set
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_default(&mut self, key: &str, value: &str) -> &mut Self {
        self.defaults.insert(key.to_string(), value.to_string());
        self
    }

    /// Values that were explicitly set, without defaults
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// Picker that answers with a directory chosen up front
#[derive(Debug, Clone, Default)]
pub struct FixedPicker {
    choice: Option<PathBuf>,
}

impl FixedPicker {
    pub fn new<P: Into<PathBuf>>(choice: P) -> Self {
        FixedPicker {
            choice: Some(choice.into()),
        }
    }

    /// A picker that behaves like a user pressing cancel
    pub fn cancelled() -> Self {
        FixedPicker { choice: None }
    }
}

impl FolderPicker for FixedPicker {
    fn pick_directory(&mut self, _start: &Path, _title: &str) -> Option<PathBuf> {
        self.choice.take()
    }
}

/// Picker that prompts for a path on a line-based terminal
///
/// An empty line or end of input counts as cancel. Relative answers are
/// resolved against the start directory.
pub struct PromptPicker<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PromptPicker { input, output }
    }
}

impl<R: BufRead, W: Write> FolderPicker for PromptPicker<R, W> {
    fn pick_directory(&mut self, start: &Path, title: &str) -> Option<PathBuf> {
        if let Err(err) = write!(self.output, "{} [{}]: ", title, start.display())
            .and_then(|_| self.output.flush())
        {
            warn!("{}", err);
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) => {}
            Err(err) => {
                warn!("{}", err);
                return None;
            }
        }

        let answer = line.trim();
        if answer.is_empty() {
            return None;
        }

        Some(start.join(answer))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        io::Cursor,
        path::{Path, PathBuf},
    };

    use crate::host::{FixedPicker, FolderPicker, Preferences, PromptPicker};

    #[test]
    fn test_preferences_default_fallback() {
        let mut prefs = Preferences::new();
        prefs.set_default("lastDir", "/home/reader");

        assert_eq!(prefs.get("lastDir"), Some("/home/reader"));
        assert!(prefs.values().is_empty());

        prefs.set("lastDir", "/books");
        assert_eq!(prefs.get("lastDir"), Some("/books"));
        assert_eq!(prefs.values().len(), 1);
    }

    #[test]
    fn test_preferences_from_values() {
        let mut values = BTreeMap::new();
        values.insert("lastDir".to_string(), "/books".to_string());

        let mut prefs = Preferences::from_values(values);
        prefs.set_default("lastDir", "/home/reader");

        assert_eq!(prefs.get("lastDir"), Some("/books"));
        assert_eq!(prefs.get("missing"), None);
    }

    #[test]
    fn test_fixed_picker() {
        let mut picker = FixedPicker::new("/books/Book");

        assert_eq!(
            picker.pick_directory(Path::new("/"), "title"),
            Some(PathBuf::from("/books/Book"))
        );
        assert_eq!(picker.pick_directory(Path::new("/"), "title"), None);

        let mut picker = FixedPicker::cancelled();
        assert_eq!(picker.pick_directory(Path::new("/"), "title"), None);
    }

    #[test]
    fn test_prompt_picker_answer() {
        let mut output = Vec::new();
        let mut picker = PromptPicker::new(Cursor::new("Book\n"), &mut output);

        let choice = picker.pick_directory(Path::new("/books"), "Select Folder");
        assert_eq!(choice, Some(PathBuf::from("/books/Book")));

        drop(picker);
        assert_eq!(String::from_utf8(output).unwrap(), "Select Folder [/books]: ");
    }

    #[test]
    fn test_prompt_picker_absolute_answer() {
        let mut picker = PromptPicker::new(Cursor::new("/srv/Book\n"), Vec::new());

        let choice = picker.pick_directory(Path::new("/books"), "Select Folder");
        assert_eq!(choice, Some(PathBuf::from("/srv/Book")));
    }

    #[test]
    fn test_prompt_picker_cancel() {
        let mut picker = PromptPicker::new(Cursor::new("\n"), Vec::new());
        assert_eq!(picker.pick_directory(Path::new("/books"), "title"), None);

        let mut picker = PromptPicker::new(Cursor::new(""), Vec::new());
        assert_eq!(picker.pick_directory(Path::new("/books"), "title"), None);
    }
}
