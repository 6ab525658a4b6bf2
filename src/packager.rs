//! EPUB Packager
//!
//! Builds an EPUB archive from the contents of a folder.
//!
//! The OCF container rules applied here are:
//! - `mimetype` must be the first entry and stored without compression,
//!   so reading systems can sniff the format from the first bytes.
//! - Every other file is deflated, under its forward-slash relative path.
//! - Rights, encryption and version control files are left out.
//!
//! ## Usage
//!
//! ```rust, no_run
//! # fn main() -> Result<(), folder_epub::error::FolderEpubError> {
//! use folder_epub::{packager::package, types::PackOptions};
//!
//! let report = package("path/to/Book", "output/Book.epub", PackOptions::default())?;
//! assert_eq!(report.entries[0], "mimetype");
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashSet,
    fs::{self, File},
    io::{self, Seek, Write},
    path::Path,
};

use log::{debug, info, warn};
use zip::{
    CompressionMethod, ZipWriter,
    write::{FileOptions, SimpleFileOptions},
};

use crate::{
    error::FolderEpubError,
    rules::is_file_to_copy,
    scanner::scan_folder,
    types::{EntryOrder, PackOptions, PackReport, RelativePath},
};

/// Name of the entry that must open every EPUB archive
pub const MIMETYPE: &str = "mimetype";

/// Files of a folder, arranged in the order they are written
struct PackPlan {
    mimetype: RelativePath,
    files: Vec<RelativePath>,
}

impl PackPlan {
    /// Scans the folder and puts the root `mimetype` file in front
    ///
    /// Fails before anything is written if `mimetype` is missing, or if two
    /// files that would be written end up with the same entry name.
    fn new(root: &Path, options: &PackOptions) -> Result<Self, FolderEpubError> {
        let (mut mimetype, mut files): (Vec<_>, Vec<_>) = scan_folder(root, options.encoding)?
            .into_iter()
            .partition(|file| file.is_root_file(MIMETYPE));

        let mimetype = mimetype
            .pop()
            .ok_or_else(|| FolderEpubError::MissingRequiredFile {
                file: MIMETYPE.to_string(),
            })?;

        if options.order == EntryOrder::Sorted {
            files.sort_by(|a, b| a.entry_name().cmp(b.entry_name()));
        }

        let plan = PackPlan { mimetype, files };
        plan.check_unique_names()?;

        Ok(plan)
    }

    /// Lossy name conversion can map distinct file names onto one entry name
    fn check_unique_names(&self) -> Result<(), FolderEpubError> {
        let mut seen = HashSet::new();
        let written = std::iter::once(&self.mimetype)
            .chain(self.files.iter().filter(|file| is_file_to_copy(file)));

        for file in written {
            if !seen.insert(file.entry_name()) {
                return Err(FolderEpubError::NonUnicodePath {
                    path: file.as_path().to_path_buf(),
                });
            }
        }

        Ok(())
    }

    fn write<W: Write + Seek>(
        self,
        root: &Path,
        writer: W,
        options: &PackOptions,
    ) -> Result<PackReport, FolderEpubError> {
        let mut zip = ZipWriter::new(writer);
        let stored = FileOptions::<()>::default().compression_method(CompressionMethod::Stored);
        let deflated = FileOptions::<()>::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(options.compression_level);

        let mut report = PackReport::default();

        write_entry(&mut zip, root, &self.mimetype, stored)?;
        report.entries.push(self.mimetype.entry_name().to_string());

        for file in self.files {
            if !is_file_to_copy(&file) {
                debug!("skipping: {}", file.entry_name());
                report.skipped.push(file);
                continue;
            }

            write_entry(&mut zip, root, &file, deflated)?;
            report.entries.push(file.entry_name().to_string());
        }

        zip.finish()?;
        Ok(report)
    }
}

/// Packages a folder into an EPUB file at `destination`
///
/// Missing parent directories of `destination` are created. If writing
/// fails after the file was created, the partial file is removed.
///
/// # Parameters
/// - `root`: The source folder
/// - `destination`: Path of the archive to create
/// - `options`: Path encoding, entry order and compression level
///
/// # Return
/// - `Ok(PackReport)`: The archive is complete and closed
/// - `Err(FolderEpubError)`: `mimetype` is missing, or any read or write failed
pub fn package<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    destination: Q,
    options: PackOptions,
) -> Result<PackReport, FolderEpubError> {
    let root = root.as_ref();
    let destination = destination.as_ref();

    let plan = PackPlan::new(root, &options)?;

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(destination)?;
    match plan.write(root, file, &options) {
        Ok(report) => Ok(report),
        Err(err) => {
            if let Err(remove_err) = fs::remove_file(destination) {
                warn!("{}", remove_err);
            }
            Err(err)
        }
    }
}

/// Packages a folder into any seekable writer
///
/// Same rules as [package]; useful for building the archive in memory.
pub fn package_to_writer<P: AsRef<Path>, W: Write + Seek>(
    root: P,
    writer: W,
    options: PackOptions,
) -> Result<PackReport, FolderEpubError> {
    let root = root.as_ref();

    PackPlan::new(root, &options)?.write(root, writer, &options)
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    root: &Path,
    file: &RelativePath,
    options: SimpleFileOptions,
) -> Result<(), FolderEpubError> {
    info!("loading: {}", file.entry_name());

    let mut source = File::open(root.join(file.as_path()))?;
    zip.start_file(file.entry_name(), options)?;
    io::copy(&mut source, zip)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        env, fs,
        io::{Cursor, Read, Seek},
        path::{Path, PathBuf},
    };

    use zip::{CompressionMethod, ZipArchive};

    use crate::{
        error::FolderEpubError,
        packager::{package, package_to_writer},
        types::{EntryOrder, PackOptions},
        utils::local_time,
    };

    fn make_folder(tag: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let root = env::temp_dir().join(format!("pack-{}-{}", tag, local_time()));
        fs::create_dir_all(&root).unwrap();
        for (file, data) in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, data).unwrap();
        }
        root
    }

    fn output_path(root: &Path) -> PathBuf {
        let mut name = root.as_os_str().to_os_string();
        name.push(".epub");
        PathBuf::from(name)
    }

    fn entry_names<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Vec<String> {
        (0..archive.len())
            .map(|index| archive.by_index(index).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_package_book_example() {
        let root = make_folder(
            "book",
            &[
                ("mimetype", b"application/epub+zip"),
                ("META-INF/container.xml", b"<container/>"),
                ("OEBPS/content.opf", b"<package/>"),
                (".git/config", b"[core]"),
            ],
        );
        let output = output_path(&root);

        let report = package(&root, &output, PackOptions::default()).unwrap();
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].entry_name(), ".git/config");

        let mut archive = ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);

        let names = entry_names(&mut archive);
        assert_eq!(names[0], "mimetype");
        assert!(names.contains(&"META-INF/container.xml".to_string()));
        assert!(names.contains(&"OEBPS/content.opf".to_string()));

        let mut mimetype = archive.by_index(0).unwrap();
        assert_eq!(mimetype.compression(), CompressionMethod::Stored);
        let mut content = String::new();
        mimetype.read_to_string(&mut content).unwrap();
        assert_eq!(content, "application/epub+zip");
        drop(mimetype);

        for index in 1..archive.len() {
            let file = archive.by_index(index).unwrap();
            assert_eq!(file.compression(), CompressionMethod::Deflated);
        }

        fs::remove_dir_all(root).unwrap();
        fs::remove_file(output).unwrap();
    }

    #[test]
    fn test_package_missing_mimetype() {
        let root = make_folder("no-mimetype", &[("OEBPS/content.opf", b"<package/>")]);
        let output = output_path(&root);

        let result = package(&root, &output, PackOptions::default());
        assert_eq!(
            result.unwrap_err(),
            FolderEpubError::MissingRequiredFile {
                file: "mimetype".to_string()
            }
        );
        assert!(!output.exists());

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_package_nested_mimetype_is_not_enough() {
        let root = make_folder("nested-mimetype", &[("OEBPS/mimetype", b"application/epub+zip")]);

        let result = package_to_writer(&root, Cursor::new(Vec::new()), PackOptions::default());
        assert!(result.is_err());

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_package_skips_excluded_files() {
        let root = make_folder(
            "excluded",
            &[
                ("mimetype", b"application/epub+zip"),
                ("META-INF/rights.xml", b"<rights/>"),
                ("OEBPS/encryption.xml", b"<encryption/>"),
                (".gitignore", b"*.bak"),
                ("OEBPS/.gitattributes", b"* text"),
                ("OEBPS/.git/HEAD", b"ref"),
                ("OEBPS/Text/chapter1.xhtml", b"<html/>"),
            ],
        );

        let mut buffer = Cursor::new(Vec::new());
        let report = package_to_writer(&root, &mut buffer, PackOptions::default()).unwrap();
        assert_eq!(report.skipped.len(), 5);

        let mut archive = ZipArchive::new(buffer).unwrap();
        let names = entry_names(&mut archive);
        assert_eq!(names, vec!["mimetype", "OEBPS/Text/chapter1.xhtml"]);

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_package_sorted_order() {
        let root = make_folder(
            "sorted",
            &[
                ("mimetype", b"application/epub+zip"),
                ("OEBPS/b.xhtml", b"b"),
                ("META-INF/container.xml", b"c"),
                ("OEBPS/a.xhtml", b"a"),
            ],
        );

        let options = PackOptions::default().with_order(EntryOrder::Sorted);
        let mut buffer = Cursor::new(Vec::new());
        let report = package_to_writer(&root, &mut buffer, options).unwrap();

        assert_eq!(
            report.entries,
            vec![
                "mimetype",
                "META-INF/container.xml",
                "OEBPS/a.xhtml",
                "OEBPS/b.xhtml"
            ]
        );

        let mut archive = ZipArchive::new(buffer).unwrap();
        assert_eq!(entry_names(&mut archive), report.entries);

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_package_creates_parent_directories() {
        let root = make_folder("parents", &[("mimetype", b"application/epub+zip")]);
        let output = env::temp_dir()
            .join(format!("pack-out-{}", local_time()))
            .join("deep")
            .join("Book.epub");

        assert!(package(&root, &output, PackOptions::default()).is_ok());
        assert!(output.is_file());

        fs::remove_dir_all(root).unwrap();
        fs::remove_dir_all(output.parent().unwrap().parent().unwrap()).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_package_dangling_link_fails() {
        use std::os::unix::fs::symlink;

        let root = make_folder(
            "dangling",
            &[
                ("mimetype", b"application/epub+zip"),
                ("OEBPS/content.opf", b"<package/>"),
            ],
        );
        symlink(root.join("OEBPS/missing.xhtml"), root.join("OEBPS/chapter.xhtml")).unwrap();

        let result = package_to_writer(&root, Cursor::new(Vec::new()), PackOptions::default());
        assert!(matches!(result, Err(FolderEpubError::IOError { .. })));

        let output = output_path(&root);
        let result = package(&root, &output, PackOptions::default());
        assert!(matches!(result, Err(FolderEpubError::IOError { .. })));
        assert!(!output.exists());

        fs::remove_dir_all(root).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_package_lossy_name_collision() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let root = make_folder("collision", &[("mimetype", b"application/epub+zip")]);
        fs::create_dir_all(root.join("OEBPS")).unwrap();
        fs::write(root.join("OEBPS").join(OsStr::from_bytes(b"caf\xe9.xhtml")), b"one").unwrap();
        fs::write(root.join("OEBPS").join(OsStr::from_bytes(b"caf\xe8.xhtml")), b"two").unwrap();
        let output = output_path(&root);

        let result = package(&root, &output, PackOptions::default());
        assert!(matches!(result, Err(FolderEpubError::NonUnicodePath { .. })));
        assert!(!output.exists());

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_package_binary_content_preserved() {
        let image: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let root = make_folder(
            "binary",
            &[
                ("mimetype", b"application/epub+zip"),
                ("OEBPS/Images/cover.png", image.as_slice()),
            ],
        );

        let mut buffer = Cursor::new(Vec::new());
        package_to_writer(&root, &mut buffer, PackOptions::default().with_compression_level(9))
            .unwrap();

        let mut archive = ZipArchive::new(buffer).unwrap();
        let mut data = Vec::new();
        archive
            .by_name("OEBPS/Images/cover.png")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, image);

        fs::remove_dir_all(root).unwrap();
    }
}
