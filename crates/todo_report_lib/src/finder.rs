//! Finding the files to scan under a search root.
use std::{cmp::Ordering, path::PathBuf};

use snafu::ResultExt;
use walkdir::{DirEntry, WalkDir};

use crate::{Error, PrefixSnafu, Result};

/// A file found under a search root.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// The path as found, starting with the root.
    pub path: PathBuf,
    /// The path relative to the root.
    pub relative: String,
}

impl SourceFile {
    pub fn new(root: &str, path: PathBuf) -> Result<Self> {
        let relative = path
            .strip_prefix(root)
            .context(PrefixSnafu { path: path.clone() })?;
        let relative = if relative.as_os_str().is_empty() {
            // The root was a file rather than a directory.
            path.file_name().map(PathBuf::from).unwrap_or_default()
        } else {
            relative.to_path_buf()
        };
        Ok(SourceFile {
            relative: relative.display().to_string(),
            path,
        })
    }
}

/// Within a directory, files come first and then sub-directories, each
/// sorted by name.
fn files_then_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_is_dir = a.file_type().is_dir();
    let b_is_dir = b.file_type().is_dir();
    a_is_dir
        .cmp(&b_is_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_excluded(entry: &DirEntry, excludes: &[String]) -> bool {
    let name = entry.file_name().to_string_lossy();
    excludes.iter().any(|exclude| exclude.as_str() == name)
}

pub struct FileSearcher;

impl FileSearcher {
    /// Recursively find the files under `root`, skipping any file or
    /// directory whose name is in `excludes`.
    ///
    /// Problems with single entries are yielded as errors so the caller can
    /// report them and carry on.
    pub fn find<'a>(
        root: &'a str,
        excludes: &'a [String],
    ) -> impl Iterator<Item = Result<SourceFile>> + 'a {
        log::debug!("searching {root:?}");
        WalkDir::new(root)
            .sort_by(files_then_dirs)
            .into_iter()
            .filter_entry(move |entry| entry.depth() == 0 || !is_excluded(entry, excludes))
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.path().is_file() => {
                    Some(SourceFile::new(root, entry.into_path()))
                }
                Ok(_) => None,
                Err(source) => Some(Err(Error::Walk {
                    root: root.to_string(),
                    source,
                })),
            })
    }
}
