//! Expansion of command line paths into the list of files to parse.
//!
//! Plain file paths are passed through exactly as given, in order, whether
//! or not they exist: a missing or unreadable file is the parse stage's
//! problem and is reported there. Directories are walked with
//! `ignore::WalkBuilder`, so `.gitignore` rules and hidden entries are
//! honored, and contribute their Go sources in sorted order.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// File extension of the sources astscout understands
pub const GO_EXTENSION: &str = "go";

/// Checks if a path names a Go source file
pub fn is_go_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(GO_EXTENSION))
}

/// Lists the Go sources below `dir`, sorted by path.
pub fn walk_directory(dir: &Path) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(dir);
    builder
        .hidden(true)
        .standard_filters(true)
        .require_git(false)
        .sort_by_file_path(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                if is_go_source(entry.path()) {
                    trace!("Adding file: {}", entry.path().display());
                    files.push(entry.into_path());
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping entry under {}: {}", dir.display(), e),
        }
    }
    files
}

/// Expands `paths` into the ordered list of files to search.
pub fn collect_source_files<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths.iter().map(AsRef::as_ref) {
        if path.is_dir() {
            let found = walk_directory(path);
            debug!("Found {} Go files under {}", found.len(), path.display());
            files.extend(found);
        } else {
            files.push(path.to_path_buf());
        }
    }
    files
}
