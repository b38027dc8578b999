//! Shared position table mapping absolute offsets to file/line/column.
//!
//! Every parsed file is registered in a [`FileSet`] and receives a *base*.
//! A byte offset `o` inside that file is represented as `Pos(base + o)`, so a
//! single `usize` identifies a location across all files of a run. Bases are
//! handed out in registration order with a one byte gap between files, which
//! keeps `Pos(0)` free to mean "no position" and lets the offset one past the
//! end of a file still resolve to that file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Absolute offset into a [`FileSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos(pub usize);

impl Pos {
    /// The zero position, never assigned to any file.
    pub const NONE: Pos = Pos(0);

    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Returns the position `delta` bytes further on.
    pub fn offset(self, delta: usize) -> Pos {
        Pos(self.0 + delta)
    }
}

/// Human readable location of a [`Pos`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub filename: PathBuf,
    /// Byte offset within the file
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based byte column
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename.display(), self.line, self.column)
    }
}

/// A single file registered in a [`FileSet`].
#[derive(Debug)]
pub struct SourceFile {
    name: PathBuf,
    base: usize,
    size: usize,
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(name: PathBuf, base: usize, content: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .filter(|&start| start < content.len() || start == 0)
            .collect();
        Self {
            name,
            base,
            size: content.len(),
            line_starts,
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Absolute position of the byte at `offset` in this file.
    pub fn pos(&self, offset: usize) -> Pos {
        debug_assert!(offset <= self.size, "offset {offset} out of range");
        Pos(self.base + offset)
    }

    fn contains(&self, pos: Pos) -> bool {
        pos.0 >= self.base && pos.0 <= self.base + self.size
    }

    /// Resolves a position known to belong to this file.
    pub fn position(&self, pos: Pos) -> Position {
        let offset = pos.0 - self.base;
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(next) => next - 1,
        };
        Position {
            filename: self.name.clone(),
            offset,
            line: line_index + 1,
            column: offset - self.line_starts[line_index] + 1,
        }
    }
}

/// Append-only set of source files shared by every stage of a search.
///
/// Files are added only by the parse stage; everything else reads. The lock
/// is held for the duration of a lookup or an insert, never across a walk.
#[derive(Debug)]
pub struct FileSet {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    next_base: usize,
    files: Vec<Arc<SourceFile>>,
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSet {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_base: 1,
                files: Vec::new(),
            }),
        }
    }

    /// Registers a file and returns its entry with a freshly allocated base.
    pub fn add_file(&self, name: impl Into<PathBuf>, content: &str) -> Arc<SourceFile> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let file = Arc::new(SourceFile::new(name.into(), inner.next_base, content));
        inner.next_base += file.size + 1;
        inner.files.push(Arc::clone(&file));
        file
    }

    /// Finds the file a position belongs to.
    pub fn file(&self, pos: Pos) -> Option<Arc<SourceFile>> {
        if !pos.is_valid() {
            return None;
        }
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        // bases are strictly increasing
        let index = inner.files.partition_point(|f| f.base <= pos.0);
        let file = inner.files.get(index.checked_sub(1)?)?;
        file.contains(pos).then(|| Arc::clone(file))
    }

    /// Resolves `pos` to a file name, line and column.
    pub fn position(&self, pos: Pos) -> Option<Position> {
        self.file(pos).map(|file| file.position(pos))
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .files
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
