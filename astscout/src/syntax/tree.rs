use std::path::{Path, PathBuf};
use std::sync::Arc;

use tree_sitter::{Node, Tree};

use super::fileset::{Pos, SourceFile};

/// Classification of Go syntax nodes that matchers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Interpreted (`"..."`) or raw (`` `...` ``) string literal
    StringLiteral,
    /// Line or block comment, doc comments included
    Comment,
    /// One entry of an `import` declaration
    ImportSpec,
    /// A `var` or `const` spec, top level or block scoped
    ValueSpec,
    Other,
}

impl NodeKind {
    /// Maps a tree-sitter-go node kind onto a [`NodeKind`].
    pub fn classify(grammar_kind: &str) -> Self {
        match grammar_kind {
            "interpreted_string_literal" | "raw_string_literal" => Self::StringLiteral,
            "comment" => Self::Comment,
            "import_spec" => Self::ImportSpec,
            "var_spec" | "const_spec" => Self::ValueSpec,
            _ => Self::Other,
        }
    }
}

/// A successfully parsed source file.
///
/// Holds the source text, its syntax tree and its entry in the shared
/// [`FileSet`](super::FileSet). Immutable once built, and `Sync`, so every
/// matcher of a file can walk it at the same time.
#[derive(Debug)]
pub struct ParsedFile {
    path: PathBuf,
    source: String,
    tree: Tree,
    file: Arc<SourceFile>,
}

impl ParsedFile {
    pub(crate) fn new(path: PathBuf, source: String, tree: Tree, file: Arc<SourceFile>) -> Self {
        Self {
            path,
            source,
            tree,
            file,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_file(&self) -> &Arc<SourceFile> {
        &self.file
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self, self.tree.root_node())
    }
}

/// Borrowed view of one node of a [`ParsedFile`].
#[derive(Debug, Clone, Copy)]
pub struct SyntaxNode<'a> {
    file: &'a ParsedFile,
    node: Node<'a>,
}

impl<'a> SyntaxNode<'a> {
    fn new(file: &'a ParsedFile, node: Node<'a>) -> Self {
        Self { file, node }
    }

    /// Identity of the node, unique within its tree.
    pub fn id(&self) -> usize {
        self.node.id()
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::classify(self.node.kind())
    }

    /// Raw tree-sitter-go kind, e.g. `"interpreted_string_literal"`.
    pub fn grammar_kind(&self) -> &'static str {
        self.node.kind()
    }

    pub fn start(&self) -> Pos {
        self.file.file.pos(self.node.start_byte())
    }

    pub fn end(&self) -> Pos {
        self.file.file.pos(self.node.end_byte())
    }

    /// Source text covered by the node, exactly as authored.
    pub fn text(&self) -> &'a str {
        &self.file.source[self.node.byte_range()]
    }

    pub fn file(&self) -> &'a ParsedFile {
        self.file
    }

    /// First name introduced by a `var`/`const` spec.
    ///
    /// Only the first name of `var a, b = 1, 2` is returned.
    pub fn first_declared_name(&self) -> Option<SyntaxNode<'a>> {
        if self.kind() != NodeKind::ValueSpec {
            return None;
        }
        self.node
            .child_by_field_name("name")
            .map(|name| SyntaxNode::new(self.file, name))
    }
}

/// What a [`Visitor`] wants the walk to do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Continue into the node's children
    Descend,
    /// Leave the node's children unvisited
    Skip,
}

/// Callback invoked for every node of a pre-order walk.
pub trait Visitor {
    fn visit(&mut self, node: &SyntaxNode<'_>) -> Walk;
}

/// Walks `file` in pre-order, calling `visitor` for each node.
///
/// A node is visited before its children and children left to right.
/// Returning [`Walk::Skip`] prunes the visited node's subtree.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, file: &ParsedFile) {
    let mut cursor = file.tree.walk();
    loop {
        let node = SyntaxNode::new(file, cursor.node());
        if visitor.visit(&node) == Walk::Descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}
