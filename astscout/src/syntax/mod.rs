//! Syntax layer: parsing Go sources with tree-sitter, the shared position
//! table, and the pre-order walker the matchers plug into.

pub mod fileset;
pub mod parser;
pub mod tree;

pub use fileset::{FileSet, Pos, Position, SourceFile};
pub use parser::GoParser;
pub use tree::{walk, NodeKind, ParsedFile, SyntaxNode, Visitor, Walk};
