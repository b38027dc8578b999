use regex::Regex;
use std::fmt;
use tracing::trace;

use crate::errors::{SearchError, SearchResult};
use crate::results::{Match, NodeRef};
use crate::syntax::{NodeKind, SyntaxNode, Visitor, Walk};

/// A [`Visitor`] that collects every [`Match`] of one criterion during a walk.
///
/// Matchers are created once per pattern and reused for every file: the
/// match stage calls [`reset`](Matcher::reset) before walking the next file,
/// which clears the accumulated matches but keeps the matcher (and its
/// compiled pattern) alive. A matcher is only ever walked by one task at a
/// time, so the accumulator needs no synchronization.
pub trait Matcher: Visitor + Send {
    /// Matches collected since the last reset, in traversal order.
    fn matches(&self) -> &[Match];

    /// Clears the collected matches.
    fn reset(&mut self);

    /// The compiled pattern this matcher searches for.
    fn pattern(&self) -> &Regex;

    /// Short label used in logs, e.g. `"string"`.
    fn name(&self) -> &'static str;
}

/// Which criterion a pattern applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    /// Contents of string literals
    String,
    /// Contents of comments
    Comment,
    /// Names of `var`/`const` declarations
    Var,
}

impl MatcherKind {
    /// Compiles `pattern` and returns the matcher for this criterion.
    pub fn build(self, pattern: &str) -> SearchResult<Box<dyn Matcher>> {
        let re = Regex::new(pattern).map_err(|e| SearchError::invalid_pattern(pattern, e))?;
        Ok(match self {
            Self::String => Box::new(StrPatternMatcher::new(re)),
            Self::Comment => Box::new(CommentPatternMatcher::new(re)),
            Self::Var => Box::new(VarPatternMatcher::new(re)),
        })
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Comment => "comment",
            Self::Var => "var",
        })
    }
}

/// Appends one match per non-overlapping occurrence of `re` in `text`.
fn collect_all(re: &Regex, node: &SyntaxNode<'_>, text: &str, out: &mut Vec<Match>) {
    let mut found = re.find_iter(text).peekable();
    if found.peek().is_none() {
        return;
    }
    let node_ref = NodeRef::from(node);
    for m in found {
        trace!("{} matched {:?} at {}", node.grammar_kind(), m.as_str(), m.start());
        out.push(Match::new(node_ref.clone(), text, m.start(), m.len()));
    }
}

/// Finds every occurrence of a pattern inside string literals.
///
/// The literal is searched exactly as written, quotes and escapes included.
/// Import paths are string literals too but are never searched.
#[derive(Debug)]
pub struct StrPatternMatcher {
    re: Regex,
    matches: Vec<Match>,
}

impl StrPatternMatcher {
    pub fn new(re: Regex) -> Self {
        Self {
            re,
            matches: Vec::new(),
        }
    }
}

impl Visitor for StrPatternMatcher {
    fn visit(&mut self, node: &SyntaxNode<'_>) -> Walk {
        match node.kind() {
            NodeKind::ImportSpec => Walk::Skip,
            NodeKind::StringLiteral => {
                collect_all(&self.re, node, node.text(), &mut self.matches);
                Walk::Descend
            }
            _ => Walk::Descend,
        }
    }
}

impl Matcher for StrPatternMatcher {
    fn matches(&self) -> &[Match] {
        &self.matches
    }

    fn reset(&mut self) {
        self.matches.clear();
    }

    fn pattern(&self) -> &Regex {
        &self.re
    }

    fn name(&self) -> &'static str {
        "string"
    }
}

/// Finds every occurrence of a pattern inside comments, markers included.
#[derive(Debug)]
pub struct CommentPatternMatcher {
    re: Regex,
    matches: Vec<Match>,
}

impl CommentPatternMatcher {
    pub fn new(re: Regex) -> Self {
        Self {
            re,
            matches: Vec::new(),
        }
    }
}

impl Visitor for CommentPatternMatcher {
    fn visit(&mut self, node: &SyntaxNode<'_>) -> Walk {
        if node.kind() == NodeKind::Comment {
            collect_all(&self.re, node, node.text(), &mut self.matches);
        }
        Walk::Descend
    }
}

impl Matcher for CommentPatternMatcher {
    fn matches(&self) -> &[Match] {
        &self.matches
    }

    fn reset(&mut self) {
        self.matches.clear();
    }

    fn pattern(&self) -> &Regex {
        &self.re
    }

    fn name(&self) -> &'static str {
        "comment"
    }
}

/// Matches the name of `var` and `const` declarations.
///
/// Function parameters, struct fields and `:=` assignments are not
/// declarations in this sense. When a declaration introduces several names
/// only the first one is considered, and at most one match (the leftmost) is
/// emitted per declaration.
#[derive(Debug)]
pub struct VarPatternMatcher {
    re: Regex,
    matches: Vec<Match>,
}

impl VarPatternMatcher {
    pub fn new(re: Regex) -> Self {
        Self {
            re,
            matches: Vec::new(),
        }
    }
}

impl Visitor for VarPatternMatcher {
    fn visit(&mut self, node: &SyntaxNode<'_>) -> Walk {
        // TODO: decide how `var a, b = 1, 2` should report its later names
        if let Some(name) = node.first_declared_name() {
            let text = name.text();
            if let Some(m) = self.re.find(text) {
                trace!("{} declares {:?}", node.grammar_kind(), text);
                // a value spec starts at its first name, so offsets line up
                self.matches
                    .push(Match::new(NodeRef::from(node), text, m.start(), m.len()));
            }
        }
        Walk::Descend
    }
}

impl Matcher for VarPatternMatcher {
    fn matches(&self) -> &[Match] {
        &self.matches
    }

    fn reset(&mut self) {
        self.matches.clear();
    }

    fn pattern(&self) -> &Regex {
        &self.re
    }

    fn name(&self) -> &'static str {
        "var"
    }
}
