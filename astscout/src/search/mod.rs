//! The concurrent parse-then-match pipeline.
//!
//! A search runs as two long-lived stages connected by unbounded channels:
//!
//! ```text
//!  paths ──► parse stage ──► ParsedFile ──► match stage ──► Match ──► caller
//!            (1 thread,                     (1 thread + rayon pool,
//!             file by file)                  matchers fanned out per file)
//! ```
//!
//! 1. **Parse stage** ([`engine::parse_stage`]) reads and parses one file at
//!    a time, in input order. Files that fail to read or parse are logged
//!    and never sent on.
//!
//! 2. **Match stage** ([`engine::match_stage`]) takes the parsed files in
//!    arrival order. For each file it spawns one task per [`Matcher`] inside
//!    a `rayon` scope: reset, walk, forward the matches. The scope is a
//!    barrier, so the next file is only started once every matcher is done
//!    with the current one. That is what lets a matcher keep a plain
//!    `Vec<Match>` accumulator: it is lent to one task at a time.
//!
//! Matches found by one matcher in one file arrive in traversal order;
//! across matchers and files the order depends on completion order.
//!
//! ```rust,ignore
//! let config = SearchConfig {
//!     comment_pattern: Some("(?i)todo".into()),
//!     paths: vec!["cmd".into()],
//!     ..SearchConfig::default()
//! };
//! let mut stream = search(&config)?;
//! let fset = stream.file_set().clone();
//! for m in stream.by_ref() {
//!     println!("{}\t{}", m.position(&fset), m.text);
//! }
//! let stats = stream.finish();
//! ```

pub mod engine;
pub mod matcher;

pub use engine::{search, ParsedFiles, SearchStream, Searcher};
pub use matcher::{
    CommentPatternMatcher, Matcher, MatcherKind, StrPatternMatcher, VarPatternMatcher,
};
