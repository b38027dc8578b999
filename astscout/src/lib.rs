pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod results;
pub mod search;
pub mod syntax;

pub use config::SearchConfig;
pub use errors::{SearchError, SearchResult};
pub use metrics::SearchStats;
pub use results::{Highlight, Match, NodeRef};
pub use search::{search, Matcher, MatcherKind, SearchStream, Searcher};
pub use syntax::{FileSet, Position};
