use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use super::matcher::Matcher;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::filters::collect_source_files;
use crate::metrics::{SearchMetrics, SearchStats};
use crate::results::Match;
use crate::syntax::{walk, FileSet, GoParser, ParsedFile};

/// Lazily parses a list of paths, one file at a time and in order.
///
/// Files that cannot be read or parsed are logged and skipped; only
/// successfully parsed files are yielded.
pub struct ParsedFiles {
    paths: std::vec::IntoIter<PathBuf>,
    parser: GoParser,
    fset: Arc<FileSet>,
    metrics: SearchMetrics,
}

impl ParsedFiles {
    pub fn new(paths: Vec<PathBuf>, fset: Arc<FileSet>, metrics: SearchMetrics) -> SearchResult<Self> {
        Ok(Self {
            paths: paths.into_iter(),
            parser: GoParser::new()?,
            fset,
            metrics,
        })
    }
}

impl Iterator for ParsedFiles {
    type Item = ParsedFile;

    fn next(&mut self) -> Option<ParsedFile> {
        for path in self.paths.by_ref() {
            self.metrics.record_attempt();
            match self.parser.parse_file(&self.fset, &path) {
                Ok(file) => {
                    self.metrics.record_parsed();
                    return Some(file);
                }
                Err(e) => {
                    self.metrics.record_parse_failure();
                    warn!("{}", e);
                }
            }
        }
        None
    }
}

/// Runs `files` on a dedicated thread, handing each parsed file downstream.
///
/// The returned channel closes once every path has been attempted.
pub fn parse_stage(files: ParsedFiles) -> SearchResult<(Receiver<ParsedFile>, JoinHandle<()>)> {
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("astscout-parse".to_string())
        .spawn(move || {
            for file in files {
                if tx.send(file).is_err() {
                    debug!("Match stage hung up, stopping parse stage");
                    break;
                }
            }
            debug!("Parse stage finished");
        })?;
    Ok((rx, handle))
}

/// Walks one file with every matcher concurrently and forwards the results.
///
/// Each matcher is lent to exactly one task. The scope only returns once all
/// of them are done, which is what makes resetting the matchers for the next
/// file safe. Returns `false` when the consumer has hung up.
fn match_file(
    pool: &ThreadPool,
    matchers: &mut [Box<dyn Matcher>],
    file: &ParsedFile,
    tx: &Sender<Match>,
    metrics: &SearchMetrics,
) -> bool {
    let hung_up = AtomicBool::new(false);
    pool.scope(|s| {
        for matcher in matchers.iter_mut() {
            let tx = tx.clone();
            let hung_up = &hung_up;
            s.spawn(move |_| {
                matcher.reset();
                walk(matcher.as_mut(), file);
                let mut sent = 0;
                for m in matcher.matches() {
                    if tx.send(m.clone()).is_err() {
                        hung_up.store(true, Ordering::Relaxed);
                        break;
                    }
                    sent += 1;
                }
                debug!(
                    "{} matcher found {} matches in {}",
                    matcher.name(),
                    sent,
                    file.path().display()
                );
                metrics.record_matches(sent);
            });
        }
    });
    !hung_up.load(Ordering::Relaxed)
}

/// Consumes parsed files on a dedicated thread and runs every matcher over
/// each one, merging all matches into the returned channel.
///
/// Files are processed strictly one after the other. Matches of one matcher
/// on one file arrive in traversal order; nothing else is ordered.
pub fn match_stage(
    files: Receiver<ParsedFile>,
    mut matchers: Vec<Box<dyn Matcher>>,
    pool: ThreadPool,
    metrics: SearchMetrics,
) -> SearchResult<(Receiver<Match>, JoinHandle<()>)> {
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("astscout-match".to_string())
        .spawn(move || {
            for file in files {
                debug!(
                    "Matching {} with {} matchers",
                    file.path().display(),
                    matchers.len()
                );
                if !match_file(&pool, &mut matchers, &file, &tx, &metrics) {
                    debug!("Consumer hung up, stopping match stage");
                    break;
                }
            }
            debug!("Match stage finished");
        })?;
    Ok((rx, handle))
}

/// The running pipeline: an iterator over matches as they are found.
///
/// Dropping the stream early is fine, both stages notice and stop.
pub struct SearchStream {
    file_set: Arc<FileSet>,
    matches: Receiver<Match>,
    workers: Vec<JoinHandle<()>>,
    metrics: SearchMetrics,
}

impl SearchStream {
    /// Position table used to resolve [`Match::position`].
    pub fn file_set(&self) -> &Arc<FileSet> {
        &self.file_set
    }

    /// Waits for both stages to exit and returns the run's statistics.
    ///
    /// Matches not yet consumed are discarded.
    pub fn finish(self) -> SearchStats {
        let SearchStream {
            matches,
            workers,
            metrics,
            ..
        } = self;
        drop(matches);
        for worker in workers {
            let name = worker.thread().name().unwrap_or("worker").to_string();
            if worker.join().is_err() {
                error!("{} thread panicked", name);
            }
        }
        metrics.log_stats();
        metrics.snapshot()
    }
}

impl Iterator for SearchStream {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        self.matches.recv().ok()
    }
}

/// A set of compiled matchers and the thread pool that runs them.
pub struct Searcher {
    matchers: Vec<Box<dyn Matcher>>,
    pool: ThreadPool,
}

impl Searcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>, thread_count: NonZeroUsize) -> SearchResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count.get())
            .thread_name(|i| format!("astscout-matcher-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(e.to_string()))?;
        Ok(Self { matchers, pool })
    }

    /// Compiles every pattern of `config`; a malformed pattern is an error.
    pub fn from_config(config: &SearchConfig) -> SearchResult<Self> {
        Self::new(config.build_matchers()?, config.thread_count)
    }

    pub fn matchers(&self) -> &[Box<dyn Matcher>] {
        &self.matchers
    }

    /// Starts the parse and match stages over `paths`.
    pub fn search(self, paths: Vec<PathBuf>) -> SearchResult<SearchStream> {
        let fset = Arc::new(FileSet::new());
        let metrics = SearchMetrics::new();
        debug!(
            "Searching {} files with {} matchers",
            paths.len(),
            self.matchers.len()
        );

        let files = ParsedFiles::new(paths, Arc::clone(&fset), metrics.clone())?;
        let (parsed, parser) = parse_stage(files)?;
        let (matches, matcher) = match_stage(parsed, self.matchers, self.pool, metrics.clone())?;

        Ok(SearchStream {
            file_set: fset,
            matches,
            workers: vec![parser, matcher],
            metrics,
        })
    }
}

/// Searches the paths of `config` with every configured pattern.
///
/// Patterns are compiled before any file is read, so a malformed pattern
/// fails the whole search up front.
pub fn search(config: &SearchConfig) -> SearchResult<SearchStream> {
    info!(
        "Starting search with patterns: {:?}",
        config.patterns()
    );
    let searcher = Searcher::from_config(config)?;
    let files = collect_source_files(&config.paths);
    info!("Found {} files to search", files.len());
    searcher.search(files)
}
