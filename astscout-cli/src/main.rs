use anyhow::{Context, Result};
use astscout::{
    config::{default_log_level, default_thread_count},
    search, Match, SearchConfig, SearchError, SearchStats,
};
use clap::Parser;
use colored::Colorize;
use std::{
    collections::HashSet,
    io::{self, BufWriter, Write},
    num::NonZeroUsize,
    path::PathBuf,
    sync::Arc,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Search Go sources for patterns in string literals, comments and
/// declared variable names.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Go files or directories to search
    #[arg(required = true, value_name = "FILE")]
    paths: Vec<PathBuf>,

    /// Regular expression matched against string literals
    #[arg(short = 's', long = "string", value_name = "PATTERN")]
    string_pattern: Option<String>,

    /// Regular expression matched against comments
    #[arg(short = 'c', long = "comment", value_name = "PATTERN")]
    comment_pattern: Option<String>,

    /// Regular expression matched against declared var/const names
    #[arg(short = 'v', long = "var", value_name = "PATTERN")]
    var_pattern: Option<String>,

    /// Number of threads used to run matchers
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print matches without highlighting
    #[arg(long)]
    no_color: bool,

    /// Print a summary to stderr after the run
    #[arg(long)]
    stats: bool,
}

impl Cli {
    fn search_config(&self) -> Result<SearchConfig> {
        let file_config = SearchConfig::load_from(self.config.as_deref())
            .map_err(|e| SearchError::config_error(e.to_string()))
            .context("failed to load configuration")?;

        let cli_config = SearchConfig {
            string_pattern: self.string_pattern.clone(),
            comment_pattern: self.comment_pattern.clone(),
            var_pattern: self.var_pattern.clone(),
            paths: self.paths.clone(),
            thread_count: self.threads.unwrap_or_else(default_thread_count),
            log_level: self.log_level.clone().unwrap_or_else(default_log_level),
        };
        Ok(file_config.merge_with_cli(cli_config))
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.search_config()?;
    init_logging(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    let mut stream = search(&config)?;
    let fset = Arc::clone(stream.file_set());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut files_with_matches = HashSet::new();
    for m in stream.by_ref() {
        let position = m.position(&fset);
        print_match(&mut out, &position, &m)?;
        files_with_matches.insert(position.filename);
    }
    out.flush()?;

    let stats = stream.finish();
    if cli.stats {
        print_stats(&stats, files_with_matches.len());
    }
    Ok(())
}

fn print_match(out: &mut impl Write, position: &astscout::Position, m: &Match) -> io::Result<()> {
    let h = m.highlighted();
    writeln!(
        out,
        "{}\t{}{}{}",
        position,
        h.prefix,
        h.matched.red(),
        h.suffix
    )
}

fn print_stats(stats: &SearchStats, files_with_matches: usize) {
    eprintln!(
        "Found {} matches in {} files ({} failed to parse)",
        stats.matches, files_with_matches, stats.parse_failures
    );
}
