use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::SearchResult;
use crate::search::matcher::{Matcher, MatcherKind};

/// Configuration for a search run.
///
/// # Configuration Locations
///
/// Values are layered, later sources overriding earlier ones:
/// 1. Global `$CONFIG_DIR/astscout/config.yaml`
/// 2. Local `.astscout.yaml` in the current directory
/// 3. A file passed explicitly (the CLI's `--config` flag)
///
/// Command line arguments are merged on top with [`SearchConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Regular expression matched against string literals
/// string_pattern: "https?://"
///
/// # Regular expression matched against comments
/// comment_pattern: "(?i)todo|fixme"
///
/// # Regular expression matched against var/const names
/// var_pattern: "^Default"
///
/// # Files or directories to search
/// paths: ["cmd", "internal"]
///
/// # Threads used to run matchers (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// An empty pattern is the same as no pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Pattern for string literal contents
    #[serde(default)]
    pub string_pattern: Option<String>,

    /// Pattern for comment contents
    #[serde(default)]
    pub comment_pattern: Option<String>,

    /// Pattern for declared variable and constant names
    #[serde(default)]
    pub var_pattern: Option<String>,

    /// Files and directories to search
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Number of threads used to run matchers
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

pub fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

pub fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            string_pattern: None,
            comment_pattern: None,
            var_pattern: None,
            paths: Vec::new(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file
    ///
    /// An explicitly named file must exist.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("astscout/config.yaml")),
            Some(PathBuf::from(".astscout.yaml")),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        // CLI values take precedence over config file values
        if cli_config.string_pattern.is_some() {
            self.string_pattern = cli_config.string_pattern;
        }
        if cli_config.comment_pattern.is_some() {
            self.comment_pattern = cli_config.comment_pattern;
        }
        if cli_config.var_pattern.is_some() {
            self.var_pattern = cli_config.var_pattern;
        }
        if !cli_config.paths.is_empty() {
            self.paths = cli_config.paths;
        }
        if cli_config.thread_count != default_thread_count() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Active criteria in a fixed order: string, comment, var.
    pub fn patterns(&self) -> Vec<(MatcherKind, &str)> {
        [
            (MatcherKind::String, &self.string_pattern),
            (MatcherKind::Comment, &self.comment_pattern),
            (MatcherKind::Var, &self.var_pattern),
        ]
        .into_iter()
        .filter_map(|(kind, pattern)| match pattern.as_deref() {
            Some(p) if !p.is_empty() => Some((kind, p)),
            _ => None,
        })
        .collect()
    }

    /// Compiles every active pattern, failing on the first malformed one.
    pub fn build_matchers(&self) -> SearchResult<Vec<Box<dyn Matcher>>> {
        self.patterns()
            .into_iter()
            .map(|(kind, pattern)| kind.build(pattern))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchError;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            string_pattern: "https?://"
            comment_pattern: "TODO|FIXME"
            paths: ["cmd", "internal"]
            thread_count: 4
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.string_pattern.as_deref(), Some("https?://"));
        assert_eq!(config.comment_pattern.as_deref(), Some("TODO|FIXME"));
        assert_eq!(config.var_pattern, None);
        assert_eq!(
            config.paths,
            vec![PathBuf::from("cmd"), PathBuf::from("internal")]
        );
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"var_pattern: \"^Default\"\n").unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.var_pattern.as_deref(), Some("^Default"));
        assert!(config.paths.is_empty());
        assert_eq!(config.thread_count, default_thread_count());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"thread_count: \"many\"\npaths: 7\n").unwrap();

        assert!(SearchConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SearchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = SearchConfig {
            string_pattern: Some("apple".to_string()),
            comment_pattern: Some("banana".to_string()),
            paths: vec![PathBuf::from("src")],
            thread_count: NonZeroUsize::new(2).unwrap(),
            log_level: "info".to_string(),
            ..SearchConfig::default()
        };
        let cli_config = SearchConfig {
            comment_pattern: Some("cherry".to_string()),
            var_pattern: Some("Alpha".to_string()),
            paths: vec![PathBuf::from("main.go")],
            ..SearchConfig::default()
        };

        let merged = file_config.merge_with_cli(cli_config);
        assert_eq!(merged.string_pattern.as_deref(), Some("apple")); // file value
        assert_eq!(merged.comment_pattern.as_deref(), Some("cherry")); // CLI value
        assert_eq!(merged.var_pattern.as_deref(), Some("Alpha")); // CLI value
        assert_eq!(merged.paths, vec![PathBuf::from("main.go")]);
        assert_eq!(merged.thread_count, NonZeroUsize::new(2).unwrap()); // CLI left default
        assert_eq!(merged.log_level, "info");
    }

    #[test]
    fn test_patterns_skip_empty() {
        let config = SearchConfig {
            string_pattern: Some(String::new()),
            var_pattern: Some("x".to_string()),
            ..SearchConfig::default()
        };
        assert_eq!(config.patterns(), vec![(MatcherKind::Var, "x")]);
        assert!(SearchConfig::default().patterns().is_empty());
    }

    #[test]
    fn test_build_matchers() {
        let config = SearchConfig {
            string_pattern: Some("a".to_string()),
            comment_pattern: Some("b".to_string()),
            var_pattern: Some("c".to_string()),
            ..SearchConfig::default()
        };
        let names: Vec<_> = config
            .build_matchers()
            .unwrap()
            .iter()
            .map(|m| m.name())
            .collect();
        assert_eq!(names, vec!["string", "comment", "var"]);

        let bad = SearchConfig {
            comment_pattern: Some("[".to_string()),
            ..SearchConfig::default()
        };
        assert!(matches!(
            bad.build_matchers(),
            Err(SearchError::InvalidPattern { .. })
        ));
    }
}
