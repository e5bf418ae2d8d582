//! Runtime preferences
//!
//! Each preference defaults from an `ACTION_*` environment variable and can be
//! overridden by a TOML file passed with `--config`. Preferences never widen a
//! compile-time limit: values that overlap one (thread count, parse depth) are
//! clamped by the consumer.

use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Errors raised while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Environment variable names, one per preference field
pub mod env_vars {
    pub const LEXICAL_DETAILED_METRICS: &str = "ACTION_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_TOKEN_STATS: &str = "ACTION_LEXICAL_LOG_TOKEN_STATS";

    pub const PARSER_MAX_DEPTH: &str = "ACTION_PARSER_MAX_DEPTH";
    pub const PARSER_LOG_EVENTS: &str = "ACTION_PARSER_LOG_EVENTS";
    pub const PARSER_SOURCE_SNIPPET: &str = "ACTION_PARSER_SOURCE_SNIPPET";

    pub const BATCH_THREADS: &str = "ACTION_BATCH_THREADS";
    pub const BATCH_FAIL_FAST: &str = "ACTION_BATCH_FAIL_FAST";
    pub const BATCH_PROGRESS: &str = "ACTION_BATCH_PROGRESS";

    pub const LOGGING_USE_STRUCTURED: &str = "ACTION_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ACTION_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ACTION_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_SOURCE_CONTEXT: &str = "ACTION_LOGGING_INCLUDE_SOURCE_CONTEXT";
}

/// Value of `name` parsed as `T`; unset or unparsable values give `default`
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Count tokens per kind while scanning
    pub collect_detailed_metrics: bool,

    /// Log the token counts when tokenization completes
    pub log_token_statistics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            log_token_statistics: env_or(env_vars::LEXICAL_LOG_TOKEN_STATS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Nesting depth limit, clamped to the compile-time MAX_PARSE_DEPTH
    pub max_parse_depth: usize,

    /// Emit a debug event per parsed action
    pub log_parse_events: bool,

    /// Diagnostics include the source line with a caret
    pub include_source_snippet: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            max_parse_depth: env_or(env_vars::PARSER_MAX_DEPTH, MAX_PARSE_DEPTH),
            log_parse_events: env_or(env_vars::PARSER_LOG_EVENTS, true),
            include_source_snippet: env_or(env_vars::PARSER_SOURCE_SNIPPET, true),
        }
    }
}

impl ParserPreferences {
    /// Depth limit after applying the compile-time ceiling
    pub fn effective_max_depth(&self) -> usize {
        self.max_parse_depth.clamp(1, MAX_PARSE_DEPTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads for action-file validation (1 = sequential)
    pub max_threads: usize,

    /// Stop at the first failing action
    pub fail_fast: bool,

    /// Emit progress events while validating
    pub progress_reporting: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            max_threads: env_or(env_vars::BATCH_THREADS, 1),
            fail_fast: env_or(env_vars::BATCH_FAIL_FAST, false),
            progress_reporting: env_or(env_vars::BATCH_PROGRESS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Print every accepted event instead of halting errors only
    pub enable_console_logging: bool,

    /// Least severe level that reaches a sink, within the security floor
    pub min_log_level: LogLevel,

    /// Stamp events with the action file and line being validated
    pub include_source_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env_or(env_vars::LOGGING_MIN_LEVEL, LogLevel::Info),
            include_source_context: env_or(env_vars::LOGGING_INCLUDE_SOURCE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub parser: ParserPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections and fields fall back to the environment defaults
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content, &origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_env_or_falls_back_on_unset_and_garbage() {
        assert_eq!(env_or("ACTION_TEST_UNSET_VARIABLE", 7usize), 7);

        env::set_var("ACTION_TEST_GARBAGE_THREADS", "many");
        assert_eq!(env_or("ACTION_TEST_GARBAGE_THREADS", 3usize), 3);

        env::set_var("ACTION_TEST_PADDED_LEVEL", " warn ");
        assert_eq!(
            env_or("ACTION_TEST_PADDED_LEVEL", LogLevel::Info),
            LogLevel::Warning
        );
    }

    #[test]
    fn test_toml_overrides() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [parser]
            max_parse_depth = 12
            include_source_snippet = false

            [batch]
            max_threads = 4
            fail_fast = true

            [logging]
            min_log_level = "debug"
            "#,
            "inline",
        )
        .expect("valid config");

        assert_eq!(config.parser.max_parse_depth, 12);
        assert!(!config.parser.include_source_snippet);
        assert_eq!(config.batch.max_threads, 4);
        assert!(config.batch.fail_fast);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = RuntimeConfig::from_toml_str("[parser]\nmax_parse_depth = \"deep\"", "bad.toml");
        assert_matches!(result, Err(ConfigError::Parse { ref path, .. }) if path == "bad.toml");

        let level = RuntimeConfig::from_toml_str("[logging]\nmin_log_level = \"loud\"", "level.toml");
        assert_matches!(level, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("runtime.toml");
        std::fs::write(&path, "[lexical]\nlog_token_statistics = true\n").expect("write");

        let config = RuntimeConfig::load_from_file(&path).expect("load");
        assert!(config.lexical.log_token_statistics);

        let missing = RuntimeConfig::load_from_file(&dir.path().join("missing.toml"));
        assert_matches!(missing, Err(ConfigError::Io { .. }));
    }

    #[test]
    fn test_effective_depth_is_clamped() {
        let mut prefs = ParserPreferences::default();
        prefs.max_parse_depth = usize::MAX;
        assert_eq!(prefs.effective_max_depth(), MAX_PARSE_DEPTH);
        prefs.max_parse_depth = 0;
        assert_eq!(prefs.effective_max_depth(), 1);
    }
}
