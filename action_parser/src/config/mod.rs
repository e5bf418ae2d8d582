//! Configuration module for the action parser
//! Compile-time limits come from the TOML profile; preferences come from the environment

// Include generated constants from build.rs
// This file is generated at compile time from the selected TOML profile
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{ConfigError, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        super::compile_time::PROFILE
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ACTION_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::{batch, file_processing, lexical, logging, syntax};
    use super::*;

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(lexical::MAX_STRING_SIZE <= lexical::MAX_ACTION_LENGTH);
        assert!(lexical::MAX_IDENTIFIER_LENGTH > 0);
        assert!(lexical::MAX_NUMBER_DIGITS > 0);
        assert!(syntax::MAX_PARSE_DEPTH > 0);
        assert!(syntax::MAX_LOOKAHEAD_TOKENS >= 2);
        assert!(batch::MAX_WORKER_THREADS > 0);
        assert!(batch::MAX_CHUNK_SIZE > 0);
        assert!(file_processing::MAX_FILE_SIZE > 0);
        assert!(logging::SECURITY_MIN_LOG_LEVEL <= 2);
    }

    #[test]
    fn test_build_info() {
        assert!(!build_info::profile().is_empty());
        assert!(build_info::source_info().ends_with(".toml"));
        assert!(build_info::source_info().contains(build_info::profile()));
    }
}
