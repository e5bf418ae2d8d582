//! Configuration module for logging
//!
//! Buffer sizes and message limits are compile-time constants. Level and output
//! format are runtime preferences.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

// ============================================================================
// RUNTIME PREFERENCES STORAGE
// ============================================================================

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; must happen before the first log call
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    validate_preferences(&preferences)?;

    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

/// Preferences in effect, read from the environment on first use when never installed
fn get_runtime_preferences() -> &'static LoggingPreferences {
    RUNTIME_PREFERENCES.get_or_init(LoggingPreferences::default)
}

fn validate_preferences(preferences: &LoggingPreferences) -> Result<(), String> {
    // Errors can never be filtered out, so only the warning floor is checked
    if SECURITY_MIN_LOG_LEVEL >= 1 && preferences.min_log_level < LogLevel::Warning {
        return Err(format!(
            "Minimum log level {} is below the security floor (level {})",
            preferences.min_log_level.as_str(),
            SECURITY_MIN_LOG_LEVEL
        ));
    }

    Ok(())
}

// ============================================================================
// CONFIGURATION ACCESS FUNCTIONS
// ============================================================================

/// Get minimum log level
pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level
}

/// Check if structured logging is enabled
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Check if console logging is enabled
pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Check if events should carry the action source and line
pub fn include_source_context() -> bool {
    get_runtime_preferences().include_source_context
}

/// Capacity of in-memory log buffers
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Maximum events retained per action source by the error collector
pub fn get_max_log_events_per_source() -> usize {
    MAX_LOG_EVENTS_PER_SOURCE
}

/// Maximum events retained by the error collector overall
pub fn get_max_error_collection() -> usize {
    MAX_ERROR_COLLECTION
}

/// Clip a message to the configured maximum length on a char boundary
pub fn truncate_message(message: &str) -> &str {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message;
    }
    let mut end = MAX_LOG_MESSAGE_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

// ============================================================================
// CONFIGURATION VALIDATION
// ============================================================================

/// Validate current configuration settings
pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!("Log buffer size out of range: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_SOURCE > MAX_ERROR_COLLECTION {
        return Err("Max log events per source exceeds total error collection".to_string());
    }

    if let Some(preferences) = RUNTIME_PREFERENCES.get() {
        validate_preferences(preferences)?;
    }

    Ok(())
}

/// Get configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Compile-time Limits ===\n\
         - Log buffer size: {}\n\
         - Max events per source: {}\n\
         - Max collected events: {}\n\
         - Max message length: {}\n\
         - Security min level: {}\n\
         === Runtime Preferences ===\n\
         - Min log level: {}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Include source context: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_SOURCE,
        MAX_ERROR_COLLECTION,
        MAX_LOG_MESSAGE_LENGTH,
        SECURITY_MIN_LOG_LEVEL,
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.include_source_context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_valid() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_truncate_message() {
        let short = "expected ')'";
        assert_eq!(truncate_message(short), short);

        let long = "é".repeat(MAX_LOG_MESSAGE_LENGTH);
        let clipped = truncate_message(&long);
        assert!(clipped.len() <= MAX_LOG_MESSAGE_LENGTH);
        assert!(clipped.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_error_only_level_is_rejected_under_security_floor() {
        let mut preferences = LoggingPreferences::default();
        preferences.min_log_level = LogLevel::Error;
        let result = validate_preferences(&preferences);
        assert_eq!(result.is_err(), SECURITY_MIN_LOG_LEVEL >= 1);

        preferences.min_log_level = LogLevel::Debug;
        assert!(validate_preferences(&preferences).is_ok());
    }

    #[test]
    fn test_summary_lists_limits() {
        let summary = get_config_summary();
        assert!(summary.contains("Log buffer size"));
        assert!(summary.contains("Min log level"));
    }
}
