//! Global logging for the action parser
//!
//! Thread-safe global logger with per-thread source context for action-file
//! validation and a small macro interface. Logging before initialization is a no-op.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ProcessingSummary, SourceContext};
pub use events::{EventSource, LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<SourceContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    init_global_logging_with_service(Arc::new(LoggingService::with_config()))
}

/// Initialize with a specific service (used by tests and embedding applications)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    for code in codes::all_error_codes() {
        if !code.is_registered() {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    // The collector may already exist if a source context was opened earlier
    let _ = GLOBAL_ERROR_COLLECTOR.set(Arc::new(ErrorCollector::new()));

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Safe access to global error collector
pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// SOURCE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_source_context(origin: PathBuf, line: usize) {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(SourceContext::new(origin, line));
    });
}

pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with events stamped by the given action source and line
pub fn with_source_context<F, R>(origin: PathBuf, line: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_source_context();
    set_source_context(origin, line);
    let result = f();
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

/// Get current source context (used by macros)
pub fn get_current_source_context() -> Option<SourceContext> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// DISPATCH
// ============================================================================

fn stamp_source(event: LogEvent) -> LogEvent {
    match get_current_source_context() {
        Some(source) if config::include_source_context() => {
            event.with_source(&source.origin.display().to_string(), source.line)
        }
        _ => event,
    }
}

/// Forward an event to the global logger and, inside a source context, to the collector
pub fn dispatch_event(mut event: LogEvent) {
    let clipped = config::truncate_message(&event.message).len();
    event.message.truncate(clipped);
    let event = stamp_source(event);

    if event.is_error() || event.is_warning() {
        if let (Some(source), Some(collector)) =
            (get_current_source_context(), try_get_global_error_collector())
        {
            collector.record_event(&source.origin, event.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Whether debug events would reach any sink; lets hot paths skip formatting
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// COLLECTED ERRORS
// ============================================================================

/// Get summary of collected events
pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

/// Error logging that falls back to stderr when logging is not initialized
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

/// Get system diagnostics
pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    let summary = get_processing_summary();
    diagnostics.push_str(&format!("Sources with events: {}\n", summary.total_sources));
    diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
    diagnostics.push_str(&format!("Total warnings: {}\n", summary.total_warnings));

    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_context_management() {
        assert!(get_current_source_context().is_none());

        set_source_context(PathBuf::from("model.actions"), 4);
        let context = get_current_source_context().unwrap();
        assert_eq!(context.origin, PathBuf::from("model.actions"));
        assert_eq!(context.line, 4);

        clear_source_context();
        assert!(get_current_source_context().is_none());
    }

    #[test]
    fn test_with_source_context_restores_previous() {
        let result = with_source_context(PathBuf::from("outer.actions"), 1, || {
            with_source_context(PathBuf::from("inner.actions"), 9, || {
                assert_eq!(get_current_source_context().unwrap().line, 9);
            });
            get_current_source_context().unwrap().origin
        });

        assert_eq!(result, PathBuf::from("outer.actions"));
        assert!(get_current_source_context().is_none());
    }

    #[test]
    fn test_logging_without_initialization_is_silent() {
        dispatch_event(LogEvent::error(codes::syntax::LEXICAL_MISMATCH, "no alternative"));
        dispatch_event(LogEvent::info("still fine").with_context("key", "value"));
        safe_log_error(codes::system::INTERNAL_ERROR, "fallback path");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Logging Configuration"));
    }
}
