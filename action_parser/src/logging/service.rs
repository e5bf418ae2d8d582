//! Log sinks and the level-filtering service in front of them

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Drops events below `min_level` and forwards the rest to one sink
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Sink chosen from the runtime logging preferences
    pub fn with_config() -> Self {
        let logger: Arc<dyn Logger> = match (
            config::use_console_logging(),
            config::use_structured_logging(),
        ) {
            (false, _) => Arc::new(StderrErrorLogger),
            (true, true) => Arc::new(StructuredLogger),
            (true, false) => Arc::new(ConsoleLogger),
        };

        Self::new(logger, config::get_min_log_level())
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

/// One line per event; errors on stderr, the rest on stdout
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.is_error() {
            eprintln!("{}", event.format());
        } else {
            println!("{}", event.format());
        }
    }
}

/// Default sink when console logging is off. Prints halting errors only, so
/// stdout stays reserved for parsed actions.
pub struct StderrErrorLogger;

impl Logger for StderrErrorLogger {
    fn log(&self, event: &LogEvent) {
        if event.requires_halt() {
            eprintln!("{}", event.format());
        }
    }
}

/// JSON lines on stderr
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(line) => eprintln!("{}", line),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

/// Keeps the most recent events in memory, bounded by the error buffer size
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, VecDeque<LogEvent>> {
        // A panicking test thread must not hide events from the others
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn codes(&self) -> Vec<Code> {
        self.events().iter().map(|e| e.code).collect()
    }

    pub fn errors(&self) -> Vec<LogEvent> {
        self.events().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.is_error() && e.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let capacity = config::get_error_buffer_size().max(1);
        let mut events = self.events();
        while events.len() >= capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

/// Memory sink for tests
pub fn create_test_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();
        assert!(logger.is_empty());

        logger.log(&LogEvent::info("parsing"));
        logger.log(&LogEvent::error(codes::syntax::LEXICAL_MISMATCH, "no alternative"));

        assert_eq!(logger.len(), 2);
        assert_eq!(logger.errors().len(), 1);
        assert!(logger.has_error_with_code(codes::syntax::LEXICAL_MISMATCH));
        assert!(!logger.has_error_with_code(codes::syntax::STRUCTURAL_MISMATCH));

        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_memory_logger_keeps_most_recent() {
        let logger = MemoryLogger::new();
        let capacity = config::get_error_buffer_size();

        for _ in 0..capacity {
            logger.log(&LogEvent::warning("noise"));
        }
        logger.log(&LogEvent::success(codes::success::ACTION_PARSED, "parsed"));

        assert_eq!(logger.len(), capacity);
        assert_eq!(logger.codes().last(), Some(&codes::success::ACTION_PARSED));
    }

    #[test]
    fn test_service_level_filtering() {
        let logger = create_test_logger();
        let service = LoggingService::new(logger.clone(), LogLevel::Warning);

        service.log_event(LogEvent::debug("token stream built"));
        service.log_event(LogEvent::info("parsing action"));
        service.log_event(LogEvent::warning("deep nesting"));
        service.log_event(LogEvent::error(codes::syntax::MAX_RECURSION_DEPTH, "too deep"));

        assert_eq!(logger.len(), 2);
        assert!(logger.has_error_with_code(codes::syntax::MAX_RECURSION_DEPTH));
        assert!(!service.should_log(LogLevel::Info));
        assert!(service.should_log(LogLevel::Error));
    }
}
