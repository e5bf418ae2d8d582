//! Error collector for action-file validation with cargo-style output
//!
//! Events logged while a source context is active are grouped by action file.

use super::config;
use super::events::LogEvent;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// The action currently being parsed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub origin: PathBuf,
    pub line: usize,
}

impl SourceContext {
    pub fn new(origin: PathBuf, line: usize) -> Self {
        Self { origin, line }
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

/// Counts across every source recorded by the collector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub total_sources: usize,
    pub sources_with_errors: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub dropped_events: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

#[derive(Default)]
struct CollectorState {
    events: BTreeMap<PathBuf, Vec<LogEvent>>,
    total: usize,
    dropped: usize,
}

/// Thread-safe collector of warning and error events per action source
#[derive(Default)]
pub struct ErrorCollector {
    state: Mutex<CollectorState>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an event for a source; per-source and global caps drop the excess
    pub fn record_event(&self, origin: &Path, event: LogEvent) {
        let mut state = self.state();

        if state.total >= config::get_max_error_collection() {
            state.dropped += 1;
            return;
        }

        let per_source = config::get_max_log_events_per_source();
        let source_events = state.events.entry(origin.to_path_buf()).or_default();
        if source_events.len() >= per_source {
            state.dropped += 1;
            return;
        }

        source_events.push(event);
        state.total += 1;
    }

    pub fn get_source_events(&self, origin: &Path) -> Vec<LogEvent> {
        self.state().events.get(origin).cloned().unwrap_or_default()
    }

    pub fn get_source_errors(&self, origin: &Path) -> Vec<LogEvent> {
        self.state()
            .events
            .get(origin)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_source_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.state().events.clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let state = self.state();
        let mut summary = ProcessingSummary {
            total_sources: state.events.len(),
            dropped_events: state.dropped,
            ..ProcessingSummary::default()
        };

        for events in state.events.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            if errors > 0 {
                summary.sources_with_errors += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += events.iter().filter(|e| e.is_warning()).count();
        }

        summary
    }

    pub fn clear(&self) {
        *self.state() = CollectorState::default();
    }
}

/// Render collected events grouped by source, cargo style
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (origin, events) in collector.get_all_source_events() {
        if events.is_empty() {
            continue;
        }
        output.push_str(&format!("Checking {}...\n", origin.display()));

        for event in events.iter().filter(|e| e.is_error() || e.is_warning()) {
            let label = if event.is_error() { "error" } else { "warning" };
            let location = match (&event.source, &event.span) {
                (Some(source), Some(span)) => format!(
                    " --> {}:{}:{}",
                    origin.display(),
                    source.line,
                    span.start().column
                ),
                (Some(source), None) => format!(" --> {}:{}", origin.display(), source.line),
                _ => String::new(),
            };

            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                label,
                event.code.as_str(),
                event.message,
                location
            ));

            if let Some(metadata) = event.error_metadata() {
                output.push_str(&format!(
                    "  = severity: {}, category: {}\n  = help: {}\n",
                    metadata.severity.as_str(),
                    metadata.category,
                    metadata.recommended_action
                ));
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }
    if summary.dropped_events > 0 {
        output.push_str(&format!("Dropped events: {}\n", summary.dropped_events));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_events_grouped_by_source() {
        let collector = ErrorCollector::new();
        let first = PathBuf::from("a.actions");
        let second = PathBuf::from("b.actions");

        collector.record_event(
            &first,
            LogEvent::error(codes::syntax::STRUCTURAL_MISMATCH, "expected ')'").with_source("a.actions", 3),
        );
        collector.record_event(&first, LogEvent::warning("deprecated form"));
        collector.record_event(&second, LogEvent::warning("deprecated form"));

        assert_eq!(collector.get_source_events(&first).len(), 2);
        assert_eq!(collector.get_source_errors(&first).len(), 1);
        assert!(collector.get_source_errors(&second).is_empty());

        let summary = collector.get_summary();
        assert_eq!(summary.total_sources, 2);
        assert_eq!(summary.sources_with_errors, 1);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.total_warnings, 2);
    }

    #[test]
    fn test_per_source_cap() {
        let collector = ErrorCollector::new();
        let origin = PathBuf::from("flood.actions");
        let cap = config::get_max_log_events_per_source();

        for _ in 0..cap + 3 {
            collector.record_event(&origin, LogEvent::warning("noise"));
        }

        assert_eq!(collector.get_source_events(&origin).len(), cap);
        assert_eq!(collector.get_summary().dropped_events, 3);

        collector.clear();
        assert_eq!(collector.get_summary(), ProcessingSummary::default());
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let origin = PathBuf::from("model.actions");
        collector.record_event(
            &origin,
            LogEvent::error(codes::syntax::UNEXPECTED_TRAILING_INPUT, "expected end of input")
                .with_source("model.actions", 7),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking model.actions..."));
        assert!(output.contains("error[E041]: expected end of input --> model.actions:7"));
        assert!(output.contains("Total errors: 1"));
    }
}
