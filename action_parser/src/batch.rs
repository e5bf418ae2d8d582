//! Batch validation of action files
//!
//! Parses every entry of an [`ActionFile`] with one shared [`ActionGrammar`],
//! either sequentially or on scoped worker threads over chunks of entries.
//! Results are kept in source order, so the first failure is always the
//! earliest failing line no matter how many threads ran.

use crate::config::compile_time::batch::{MAX_CHUNK_SIZE, MAX_WORKER_THREADS};
use crate::config::runtime::BatchPreferences;
use crate::file_processor::{ActionEntry, ActionFile};
use crate::grammar::ast::nodes::Action;
use crate::logging::{self, codes};
use crate::syntax::{ActionGrammar, ParseError};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch validation configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub fail_fast: bool,
    pub progress_reporting: bool,
}

impl BatchConfig {
    /// Thread count after applying the compile-time ceiling
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

impl From<&BatchPreferences> for BatchConfig {
    fn from(preferences: &BatchPreferences) -> Self {
        Self {
            max_threads: preferences.max_threads,
            fail_fast: preferences.fail_fast,
            progress_reporting: preferences.progress_reporting,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from(&BatchPreferences::default())
    }
}

/// An entry that parsed
#[derive(Debug, Clone)]
pub struct ValidatedAction {
    pub line: usize,
    pub text: String,
    pub action: Action,
}

/// An entry that failed to parse
#[derive(Debug, Clone)]
pub struct FailedAction {
    pub line: usize,
    pub text: String,
    pub error: ParseError,
}

impl FailedAction {
    /// `path:line: error` followed by a caret diagnostic
    pub fn report(&self, origin: &Path) -> String {
        format!(
            "{}:{}: {}\n{}",
            origin.display(),
            self.line,
            self.error,
            self.error.format_with_source(&self.text)
        )
    }
}

/// Batch validation results, both lists in source order
#[derive(Debug)]
pub struct BatchResults {
    pub started_at: DateTime<Utc>,
    pub successes: Vec<ValidatedAction>,
    pub failures: Vec<FailedAction>,
    pub actions_total: usize,
    pub threads_used: usize,
    pub processing_duration: Duration,
}

impl BatchResults {
    pub fn new(actions_total: usize) -> Self {
        Self {
            started_at: Utc::now(),
            successes: Vec::new(),
            failures: Vec::new(),
            actions_total,
            threads_used: 1,
            processing_duration: Duration::new(0, 0),
        }
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn actions_processed(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Every entry was processed and parsed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.actions_processed() == self.actions_total
    }

    /// Earliest failing entry
    pub fn first_failure(&self) -> Option<&FailedAction> {
        self.failures.first()
    }

    pub fn success_rate(&self) -> f64 {
        let processed = self.actions_processed();
        if processed == 0 {
            0.0
        } else {
            self.successes.len() as f64 / processed as f64
        }
    }

    fn add(&mut self, entry: &ActionEntry, outcome: Result<Action, ParseError>) {
        match outcome {
            Ok(action) => self.successes.push(ValidatedAction {
                line: entry.line,
                text: entry.text.clone(),
                action,
            }),
            Err(error) => self.failures.push(FailedAction {
                line: entry.line,
                text: entry.text.clone(),
                error,
            }),
        }
    }

    /// Append results of a later chunk
    fn merge(&mut self, other: BatchResults) {
        self.successes.extend(other.successes);
        self.failures.extend(other.failures);
    }

    pub fn summary(&self) -> String {
        format!(
            "Validated {} of {} actions: {} parsed ({:.1}%), {} failed, {} thread(s), {:.2}s",
            self.actions_processed(),
            self.actions_total,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.threads_used,
            self.processing_duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Worker thread failed: {message}")]
    ThreadFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            BatchError::ThreadFailure { .. } => codes::batch::THREAD_FAILURE,
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validate an action file with the process-wide grammar
pub fn validate_actions(
    file: &ActionFile,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    validate_actions_with_grammar(file, config, crate::syntax::default_grammar())
}

/// Validate an action file with a caller-supplied grammar
pub fn validate_actions_with_grammar(
    file: &ActionFile,
    config: &BatchConfig,
    grammar: &ActionGrammar,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.effective_threads();

    crate::log_info!("Starting action validation",
        "file" => file.path().display(),
        "actions" => file.len(),
        "threads" => threads
    );

    let mut results = if threads == 1 || file.len() <= 1 {
        validate_sequential(file.path(), &file.entries, config, grammar)
    } else {
        validate_parallel(file.path(), &file.entries, config, grammar, threads)?
    };
    results.processing_duration = start_time.elapsed();

    log_completion(file.path(), &results);
    Ok(results)
}

fn validate_entry(
    origin: &Path,
    entry: &ActionEntry,
    grammar: &ActionGrammar,
) -> Result<Action, ParseError> {
    logging::with_source_context(origin.to_path_buf(), entry.line, || grammar.parse(&entry.text))
}

fn validate_sequential(
    origin: &Path,
    entries: &[ActionEntry],
    config: &BatchConfig,
    grammar: &ActionGrammar,
) -> BatchResults {
    let mut results = BatchResults::new(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        if config.progress_reporting {
            crate::log_info!("Validating action",
                "index" => index + 1,
                "of" => entries.len(),
                "line" => entry.line
            );
        }

        results.add(entry, validate_entry(origin, entry, grammar));

        if config.fail_fast && !results.failures.is_empty() {
            crate::log_warning!("Fail-fast mode enabled, stopping validation",
                "line" => entry.line
            );
            break;
        }
    }

    results
}

/// Chunks are dispatched in rounds of `threads`; each round joins in order
fn validate_parallel(
    origin: &Path,
    entries: &[ActionEntry],
    config: &BatchConfig,
    grammar: &ActionGrammar,
    threads: usize,
) -> Result<BatchResults, BatchError> {
    let mut results = BatchResults::new(entries.len());
    let chunk_size = calculate_chunk_size(entries.len(), threads);
    let chunks: Vec<&[ActionEntry]> = entries.chunks(chunk_size).collect();
    results.threads_used = threads.min(chunks.len());

    crate::log_debug!("Parallel validation configuration",
        "total_actions" => entries.len(),
        "chunk_size" => chunk_size,
        "threads" => results.threads_used
    );

    for (round, round_chunks) in chunks.chunks(threads).enumerate() {
        if config.progress_reporting {
            crate::log_info!("Validating chunk round",
                "round" => round + 1,
                "chunks" => round_chunks.len()
            );
        }

        let round_results = thread::scope(|scope| {
            let handles: Vec<_> = round_chunks
                .iter()
                .map(|chunk| {
                    scope.spawn(move || {
                        let mut chunk_results = BatchResults::new(chunk.len());
                        for entry in chunk.iter() {
                            chunk_results.add(entry, validate_entry(origin, entry, grammar));
                        }
                        chunk_results
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().map_err(|_| BatchError::ThreadFailure {
                        message: "worker panicked during validation".to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        });

        let round_results = match round_results {
            Ok(round_results) => round_results,
            Err(error) => {
                crate::log_error!(error.error_code(), &error.to_string(),
                    "file" => origin.display()
                );
                return Err(error);
            }
        };

        for chunk_results in round_results {
            results.merge(chunk_results);
        }

        if config.fail_fast && !results.failures.is_empty() {
            crate::log_warning!("Fail-fast mode enabled, stopping validation",
                "round" => round + 1
            );
            break;
        }
    }

    Ok(results)
}

/// Even split across threads, bounded by the compile-time chunk size
fn calculate_chunk_size(total: usize, threads: usize) -> usize {
    let ideal = (total + threads - 1) / threads.max(1);
    ideal.clamp(1, MAX_CHUNK_SIZE)
}

fn log_completion(origin: &Path, results: &BatchResults) {
    let duration_ms = format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0);

    match results.first_failure() {
        None => {
            crate::log_success!(
                codes::success::BATCH_VALIDATION_COMPLETED,
                "Action validation completed",
                "file" => origin.display(),
                "actions" => results.actions_processed(),
                "threads" => results.threads_used,
                "duration_ms" => duration_ms
            );
        }
        Some(first) => {
            crate::log_error!(
                codes::batch::ACTION_VALIDATION_FAILED,
                "Action validation failed",
                "file" => origin.display(),
                "failed" => results.failure_count(),
                "first_line" => first.line,
                "duration_ms" => duration_ms
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_processor::{extract_actions, FileMetadata};
    use crate::grammar::ast::nodes::Expression;
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    fn action_file(source: &str) -> ActionFile {
        ActionFile {
            metadata: FileMetadata {
                path: PathBuf::from("actions.txt"),
                size: source.len() as u64,
                line_count: source.lines().count(),
                modified: None,
            },
            entries: extract_actions(source).expect("extract"),
            processing_duration: Duration::new(0, 0),
        }
    }

    fn config(max_threads: usize, fail_fast: bool) -> BatchConfig {
        BatchConfig {
            max_threads,
            fail_fast,
            progress_reporting: false,
        }
    }

    #[test]
    fn test_sequential_validation() {
        let file = action_file("x := 1\n# comment\ny := f (x)\nT'Write (c, v)\n");
        let results = validate_actions(&file, &config(1, false)).expect("validate");

        assert!(results.is_success());
        assert_eq!(results.success_count(), 3);
        assert_eq!(results.successes[1].line, 3);
        assert_eq!(
            results.successes[0].action.expression(),
            &Expression::number(1u32)
        );
    }

    #[test]
    fn test_first_failure_is_earliest_line() {
        let file = action_file("a := 1\nb := f (x\nc := 2\nd := 3 3\n");
        let results = validate_actions(&file, &config(1, false)).expect("validate");

        assert_eq!(results.failure_count(), 2);
        let first = results.first_failure().expect("failure");
        assert_eq!(first.line, 2);
        assert_matches!(first.error, ParseError::StructuralMismatch { .. });
        assert!(!results.is_success());
    }

    #[test]
    fn test_fail_fast_stops_sequential_run() {
        let file = action_file("a := 1\nb := @\nc := 2\n");
        let results = validate_actions(&file, &config(1, true)).expect("validate");

        assert_eq!(results.actions_processed(), 2);
        assert_eq!(results.first_failure().map(|f| f.line), Some(2));
        assert!(!results.is_success());
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let mut source = String::new();
        for i in 0..200 {
            if i % 37 == 5 {
                source.push_str(&format!("v{} := f (\n", i));
            } else {
                source.push_str(&format!("v{} := g (a{}, {}) \n", i, i, i));
            }
        }
        let file = action_file(&source);

        let sequential = validate_actions(&file, &config(1, false)).expect("sequential");
        let parallel = validate_actions(&file, &config(4, false)).expect("parallel");

        assert_eq!(parallel.threads_used, 4);
        assert_eq!(sequential.failure_count(), parallel.failure_count());
        assert_eq!(
            sequential.first_failure().map(|f| f.line),
            parallel.first_failure().map(|f| f.line)
        );
        let lines = |r: &BatchResults| r.successes.iter().map(|s| s.line).collect::<Vec<_>>();
        assert_eq!(lines(&sequential), lines(&parallel));
        assert_eq!(parallel.first_failure().map(|f| f.line), Some(6));
    }

    #[test]
    fn test_parallel_fail_fast_reports_first_failure() {
        let mut source = String::from("bad := (\n");
        for i in 0..50 {
            source.push_str(&format!("v{} := {}\n", i, i));
        }
        let file = action_file(&source);
        let results = validate_actions(&file, &config(2, true)).expect("validate");

        assert_eq!(results.first_failure().map(|f| f.line), Some(1));
        assert!(!results.is_success());
    }

    #[test]
    fn test_failure_report_format() {
        let file = action_file("x := f (a\n");
        let results = validate_actions(&file, &config(1, false)).expect("validate");
        let report = results
            .first_failure()
            .expect("failure")
            .report(file.path());

        assert!(report.starts_with("actions.txt:1: expected ',' or ')' at position 9"));
        assert!(report.contains('^'));
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(MAX_CHUNK_SIZE * 10, 2), MAX_CHUNK_SIZE);
    }

    #[test]
    fn test_thread_ceiling() {
        assert_eq!(config(0, false).effective_threads(), 1);
        assert_eq!(
            config(MAX_WORKER_THREADS + 5, false).effective_threads(),
            MAX_WORKER_THREADS
        );
    }

    #[test]
    fn test_empty_file_is_success() {
        let file = action_file("# only comments\n");
        let results = validate_actions(&file, &config(4, false)).expect("validate");
        assert!(results.is_success());
        assert_eq!(results.success_rate(), 0.0);
    }
}
