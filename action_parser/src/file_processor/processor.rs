//! Action file reader with compile-time limits and global logging integration
//!
//! An action file holds one action per line. Blank lines and lines whose
//! first non-space character is `#` are skipped; every other line is kept
//! verbatim (minus surrounding whitespace) with its 1-based line number.

use crate::config::compile_time::file_processing::{MAX_ACTIONS_PER_FILE, MAX_FILE_SIZE};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const COMMENT_MARKER: char = '#';

/// File processor specific errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Not a regular file: {path}")]
    InvalidPath { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty: {path}")]
    EmptyFile { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file {path} at byte {offset}")]
    InvalidEncoding { path: String, offset: usize },

    #[error("I/O error reading {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Too many actions: {count} (max: {max_actions})")]
    TooManyActions { count: usize, max_actions: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidPath { .. } | FileProcessorError::IoError { .. } => {
                codes::file_processing::IO_ERROR
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile { .. } => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::TooManyActions { .. } => codes::file_processing::TOO_MANY_ACTIONS,
        }
    }

    pub fn requires_halt(&self) -> bool {
        self.error_code().requires_halt()
    }

    pub fn severity(&self) -> &'static str {
        self.error_code().severity().as_str()
    }

    pub fn is_recoverable(&self) -> bool {
        self.error_code().is_recoverable()
    }

    fn from_io(error: &std::io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => FileProcessorError::FileNotFound { path },
            ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied { path },
            _ => FileProcessorError::IoError {
                path,
                message: error.to_string(),
            },
        }
    }
}

/// File metadata collected during processing
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub line_count: usize,
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    /// Size with a binary unit: `12 B`, `2.00 KB`, up to GB
    pub fn human_readable_size(&self) -> String {
        if self.size < 1024 {
            return format!("{} B", self.size);
        }

        let mut scaled = self.size as f64 / 1024.0;
        let mut unit = "KB";
        for larger in ["MB", "GB"] {
            if scaled < 1024.0 {
                break;
            }
            scaled /= 1024.0;
            unit = larger;
        }
        format!("{:.2} {}", scaled, unit)
    }
}

/// One action line of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    /// 1-based line number
    pub line: usize,
    pub text: String,
}

/// Actions read from one file
#[derive(Debug, Clone)]
pub struct ActionFile {
    pub metadata: FileMetadata,
    pub entries: Vec<ActionEntry>,
    pub processing_duration: std::time::Duration,
}

impl ActionFile {
    pub fn path(&self) -> &Path {
        &self.metadata.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.text.as_str())
    }
}

/// Split action-file content into entries
pub fn extract_actions(source: &str) -> Result<Vec<ActionEntry>, FileProcessorError> {
    let mut entries = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let text = line.trim();
        if text.is_empty() || text.starts_with(COMMENT_MARKER) {
            continue;
        }
        if entries.len() >= MAX_ACTIONS_PER_FILE {
            return Err(FileProcessorError::TooManyActions {
                count: entries.len() + 1,
                max_actions: MAX_ACTIONS_PER_FILE,
            });
        }
        entries.push(ActionEntry {
            line: index + 1,
            text: text.to_string(),
        });
    }

    Ok(entries)
}

/// Reads action files under the compile-time size limits
#[derive(Debug, Clone)]
pub struct FileProcessor {
    /// Whether to include duration and size details in the success event
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            enable_performance_logging: true,
        }
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Read a file and split it into action entries
    pub fn process_file(&self, file_path: &Path) -> Result<ActionFile, FileProcessorError> {
        let start_time = std::time::Instant::now();
        let display = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => display.as_str());

        let result = self.read_actions(file_path);
        match result {
            Ok((source_len, metadata, entries)) => {
                let file = ActionFile {
                    metadata,
                    entries,
                    processing_duration: start_time.elapsed(),
                };
                self.log_processing_success(&file, source_len);
                Ok(file)
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(), "file" => display.as_str());
                Err(error)
            }
        }
    }

    fn read_actions(
        &self,
        path: &Path,
    ) -> Result<(usize, FileMetadata, Vec<ActionEntry>), FileProcessorError> {
        let fs_metadata =
            fs::metadata(path).map_err(|e| FileProcessorError::from_io(&e, path))?;

        if !fs_metadata.is_file() {
            return Err(FileProcessorError::InvalidPath {
                path: path.display().to_string(),
            });
        }

        let size = fs_metadata.len();
        if size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if size == 0 {
            return Err(FileProcessorError::EmptyFile {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path).map_err(|e| FileProcessorError::from_io(&e, path))?;
        let source = String::from_utf8(bytes).map_err(|e| FileProcessorError::InvalidEncoding {
            path: path.display().to_string(),
            offset: e.utf8_error().valid_up_to(),
        })?;

        let entries = extract_actions(&source)?;
        let metadata = FileMetadata {
            path: path.to_path_buf(),
            size,
            line_count: source.lines().count(),
            modified: fs_metadata.modified().ok(),
        };

        Ok((source.len(), metadata, entries))
    }

    fn log_processing_success(&self, file: &ActionFile, source_len: usize) {
        let path = file.metadata.path.display().to_string();

        if self.enable_performance_logging {
            let duration_ms = format!("{:.2}", file.processing_duration.as_secs_f64() * 1000.0);
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "Action file processed with performance metrics",
                "file" => path.as_str(),
                "size_human" => file.metadata.human_readable_size(),
                "bytes" => source_len,
                "lines" => file.metadata.line_count,
                "actions" => file.entries.len(),
                "duration_ms" => duration_ms
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "Action file processed",
                "file" => path.as_str(),
                "actions" => file.entries.len()
            );
        }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_extract_skips_blank_and_comment_lines() {
        let source = "# header\n\nx := 1\n   # indented comment\n  T'Write (c, v)  \n";
        let entries = extract_actions(source).expect("extract");
        assert_eq!(
            entries,
            vec![
                ActionEntry {
                    line: 3,
                    text: "x := 1".to_string()
                },
                ActionEntry {
                    line: 5,
                    text: "T'Write (c, v)".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_extract_keeps_crlf_lines_clean() {
        let entries = extract_actions("a := b\r\nc := d\r\n").expect("extract");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, "c := d");
        assert_eq!(entries[1].line, 2);
    }

    #[test]
    fn test_process_file() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("actions.txt");
        fs::write(&file_path, "x := 1\n# note\ny := f (x)\n").expect("write");

        let file = FileProcessor::new().process_file(&file_path).expect("process");
        assert_eq!(file.len(), 2);
        assert_eq!(file.metadata.line_count, 3);
        assert_eq!(file.path(), file_path.as_path());
        assert_eq!(file.texts().collect::<Vec<_>>(), vec!["x := 1", "y := f (x)"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().expect("tempdir");
        let error = FileProcessor::new()
            .process_file(&dir.path().join("absent.txt"))
            .expect_err("missing");
        assert_matches!(error, FileProcessorError::FileNotFound { .. });
        assert_eq!(error.error_code().as_str(), "E005");
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().expect("tempdir");
        assert_matches!(
            FileProcessor::new().process_file(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("empty.txt");
        fs::write(&file_path, "").expect("write");
        let error = FileProcessor::new()
            .process_file(&file_path)
            .expect_err("empty");
        assert_matches!(error, FileProcessorError::EmptyFile { .. });
        assert_eq!(error.error_code().as_str(), "E008");
    }

    #[test]
    fn test_comment_only_file_has_no_entries() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("comments.txt");
        fs::write(&file_path, "# nothing here\n\n").expect("write");
        let file = FileProcessor::new()
            .with_performance_logging(false)
            .process_file(&file_path)
            .expect("process");
        assert!(file.is_empty());
    }

    #[test]
    fn test_invalid_encoding() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("binary.txt");
        fs::write(&file_path, [b'x', b' ', 0xff, 0xfe]).expect("write");
        assert_matches!(
            FileProcessor::new().process_file(&file_path),
            Err(FileProcessorError::InvalidEncoding { offset: 2, .. })
        );
    }

    #[test]
    fn test_human_readable_size() {
        let metadata = FileMetadata {
            path: PathBuf::from("a"),
            size: 2048,
            line_count: 0,
            modified: None,
        };
        assert_eq!(metadata.human_readable_size(), "2.00 KB");

        let small = FileMetadata { size: 12, ..metadata.clone() };
        assert_eq!(small.human_readable_size(), "12 B");

        let huge = FileMetadata { size: 3 << 40, ..metadata };
        assert_eq!(huge.human_readable_size(), "3072.00 GB");
    }
}
