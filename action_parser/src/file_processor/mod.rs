//! Action file reading with compile-time limits and global logging integration

mod processor;

use crate::config::compile_time::file_processing::{MAX_ACTIONS_PER_FILE, MAX_FILE_SIZE};
use crate::log_debug;
use std::path::Path;

pub use processor::{
    extract_actions, ActionEntry, ActionFile, FileMetadata, FileProcessor, FileProcessorError,
};

/// Read an action file with default settings
pub fn process_file(file_path: &Path) -> Result<ActionFile, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Check if an error should halt processing
pub fn should_halt_on_error(error: &FileProcessorError) -> bool {
    error.requires_halt()
}

/// Get the compile-time maximum file size limit
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

/// Validate file processor error codes against the registry (for system startup)
pub fn init_file_processor_logging() -> Result<(), String> {
    let file_codes = [
        crate::logging::codes::file_processing::FILE_NOT_FOUND,
        crate::logging::codes::file_processing::FILE_TOO_LARGE,
        crate::logging::codes::file_processing::EMPTY_FILE,
        crate::logging::codes::file_processing::PERMISSION_DENIED,
        crate::logging::codes::file_processing::INVALID_ENCODING,
        crate::logging::codes::file_processing::IO_ERROR,
        crate::logging::codes::file_processing::TOO_MANY_ACTIONS,
    ];

    for code in &file_codes {
        if !code.is_registered() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "max_actions_per_file" => MAX_ACTIONS_PER_FILE
    );

    Ok(())
}
