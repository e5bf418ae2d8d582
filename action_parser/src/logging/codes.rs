//! Log codes and their classification metadata
//!
//! Every error code the parser, file reader and batch validator emit is declared here
//! together with its severity, category and recommended action.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone, Copy)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    const fn row(
        code: Code,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code: code.as_str(),
            category: "",
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }

    /// Stops the current run
    const fn halting(
        code: Code,
        severity: Severity,
        description: &'static str,
        action: &'static str,
    ) -> Self {
        Self::row(code, severity, false, true, description, action)
    }

    /// Fails the action it was raised for; the caller moves on to the next one
    const fn reported(
        code: Code,
        severity: Severity,
        description: &'static str,
        action: &'static str,
    ) -> Self {
        Self::row(code, severity, false, false, description, action)
    }

    const fn recoverable(
        code: Code,
        severity: Severity,
        description: &'static str,
        action: &'static str,
    ) -> Self {
        Self::row(code, severity, true, false, description, action)
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Action file error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const TOO_MANY_ACTIONS: Code = Code::new("E012");
}

/// Tokenizer error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const INVALID_BASED_LITERAL: Code = Code::new("E023");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E024");
    pub const STRING_TOO_LARGE: Code = Code::new("E025");
    pub const NUMBER_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const ACTION_TOO_LONG: Code = Code::new("E028");
}

/// Grammar error codes, one per parse error kind
pub mod syntax {
    use super::Code;

    pub const LEXICAL_MISMATCH: Code = Code::new("E040");
    pub const UNEXPECTED_TRAILING_INPUT: Code = Code::new("E041");
    pub const STRUCTURAL_MISMATCH: Code = Code::new("E042");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E043");
}

/// Action-list validation error codes
pub mod batch {
    use super::Code;

    pub const THREAD_FAILURE: Code = Code::new("E060");
    pub const ACTION_VALIDATION_FAILED: Code = Code::new("E061");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I010");
    pub const ACTION_PARSED: Code = Code::new("I020");
    pub const BATCH_VALIDATION_COMPLETED: Code = Code::new("I030");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const SYSTEM_ERRORS: &[ErrorMetadata] = &[
    ErrorMetadata::halting(
        system::INTERNAL_ERROR,
        Severity::Critical,
        "Critical internal system error",
        "File a bug report with the failing input",
    ),
    ErrorMetadata::halting(
        system::INITIALIZATION_FAILURE,
        Severity::Critical,
        "System initialization failure",
        "Check logging configuration and error code registry",
    ),
    ErrorMetadata::halting(
        system::CONFIGURATION_ERROR,
        Severity::High,
        "Invalid runtime configuration",
        "Fix the runtime configuration file or ACTION_* environment variables",
    ),
];

const FILE_ERRORS: &[ErrorMetadata] = &[
    ErrorMetadata::halting(
        file_processing::FILE_NOT_FOUND,
        Severity::High,
        "Action file not found",
        "Verify the file path exists",
    ),
    ErrorMetadata::halting(
        file_processing::FILE_TOO_LARGE,
        Severity::High,
        "Action file exceeds size limit",
        "Split the action list into smaller files",
    ),
    ErrorMetadata::recoverable(
        file_processing::EMPTY_FILE,
        Severity::Low,
        "Action file contains no actions",
        "Add at least one action line",
    ),
    ErrorMetadata::halting(
        file_processing::PERMISSION_DENIED,
        Severity::High,
        "Permission denied reading action file",
        "Check file permissions",
    ),
    ErrorMetadata::halting(
        file_processing::INVALID_ENCODING,
        Severity::High,
        "Action file is not valid UTF-8",
        "Re-encode the file as UTF-8",
    ),
    ErrorMetadata::halting(
        file_processing::IO_ERROR,
        Severity::High,
        "I/O error reading action file",
        "Check disk and file system health",
    ),
    ErrorMetadata::halting(
        file_processing::TOO_MANY_ACTIONS,
        Severity::High,
        "Action file exceeds maximum action count",
        "Split the action list into smaller files",
    ),
];

const LEXICAL_ERRORS: &[ErrorMetadata] = &[
    ErrorMetadata::reported(
        lexical::INVALID_CHARACTER,
        Severity::High,
        "Character does not start any token",
        "Remove or quote the offending character",
    ),
    ErrorMetadata::reported(
        lexical::UNTERMINATED_STRING,
        Severity::High,
        "String literal is missing its closing quote",
        "Add the matching closing quote",
    ),
    ErrorMetadata::reported(
        lexical::INVALID_NUMBER,
        Severity::High,
        "Malformed number literal",
        "Separate the number from following letters",
    ),
    ErrorMetadata::reported(
        lexical::INVALID_BASED_LITERAL,
        Severity::High,
        "Malformed based literal",
        "Use base#digits# with a base in 2..16 and digits valid for that base",
    ),
    ErrorMetadata::reported(
        lexical::IDENTIFIER_TOO_LONG,
        Severity::Medium,
        "Identifier exceeds maximum length",
        "Shorten the identifier",
    ),
    ErrorMetadata::reported(
        lexical::STRING_TOO_LARGE,
        Severity::Medium,
        "String literal exceeds maximum size",
        "Shorten the string literal",
    ),
    ErrorMetadata::reported(
        lexical::NUMBER_TOO_LONG,
        Severity::Medium,
        "Number literal has too many digits",
        "Shorten the number literal",
    ),
    ErrorMetadata::reported(
        lexical::TOO_MANY_TOKENS,
        Severity::Medium,
        "Action produces too many tokens",
        "Simplify the action",
    ),
    ErrorMetadata::reported(
        lexical::ACTION_TOO_LONG,
        Severity::Medium,
        "Action text exceeds maximum length",
        "Shorten the action",
    ),
];

const SYNTAX_ERRORS: &[ErrorMetadata] = &[
    ErrorMetadata::reported(
        syntax::LEXICAL_MISMATCH,
        Severity::High,
        "No grammar alternative matches at this position",
        "Check the action against the assignment and attribute forms",
    ),
    ErrorMetadata::reported(
        syntax::UNEXPECTED_TRAILING_INPUT,
        Severity::High,
        "Action parsed but input remains",
        "Remove the trailing text or join it with an operator",
    ),
    ErrorMetadata::reported(
        syntax::STRUCTURAL_MISMATCH,
        Severity::High,
        "Construct opened but not completed",
        "Close the parenthesis, quote or attribute form",
    ),
    ErrorMetadata::reported(
        syntax::MAX_RECURSION_DEPTH,
        Severity::High,
        "Nesting depth limit exceeded",
        "Reduce call or parenthesis nesting",
    ),
];

const BATCH_ERRORS: &[ErrorMetadata] = &[
    ErrorMetadata::halting(
        batch::THREAD_FAILURE,
        Severity::Critical,
        "Worker thread failed during validation",
        "Retry with --threads 1 and report the failure",
    ),
    ErrorMetadata::recoverable(
        batch::ACTION_VALIDATION_FAILED,
        Severity::Medium,
        "Action failed validation",
        "See the accompanying parse error",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let tables = [
            ("System", SYSTEM_ERRORS),
            ("FileProcessing", FILE_ERRORS),
            ("Lexical", LEXICAL_ERRORS),
            ("Syntax", SYNTAX_ERRORS),
            ("Batch", BATCH_ERRORS),
        ];

        tables
            .iter()
            .flat_map(|&(category, rows)| {
                rows.iter()
                    .map(move |row| (row.code, ErrorMetadata { category, ..*row }))
            })
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Registry lookups. Unregistered codes (info, debug and warning events) fall
/// back to a recoverable, non-halting, medium-severity classification.
impl Code {
    pub fn metadata(self) -> Option<&'static ErrorMetadata> {
        get_error_registry().get(self.0)
    }

    pub fn is_registered(self) -> bool {
        self.metadata().is_some()
    }

    pub fn severity(self) -> Severity {
        self.metadata().map_or(Severity::Medium, |m| m.severity)
    }

    pub fn category(self) -> &'static str {
        self.metadata().map_or("Unknown", |m| m.category)
    }

    pub fn description(self) -> &'static str {
        self.metadata().map_or("Unknown error", |m| m.description)
    }

    pub fn recommended_action(self) -> &'static str {
        self.metadata()
            .map_or("No specific action available", |m| m.recommended_action)
    }

    pub fn is_recoverable(self) -> bool {
        self.metadata().map_or(true, |m| m.recoverable)
    }

    pub fn requires_halt(self) -> bool {
        self.metadata().is_some_and(|m| m.requires_halt)
    }
}

/// Every error code constant, used to verify registry coverage at startup
pub fn all_error_codes() -> &'static [Code] {
    &[
        system::INTERNAL_ERROR,
        system::INITIALIZATION_FAILURE,
        system::CONFIGURATION_ERROR,
        file_processing::FILE_NOT_FOUND,
        file_processing::FILE_TOO_LARGE,
        file_processing::EMPTY_FILE,
        file_processing::PERMISSION_DENIED,
        file_processing::INVALID_ENCODING,
        file_processing::IO_ERROR,
        file_processing::TOO_MANY_ACTIONS,
        lexical::INVALID_CHARACTER,
        lexical::UNTERMINATED_STRING,
        lexical::INVALID_NUMBER,
        lexical::INVALID_BASED_LITERAL,
        lexical::IDENTIFIER_TOO_LONG,
        lexical::STRING_TOO_LARGE,
        lexical::NUMBER_TOO_LONG,
        lexical::TOO_MANY_TOKENS,
        lexical::ACTION_TOO_LONG,
        syntax::LEXICAL_MISMATCH,
        syntax::UNEXPECTED_TRAILING_INPUT,
        syntax::STRUCTURAL_MISMATCH,
        syntax::MAX_RECURSION_DEPTH,
        batch::THREAD_FAILURE,
        batch::ACTION_VALIDATION_FAILED,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_is_registered() {
        for code in all_error_codes() {
            let metadata = code.metadata();
            assert!(metadata.is_some(), "missing metadata for {}", code);
            assert_eq!(metadata.map(|m| m.code), Some(code.as_str()));
        }
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        let unknown = Code::new("E999");
        assert!(!unknown.is_registered());
        assert_eq!(unknown.description(), "Unknown error");
        assert_eq!(unknown.category(), "Unknown");
        assert_eq!(unknown.severity(), Severity::Medium);
        assert!(unknown.is_recoverable());
        assert!(!unknown.requires_halt());
    }

    #[test]
    fn test_syntax_classification() {
        assert_eq!(syntax::STRUCTURAL_MISMATCH.category(), "Syntax");
        assert!(batch::THREAD_FAILURE.requires_halt());
        assert!(!syntax::LEXICAL_MISMATCH.requires_halt());
        assert_eq!(system::INTERNAL_ERROR.severity(), Severity::Critical);
    }

    #[test]
    fn test_registry_rows_carry_category_and_disposition() {
        let metadata = file_processing::EMPTY_FILE.metadata().expect("E008");
        assert_eq!(metadata.category, "FileProcessing");
        assert!(metadata.recoverable);
        assert!(!metadata.requires_halt);

        let halting = system::CONFIGURATION_ERROR.metadata().expect("ERR003");
        assert_eq!(halting.category, "System");
        assert!(halting.requires_halt);
        assert_eq!(
            syntax::UNEXPECTED_TRAILING_INPUT.recommended_action(),
            "Remove the trailing text or join it with an operator"
        );
    }
}
