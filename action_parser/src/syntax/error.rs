//! Parse error taxonomy for actions
//!
//! Every failure carries the span where the expectation failed and the
//! expectation text, and maps to a stable code in the logging registry.
//! There is no recovery: the first error ends the parse.

use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::tokens::Token;
use crate::utils::{SourceMap, Span};
use serde::Serialize;

pub type ParseResult<T> = Result<T, ParseError>;

/// Resource limits enforced while lexing and parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LimitKind {
    ActionLength,
    IdentifierLength,
    StringSize,
    NumberDigits,
    TokenCount,
    NestingDepth,
}

impl LimitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActionLength => "action length",
            Self::IdentifierLength => "identifier length",
            Self::StringSize => "string size",
            Self::NumberDigits => "number digits",
            Self::TokenCount => "token count",
            Self::NestingDepth => "nesting depth",
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ActionLength => codes::lexical::ACTION_TOO_LONG,
            Self::IdentifierLength => codes::lexical::IDENTIFIER_TOO_LONG,
            Self::StringSize => codes::lexical::STRING_TOO_LARGE,
            Self::NumberDigits => codes::lexical::NUMBER_TOO_LONG,
            Self::TokenCount => codes::lexical::TOO_MANY_TOKENS,
            Self::NestingDepth => codes::syntax::MAX_RECURSION_DEPTH,
        }
    }
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No alternative matches at the position
    #[error("expected {expected} at position {}, found {found}", .span.start.offset)]
    LexicalMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// A complete action was parsed but input remains
    #[error("expected end of input at position {}, found {found}", .span.start.offset)]
    UnexpectedTrailingInput { found: String, span: Span },

    /// A rule committed to a form and could not complete it
    #[error("expected {expected} at position {}, found {found}", .span.start.offset)]
    StructuralMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("expected at most {maximum} for {limit} at position {}, found {actual}", .span.start.offset)]
    LimitExceeded {
        limit: LimitKind,
        actual: usize,
        maximum: usize,
        span: Span,
    },
}

impl ParseError {
    pub fn lexical_mismatch(expected: impl Into<String>, found: &Token, span: Span) -> Self {
        Self::LexicalMismatch {
            expected: expected.into(),
            found: found.describe(),
            span,
        }
    }

    pub fn structural_mismatch(expected: impl Into<String>, found: &Token, span: Span) -> Self {
        Self::StructuralMismatch {
            expected: expected.into(),
            found: found.describe(),
            span,
        }
    }

    pub fn trailing_input(found: &Token, span: Span) -> Self {
        Self::UnexpectedTrailingInput {
            found: found.describe(),
            span,
        }
    }

    pub fn limit_exceeded(limit: LimitKind, actual: usize, maximum: usize, span: Span) -> Self {
        Self::LimitExceeded {
            limit,
            actual,
            maximum,
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::LexicalMismatch { span, .. }
            | Self::UnexpectedTrailingInput { span, .. }
            | Self::StructuralMismatch { span, .. }
            | Self::LimitExceeded { span, .. } => *span,
        }
    }

    /// Byte offset (0-based) where the expectation failed
    pub fn position(&self) -> usize {
        self.span().start.offset
    }

    /// What the parser was looking for
    pub fn expected(&self) -> String {
        match self {
            Self::LexicalMismatch { expected, .. } | Self::StructuralMismatch { expected, .. } => {
                expected.clone()
            }
            Self::UnexpectedTrailingInput { .. } => "end of input".to_string(),
            Self::LimitExceeded { limit, maximum, .. } => format!("at most {} for {}", maximum, limit),
        }
    }

    pub fn found(&self) -> String {
        match self {
            Self::LexicalMismatch { found, .. }
            | Self::StructuralMismatch { found, .. }
            | Self::UnexpectedTrailingInput { found, .. } => found.clone(),
            Self::LimitExceeded { actual, .. } => actual.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::LexicalMismatch { .. } => "lexical mismatch",
            Self::UnexpectedTrailingInput { .. } => "unexpected trailing input",
            Self::StructuralMismatch { .. } => "structural mismatch",
            Self::LimitExceeded { .. } => "limit exceeded",
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::LexicalMismatch { .. } => codes::syntax::LEXICAL_MISMATCH,
            Self::UnexpectedTrailingInput { .. } => codes::syntax::UNEXPECTED_TRAILING_INPUT,
            Self::StructuralMismatch { .. } => codes::syntax::STRUCTURAL_MISMATCH,
            Self::LimitExceeded { limit, .. } => limit.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        self.error_code().requires_halt()
    }

    pub fn is_recoverable(&self) -> bool {
        self.error_code().is_recoverable()
    }

    pub fn severity(&self) -> &'static str {
        self.error_code().severity().as_str()
    }

    pub fn category(&self) -> &'static str {
        self.error_code().category()
    }

    pub fn description(&self) -> &'static str {
        self.error_code().description()
    }

    pub fn recommended_action(&self) -> &'static str {
        self.error_code().recommended_action()
    }

    /// Caret diagnostic under the offending column of `source`
    pub fn format_with_source(&self, source: &str) -> String {
        let map = SourceMap::new(source);
        let start = map.position_at(self.span().start.offset);
        let end = map.position_at(self.span().end.offset.max(start.offset));
        let located = Span::new(start, end);
        format!(
            "{}\n  = help: {}",
            map.format_error(&located, &self.to_string()).trim_end(),
            self.recommended_action()
        )
    }
}

fn describe_char(character: char) -> String {
    format!("'{}'", character)
}

impl From<LexerError> for ParseError {
    fn from(error: LexerError) -> Self {
        match error {
            LexerError::InvalidCharacter {
                character,
                expected,
                span,
            } => Self::LexicalMismatch {
                expected: expected.to_string(),
                found: describe_char(character),
                span,
            },
            LexerError::UnterminatedString { quote, span, .. } => Self::StructuralMismatch {
                expected: format!("closing {}", describe_char(quote)),
                found: "end of input".to_string(),
                span,
            },
            LexerError::InvalidNumber { text, span } => Self::LexicalMismatch {
                expected: "number followed by a delimiter".to_string(),
                found: format!("'{}'", text),
                span,
            },
            LexerError::InvalidBasedLiteral {
                expected,
                found,
                span,
            } => Self::StructuralMismatch {
                expected,
                found,
                span,
            },
            LexerError::ActionTooLong { length, span } => Self::LimitExceeded {
                limit: LimitKind::ActionLength,
                actual: length,
                maximum: crate::config::compile_time::lexical::MAX_ACTION_LENGTH,
                span,
            },
            LexerError::IdentifierTooLong { length, span } => Self::LimitExceeded {
                limit: LimitKind::IdentifierLength,
                actual: length,
                maximum: crate::config::compile_time::lexical::MAX_IDENTIFIER_LENGTH,
                span,
            },
            LexerError::StringTooLarge { size, span } => Self::LimitExceeded {
                limit: LimitKind::StringSize,
                actual: size,
                maximum: crate::config::compile_time::lexical::MAX_STRING_SIZE,
                span,
            },
            LexerError::NumberTooLong { digits, span } => Self::LimitExceeded {
                limit: LimitKind::NumberDigits,
                actual: digits,
                maximum: crate::config::compile_time::lexical::MAX_NUMBER_DIGITS,
                span,
            },
            LexerError::TooManyTokens { count, span } => Self::LimitExceeded {
                limit: LimitKind::TokenCount,
                actual: count,
                maximum: crate::config::compile_time::lexical::MAX_TOKEN_COUNT,
                span,
            },
        }
    }
}
