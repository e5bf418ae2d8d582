//! Core lexical analyzer for action strings
//!
//! Produces the raw token vector (whitespace included) that the token stream
//! filters. Numeric literals are normalized here, so the grammar only ever sees
//! a `Token::Number` with its integer value, whatever base it was written in.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::token::{classify_symbol, classify_word};
use crate::tokens::{QuoteStyle, SpannedToken, StringLiteral, Token, TokenStream};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error, log_success};
use num_bigint::BigUint;

/// Lexical analysis errors; every variant carries the span of the offending lexeme
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at position {}", .span.start.offset)]
    InvalidCharacter {
        character: char,
        expected: &'static str,
        span: Span,
    },

    #[error("Unterminated string literal opened at position {opened_at}")]
    UnterminatedString {
        quote: char,
        opened_at: usize,
        span: Span,
    },

    #[error("Invalid number '{text}' at position {}", .span.start.offset)]
    InvalidNumber { text: String, span: Span },

    #[error("Invalid based literal: expected {expected}, found {found} at position {}", .span.start.offset)]
    InvalidBasedLiteral {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Action too long: {length} bytes (max {MAX_ACTION_LENGTH})")]
    ActionTooLong { length: usize, span: Span },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, span: Span },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize, span: Span },

    #[error("Number too long: {digits} digits (max {MAX_NUMBER_DIGITS})")]
    NumberTooLong { digits: usize, span: Span },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize, span: Span },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::InvalidBasedLiteral { .. } => codes::lexical::INVALID_BASED_LITERAL,
            LexerError::ActionTooLong { .. } => codes::lexical::ACTION_TOO_LONG,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::NumberTooLong { .. } => codes::lexical::NUMBER_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LexerError::InvalidCharacter { span, .. }
            | LexerError::UnterminatedString { span, .. }
            | LexerError::InvalidNumber { span, .. }
            | LexerError::InvalidBasedLiteral { span, .. }
            | LexerError::ActionTooLong { span, .. }
            | LexerError::IdentifierTooLong { span, .. }
            | LexerError::StringTooLarge { span, .. }
            | LexerError::NumberTooLong { span, .. }
            | LexerError::TooManyTokens { span, .. } => *span,
        }
    }
}

/// Token counts gathered during one tokenization
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub whitespace_tokens: usize,
    pub based_literals: usize,
    pub max_string_length: usize,
    pub max_number_digits: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        if !preferences.collect_detailed_metrics {
            return;
        }

        match token {
            Token::Identifier(_) => self.identifier_tokens += 1,
            Token::Boolean(_) | Token::Number(_) | Token::StringLiteral(_) => {
                self.literal_tokens += 1
            }
            Token::Plus | Token::Minus | Token::Star | Token::Slash => self.operator_tokens += 1,
            Token::Space | Token::Tab | Token::Newline => self.whitespace_tokens += 1,
            Token::Eof => {}
            _ => self.punctuation_tokens += 1,
        }
    }

    pub(crate) fn record_string_length(&mut self, length: usize) {
        self.max_string_length = self.max_string_length.max(length);
    }

    pub(crate) fn record_number(&mut self, digits: usize, based: bool) {
        self.max_number_digits = self.max_number_digits.max(digits);
        if based {
            self.based_literals += 1;
        }
    }
}

/// Character cursor over the action text that tracks line and column
struct Cursor<'a> {
    source: &'a str,
    offset: usize,
    position: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::start(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.offset..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        self.position = self.position.advance(ch);
        Some(ch)
    }

    /// Consume characters while `predicate` holds and return the consumed text
    fn eat_while<F>(&mut self, predicate: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.offset;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        &self.source[start..self.offset]
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.position)
    }

    /// Span of the next character, or a point at end of input
    fn next_char_span(&self) -> Span {
        match self.peek() {
            Some(ch) => Span::new(self.position, self.position.advance(ch)),
            None => Span::point(self.position),
        }
    }
}

fn describe_char(ch: Option<char>) -> String {
    match ch {
        Some(c) => format!("'{}'", c),
        None => "end of input".to_string(),
    }
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Lexical analyzer with compile-time limits and runtime preferences
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize an action into raw tokens, whitespace included, ending with `Eof`
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<SpannedToken>, LexerError> {
        self.metrics = LexicalMetrics::default();

        match self.scan(source) {
            Ok(tokens) => {
                if self.preferences.log_token_statistics {
                    log_success!(codes::success::TOKENIZATION_COMPLETE,
                        "Lexical analysis completed",
                        "token_count" => self.metrics.total_tokens,
                        "identifiers" => self.metrics.identifier_tokens,
                        "literals" => self.metrics.literal_tokens,
                        "operators" => self.metrics.operator_tokens,
                        "based_literals" => self.metrics.based_literals,
                        "max_string_length" => self.metrics.max_string_length
                    );
                }
                Ok(tokens)
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(),
                    span = error.span(),
                    "tokens_processed" => self.metrics.total_tokens
                );
                Err(error)
            }
        }
    }

    /// Tokenize and wrap the result in a [`TokenStream`]
    pub fn tokenize_to_stream(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.tokenize(source).map(TokenStream::new)
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    fn scan(&mut self, source: &str) -> Result<Vec<SpannedToken>, LexerError> {
        if source.len() > MAX_ACTION_LENGTH {
            return Err(LexerError::ActionTooLong {
                length: source.len(),
                span: Span::point(Position::start()),
            });
        }

        log_debug!("Starting lexical analysis",
            "length" => source.len(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let mut cursor = Cursor::new(source);
        let mut tokens: Vec<SpannedToken> = Vec::new();

        while let Some(ch) = cursor.peek() {
            if tokens.len() >= MAX_TOKEN_COUNT {
                return Err(LexerError::TooManyTokens {
                    count: tokens.len(),
                    span: cursor.next_char_span(),
                });
            }

            let start = cursor.position;
            let token = match ch {
                ' ' => {
                    cursor.bump();
                    Token::Space
                }
                '\t' => {
                    cursor.bump();
                    Token::Tab
                }
                '\n' => {
                    cursor.bump();
                    Token::Newline
                }
                '\r' => {
                    cursor.bump();
                    if cursor.peek() == Some('\n') {
                        cursor.bump();
                    }
                    Token::Newline
                }
                ':' => {
                    if cursor.peek_second() == Some('=') {
                        cursor.bump();
                        cursor.bump();
                        Token::Assign
                    } else {
                        return Err(LexerError::InvalidCharacter {
                            character: ch,
                            expected: "':='",
                            span: cursor.next_char_span(),
                        });
                    }
                }
                '\'' if Self::follows_identifier(&tokens, start) => {
                    cursor.bump();
                    Token::Tick
                }
                '\'' | '"' => self.scan_string(&mut cursor)?,
                '0'..='9' => self.scan_number(&mut cursor)?,
                'a'..='z' | 'A'..='Z' => Self::scan_word(&mut cursor)?,
                _ => match classify_symbol(ch) {
                    Some(token) => {
                        cursor.bump();
                        token
                    }
                    None => {
                        return Err(LexerError::InvalidCharacter {
                            character: ch,
                            expected: "a token",
                            span: cursor.next_char_span(),
                        })
                    }
                },
            };

            self.metrics.record_token(&token, &self.preferences);
            tokens.push(Spanned::new(token, cursor.span_from(start)));
        }

        tokens.push(Spanned::new(Token::Eof, Span::point(cursor.position)));
        Ok(tokens)
    }

    /// An apostrophe glued to the end of an identifier is an attribute tick
    fn follows_identifier(tokens: &[SpannedToken], at: Position) -> bool {
        tokens
            .last()
            .is_some_and(|t| t.value.is_identifier() && t.span.end().offset == at.offset)
    }

    fn scan_word(cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.position;
        let word = cursor.eat_while(is_identifier_continue);
        let length = word.chars().count();
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length,
                span: cursor.span_from(start),
            });
        }
        Ok(classify_word(word))
    }

    fn scan_string(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.position;
        let Some(delimiter) = cursor.bump() else {
            return Err(LexerError::UnterminatedString {
                quote: '"',
                opened_at: start.offset,
                span: Span::point(start),
            });
        };
        let quote = QuoteStyle::from_char(delimiter).unwrap_or(QuoteStyle::Double);

        let content = cursor.eat_while(|c| c != delimiter);
        if content.len() > MAX_STRING_SIZE {
            return Err(LexerError::StringTooLarge {
                size: content.len(),
                span: cursor.span_from(start),
            });
        }

        if cursor.bump().is_none() {
            return Err(LexerError::UnterminatedString {
                quote: delimiter,
                opened_at: start.offset,
                span: Span::point(cursor.position),
            });
        }

        self.metrics.record_string_length(content.len());
        Ok(Token::StringLiteral(StringLiteral::new(content, quote)))
    }

    /// Decimal `772` or based `16#0304#`
    fn scan_number(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.position;
        let digits = cursor.eat_while(|c| c.is_ascii_digit());
        Self::check_digit_count(digits, cursor, start)?;

        let (value, based) = if cursor.peek() == Some('#') {
            (Self::scan_based_digits(digits, cursor, start)?, true)
        } else {
            let value = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| {
                LexerError::InvalidNumber {
                    text: digits.to_string(),
                    span: cursor.span_from(start),
                }
            })?;
            (value, false)
        };

        // `12ab` is one malformed lexeme, not a number followed by a name
        if cursor.peek().is_some_and(is_identifier_continue) {
            let tail_start = cursor.offset;
            let tail = cursor.eat_while(is_identifier_continue);
            let text = format!(
                "{}{}",
                &cursor.source[start.offset..tail_start],
                tail
            );
            return Err(LexerError::InvalidNumber {
                text,
                span: cursor.span_from(start),
            });
        }

        self.metrics.record_number(digits.len(), based);
        Ok(Token::Number(value))
    }

    fn scan_based_digits(
        base_text: &str,
        cursor: &mut Cursor<'_>,
        start: Position,
    ) -> Result<BigUint, LexerError> {
        let base = base_text
            .parse::<u32>()
            .ok()
            .filter(|b| (2..=16).contains(b))
            .ok_or_else(|| LexerError::InvalidBasedLiteral {
                expected: "base between 2 and 16".to_string(),
                found: format!("base {}", base_text),
                span: cursor.span_from(start),
            })?;

        // opening '#'
        cursor.bump();

        let digit_start = cursor.offset;
        while let Some(ch) = cursor.peek() {
            if ch == '#' {
                break;
            }
            if !ch.is_digit(base) {
                return Err(LexerError::InvalidBasedLiteral {
                    expected: format!("digit valid in base {}", base),
                    found: describe_char(Some(ch)),
                    span: cursor.next_char_span(),
                });
            }
            cursor.bump();
        }
        let digits = &cursor.source[digit_start..cursor.offset];

        if digits.is_empty() {
            return Err(LexerError::InvalidBasedLiteral {
                expected: format!("digit valid in base {}", base),
                found: describe_char(cursor.peek()),
                span: cursor.next_char_span(),
            });
        }
        if cursor.peek() != Some('#') {
            return Err(LexerError::InvalidBasedLiteral {
                expected: "closing '#'".to_string(),
                found: describe_char(cursor.peek()),
                span: cursor.next_char_span(),
            });
        }
        Self::check_digit_count(digits, cursor, start)?;

        // closing '#'
        cursor.bump();

        BigUint::parse_bytes(digits.as_bytes(), base).ok_or_else(|| {
            LexerError::InvalidBasedLiteral {
                expected: format!("digits valid in base {}", base),
                found: format!("'{}'", digits),
                span: cursor.span_from(start),
            }
        })
    }

    fn check_digit_count(
        digits: &str,
        cursor: &Cursor<'_>,
        start: Position,
    ) -> Result<(), LexerError> {
        if digits.len() > MAX_NUMBER_DIGITS {
            return Err(LexerError::NumberTooLong {
                digits: digits.len(),
                span: cursor.span_from(start),
            });
        }
        Ok(())
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
