//! Token definitions for the action language

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote character that delimited a string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '\'' => Some(Self::Single),
            '"' => Some(Self::Double),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

/// String literal content with its delimiter; content has no escapes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringLiteral {
    pub content: String,
    pub quote: QuoteStyle,
}

impl StringLiteral {
    pub fn new(content: impl Into<String>, quote: QuoteStyle) -> Self {
        Self {
            content: content.into(),
            quote,
        }
    }
}

impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.quote.as_char();
        write!(f, "{}{}{}", q, self.content, q)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    // Names and literals
    Identifier(String),
    Boolean(bool),
    /// Decimal or based numeral, already normalized
    Number(BigUint),
    StringLiteral(StringLiteral),

    // Punctuation
    Assign,     // :=
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,
    Dot,        // .
    /// Apostrophe glued to a preceding identifier (`Type'Read`)
    Tick,

    // Arithmetic operators
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /

    // Formatting
    Space,
    Tab,
    Newline,

    Eof,
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Identifier,
    Literal,
    Punctuation,
    Operator,
    Whitespace,
    Special,
}

impl Token {
    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Identifier(_) => TokenClass::Identifier,
            Self::Boolean(_) | Self::Number(_) | Self::StringLiteral(_) => TokenClass::Literal,
            Self::Assign
            | Self::LeftParen
            | Self::RightParen
            | Self::Comma
            | Self::Dot
            | Self::Tick => TokenClass::Punctuation,
            Self::Plus | Self::Minus | Self::Star | Self::Slash => TokenClass::Operator,
            Self::Space | Self::Tab | Self::Newline => TokenClass::Whitespace,
            Self::Eof => TokenClass::Special,
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    pub fn is_identifier_with_name(&self, name: &str) -> bool {
        matches!(self, Self::Identifier(n) if n == name)
    }

    pub fn is_arithmetic_operator(&self) -> bool {
        self.token_class() == TokenClass::Operator
    }

    pub fn is_whitespace(&self) -> bool {
        self.token_class() == TokenClass::Whitespace
    }

    /// Tokens the grammar sees; whitespace is dropped by the token stream
    pub fn is_significant(&self) -> bool {
        !self.is_whitespace()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Source form of the token
    pub fn as_source_string(&self) -> String {
        match self {
            Self::Identifier(name) => name.clone(),
            Self::Boolean(true) => "True".to_string(),
            Self::Boolean(false) => "False".to_string(),
            Self::Number(value) => value.to_string(),
            Self::StringLiteral(literal) => literal.to_string(),
            Self::Assign => ":=".to_string(),
            Self::LeftParen => "(".to_string(),
            Self::RightParen => ")".to_string(),
            Self::Comma => ",".to_string(),
            Self::Dot => ".".to_string(),
            Self::Tick => "'".to_string(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Space => " ".to_string(),
            Self::Tab => "\t".to_string(),
            Self::Newline => "\n".to_string(),
            Self::Eof => String::new(),
        }
    }

    /// Phrase used for the "found ..." part of parse errors
    pub fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => format!("identifier '{}'", name),
            Self::Boolean(_) => format!("boolean '{}'", self.as_source_string()),
            Self::Number(value) => format!("number {}", value),
            Self::StringLiteral(literal) => format!("string {}", literal),
            Self::Eof => "end of input".to_string(),
            Self::Tick => "attribute tick".to_string(),
            other => format!("'{}'", other.as_source_string()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_source_string())
    }
}

/// Classify a complete word: the two boolean keywords, otherwise an identifier
pub fn classify_word(word: &str) -> Token {
    match word {
        "True" => Token::Boolean(true),
        "False" => Token::Boolean(false),
        _ => Token::Identifier(word.to_string()),
    }
}

/// Single-character punctuation and operators
pub fn classify_symbol(ch: char) -> Option<Token> {
    match ch {
        '(' => Some(Token::LeftParen),
        ')' => Some(Token::RightParen),
        ',' => Some(Token::Comma),
        '.' => Some(Token::Dot),
        '+' => Some(Token::Plus),
        '-' => Some(Token::Minus),
        '*' => Some(Token::Star),
        '/' => Some(Token::Slash),
        _ => None,
    }
}
