//! Parser trait and literal builders
//!
//! Builders are free functions over `&mut dyn Parser`, one per production.
//! A builder either consumes its whole production or returns an error; the
//! caller decides whether the error is final or whether it restores the
//! cursor and tries the next alternative.

use crate::grammar::ast::nodes::*;
use crate::syntax::error::{ParseError, ParseResult};
use crate::tokens::Token;
use crate::utils::Span;

/// Token cursor the builders drive
pub trait Parser {
    // === BASIC NAVIGATION ===
    fn current_token(&self) -> &Token;
    /// Token `n` positions ahead of the current one; `Eof` past the end
    fn peek_token(&self, n: usize) -> &Token;
    fn advance(&mut self);
    fn is_at_end(&self) -> bool {
        self.current_token().is_eof()
    }

    // === CHECKPOINTS ===
    fn save_position(&self) -> usize;
    fn restore_position(&mut self, position: usize);

    // === NESTING ===
    /// Enter a recursive production; fails once the depth limit is reached
    fn enter_nesting(&mut self, context: &'static str) -> ParseResult<()>;
    fn exit_nesting(&mut self);

    // === SPAN REPORTING ===
    fn current_span(&self) -> Span;

    // === EXPECTATIONS ===

    /// Error for a production that did not match at all
    fn mismatch(&self, expected: &str) -> ParseError {
        ParseError::lexical_mismatch(expected, self.current_token(), self.current_span())
    }

    /// Error for a production that committed and could not complete
    fn structural(&self, expected: &str) -> ParseError {
        ParseError::structural_mismatch(expected, self.current_token(), self.current_span())
    }

    /// Consume `expected` or fail; `committed` selects the error kind
    fn expect_token(&mut self, expected: &Token, committed: bool) -> ParseResult<()> {
        if self.current_token() == expected {
            self.advance();
            return Ok(());
        }
        let description = expected.describe();
        Err(if committed {
            self.structural(&description)
        } else {
            self.mismatch(&description)
        })
    }

    fn expect_identifier(&mut self, expected: &str, committed: bool) -> ParseResult<Identifier> {
        if let Token::Identifier(name) = self.current_token() {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        Err(if committed {
            self.structural(expected)
        } else {
            self.mismatch(expected)
        })
    }
}

// === LITERAL BUILDERS ===

/// boolean ::= "True" | "False"
pub fn parse_boolean(parser: &mut dyn Parser) -> ParseResult<Expression> {
    match parser.current_token() {
        Token::Boolean(value) => {
            let value = *value;
            parser.advance();
            Ok(Expression::BooleanLiteral(value))
        }
        _ => Err(parser.mismatch("boolean literal")),
    }
}

/// number ::= digits | base '#' based_digits '#'
///
/// The lexer has already normalized the value, so equal integers written in
/// different bases produce equal literals.
pub fn parse_number(parser: &mut dyn Parser) -> ParseResult<Expression> {
    match parser.current_token() {
        Token::Number(value) => {
            let value = value.clone();
            parser.advance();
            Ok(Expression::NumberLiteral(value))
        }
        _ => Err(parser.mismatch("number literal")),
    }
}

/// string ::= '"' chars '"' | "'" chars "'"
pub fn parse_string(parser: &mut dyn Parser) -> ParseResult<Expression> {
    match parser.current_token() {
        Token::StringLiteral(literal) => {
            let text = literal.content.clone();
            parser.advance();
            Ok(Expression::StringLiteral(text))
        }
        _ => Err(parser.mismatch("string literal")),
    }
}

/// Any literal token: boolean, number or string
pub fn parse_literal(parser: &mut dyn Parser) -> ParseResult<Expression> {
    match parser.current_token() {
        Token::Boolean(_) => parse_boolean(parser),
        Token::Number(_) => parse_number(parser),
        Token::StringLiteral(_) => parse_string(parser),
        _ => Err(parser.mismatch("literal")),
    }
}
