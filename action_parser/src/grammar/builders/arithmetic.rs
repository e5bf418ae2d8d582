//! Arithmetic sub-grammar
//!
//! The action grammar treats arithmetic as a pluggable building block: it
//! hands the cursor to an [`ArithmeticGrammar`] and takes back a tree, with the
//! cursor left just past the last token the sub-grammar accepted. The
//! default implementation is precedence climbing over `+ -` and `* /` with
//! unary minus and parentheses, all left-associative.

use super::atomic::Parser;
use super::variable::parse_variable;
use crate::grammar::ast::nodes::{ArithmeticExpression, ArithmeticOperator};
use crate::syntax::error::ParseResult;
use crate::tokens::Token;

/// Boundary between the action grammar and an arithmetic expression grammar
pub trait ArithmeticGrammar: Send + Sync {
    fn name(&self) -> &'static str;

    /// Parse one expression from the current position
    ///
    /// Stops before the first token that cannot continue the expression. A
    /// failure before anything was consumed must be a lexical mismatch so the
    /// caller can report that no alternative matched.
    fn parse_arithmetic(&self, parser: &mut dyn Parser) -> ParseResult<ArithmeticExpression>;
}

/// Default arithmetic grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecedenceClimbing;

const LOWEST_PRECEDENCE: u8 = 1;

impl ArithmeticGrammar for PrecedenceClimbing {
    fn name(&self) -> &'static str {
        "precedence-climbing"
    }

    fn parse_arithmetic(&self, parser: &mut dyn Parser) -> ParseResult<ArithmeticExpression> {
        parse_binary(parser, LOWEST_PRECEDENCE, false)
    }
}

fn binary_operator(token: &Token) -> Option<ArithmeticOperator> {
    match token {
        Token::Plus => Some(ArithmeticOperator::Add),
        Token::Minus => Some(ArithmeticOperator::Subtract),
        Token::Star => Some(ArithmeticOperator::Multiply),
        Token::Slash => Some(ArithmeticOperator::Divide),
        _ => None,
    }
}

/// expr(p) ::= unary (op expr(prec(op) + 1))*  for every op with prec(op) >= p
fn parse_binary(
    parser: &mut dyn Parser,
    min_precedence: u8,
    committed: bool,
) -> ParseResult<ArithmeticExpression> {
    let mut left = parse_unary(parser, committed)?;

    while let Some(operator) = binary_operator(parser.current_token()) {
        let precedence = operator.precedence();
        if precedence < min_precedence {
            break;
        }
        parser.advance();
        let right = parse_binary(parser, precedence + 1, true)?;
        left = ArithmeticExpression::binary(operator, left, right);
    }

    Ok(left)
}

/// unary ::= '-' unary | primary
fn parse_unary(parser: &mut dyn Parser, committed: bool) -> ParseResult<ArithmeticExpression> {
    if parser.current_token() != &Token::Minus {
        return parse_primary(parser, committed);
    }

    parser.advance();
    parser.enter_nesting("negation")?;
    let operand = parse_unary(parser, true);
    parser.exit_nesting();

    Ok(ArithmeticExpression::negate(operand?))
}

/// primary ::= number | variable | '(' expr ')'
fn parse_primary(parser: &mut dyn Parser, committed: bool) -> ParseResult<ArithmeticExpression> {
    match parser.current_token() {
        Token::Number(value) => {
            let value = value.clone();
            parser.advance();
            Ok(ArithmeticExpression::Number { value })
        }
        Token::Identifier(_) => Ok(ArithmeticExpression::Variable {
            variable: parse_variable(parser)?,
        }),
        Token::LeftParen => {
            parser.advance();
            parser.enter_nesting("parenthesized expression")?;
            let inner = parse_binary(parser, LOWEST_PRECEDENCE, true);
            parser.exit_nesting();
            let inner = inner?;
            parser.expect_token(&Token::RightParen, true)?;
            Ok(inner)
        }
        _ if committed => Err(parser.structural("operand")),
        _ => Err(parser.mismatch("expression")),
    }
}
