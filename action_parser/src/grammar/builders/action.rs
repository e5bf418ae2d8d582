//! Action and right-hand-side dispatch
//!
//! The right-hand side is an ordered choice. Alternatives are tried in this
//! order, and the first one whose distinguishing lookahead matches owns the
//! input from then on:
//!
//! 1. read attribute (`identifier '`)
//! 2. boolean literal
//! 3. string literal
//! 4. function call (`identifier (`)
//! 5. variable, only when it reaches the end of input
//! 6. arithmetic expression
//!
//! Alternatives 1 to 4 commit on their lookahead and never fall through. The
//! variable alternative is the only one that backtracks: `a + 1` starts like
//! the variable `a`, so the cursor is restored and arithmetic runs from the
//! same position.

use super::arithmetic::ArithmeticGrammar;
use super::atomic::{parse_boolean, parse_string, Parser};
use super::attribute::{parse_read_attribute, parse_write_attribute};
use super::call::parse_call;
use super::variable::{at_attribute_start, at_call_start, parse_variable};
use crate::grammar::ast::nodes::{Action, Expression};
use crate::syntax::error::ParseResult;
use crate::tokens::Token;

/// action ::= identifier ':=' rhs | write_attribute
pub fn parse_action(
    parser: &mut dyn Parser,
    arithmetic: &dyn ArithmeticGrammar,
) -> ParseResult<Action> {
    if at_attribute_start(parser) {
        return parse_write_attribute(parser);
    }

    let target = parser.expect_identifier("identifier", false)?;
    if parser.current_token() != &Token::Assign {
        return Err(parser.mismatch("':=' or attribute tick"));
    }
    parser.advance();

    let value = parse_right_hand_side(parser, arithmetic)?;
    Ok(Action::Assignment { target, value })
}

/// rhs ::= read_attribute | boolean | string | call | variable EOF | arithmetic
pub fn parse_right_hand_side(
    parser: &mut dyn Parser,
    arithmetic: &dyn ArithmeticGrammar,
) -> ParseResult<Expression> {
    if at_attribute_start(parser) {
        return parse_read_attribute(parser);
    }

    match parser.current_token() {
        Token::Boolean(_) => return parse_boolean(parser),
        Token::StringLiteral(_) => return parse_string(parser),
        _ => {}
    }

    if at_call_start(parser) {
        return parse_call(parser);
    }

    if parser.current_token().is_identifier() {
        let checkpoint = parser.save_position();
        if let Ok(variable) = parse_variable(parser) {
            if parser.is_at_end() {
                return Ok(Expression::Variable(variable));
            }
        }
        parser.restore_position(checkpoint);
    }

    let expr = arithmetic.parse_arithmetic(parser)?;
    Ok(Expression::from(expr))
}
