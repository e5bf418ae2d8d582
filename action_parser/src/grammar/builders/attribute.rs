//! Attribute Read/Write builders
//!
//! `Type'Read (channel)` is an expression; `Type'Write (channel, item)` is an
//! action. Both commit at the tick: once `Type'` is consumed, every later
//! failure is structural.

use super::atomic::Parser;
use super::call::parse_call;
use super::variable::{at_call_start, parse_variable};
use crate::grammar::ast::nodes::{Action, Expression, Identifier};
use crate::syntax::error::ParseResult;
use crate::tokens::Token;

pub const READ_ATTRIBUTE: &str = "Read";
pub const WRITE_ATTRIBUTE: &str = "Write";

/// Consume `Type ' Attribute` and return the type name
fn parse_attribute_prefix(parser: &mut dyn Parser, attribute: &str) -> ParseResult<Identifier> {
    let type_name = parser.expect_identifier("type name", false)?;
    parser.expect_token(&Token::Tick, false)?;

    if !parser.current_token().is_identifier_with_name(attribute) {
        return Err(parser.structural(&format!("'{}'", attribute)));
    }
    parser.advance();

    Ok(type_name)
}

/// read_attribute ::= identifier "'" "Read" '(' identifier ')'
pub fn parse_read_attribute(parser: &mut dyn Parser) -> ParseResult<Expression> {
    let type_name = parse_attribute_prefix(parser, READ_ATTRIBUTE)?;
    parser.expect_token(&Token::LeftParen, true)?;
    let channel = parser.expect_identifier("channel name", true)?;
    parser.expect_token(&Token::RightParen, true)?;

    Ok(Expression::ReadAttribute { type_name, channel })
}

/// write_attribute ::= identifier "'" "Write" '(' identifier ',' (call | variable) ')'
pub fn parse_write_attribute(parser: &mut dyn Parser) -> ParseResult<Action> {
    let type_name = parse_attribute_prefix(parser, WRITE_ATTRIBUTE)?;
    parser.expect_token(&Token::LeftParen, true)?;
    let channel = parser.expect_identifier("channel name", true)?;
    parser.expect_token(&Token::Comma, true)?;

    parser.enter_nesting("write item")?;
    let item = parse_write_item(parser);
    parser.exit_nesting();
    let item = item?;

    parser.expect_token(&Token::RightParen, true)?;

    Ok(Action::WriteAttribute {
        type_name,
        channel,
        item,
    })
}

/// item ::= call | variable
fn parse_write_item(parser: &mut dyn Parser) -> ParseResult<Expression> {
    if at_call_start(parser) {
        return parse_call(parser);
    }
    if parser.current_token().is_identifier() {
        return Ok(Expression::Variable(parse_variable(parser)?));
    }
    Err(parser.structural("call or variable"))
}
