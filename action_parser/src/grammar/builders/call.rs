//! Function-call builder
//!
//! Arguments may themselves be calls, so `parse_call` and
//! `parse_call_argument` recurse into each other. Every level of nesting goes
//! through `enter_nesting`, which bounds the recursion.

use super::atomic::{parse_boolean, parse_number, parse_string, Parser};
use super::variable::{at_call_start, parse_variable};
use crate::grammar::ast::nodes::Expression;
use crate::syntax::error::ParseResult;
use crate::tokens::Token;

/// call ::= identifier '(' [argument (',' argument)*] ')'
///
/// Commits once `(` is consumed; any later failure is structural.
pub fn parse_call(parser: &mut dyn Parser) -> ParseResult<Expression> {
    let name = parser.expect_identifier("function name", false)?;
    parser.expect_token(&Token::LeftParen, false)?;

    parser.enter_nesting("call")?;
    let args = parse_argument_list(parser);
    parser.exit_nesting();

    Ok(Expression::Call { name, args: args? })
}

fn parse_argument_list(parser: &mut dyn Parser) -> ParseResult<Vec<Expression>> {
    let mut args = Vec::new();

    if parser.current_token() == &Token::RightParen {
        parser.advance();
        return Ok(args);
    }

    loop {
        args.push(parse_call_argument(parser)?);

        match parser.current_token() {
            Token::Comma => parser.advance(),
            Token::RightParen => {
                parser.advance();
                return Ok(args);
            }
            _ => return Err(parser.structural("',' or ')'")),
        }
    }
}

/// argument ::= call | number | string | boolean | variable
pub fn parse_call_argument(parser: &mut dyn Parser) -> ParseResult<Expression> {
    match parser.current_token() {
        Token::Identifier(_) if at_call_start(parser) => parse_call(parser),
        Token::Identifier(_) => Ok(Expression::Variable(parse_variable(parser)?)),
        Token::Number(_) => parse_number(parser),
        Token::StringLiteral(_) => parse_string(parser),
        Token::Boolean(_) => parse_boolean(parser),
        _ => Err(parser.structural("argument")),
    }
}
