//! Variable builder: a name with dotted component accesses

use super::atomic::Parser;
use crate::grammar::ast::nodes::Variable;
use crate::syntax::error::ParseResult;
use crate::tokens::Token;

/// variable ::= identifier ('.' identifier)*
///
/// Never consumes a following `(`; that token belongs to the call rule.
pub fn parse_variable(parser: &mut dyn Parser) -> ParseResult<Variable> {
    let name = parser.expect_identifier("identifier", false)?;
    let mut path = Vec::new();

    while parser.current_token() == &Token::Dot {
        parser.advance();
        path.push(parser.expect_identifier("identifier after '.'", true)?);
    }

    Ok(Variable { name, path })
}

/// Whether the cursor sits on `identifier (`, the start of a call
pub fn at_call_start(parser: &dyn Parser) -> bool {
    parser.current_token().is_identifier() && parser.peek_token(1) == &Token::LeftParen
}

/// Whether the cursor sits on `identifier '`, the start of an attribute form
pub fn at_attribute_start(parser: &dyn Parser) -> bool {
    parser.current_token().is_identifier() && parser.peek_token(1) == &Token::Tick
}
