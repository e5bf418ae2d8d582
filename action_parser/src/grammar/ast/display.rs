//! Canonical text form of the AST
//!
//! The printed form re-parses to a structurally equal tree. Arithmetic is
//! parenthesized only where precedence or left associativity requires it.

use super::nodes::{Action, ArithmeticExpression, ArithmeticOperator, Expression, Variable};
use std::fmt;

const UNARY_PRECEDENCE: u8 = 3;
const LEAF_PRECEDENCE: u8 = 4;

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment { target, value } => write!(f, "{} := {}", target, value),
            Self::WriteAttribute {
                type_name,
                channel,
                item,
            } => write!(f, "{}'Write ({}, {})", type_name, channel, item),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components().collect::<Vec<_>>().join("."))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(variable) => write!(f, "{}", variable),
            Self::NumberLiteral(value) => write!(f, "{}", value),
            Self::StringLiteral(text) => {
                // No escapes exist, so pick the quote the text does not contain
                if text.contains('"') {
                    write!(f, "'{}'", text)
                } else {
                    write!(f, "\"{}\"", text)
                }
            }
            Self::BooleanLiteral(true) => write!(f, "True"),
            Self::BooleanLiteral(false) => write!(f, "False"),
            Self::Call { name, args } => {
                let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{} ({})", name, rendered.join(", "))
            }
            Self::ReadAttribute { type_name, channel } => {
                write!(f, "{}'Read ({})", type_name, channel)
            }
            Self::Arithmetic(expr) => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ArithmeticExpression {
    fn binding(&self) -> u8 {
        match self {
            Self::Number { .. } | Self::Variable { .. } => LEAF_PRECEDENCE,
            Self::Negate { .. } => UNARY_PRECEDENCE,
            Self::Binary { operator, .. } => operator.precedence(),
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for ArithmeticExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { value } => write!(f, "{}", value),
            Self::Variable { variable } => write!(f, "{}", variable),
            Self::Negate { operand } => {
                write!(f, "-")?;
                operand.fmt_operand(f, operand.binding() < UNARY_PRECEDENCE)
            }
            Self::Binary {
                operator,
                left,
                right,
            } => {
                let precedence = operator.precedence();
                left.fmt_operand(f, left.binding() < precedence)?;
                write!(f, " {} ", operator)?;
                right.fmt_operand(f, right.binding() <= precedence)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> ArithmeticExpression {
        ArithmeticExpression::variable(Variable::new(name))
    }

    #[test]
    fn test_action_forms() {
        let action = Action::assignment(
            "connection",
            Expression::call("read", vec![Expression::variable("application_in")]),
        );
        assert_eq!(action.to_string(), "connection := read (application_in)");

        let write = Action::write_attribute(
            "TLS_Alert",
            "network_out",
            Expression::call("TLS_Alert", vec![Expression::variable("CLOSE_NOTIFY")]),
        );
        assert_eq!(
            write.to_string(),
            "TLS_Alert'Write (network_out, TLS_Alert (CLOSE_NOTIFY))"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(Expression::number(772u32).to_string(), "772");
        assert_eq!(Expression::BooleanLiteral(false).to_string(), "False");
        assert_eq!(Expression::string("c e traffic").to_string(), "\"c e traffic\"");
        assert_eq!(Expression::string("say \"hi\"").to_string(), "'say \"hi\"'");
        assert_eq!(Expression::call("fun", vec![]).to_string(), "fun ()");
        assert_eq!(
            Expression::read_attribute("GreenTLS_Control", "control_in").to_string(),
            "GreenTLS_Control'Read (control_in)"
        );
        assert_eq!(
            Expression::Variable(Variable::with_path("a", ["b", "c"])).to_string(),
            "a.b.c"
        );
    }

    #[test]
    fn test_minimal_parentheses() {
        use ArithmeticOperator::*;

        // (a + b) * c
        let expr = ArithmeticExpression::binary(
            Multiply,
            ArithmeticExpression::binary(Add, var("a"), var("b")),
            var("c"),
        );
        assert_eq!(expr.to_string(), "(a + b) * c");

        // a - (b - c) keeps its parentheses, (a - b) - c drops them
        let right_nested = ArithmeticExpression::binary(
            Subtract,
            var("a"),
            ArithmeticExpression::binary(Subtract, var("b"), var("c")),
        );
        assert_eq!(right_nested.to_string(), "a - (b - c)");
        let left_nested = ArithmeticExpression::binary(
            Subtract,
            ArithmeticExpression::binary(Subtract, var("a"), var("b")),
            var("c"),
        );
        assert_eq!(left_nested.to_string(), "a - b - c");

        let a_plus_b_times_c = ArithmeticExpression::binary(
            Add,
            var("a"),
            ArithmeticExpression::binary(Multiply, var("b"), var("c")),
        );
        assert_eq!(a_plus_b_times_c.to_string(), "a + b * c");
    }

    #[test]
    fn test_negation() {
        let expr = ArithmeticExpression::negate(ArithmeticExpression::binary(
            ArithmeticOperator::Add,
            var("a"),
            ArithmeticExpression::number(1u32),
        ));
        assert_eq!(expr.to_string(), "-(a + 1)");
        assert_eq!(
            ArithmeticExpression::negate(ArithmeticExpression::number(5u32)).to_string(),
            "-5"
        );
    }
}
