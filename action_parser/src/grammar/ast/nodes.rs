//! AST node definitions for actions
//!
//! Every node is a plain tagged union with derived structural equality: two
//! trees compare equal exactly when their shapes and leaf values match. Nodes
//! carry no spans and are built fresh for every parse.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

// === IDENTIFIERS ===
// All identifiers follow [A-Za-z][A-Za-z0-9_]*

pub type Identifier = String;

/// Numbers serialize as decimal strings so arbitrarily large values survive JSON
mod decimal {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigUint::parse_bytes(text.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid decimal number '{}'", text)))
    }
}

// === ACTIONS ===

/// A parsed statement attached to a state transition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Action {
    /// `target := value`
    Assignment {
        target: Identifier,
        value: Expression,
    },
    /// `Type'Write (channel, item)`, a side effect on `channel`
    WriteAttribute {
        type_name: Identifier,
        channel: Identifier,
        item: Expression,
    },
}

impl Action {
    pub fn assignment(target: impl Into<Identifier>, value: Expression) -> Self {
        Self::Assignment {
            target: target.into(),
            value,
        }
    }

    pub fn write_attribute(
        type_name: impl Into<Identifier>,
        channel: impl Into<Identifier>,
        item: Expression,
    ) -> Self {
        Self::WriteAttribute {
            type_name: type_name.into(),
            channel: channel.into(),
            item,
        }
    }

    /// The expression the action evaluates
    pub fn expression(&self) -> &Expression {
        match self {
            Self::Assignment { value, .. } => value,
            Self::WriteAttribute { item, .. } => item,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Assignment { .. } => "assignment",
            Self::WriteAttribute { .. } => "write_attribute",
        }
    }
}

// === EXPRESSIONS ===

/// A name with zero or more dotted component accesses (`a.b.c`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: Identifier,
    pub path: Vec<Identifier>,
}

impl Variable {
    pub fn new(name: impl Into<Identifier>) -> Self {
        Self {
            name: name.into(),
            path: Vec::new(),
        }
    }

    pub fn with_path<I, S>(name: impl Into<Identifier>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        Self {
            name: name.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_simple(&self) -> bool {
        self.path.is_empty()
    }

    /// Name and path components in source order
    pub fn components(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.path.iter().map(String::as_str))
    }
}

/// Value-producing construct on the right-hand side of an action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Expression {
    Variable(Variable),
    /// Normalized integer; the base the literal was written in is not kept
    NumberLiteral(#[serde(with = "decimal")] BigUint),
    StringLiteral(String),
    BooleanLiteral(bool),
    Call {
        name: Identifier,
        args: Vec<Expression>,
    },
    /// `Type'Read (channel)`
    ReadAttribute {
        type_name: Identifier,
        channel: Identifier,
    },
    Arithmetic(ArithmeticExpression),
}

impl Expression {
    pub fn variable(name: impl Into<Identifier>) -> Self {
        Self::Variable(Variable::new(name))
    }

    pub fn number(value: impl Into<BigUint>) -> Self {
        Self::NumberLiteral(value.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::StringLiteral(text.into())
    }

    pub fn call(name: impl Into<Identifier>, args: Vec<Expression>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    pub fn read_attribute(type_name: impl Into<Identifier>, channel: impl Into<Identifier>) -> Self {
        Self::ReadAttribute {
            type_name: type_name.into(),
            channel: channel.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Variable(_) => "variable",
            Self::NumberLiteral(_) => "number",
            Self::StringLiteral(_) => "string",
            Self::BooleanLiteral(_) => "boolean",
            Self::Call { .. } => "call",
            Self::ReadAttribute { .. } => "read_attribute",
            Self::Arithmetic(_) => "arithmetic",
        }
    }

    /// Nesting depth counting calls and arithmetic nodes; leaves are depth 1
    pub fn depth(&self) -> usize {
        match self {
            Self::Call { args, .. } => 1 + args.iter().map(Self::depth).max().unwrap_or(0),
            Self::Arithmetic(expr) => expr.depth(),
            _ => 1,
        }
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

impl From<ArithmeticExpression> for Expression {
    /// Lone leaves collapse to the plain literal or variable
    fn from(expr: ArithmeticExpression) -> Self {
        match expr {
            ArithmeticExpression::Number { value } => Self::NumberLiteral(value),
            ArithmeticExpression::Variable { variable } => Self::Variable(variable),
            other => Self::Arithmetic(other),
        }
    }
}

// === ARITHMETIC ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
}

impl ArithmeticOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" => Some(Self::Divide),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }

    /// Binding power; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide => 2,
        }
    }
}

/// Infix arithmetic tree over variables and number literals
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ArithmeticExpression {
    Number {
        #[serde(with = "decimal")]
        value: BigUint,
    },
    Variable { variable: Variable },
    Negate { operand: Box<ArithmeticExpression> },
    Binary {
        operator: ArithmeticOperator,
        left: Box<ArithmeticExpression>,
        right: Box<ArithmeticExpression>,
    },
}

impl ArithmeticExpression {
    pub fn number(value: impl Into<BigUint>) -> Self {
        Self::Number {
            value: value.into(),
        }
    }

    pub fn variable(variable: Variable) -> Self {
        Self::Variable { variable }
    }

    pub fn negate(operand: ArithmeticExpression) -> Self {
        Self::Negate {
            operand: Box::new(operand),
        }
    }

    pub fn binary(
        operator: ArithmeticOperator,
        left: ArithmeticExpression,
        right: ArithmeticExpression,
    ) -> Self {
        Self::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Number { .. } | Self::Variable { .. } => 1,
            Self::Negate { operand } => 1 + operand.depth(),
            Self::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_leaves_collapse() {
        assert_eq!(
            Expression::from(ArithmeticExpression::number(772u32)),
            Expression::number(772u32)
        );
        let negated = ArithmeticExpression::negate(ArithmeticExpression::number(1u32));
        assert_eq!(negated.depth(), 2);
        assert_matches::assert_matches!(Expression::from(negated), Expression::Arithmetic(_));
    }

    #[test]
    fn test_json_keeps_large_numbers_exact() {
        let digits = "123456789012345678901234567890";
        let value = BigUint::parse_bytes(digits.as_bytes(), 10).expect("valid");
        let action = Action::assignment("x", Expression::NumberLiteral(value));

        let json = serde_json::to_string(&action).expect("serialize");
        assert_eq!(
            json,
            format!(
                r#"{{"kind":"Assignment","target":"x","value":{{"kind":"NumberLiteral","value":"{}"}}}}"#,
                digits
            )
        );
        let back: Action = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, action);
    }

    #[test]
    fn test_json_rejects_non_decimal_numbers() {
        let json = r#"{"kind":"NumberLiteral","value":"0x10"}"#;
        assert!(serde_json::from_str::<Expression>(json).is_err());
    }

    #[test]
    fn test_variable_components() {
        let variable = Variable::with_path("a", ["b", "c"]);
        assert!(!variable.is_simple());
        assert_eq!(variable.components().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(Expression::call("f", vec![Expression::call("g", vec![])]).depth(), 2);
    }
}
