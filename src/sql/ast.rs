//! Closed statement and expression types handed to table adapters
//!
//! Only the shapes the adapters understand are representable; everything
//! else is rejected while converting from the parser's tree.

use serde_json::Value;
use std::fmt;

/// A possibly qualified column or table name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub parts: Vec<String>,
}

impl Identifier {
    /// Create an unqualified identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parts: vec![name.into()],
        }
    }

    /// Create an identifier from its dotted parts
    pub fn from_parts(parts: Vec<String>) -> Self {
        Self { parts }
    }

    /// The unqualified name (last part)
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Constant {
    /// Convert to the JSON value sent to the API
    pub fn to_json(&self) -> Value {
        match self {
            Constant::Null => Value::Null,
            Constant::Bool(b) => Value::Bool(*b),
            Constant::Int(i) => Value::from(*i),
            Constant::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Constant::String(s) => Value::String(s.clone()),
        }
    }
}

/// Renders the raw value, as used in id path segments
impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Null => f.write_str("null"),
            Constant::Bool(b) => write!(f, "{b}"),
            Constant::Int(i) => write!(f, "{i}"),
            Constant::Float(x) => write!(f, "{x}"),
            Constant::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(value.to_string())
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Constant::String(value)
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant::Bool(value)
    }
}

/// Binary operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    /// Any other operator, kept by its SQL spelling
    Other(String),
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Other(op) => op,
        };
        f.write_str(s)
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    Constant(Constant),
    Star,
    BinaryOp {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Shorthand for an unqualified identifier
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(Identifier::new(name))
    }

    /// Shorthand for a constant
    pub fn constant(value: impl Into<Constant>) -> Self {
        Expr::Constant(value.into())
    }

    /// Shorthand for a binary operation
    pub fn binary(op: Operator, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(ident) => write!(f, "{ident}"),
            Expr::Constant(Constant::String(s)) => write!(f, "'{s}'"),
            Expr::Constant(c) => write!(f, "{c}"),
            Expr::Star => f.write_str("*"),
            Expr::BinaryOp { op, left, right } => write!(f, "{left} {op} {right}"),
        }
    }
}

/// SELECT targets FROM table [WHERE ..] [LIMIT n]
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub targets: Vec<Expr>,
    pub from: Identifier,
    pub where_clause: Option<Expr>,
    pub limit: Option<u64>,
}

impl Select {
    /// `SELECT * FROM table`
    pub fn star(from: impl Into<String>) -> Self {
        Self {
            targets: vec![Expr::Star],
            from: Identifier::new(from),
            where_clause: None,
            limit: None,
        }
    }
}

/// INSERT INTO table (columns) VALUES (..), ..
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub into: Identifier,
    pub columns: Vec<Identifier>,
    pub values: Vec<Vec<Expr>>,
}

/// UPDATE table SET column = value, .. [WHERE ..]
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: Identifier,
    pub update_columns: Vec<(String, Expr)>,
    pub where_clause: Option<Expr>,
}

/// A statement routed to a table adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
}

impl Statement {
    /// Name of the table the statement targets
    pub fn table(&self) -> &Identifier {
        match self {
            Statement::Select(s) => &s.from,
            Statement::Insert(i) => &i.into,
            Statement::Update(u) => &u.table,
        }
    }
}
