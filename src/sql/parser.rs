//! Conversion from `sqlparser` trees into the crate's statement types

use super::ast::{Constant, Expr, Identifier, Insert, Operator, Select, Statement, Update};
use crate::error::{Error, Result};
use sqlparser::ast::{
    self as sp, BinaryOperator, LimitClause, SelectItem, SetExpr, TableFactor, UnaryOperator,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Parse SQL text into statements
pub fn parse(sql: &str) -> Result<Vec<Statement>> {
    let parsed = Parser::parse_sql(&GenericDialect {}, sql)?;
    parsed.iter().map(convert_statement).collect()
}

/// Parse SQL text that must contain exactly one statement
pub fn parse_statement(sql: &str) -> Result<Statement> {
    let mut statements = parse(sql)?;
    if statements.len() != 1 {
        return Err(Error::unsupported_statement(format!(
            "expected one statement, found {}",
            statements.len()
        )));
    }
    Ok(statements.remove(0))
}

fn convert_statement(stmt: &sp::Statement) -> Result<Statement> {
    match stmt {
        sp::Statement::Query(query) => convert_query(query).map(Statement::Select),
        sp::Statement::Insert(insert) => convert_insert(insert).map(Statement::Insert),
        sp::Statement::Update(update) => convert_update(update).map(Statement::Update),
        other => Err(Error::unsupported_statement(first_keyword(other))),
    }
}

fn first_keyword(stmt: &sp::Statement) -> String {
    stmt.to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

fn convert_query(query: &sp::Query) -> Result<Select> {
    let SetExpr::Select(select) = query.body.as_ref() else {
        return Err(Error::unsupported_statement(
            "only simple SELECT queries are supported",
        ));
    };

    if select.from.len() != 1 || !select.from[0].joins.is_empty() {
        return Err(Error::unsupported_statement(
            "SELECT must read from exactly one table",
        ));
    }
    let from = table_name(&select.from[0].relation)?;

    let targets = select
        .projection
        .iter()
        .map(|item| match item {
            SelectItem::Wildcard(_) => Ok(Expr::Star),
            SelectItem::UnnamedExpr(expr) => convert_expr(expr),
            SelectItem::ExprWithAlias { expr, .. } => convert_expr(expr),
            other => Err(Error::unsupported_statement(format!(
                "select item {other}"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let where_clause = select.selection.as_ref().map(convert_expr).transpose()?;

    let limit = match &query.limit_clause {
        Some(LimitClause::LimitOffset {
            limit: Some(expr), ..
        }) => Some(convert_limit(expr)?),
        _ => None,
    };

    Ok(Select {
        targets,
        from,
        where_clause,
        limit,
    })
}

fn convert_limit(expr: &sp::Expr) -> Result<u64> {
    match convert_expr(expr)? {
        Expr::Constant(Constant::Int(n)) if n >= 0 => Ok(n as u64),
        other => Err(Error::invalid_value(format!(
            "LIMIT must be a non-negative integer, got {other}"
        ))),
    }
}

fn convert_insert(insert: &sp::Insert) -> Result<Insert> {
    let into = Identifier::from_parts(
        insert
            .table
            .to_string()
            .split('.')
            .map(str::to_string)
            .collect(),
    );
    let columns = insert
        .columns
        .iter()
        .map(|c| Identifier::new(c.value.clone()))
        .collect();

    let values = match insert.source.as_deref().map(|q| q.body.as_ref()) {
        Some(SetExpr::Values(v)) => v
            .rows
            .iter()
            .map(|row| row.iter().map(convert_expr).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(Error::unsupported_statement(
                "INSERT source must be a VALUES list",
            ))
        }
        None => Vec::new(),
    };

    Ok(Insert {
        into,
        columns,
        values,
    })
}

fn convert_update(update: &sp::Update) -> Result<Update> {
    let table = table_name(&update.table.relation)?;
    let update_columns = update
        .assignments
        .iter()
        .map(|a| Ok((a.target.to_string(), convert_expr(&a.value)?)))
        .collect::<Result<Vec<_>>>()?;
    let where_clause = update.selection.as_ref().map(convert_expr).transpose()?;

    Ok(Update {
        table,
        update_columns,
        where_clause,
    })
}

fn table_name(factor: &TableFactor) -> Result<Identifier> {
    match factor {
        TableFactor::Table { name, .. } => Ok(Identifier::from_parts(
            name.to_string().split('.').map(str::to_string).collect(),
        )),
        _ => Err(Error::unsupported_statement(
            "complex table expressions are not supported",
        )),
    }
}

fn convert_expr(expr: &sp::Expr) -> Result<Expr> {
    match expr {
        sp::Expr::Identifier(ident) => Ok(Expr::ident(ident.value.clone())),
        sp::Expr::CompoundIdentifier(parts) => Ok(Expr::Identifier(Identifier::from_parts(
            parts.iter().map(|p| p.value.clone()).collect(),
        ))),
        sp::Expr::Wildcard(_) => Ok(Expr::Star),
        sp::Expr::Value(v) => convert_value(&v.value).map(Expr::Constant),
        sp::Expr::Nested(inner) => convert_expr(inner),
        sp::Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr: inner,
        } => match convert_expr(inner)? {
            Expr::Constant(Constant::Int(i)) => Ok(Expr::Constant(Constant::Int(-i))),
            Expr::Constant(Constant::Float(f)) => Ok(Expr::Constant(Constant::Float(-f))),
            other => Err(Error::unsupported_statement(format!(
                "cannot negate {other}"
            ))),
        },
        sp::Expr::BinaryOp { left, op, right } => Ok(Expr::binary(
            convert_operator(op),
            convert_expr(left)?,
            convert_expr(right)?,
        )),
        other => Err(Error::unsupported_statement(format!(
            "expression {other}"
        ))),
    }
}

fn convert_operator(op: &BinaryOperator) -> Operator {
    match op {
        BinaryOperator::Eq => Operator::Eq,
        BinaryOperator::NotEq => Operator::NotEq,
        BinaryOperator::Lt => Operator::Lt,
        BinaryOperator::LtEq => Operator::LtEq,
        BinaryOperator::Gt => Operator::Gt,
        BinaryOperator::GtEq => Operator::GtEq,
        BinaryOperator::And => Operator::And,
        BinaryOperator::Or => Operator::Or,
        other => Operator::Other(other.to_string()),
    }
}

fn convert_value(value: &sp::Value) -> Result<Constant> {
    match value {
        sp::Value::Null => Ok(Constant::Null),
        sp::Value::Boolean(b) => Ok(Constant::Bool(*b)),
        sp::Value::Number(n, _) => n
            .parse::<i64>()
            .map(Constant::Int)
            .or_else(|_| n.parse::<f64>().map(Constant::Float))
            .map_err(|_| Error::invalid_value(format!("invalid number '{n}'"))),
        sp::Value::SingleQuotedString(s) | sp::Value::DoubleQuotedString(s) => {
            Ok(Constant::String(s.clone()))
        }
        other => Err(Error::unsupported_statement(format!("literal {other}"))),
    }
}
