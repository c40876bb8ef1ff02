/// Expression and WHERE-condition evaluation against a single row.
///
/// Rows are plain value slices paired with the column names that label them,
/// so the same evaluator serves table rows and projected output rows.

use crate::core::value::parse_timestamp;
use crate::core::{DatabaseError, Value};
use crate::parser::{BinaryOperator, Expression, UnaryOperator};
use std::cmp::Ordering;

pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Evaluates `expr` to a value. Unknown identifiers evaluate to NULL;
    /// callers that need a hard error validate column references first.
    ///
    /// Arithmetic always yields FLOAT64 and division by zero yields NULL.
    /// Comparisons and AND/OR yield BOOL with condition semantics.
    pub fn evaluate_expression(
        expr: &Expression,
        columns: &[String],
        row: &[Value],
    ) -> Result<Value, DatabaseError> {
        match expr {
            Expression::Identifier(name) => Ok(columns
                .iter()
                .position(|c| c == name)
                .and_then(|idx| row.get(idx))
                .cloned()
                .unwrap_or(Value::Null)),
            Expression::Integer(n) => Ok(Value::Int64(*n)),
            Expression::Float(f) => Ok(Value::Float64(*f)),
            Expression::String(s) => Ok(Value::String(s.clone())),
            Expression::Boolean(b) => Ok(Value::Bool(*b)),
            Expression::Null => Ok(Value::Null),

            Expression::Binary { left, op, right } => match op {
                BinaryOperator::Plus
                | BinaryOperator::Minus
                | BinaryOperator::Multiply
                | BinaryOperator::Divide => {
                    let left = Self::evaluate_expression(left, columns, row)?;
                    let right = Self::evaluate_expression(right, columns, row)?;
                    Ok(Self::arithmetic(*op, &left, &right))
                }
                _ => Ok(Value::Bool(Self::evaluate_condition(expr, columns, row)?)),
            },

            Expression::Unary { op, operand } => {
                let value = Self::evaluate_expression(operand, columns, row)?;
                Ok(match (op, value) {
                    (UnaryOperator::Minus, Value::Int64(n)) => {
                        n.checked_neg().map_or(Value::Null, Value::Int64)
                    }
                    (UnaryOperator::Minus, Value::Float64(f)) => Value::Float64(-f),
                    (UnaryOperator::Not, Value::Bool(b)) => Value::Bool(!b),
                    _ => Value::Null,
                })
            }

            Expression::Wildcard => Err(DatabaseError::UnsupportedExpression(
                "'*' outside COUNT(*)".to_string(),
            )),
            Expression::Function(call) => Err(DatabaseError::UnsupportedExpression(format!(
                "aggregate {} is only allowed as a select item",
                call.func.name()
            ))),
        }
    }

    /// Evaluates `expr` as a filter. AND/OR short-circuit; any comparison
    /// with a NULL operand is false, `= NULL` and `<> NULL` included.
    pub fn evaluate_condition(
        expr: &Expression,
        columns: &[String],
        row: &[Value],
    ) -> Result<bool, DatabaseError> {
        match expr {
            Expression::Binary { left, op: BinaryOperator::And, right } => {
                Ok(Self::evaluate_condition(left, columns, row)?
                    && Self::evaluate_condition(right, columns, row)?)
            }
            Expression::Binary { left, op: BinaryOperator::Or, right } => {
                Ok(Self::evaluate_condition(left, columns, row)?
                    || Self::evaluate_condition(right, columns, row)?)
            }
            Expression::Binary { left, op, right } if op.is_comparison() => {
                let left = Self::evaluate_expression(left, columns, row)?;
                let right = Self::evaluate_expression(right, columns, row)?;
                Ok(Self::compare_values(&left, &right, *op))
            }
            Expression::Unary { op: UnaryOperator::Not, operand } => {
                Ok(!Self::evaluate_condition(operand, columns, row)?)
            }
            Expression::Boolean(b) => Ok(*b),
            other => Ok(matches!(
                Self::evaluate_expression(other, columns, row)?,
                Value::Bool(true)
            )),
        }
    }

    fn arithmetic(op: BinaryOperator, left: &Value, right: &Value) -> Value {
        let (Some(l), Some(r)) = (left.to_numeric(), right.to_numeric()) else {
            return Value::Null;
        };
        match op {
            BinaryOperator::Plus => Value::Float64(l + r),
            BinaryOperator::Minus => Value::Float64(l - r),
            BinaryOperator::Multiply => Value::Float64(l * r),
            BinaryOperator::Divide if r != 0.0 => Value::Float64(l / r),
            _ => Value::Null,
        }
    }

    fn compare_values(left: &Value, right: &Value, op: BinaryOperator) -> bool {
        if left.is_null() || right.is_null() {
            return false;
        }

        let ordering = match (left, right) {
            // string literals compare against timestamp columns as timestamps
            (Value::Timestamp(ts), Value::String(s)) => match parse_timestamp(s) {
                Some(other) => ts.cmp(&other),
                None => left.compare(right),
            },
            (Value::String(s), Value::Timestamp(ts)) => match parse_timestamp(s) {
                Some(other) => other.cmp(ts),
                None => left.compare(right),
            },
            _ => left.compare(right),
        };

        match op {
            BinaryOperator::Eq => ordering == Ordering::Equal,
            BinaryOperator::NotEq => ordering != Ordering::Equal,
            BinaryOperator::Lt => ordering == Ordering::Less,
            BinaryOperator::Gt => ordering == Ordering::Greater,
            BinaryOperator::LtEq => ordering != Ordering::Greater,
            BinaryOperator::GtEq => ordering != Ordering::Less,
            _ => false,
        }
    }
}
