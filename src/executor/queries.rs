/// Query operations (SELECT)
///
/// Two paths, chosen once per statement:
/// - projection: filter → project → distinct → order → offset → limit
/// - aggregate: any top-level select item is a function call; one output row

use crate::core::{DatabaseError, Value};
use crate::parser::{
    AggregateFunction, Expression, FunctionCall, OrderByClause, SelectColumn, SortOrder,
};
use crate::storage::Table;
use std::collections::HashSet;
use super::conditions::ExpressionEvaluator;
use super::QueryResult;

pub struct QueryExecutor;

/// Running state for one aggregate select item.
#[derive(Debug, Default)]
struct AggregateState {
    count: i64,
    sum: f64,
    extremum: Option<Value>,
    seen: HashSet<String>,
}

impl QueryExecutor {
    /// Main SELECT entry point
    pub fn select(
        table: &Table,
        distinct: bool,
        columns: &[SelectColumn],
        filter: Option<&Expression>,
        order_by: &[OrderByClause],
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<QueryResult, DatabaseError> {
        let schema_columns = table.schema().column_names();
        let (names, exprs) = Self::expand_select_list(&schema_columns, columns);

        // unresolvable columns fail before any row is read
        for expr in exprs.iter().chain(filter) {
            Self::check_columns(expr, &schema_columns)?;
        }
        let order_indices = order_by
            .iter()
            .map(|clause| {
                names
                    .iter()
                    .position(|name| *name == clause.column)
                    .map(|idx| (idx, clause.order))
                    .ok_or_else(|| DatabaseError::ColumnNotFound(clause.column.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let has_aggregates = exprs.iter().any(|expr| matches!(expr, Expression::Function(_)));
        if has_aggregates {
            let row = Self::select_aggregate(table, &schema_columns, &exprs, filter)?;
            return Ok(QueryResult::with_rows(names, vec![row]));
        }

        let mut rows = Self::select_rows(table, &schema_columns, &exprs, filter)?;
        if distinct {
            rows = Self::apply_distinct(rows);
        }
        if !order_indices.is_empty() {
            Self::apply_order_by(&mut rows, &order_indices);
        }
        let rows = rows
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        Ok(QueryResult::with_rows(names, rows))
    }

    /// Expands `*` to the schema columns and names every output column.
    fn expand_select_list(
        schema_columns: &[String],
        columns: &[SelectColumn],
    ) -> (Vec<String>, Vec<Expression>) {
        let mut names = Vec::new();
        let mut exprs = Vec::new();
        for column in columns {
            match column {
                SelectColumn::Wildcard => {
                    for name in schema_columns {
                        names.push(name.clone());
                        exprs.push(Expression::Identifier(name.clone()));
                    }
                }
                SelectColumn::Expr { expr, alias } => {
                    names.push(alias.clone().unwrap_or_else(|| Self::column_name(expr)));
                    exprs.push(expr.clone());
                }
            }
        }
        (names, exprs)
    }

    fn column_name(expr: &Expression) -> String {
        match expr {
            Expression::Identifier(name) => name.clone(),
            Expression::Function(FunctionCall { func, distinct, args }) => {
                let prefix = if *distinct { "DISTINCT " } else { "" };
                match args.first() {
                    Some(Expression::Identifier(arg)) => format!("{}({prefix}{arg})", func.name()),
                    Some(Expression::Wildcard) => format!("{}({prefix}*)", func.name()),
                    _ => func.name().to_string(),
                }
            }
            _ => "?".to_string(),
        }
    }

    fn check_columns(expr: &Expression, schema_columns: &[String]) -> Result<(), DatabaseError> {
        match expr {
            Expression::Identifier(name) => {
                if schema_columns.contains(name) {
                    Ok(())
                } else {
                    Err(DatabaseError::ColumnNotFound(name.clone()))
                }
            }
            Expression::Unary { operand, .. } => Self::check_columns(operand, schema_columns),
            Expression::Binary { left, right, .. } => {
                Self::check_columns(left, schema_columns)?;
                Self::check_columns(right, schema_columns)
            }
            Expression::Function(call) => call
                .args
                .iter()
                .try_for_each(|arg| Self::check_columns(arg, schema_columns)),
            _ => Ok(()),
        }
    }

    /// Projection path: one scan producing the filtered, projected rows.
    fn select_rows(
        table: &Table,
        schema_columns: &[String],
        exprs: &[Expression],
        filter: Option<&Expression>,
    ) -> Result<Vec<Vec<Value>>, DatabaseError> {
        let mut rows = Vec::new();
        let mut failure = None;

        table.scan(|_, row| {
            let projected = Self::matches(filter, schema_columns, row).and_then(|matched| {
                if !matched {
                    return Ok(None);
                }
                exprs
                    .iter()
                    .map(|expr| ExpressionEvaluator::evaluate_expression(expr, schema_columns, row))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Some)
            });
            match projected {
                Ok(Some(out)) => rows.push(out),
                Ok(None) => {}
                Err(e) => {
                    failure = Some(e);
                    return false;
                }
            }
            true
        })?;

        match failure {
            Some(e) => Err(e),
            None => Ok(rows),
        }
    }

    /// Aggregate path: a single scan feeding one state per function item.
    /// Non-aggregate items come out as NULL.
    fn select_aggregate(
        table: &Table,
        schema_columns: &[String],
        exprs: &[Expression],
        filter: Option<&Expression>,
    ) -> Result<Vec<Value>, DatabaseError> {
        let mut states: Vec<AggregateState> = exprs.iter().map(|_| AggregateState::default()).collect();
        let mut failure = None;

        table.scan(|_, row| {
            let step = Self::matches(filter, schema_columns, row).and_then(|matched| {
                if !matched {
                    return Ok(());
                }
                for (expr, state) in exprs.iter().zip(states.iter_mut()) {
                    if let Expression::Function(call) = expr {
                        Self::accumulate(call, state, schema_columns, row)?;
                    }
                }
                Ok(())
            });
            if let Err(e) = step {
                failure = Some(e);
                return false;
            }
            true
        })?;

        if let Some(e) = failure {
            return Err(e);
        }

        Ok(exprs
            .iter()
            .zip(states)
            .map(|(expr, state)| match expr {
                Expression::Function(call) => Self::finish(call, state),
                _ => Value::Null,
            })
            .collect())
    }

    fn matches(
        filter: Option<&Expression>,
        columns: &[String],
        row: &[Value],
    ) -> Result<bool, DatabaseError> {
        filter.map_or(Ok(true), |expr| ExpressionEvaluator::evaluate_condition(expr, columns, row))
    }

    fn accumulate(
        call: &FunctionCall,
        state: &mut AggregateState,
        columns: &[String],
        row: &[Value],
    ) -> Result<(), DatabaseError> {
        let arg = match call.args.first() {
            None | Some(Expression::Wildcard) => None,
            Some(expr) => Some(ExpressionEvaluator::evaluate_expression(expr, columns, row)?),
        };

        match call.func {
            AggregateFunction::Count if call.distinct => {
                let key = match &arg {
                    Some(value) if value.is_null() => return Ok(()),
                    Some(value) => value.to_string(),
                    None => Self::row_key(row),
                };
                state.seen.insert(key);
            }
            AggregateFunction::Count => state.count += 1,
            AggregateFunction::Sum | AggregateFunction::Avg => {
                if let Some(n) = arg.as_ref().and_then(Value::to_numeric) {
                    state.sum += n;
                    state.count += 1;
                }
            }
            AggregateFunction::Min | AggregateFunction::Max => {
                let Some(value) = arg.filter(|v| !v.is_null()) else {
                    return Ok(());
                };
                let wanted = if call.func == AggregateFunction::Min {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Greater
                };
                let replace = state
                    .extremum
                    .as_ref()
                    .is_none_or(|current| value.compare(current) == wanted);
                if replace {
                    state.extremum = Some(value);
                }
            }
        }
        Ok(())
    }

    fn finish(call: &FunctionCall, state: AggregateState) -> Value {
        match call.func {
            AggregateFunction::Count if call.distinct => Value::Int64(state.seen.len() as i64),
            AggregateFunction::Count => Value::Int64(state.count),
            AggregateFunction::Sum if state.count > 0 => Value::Float64(state.sum),
            AggregateFunction::Avg if state.count > 0 => {
                Value::Float64(state.sum / state.count as f64)
            }
            AggregateFunction::Sum | AggregateFunction::Avg => Value::Null,
            AggregateFunction::Min | AggregateFunction::Max => state.extremum.unwrap_or(Value::Null),
        }
    }

    /// Keeps the first occurrence of each row, in order.
    fn apply_distinct(rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
        let mut seen = HashSet::new();
        rows.into_iter()
            .filter(|row| seen.insert(Self::row_key(row)))
            .collect()
    }

    /// NUL-joined display form; `1` and `1.000000` are different keys.
    fn row_key(row: &[Value]) -> String {
        row.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\0")
    }

    /// Stable multi-key sort over output rows.
    fn apply_order_by(rows: &mut [Vec<Value>], order: &[(usize, SortOrder)]) {
        rows.sort_by(|a, b| {
            for &(idx, direction) in order {
                let ordering = a[idx].compare(&b[idx]);
                if ordering.is_ne() {
                    return match direction {
                        SortOrder::Asc => ordering,
                        SortOrder::Desc => ordering.reverse(),
                    };
                }
            }
            std::cmp::Ordering::Equal
        });
    }
}
