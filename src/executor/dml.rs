/// DML (Data Manipulation Language) operations
///
/// INSERT. Every insert rewrites all of the table's column files.

use crate::core::{DatabaseError, TableSchema, Value};
use crate::parser::Expression;
use tracing::{debug, warn};
use super::conditions::ExpressionEvaluator;
use super::{Executor, QueryResult};

pub struct DmlExecutor;

impl DmlExecutor {
    /// Execute INSERT statement
    ///
    /// With an explicit column list, unlisted columns are NULL. Without one,
    /// the values must cover every column in schema order.
    pub fn insert(
        executor: &Executor,
        table_name: &str,
        columns: Option<&[String]>,
        values: &[Expression],
    ) -> Result<QueryResult, DatabaseError> {
        executor.with_table(table_name, |table| {
            let row = Self::build_row(table.schema(), columns, values)?;
            table.insert(&row)?;
            if let Err(e) = table.save() {
                table.pop_row();
                // bring any files that were already rewritten back in line
                if let Err(restore) = table.save() {
                    warn!(table = table_name, error = %restore, "could not restore table files");
                }
                return Err(e);
            }
            debug!(table = table_name, rows = table.row_count(), "row inserted");
            Ok(QueryResult::with_message("1 row inserted"))
        })
    }

    /// Evaluates the value expressions and lays them out in schema order,
    /// coerced to each column's type.
    fn build_row(
        schema: &TableSchema,
        columns: Option<&[String]>,
        values: &[Expression],
    ) -> Result<Vec<Value>, DatabaseError> {
        // values carry no row context; identifiers evaluate to NULL
        let evaluated = values
            .iter()
            .map(|expr| ExpressionEvaluator::evaluate_expression(expr, &[], &[]))
            .collect::<Result<Vec<_>, _>>()?;

        let ordered = match columns {
            Some(names) => {
                if names.len() != evaluated.len() {
                    return Err(DatabaseError::ColumnCountMismatch {
                        expected: names.len(),
                        actual: evaluated.len(),
                    });
                }
                let mut row = vec![Value::Null; schema.columns.len()];
                for (name, value) in names.iter().zip(evaluated) {
                    let idx = schema
                        .get_column_index(name)
                        .ok_or_else(|| DatabaseError::ColumnNotFound(name.clone()))?;
                    row[idx] = value;
                }
                row
            }
            None => {
                if evaluated.len() != schema.columns.len() {
                    return Err(DatabaseError::ColumnCountMismatch {
                        expected: schema.columns.len(),
                        actual: evaluated.len(),
                    });
                }
                evaluated
            }
        };

        schema
            .columns
            .iter()
            .zip(ordered)
            .map(|(col, value)| {
                if value.is_null() && !col.nullable {
                    return Err(DatabaseError::NotNullViolation(col.name.clone()));
                }
                let actual = value.data_type();
                value.coerce_to(col.data_type).ok_or_else(|| DatabaseError::TypeMismatch {
                    column: col.name.clone(),
                    expected: col.data_type.to_string(),
                    actual: actual.to_string(),
                })
            })
            .collect()
    }
}
