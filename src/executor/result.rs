use crate::core::Value;
use comfy_table::{presets::UTF8_FULL, Cell, Table as ComfyTable};

/// Outcome of one statement: a tabular result, a status message, or both.
/// Every row has exactly `columns.len()` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub message: Option<String>,
}

impl QueryResult {
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            message: None,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Renders the rows as a box-drawn table, or the status message when the
    /// result has no columns.
    #[must_use]
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return self.message.clone().unwrap_or_default();
        }

        let mut table = ComfyTable::new();
        table.load_preset(UTF8_FULL);
        table.set_header(self.columns.iter().map(Cell::new));
        for row in &self.rows {
            table.add_row(row.iter().map(|value| Cell::new(value.to_string())));
        }
        table.to_string()
    }
}
