use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("table '{0}' does not exist")]
    TableNotFound(String),
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),
    #[error("column '{0}' not found")]
    ColumnNotFound(String),
    #[error("column '{0}' specified more than once")]
    DuplicateColumn(String),
    #[error("column count mismatch: expected {expected}, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },
    #[error("type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },
    #[error("column '{0}' does not accept NULL")]
    NotNullViolation(String),
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
    #[error("invalid column file '{path}': {reason}")]
    InvalidColumnFile { path: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
