use serde::{Deserialize, Serialize};

/// Column type. The discriminant is the on-disk type code used by column
/// files and by the JSON catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum DataType {
    /// Untyped: produced for unknown type names in CREATE TABLE.
    Null = 0,
    Bool = 1,
    Int64 = 2,
    Float64 = 3,
    String = 4,
    Timestamp = 5,
}

impl DataType {
    /// Resolves a type name coming from CREATE TABLE. Unknown names resolve
    /// to `DataType::Null` rather than failing.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "INT64" | "INT" | "INTEGER" | "BIGINT" => Self::Int64,
            "FLOAT64" | "FLOAT" | "DOUBLE" | "REAL" => Self::Float64,
            "STRING" | "VARCHAR" | "TEXT" => Self::String,
            "BOOL" | "BOOLEAN" => Self::Bool,
            "TIMESTAMP" => Self::Timestamp,
            _ => Self::Null,
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Null),
            1 => Some(Self::Bool),
            2 => Some(Self::Int64),
            3 => Some(Self::Float64),
            4 => Some(Self::String),
            5 => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Width in bytes of one slot for fixed-width types.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Bool => Some(1),
            Self::Int64 | Self::Float64 | Self::Timestamp => Some(8),
            Self::Null | Self::String => None,
        }
    }
}

impl From<DataType> for u8 {
    fn from(data_type: DataType) -> Self {
        data_type.code()
    }
}

impl TryFrom<u8> for DataType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown data type code {code}"))
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::Bool => "BOOL",
            Self::Int64 => "INT64",
            Self::Float64 => "FLOAT64",
            Self::String => "STRING",
            Self::Timestamp => "TIMESTAMP",
        };
        write!(f, "{name}")
    }
}
