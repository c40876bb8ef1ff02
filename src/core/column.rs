use serde::{Deserialize, Serialize};
use super::data_type::DataType;

/// One column of a table schema. `position` is the column's ordinal in the
/// schema and is what row layout follows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub nullable: bool,
    pub position: usize,
}
