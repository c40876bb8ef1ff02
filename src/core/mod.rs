// Module declarations
pub mod error;
pub mod value;
pub mod data_type;
pub mod column;
pub mod schema;

// Re-exports for convenience
pub use error::DatabaseError;
pub use value::Value;
pub use data_type::DataType;
pub use column::ColumnDef;
pub use schema::TableSchema;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cmp::Ordering;

    fn users_schema() -> TableSchema {
        let mut schema = TableSchema::new("users");
        schema.add_column("id", DataType::Int64, false);
        schema.add_column("name", DataType::String, true);
        schema
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int64(42).to_string(), "42");
        assert_eq!(Value::Float64(3.5).to_string(), "3.500000");
        assert_eq!(Value::String("hello".to_string()).to_string(), "hello");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int64(42).as_int64(), Some(42));
        assert_eq!(Value::String("hello".to_string()).as_int64(), None);
        assert_eq!(Value::Null.as_int64(), None);
        assert_eq!(Value::String("hello".to_string()).as_str(), Some("hello"));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::Int64(1).as_bool(), None);
    }

    #[test]
    fn test_to_numeric_widens_only_numbers() {
        assert_eq!(Value::Int64(7).to_numeric(), Some(7.0));
        assert_eq!(Value::Float64(2.5).to_numeric(), Some(2.5));
        assert_eq!(Value::String("7".to_string()).to_numeric(), None);
        assert_eq!(Value::Bool(true).to_numeric(), None);
        assert_eq!(Value::Null.to_numeric(), None);
    }

    #[test]
    fn test_compare_null_ordering() {
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
        assert_eq!(Value::Null.compare(&Value::Int64(-100)), Ordering::Less);
        assert_eq!(Value::Bool(false).compare(&Value::Null), Ordering::Greater);
    }

    #[test]
    fn test_compare_homogeneous() {
        assert_eq!(Value::Bool(false).compare(&Value::Bool(true)), Ordering::Less);
        assert_eq!(Value::Int64(3).compare(&Value::Int64(2)), Ordering::Greater);
        assert_eq!(Value::Float64(1.5).compare(&Value::Int64(2)), Ordering::Less);
        assert_eq!(
            Value::String("B".to_string()).compare(&Value::String("a".to_string())),
            Ordering::Less
        );
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            Value::Timestamp(earlier).compare(&Value::Timestamp(later)),
            Ordering::Less
        );
    }

    #[test]
    fn test_coerce_to_column_types() {
        assert_eq!(Value::Int64(2).coerce_to(DataType::Float64), Some(Value::Float64(2.0)));
        assert_eq!(Value::Null.coerce_to(DataType::Int64), Some(Value::Null));
        assert_eq!(Value::String("x".to_string()).coerce_to(DataType::Int64), None);
        assert_eq!(Value::Int64(1).coerce_to(DataType::Null), None);

        let ts = Value::String("2024-03-01 12:30:00".to_string())
            .coerce_to(DataType::Timestamp)
            .unwrap();
        assert_eq!(ts.to_string(), "2024-03-01 12:30:00");
    }

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::from_name("int64"), DataType::Int64);
        assert_eq!(DataType::from_name("TEXT"), DataType::String);
        assert_eq!(DataType::from_name("BOOLEAN"), DataType::Bool);
        assert_eq!(DataType::from_name("TIMESTAMP"), DataType::Timestamp);
        assert_eq!(DataType::from_name("BLOB"), DataType::Null);
        assert_eq!(DataType::from_code(4), Some(DataType::String));
        assert_eq!(DataType::from_code(9), None);
    }

    #[test]
    fn test_schema_positions_and_lookup() {
        let schema = users_schema();
        assert_eq!(schema.columns[1].position, 1);
        assert_eq!(schema.get_column_index("id"), Some(0));
        assert_eq!(schema.get_column_index("age"), None);
        assert_eq!(schema.column_names(), vec!["id".to_string(), "name".to_string()]);
        assert!(!schema.get_column("id").unwrap().nullable);
    }

    #[test]
    fn test_schema_json_uses_type_codes() {
        let schema = users_schema();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["columns"][0]["type"], 2);
        assert_eq!(json["columns"][1]["type"], 4);
        assert_eq!(json["columns"][1]["position"], 1);

        let back: TableSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }
}
