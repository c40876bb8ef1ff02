use bytes::{Buf, BufMut, BytesMut};
use crate::core::value::{timestamp_from_micros, timestamp_to_micros};
use crate::core::{DataType, DatabaseError, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column file signature: "TCOL"
pub const COLUMN_FILE_MAGIC: &[u8; 4] = b"TCOL";

/// Current on-disk format version
pub const COLUMN_FILE_VERSION: u16 = 1;

/// magic(4) + version(2) + type(1) + row count(8) + null mask size(8)
const HEADER_LEN: usize = 23;

/// One column of one table, held fully in memory and written back whole.
///
/// Layout (little-endian):
/// magic(4) version(2) type(1) rows(8) mask_len(8) mask(N) data_len(8) data(M)
///
/// Bit `i % 8` of mask byte `i / 8` set means row `i` is NULL. NULL rows still
/// occupy a zeroed slot in `data` (a zero-length string for STRING columns).
#[derive(Debug, Clone)]
pub struct ColumnFile {
    path: PathBuf,
    data_type: DataType,
    row_count: usize,
    null_mask: Vec<u8>,
    data: Vec<u8>,
    /// Start offset of every row in `data`. STRING columns only.
    string_offsets: Vec<usize>,
}

impl ColumnFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, data_type: DataType) -> Self {
        Self {
            path: path.into(),
            data_type,
            row_count: 0,
            null_mask: Vec::new(),
            data: Vec::new(),
            string_offsets: Vec::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Checks that `value` can be appended without touching the column.
    pub fn check(&self, value: &Value) -> Result<(), DatabaseError> {
        if value.is_null() || value.data_type() == self.data_type {
            Ok(())
        } else {
            Err(DatabaseError::TypeMismatch {
                column: self.path.display().to_string(),
                expected: self.data_type.to_string(),
                actual: value.data_type().to_string(),
            })
        }
    }

    /// Appends one row. The value must be NULL or of the column's type.
    pub fn append(&mut self, value: &Value) -> Result<(), DatabaseError> {
        self.check(value)?;

        let row = self.row_count;
        if row % 8 == 0 {
            self.null_mask.push(0);
        }
        if value.is_null() {
            self.null_mask[row / 8] |= 1 << (row % 8);
        }
        if self.data_type == DataType::String {
            self.string_offsets.push(self.data.len());
        }

        let mut buf = BytesMut::new();
        match value {
            Value::Null => self.encode_placeholder(&mut buf),
            Value::Bool(b) => buf.put_u8(u8::from(*b)),
            Value::Int64(n) => buf.put_i64_le(*n),
            Value::Float64(f) => buf.put_f64_le(*f),
            Value::String(s) => {
                buf.put_u32_le(s.len() as u32);
                buf.put_slice(s.as_bytes());
            }
            Value::Timestamp(ts) => buf.put_i64_le(timestamp_to_micros(ts)),
        }
        self.data.extend_from_slice(&buf);
        self.row_count += 1;
        Ok(())
    }

    /// Removes the most recently appended row, if any.
    pub fn truncate_last(&mut self) {
        let Some(row) = self.row_count.checked_sub(1) else {
            return;
        };
        let start = match (self.data_type.fixed_width(), self.data_type) {
            (Some(width), _) => row * width,
            (None, DataType::String) => self.string_offsets.pop().unwrap_or(self.data.len()),
            (None, _) => self.data.len(),
        };
        self.data.truncate(start);
        if row % 8 == 0 {
            self.null_mask.pop();
        } else if let Some(byte) = self.null_mask.get_mut(row / 8) {
            *byte &= !(1 << (row % 8));
        }
        self.row_count = row;
    }

    fn encode_placeholder(&self, buf: &mut BytesMut) {
        match self.data_type {
            DataType::String => buf.put_u32_le(0),
            other => buf.put_bytes(0, other.fixed_width().unwrap_or(0)),
        }
    }

    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        self.null_mask
            .get(row / 8)
            .is_some_and(|byte| byte & (1 << (row % 8)) != 0)
    }

    /// Reads row `row`. Fixed-width types are addressed as `row * width`;
    /// strings go through the offset index.
    pub fn get(&self, row: usize) -> Result<Value, DatabaseError> {
        if row >= self.row_count {
            return Err(self.invalid(format!(
                "row {row} out of range ({} rows)",
                self.row_count
            )));
        }
        if self.is_null(row) {
            return Ok(Value::Null);
        }

        let offset = match (self.data_type.fixed_width(), self.data_type) {
            (Some(width), _) => row * width,
            (None, DataType::String) => self.string_offsets[row],
            (None, _) => return Ok(Value::Null),
        };
        let mut cur = self.data.get(offset..).unwrap_or_default();

        let value = match self.data_type {
            DataType::Null => Value::Null,
            DataType::Bool => {
                self.ensure(&cur, 1)?;
                Value::Bool(cur.get_u8() != 0)
            }
            DataType::Int64 => {
                self.ensure(&cur, 8)?;
                Value::Int64(cur.get_i64_le())
            }
            DataType::Float64 => {
                self.ensure(&cur, 8)?;
                Value::Float64(cur.get_f64_le())
            }
            DataType::Timestamp => {
                self.ensure(&cur, 8)?;
                let micros = cur.get_i64_le();
                let ts = timestamp_from_micros(micros)
                    .ok_or_else(|| self.invalid(format!("timestamp {micros} out of range")))?;
                Value::Timestamp(ts)
            }
            DataType::String => {
                self.ensure(&cur, 4)?;
                let len = cur.get_u32_le() as usize;
                self.ensure(&cur, len)?;
                let text = String::from_utf8(cur[..len].to_vec())
                    .map_err(|e| self.invalid(format!("row {row}: {e}")))?;
                Value::String(text)
            }
        };
        Ok(value)
    }

    /// Rewrites the whole file.
    pub fn save(&self) -> Result<(), DatabaseError> {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.null_mask.len() + 8 + self.data.len());

        buf.put_slice(COLUMN_FILE_MAGIC);
        buf.put_u16_le(COLUMN_FILE_VERSION);
        buf.put_u8(self.data_type.code());
        buf.put_u64_le(self.row_count as u64);
        buf.put_u64_le(self.null_mask.len() as u64);
        buf.put_slice(&self.null_mask);
        buf.put_u64_le(self.data.len() as u64);
        buf.put_slice(&self.data);

        fs::write(&self.path, &buf)?;
        debug!(path = %self.path.display(), rows = self.row_count, "saved column file");
        Ok(())
    }

    pub fn load(path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();
        let raw = fs::read(&path)?;
        let mut column = Self::new(path, DataType::Null);
        let mut cur = raw.as_slice();

        if cur.get(..4) != Some(COLUMN_FILE_MAGIC.as_slice()) {
            return Err(column.invalid("bad magic".to_string()));
        }
        column.ensure(&cur, HEADER_LEN)?;
        cur.advance(4);

        let version = cur.get_u16_le();
        if version != COLUMN_FILE_VERSION {
            return Err(column.invalid(format!("unsupported version {version}")));
        }
        let code = cur.get_u8();
        column.data_type = DataType::from_code(code)
            .ok_or_else(|| column.invalid(format!("unknown data type code {code}")))?;
        column.row_count = cur.get_u64_le() as usize;

        let mask_len = cur.get_u64_le() as usize;
        column.ensure(&cur, mask_len)?;
        column.null_mask = cur[..mask_len].to_vec();
        cur.advance(mask_len);

        column.ensure(&cur, 8)?;
        let data_len = cur.get_u64_le() as usize;
        column.ensure(&cur, data_len)?;
        column.data = cur[..data_len].to_vec();

        if column.null_mask.len() != column.row_count.div_ceil(8) {
            return Err(column.invalid(format!(
                "null mask holds {} bytes for {} rows",
                mask_len, column.row_count
            )));
        }
        column.build_index()?;

        debug!(path = %column.path.display(), rows = column.row_count, "loaded column file");
        Ok(column)
    }

    /// Validates the data section and, for STRING columns, records the start
    /// offset of each row.
    fn build_index(&mut self) -> Result<(), DatabaseError> {
        match self.data_type {
            DataType::String => {
                let mut offsets = Vec::with_capacity(self.row_count);
                let mut offset = 0;
                for _ in 0..self.row_count {
                    let mut cur = self.data.get(offset..).unwrap_or_default();
                    self.ensure(&cur, 4)?;
                    let len = cur.get_u32_le() as usize;
                    self.ensure(&cur, len)?;
                    offsets.push(offset);
                    offset += 4 + len;
                }
                self.string_offsets = offsets;
            }
            other => {
                let expected = other.fixed_width().unwrap_or(0) * self.row_count;
                if self.data.len() != expected {
                    return Err(self.invalid(format!(
                        "data section holds {} bytes, expected {expected}",
                        self.data.len()
                    )));
                }
            }
        }
        Ok(())
    }

    fn ensure(&self, cur: &[u8], needed: usize) -> Result<(), DatabaseError> {
        if cur.remaining() < needed {
            return Err(self.invalid("unexpected end of file".to_string()));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> DatabaseError {
        DatabaseError::InvalidColumnFile {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn round_trip(data_type: DataType, values: &[Value]) -> ColumnFile {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("col_x.dat");

        let mut column = ColumnFile::new(&path, data_type);
        for value in values {
            column.append(value).unwrap();
        }
        column.save().unwrap();

        let loaded = ColumnFile::load(&path).unwrap();
        assert_eq!(loaded.data_type(), data_type);
        assert_eq!(loaded.row_count(), values.len());
        for (i, value) in values.iter().enumerate() {
            assert_eq!(loaded.is_null(i), value.is_null());
            assert_eq!(&loaded.get(i).unwrap(), value);
        }
        loaded
    }

    #[test]
    fn test_fixed_width_columns_with_nulls() {
        round_trip(
            DataType::Int64,
            &[Value::Int64(1), Value::Null, Value::Int64(-7), Value::Int64(i64::MAX)],
        );
        round_trip(DataType::Float64, &[Value::Float64(2.5), Value::Null]);
        round_trip(DataType::Bool, &[Value::Bool(true), Value::Bool(false), Value::Null]);
    }

    #[test]
    fn test_string_column_with_nulls() {
        let values: Vec<Value> = (0..20)
            .map(|i| {
                if i % 3 == 0 {
                    Value::Null
                } else {
                    Value::String("x".repeat(i))
                }
            })
            .collect();
        let loaded = round_trip(DataType::String, &values);
        // null placeholder is a zero-length string: 4 bytes each
        let expected_len: usize = (0..20).map(|i| if i % 3 == 0 { 4 } else { 4 + i }).sum();
        assert_eq!(loaded.data.len(), expected_len);
    }

    #[test]
    fn test_timestamp_column() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_micro_opt(23, 59, 58, 123_456)
            .unwrap();
        round_trip(DataType::Timestamp, &[Value::Timestamp(ts), Value::Null]);
    }

    #[test]
    fn test_truncate_last_restores_previous_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut column = ColumnFile::new(temp_dir.path().join("c.dat"), DataType::String);
        for i in 0..8 {
            column.append(&Value::String(format!("v{i}"))).unwrap();
        }
        let snapshot = (column.null_mask.clone(), column.data.clone(), column.string_offsets.clone());

        column.append(&Value::Null).unwrap();
        assert!(column.is_null(8));
        column.truncate_last();
        assert_eq!(column.row_count(), 8);
        assert_eq!(
            (column.null_mask.clone(), column.data.clone(), column.string_offsets.clone()),
            snapshot
        );

        column.append(&Value::String("again".to_string())).unwrap();
        assert_eq!(column.get(8).unwrap(), Value::String("again".to_string()));
        assert!(!column.is_null(8));

        let mut ints = ColumnFile::new(temp_dir.path().join("i.dat"), DataType::Int64);
        ints.append(&Value::Int64(1)).unwrap();
        ints.append(&Value::Null).unwrap();
        ints.truncate_last();
        assert!(!ints.is_null(1));
        assert_eq!(ints.data.len(), 8);
        ints.truncate_last();
        ints.truncate_last();
        assert_eq!(ints.row_count(), 0);
        assert!(ints.null_mask.is_empty());
    }

    #[test]
    fn test_empty_and_all_null_columns() {
        round_trip(DataType::String, &[]);
        let loaded = round_trip(DataType::Int64, &vec![Value::Null; 9]);
        assert_eq!(loaded.null_mask, vec![0xFF, 0x01]);
        assert_eq!(loaded.data.len(), 9 * 8);
    }

    #[test]
    fn test_header_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("col_id.dat");
        let mut column = ColumnFile::new(&path, DataType::Int64);
        column.append(&Value::Int64(5)).unwrap();
        column.append(&Value::Null).unwrap();
        column.save().unwrap();

        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[0..4], b"TCOL");
        assert_eq!(&raw[4..6], &[1, 0]);
        assert_eq!(raw[6], 2);
        assert_eq!(&raw[7..15], &2u64.to_le_bytes());
        assert_eq!(&raw[15..23], &1u64.to_le_bytes());
        assert_eq!(raw[23], 0b10);
        assert_eq!(&raw[24..32], &16u64.to_le_bytes());
        assert_eq!(&raw[32..40], &5i64.to_le_bytes());
        assert_eq!(raw.len(), 48);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("col_bad.dat");
        fs::write(&path, b"NOPE\x01\x00\x02").unwrap();
        match ColumnFile::load(&path) {
            Err(DatabaseError::InvalidColumnFile { reason, .. }) => assert_eq!(reason, "bad magic"),
            other => panic!("expected InvalidColumnFile, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("col_s.dat");
        let mut column = ColumnFile::new(&path, DataType::String);
        column.append(&Value::String("hello".to_string())).unwrap();
        column.save().unwrap();

        let raw = fs::read(&path).unwrap();
        fs::write(&path, &raw[..raw.len() - 2]).unwrap();
        assert!(ColumnFile::load(&path).is_err());
    }

    #[test]
    fn test_type_checked_append() {
        let mut column = ColumnFile::new("unused.dat", DataType::Int64);
        let err = column.append(&Value::String("x".to_string())).unwrap_err();
        assert!(matches!(err, DatabaseError::TypeMismatch { .. }));
        assert_eq!(column.row_count(), 0);
        assert!(column.get(0).is_err());
    }
}
