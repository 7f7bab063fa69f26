use std::ops::Range;

use serde_json::Map;

use super::TableError;
use super::value::{DType, Value};

/// A named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: DType,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn slice(&self, range: Range<usize>) -> Self {
        Self {
            name: self.name.clone(),
            dtype: self.dtype,
            values: self.values[range].to_vec(),
        }
    }
}

/// In-memory table stored column by column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<Column>,
    height: usize,
}

impl DataFrame {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let height = columns.first().map(Column::len).unwrap_or(0);
        if let Some(column) = columns.iter().find(|c| c.len() != height) {
            return Err(TableError::Malformed(format!(
                "column '{}' has {} values, expected {height}",
                column.name(),
                column.len()
            )));
        }
        Ok(Self { columns, height })
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.columns.len())
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn dtypes(&self) -> Vec<(String, DType)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.dtype))
            .collect()
    }

    /// Cells of row `index`, in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.height {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// First `n` rows; a negative `n` keeps all rows except the last `|n|`
    pub fn head(&self, n: i64) -> Self {
        let count = clamp(n, self.height);
        let end = if n >= 0 { count } else { self.height - count };
        self.slice(0..end)
    }

    /// Last `n` rows; a negative `n` keeps all rows except the first `|n|`
    pub fn tail(&self, n: i64) -> Self {
        let count = clamp(n, self.height);
        let start = if n >= 0 { self.height - count } else { count };
        self.slice(start..self.height)
    }

    fn slice(&self, range: Range<usize>) -> Self {
        Self {
            height: range.len(),
            columns: self.columns.iter().map(|c| c.slice(range.clone())).collect(),
        }
    }

    /// Rows as JSON objects keyed by column name, in column order
    pub fn to_records(&self) -> Vec<Map<String, serde_json::Value>> {
        (0..self.height)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values[i].to_json()))
                    .collect()
            })
            .collect()
    }
}

fn clamp(n: i64, height: usize) -> usize {
    usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX).min(height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "name",
                DType::Object,
                vec!["Alice".into(), "Bob".into(), "Charlie".into()],
            ),
            Column::new("age", DType::Int64, vec![30.into(), 25.into(), 35.into()]),
        ])
        .unwrap()
    }

    fn names(frame: &DataFrame) -> Vec<String> {
        frame
            .column("name")
            .unwrap()
            .values()
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_head_and_tail() {
        let frame = people();
        assert_eq!(names(&frame.head(2)), ["Alice", "Bob"]);
        assert_eq!(names(&frame.tail(2)), ["Bob", "Charlie"]);
        assert_eq!(frame.head(10).shape(), (3, 2));
        assert_eq!(frame.tail(10).shape(), (3, 2));
    }

    #[test]
    fn test_zero_and_negative_counts() {
        let frame = people();
        assert_eq!(frame.head(0).shape(), (0, 2));
        assert_eq!(frame.tail(0).shape(), (0, 2));
        assert_eq!(names(&frame.head(-1)), ["Alice", "Bob"]);
        assert_eq!(names(&frame.tail(-1)), ["Bob", "Charlie"]);
        assert_eq!(frame.head(-5).height(), 0);
        assert_eq!(frame.tail(i64::MIN).height(), 0);
    }

    #[test]
    fn test_records_keep_column_order() {
        let records = people().head(1).to_records();
        assert_eq!(records.len(), 1);
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, ["name", "age"]);
        assert_eq!(records[0]["age"], serde_json::json!(30));
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let err = DataFrame::new(vec![
            Column::new("a", DType::Int64, vec![1.into()]),
            Column::new("b", DType::Int64, vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::Malformed(_)));
    }

    #[test]
    fn test_row_access() {
        let frame = people();
        assert_eq!(frame.row(1).unwrap(), [&Value::from("Bob"), &Value::Int(25)]);
        assert!(frame.row(3).is_none());
    }
}
