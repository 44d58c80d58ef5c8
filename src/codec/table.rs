//! Record tables shared by the tabular strategies

use serde_json::{Map, Value};

/// Rows of a tabular value with the union of their columns
#[derive(Debug, Default, PartialEq)]
pub(super) struct Table {
    /// Column names in first-appearance order
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl Table {
    /// View a serialized value as records
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Array(items) = value else {
            return Err("tabular strategies need a sequence of records".to_string());
        };

        let mut table = Self::default();
        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(row) = item else {
                return Err(format!("row {} is not a record", index));
            };
            for key in row.keys() {
                if !table.columns.contains(key) {
                    table.columns.push(key.clone());
                }
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Cell of a row, `null` when absent
    pub fn cell<'a>(row: &'a Map<String, Value>, column: &str) -> &'a Value {
        row.get(column).unwrap_or(&Value::Null)
    }

    /// Rebuild the serialized value
    pub fn into_value(self) -> Value {
        Value::Array(self.rows.into_iter().map(Value::Object).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn columns_are_unioned_in_order() {
        let table = Table::from_value(json!([{"a": 1}, {"b": 2, "a": 3}])).unwrap();
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(Table::cell(&table.rows[0], "b"), &Value::Null);
    }

    #[test]
    fn non_records_are_rejected() {
        assert!(Table::from_value(json!(3)).is_err());
        assert!(Table::from_value(json!([1, 2])).unwrap_err().contains("row 0"));
    }
}
